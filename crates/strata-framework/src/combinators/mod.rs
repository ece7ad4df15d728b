//! Combinator library.
//!
//! Every combinator takes one or more middleware (and sometimes a
//! [`Condition`](crate::Condition) or a factory) and returns a new
//! [`Middleware`](strata_core::Middleware). None of them hold state across
//! invocations, except [`lazy`], which caches the middleware its factory
//! produced.
//!
//! | Combinator | Behaviour |
//! |---|---|
//! | [`skip`] | Continues immediately. |
//! | [`stop`] | Ends the chain. |
//! | [`lazy`] | Resolves the middleware on first use, then reuses it. |
//! | [`tap`] | Runs a middleware for side effects, then continues. |
//! | [`fork`] | Spawns a middleware in the background, then continues. |
//! | [`branch`] | Picks one of two middleware from a condition. |
//! | [`optional`] | Runs a middleware when the condition holds, else continues. |
//! | [`filter`] | Runs a middleware when the condition holds, else ends the chain. |
//! | [`before`] | Runs a middleware only if a gate continues. |
//! | [`after`] | Runs a follow-up only if a middleware continues. |
//! | [`enforce`] | Gate, middleware, follow-up; each must continue to reach the next. |
//! | [`caught`] | Hands downstream errors to an error handler. |
//! | [`concurrency`] | Runs a set concurrently; continues if all of them did. |

mod branch;
mod caught;
mod concurrency;
mod flow;
mod sequence;

#[cfg(test)]
pub(crate) mod test_support;

pub use branch::{branch, filter, optional};
pub use caught::caught;
pub use concurrency::concurrency;
pub use flow::{fork, lazy, skip, stop, tap};
pub use sequence::{after, before, enforce};
