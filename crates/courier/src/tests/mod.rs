//! Test suites for the courier runtime.

mod dispatch_behaviour;
pub(crate) mod support;
mod unit;
