//! Post-hoc assertions over recorded calls.
//!
//! The helpers report failures through a [`Failer`] so they can plug into any
//! test harness; [`PanicFailer`] suits the built-in one.

mod no_match;
mod request_assertions;

pub use no_match::NoMatchRecorder;
pub use request_assertions::RequestAssertions;

/// Capability to abort the current test with a message.
pub trait Failer {
    fn fail(&self, message: String) -> !;
}

/// Fails by panicking, which the standard test harness reports as a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicFailer;

impl Failer for PanicFailer {
    fn fail(&self, message: String) -> ! {
        panic!("{message}")
    }
}
