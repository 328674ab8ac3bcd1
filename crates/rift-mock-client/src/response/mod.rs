//! Canned responses and the per-pattern response queue.
//!
//! - `mock_response`: `MockResponse`, the status/headers/body triple a pattern answers with
//! - `queue`: `ResponseQueue`, the single-or-sequential queue of responses and errors
//! - `factory`: `ResponseFactory`, turning a `MockResponse` into a host HTTP response

mod factory;
mod mock_response;
mod queue;

pub use factory::{HyperResponseFactory, ResponseFactory};
pub use mock_response::MockResponse;
pub use queue::{QueueItem, ResponseMode, ResponseQueue};
