//! Request matching and resolution.
//!
//! - `match_result`: score and mismatch reason of a single comparison
//! - `request_matcher`: per-dimension checks and additive scoring
//! - `resolver`: selection of the winning pattern across a registry

mod match_result;
mod request_matcher;
mod resolver;

pub use match_result::{MatchDimension, MatchResult};
pub use request_matcher::RequestMatcher;
pub use resolver::Resolver;
