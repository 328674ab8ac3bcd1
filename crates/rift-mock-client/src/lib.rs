//! Request-matching test doubles for outbound HTTP calls.
//!
//! Tests register [`RequestPattern`]s describing the calls they expect, each with a
//! queue of canned responses or errors. The transport hands every intercepted call
//! to a [`PatternRegistry`], which scores all patterns against it, records the call
//! on the best match and answers with that pattern's next queued response.
//!
//! ```
//! use rift_mock_client::{MockResponse, PatternRegistry, RequestOptions, RequestPattern};
//!
//! let mut registry = PatternRegistry::new();
//! let users = registry.register(
//!     RequestPattern::new()
//!         .method("GET")
//!         .uri("/users?page=1")
//!         .will_respond(MockResponse::new().json(&serde_json::json!([{"id": 1}])))
//!         .unwrap(),
//! );
//!
//! let response = registry.resolve("GET", "/users?page=1", &RequestOptions::new()).unwrap();
//! assert_eq!(response.code(), None);
//! assert_eq!(registry.get(users).unwrap().calls().len(), 1);
//! ```

// ===== Matching engine =====
pub mod compare;
pub mod matcher;
pub mod pattern;
pub mod registry;
pub mod response;

// ===== Test support =====
pub mod assertions;
pub mod config;

pub mod error;
pub mod headers;

pub use assertions::{Failer, NoMatchRecorder, PanicFailer, RequestAssertions};
pub use config::MockConfig;
pub use error::{ConfiguredError, FixtureError, MockError, QueueError};
pub use matcher::{MatchResult, RequestMatcher, Resolver};
pub use pattern::{RequestPattern, UriMatcher};
pub use registry::{
    CallStack, PatternId, PatternRegistry, RequestBody, RequestFactory, RequestOptions,
    SharedRegistry,
};
pub use response::{HyperResponseFactory, MockResponse, ResponseFactory};
