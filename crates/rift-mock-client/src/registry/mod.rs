//! Pattern registry: the per-test entry point for intercepted calls.
//!
//! A real call flows through the registry as:
//! normalize (`RequestFactory`) → resolve (`Resolver`) → record on the winning
//! pattern → next queued response or error → `on_match` callback.

mod call_stack;
mod request_factory;
mod shared;


pub use call_stack::CallStack;
pub use request_factory::{MultipartField, RequestBody, RequestFactory, RequestOptions};
pub use shared::SharedRegistry;

use crate::config::MockConfig;
use crate::error::MockError;
use crate::matcher::Resolver;
use crate::pattern::{MatchCallback, RequestPattern};
use crate::response::{MockResponse, QueueItem, ResponseFactory};
use tracing::debug;

/// Handle to a registered pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(usize);

impl PatternId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// All patterns registered for one test, in registration order.
#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: Vec<RequestPattern>,
    factory: RequestFactory,
    resolver: Resolver,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a fixture configuration.
    pub fn from_config(config: MockConfig) -> Result<Self, MockError> {
        let mut registry = Self::new();
        for pattern in config.into_patterns()? {
            registry.register(pattern);
        }
        Ok(registry)
    }

    pub fn register(&mut self, pattern: RequestPattern) -> PatternId {
        self.patterns.push(pattern);
        PatternId(self.patterns.len() - 1)
    }

    pub fn get(&self, id: PatternId) -> Option<&RequestPattern> {
        self.patterns.get(id.0)
    }

    pub fn get_mut(&mut self, id: PatternId) -> Option<&mut RequestPattern> {
        self.patterns.get_mut(id.0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RequestPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Calls of every pattern, in registration order.
    pub fn call_stack(&self) -> CallStack {
        CallStack::merged(self.patterns.iter().map(RequestPattern::call_stack))
    }

    /// Clear recorded calls on every pattern.
    pub fn reset_calls(&mut self) {
        for pattern in &mut self.patterns {
            pattern.reset_calls();
        }
    }

    /// Handle an intercepted call and return the mock response for it.
    ///
    /// A queued error is returned as `MockError::Configured`.
    pub fn resolve(
        &mut self,
        method: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Result<MockResponse, MockError> {
        self.dispatch(method, url, options).finish()
    }

    /// Like [`resolve`](Self::resolve), converting the response with `factory`.
    pub fn resolve_with<F: ResponseFactory>(
        &mut self,
        factory: &F,
        method: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Result<F::Output, MockError> {
        let response = self.resolve(method, url, options)?;
        factory.create(&response)
    }

    /// Resolve an already normalized real request.
    pub fn respond_to(&mut self, real: RequestPattern) -> Result<MockResponse, MockError> {
        self.dispatch_request(real).finish()
    }

    /// Resolve, record and advance the queue, leaving the `on_match` callback to the caller.
    pub(crate) fn dispatch(
        &mut self,
        method: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Dispatch {
        match self.factory.create(method, url, options) {
            Ok(real) => self.dispatch_request(real),
            Err(error) => Dispatch::failed(error),
        }
    }

    fn dispatch_request(&mut self, real: RequestPattern) -> Dispatch {
        let index = match self.resolver.resolve(&self.patterns, &real) {
            Ok(index) => index,
            Err(error) => return Dispatch::failed(error),
        };
        let pattern = &mut self.patterns[index];

        pattern.called(real);
        let pending = pattern
            .match_callback()
            .cloned()
            .zip(pattern.calls().last().cloned());

        let outcome = match pattern.next_response() {
            Ok(QueueItem::Response(response)) => Ok(response),
            Ok(QueueItem::Error(error)) => {
                debug!(pattern = index, %error, "Raising configured error");
                Err(MockError::Configured(error))
            }
            Err(error) => Err(error),
        };

        Dispatch { outcome, pending }
    }
}

/// Result of one dispatched call, with the match callback still to run.
#[must_use]
pub(crate) struct Dispatch {
    outcome: Result<MockResponse, MockError>,
    pending: Option<(MatchCallback, RequestPattern)>,
}

impl Dispatch {
    fn failed(error: MockError) -> Self {
        Self {
            outcome: Err(error),
            pending: None,
        }
    }

    /// Run the match callback, if any, and hand back the outcome.
    pub(crate) fn finish(self) -> Result<MockResponse, MockError> {
        if let Some((callback, recorded)) = self.pending {
            callback.call(&recorded);
        }
        self.outcome
    }
}

impl<'a> IntoIterator for &'a PatternRegistry {
    type Item = &'a RequestPattern;
    type IntoIter = std::slice::Iter<'a, RequestPattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}
