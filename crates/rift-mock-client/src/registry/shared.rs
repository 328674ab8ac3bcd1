//! Thread-safe registry handle.

use super::{CallStack, PatternId, PatternRegistry, RequestOptions};
use crate::error::MockError;
use crate::pattern::RequestPattern;
use crate::response::{MockResponse, ResponseFactory};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Clonable registry handle for transports that dispatch calls from several threads.
///
/// One lock covers resolution, recording and queue advance, so two concurrent
/// calls can never both consume the same sequential response. `on_match`
/// callbacks run after the lock is released.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<PatternRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: PatternRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn register(&self, pattern: RequestPattern) -> PatternId {
        self.inner.lock().register(pattern)
    }

    pub fn resolve(
        &self,
        method: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Result<MockResponse, MockError> {
        let dispatch = self.inner.lock().dispatch(method, url, options);
        dispatch.finish()
    }

    pub fn resolve_with<F: ResponseFactory>(
        &self,
        factory: &F,
        method: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Result<F::Output, MockError> {
        let response = self.resolve(method, url, options)?;
        factory.create(&response)
    }

    pub fn call_stack(&self) -> CallStack {
        self.inner.lock().call_stack()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Run `f` against a registered pattern.
    pub fn with_pattern<R>(&self, id: PatternId, f: impl FnOnce(&RequestPattern) -> R) -> Option<R> {
        self.inner.lock().get(id).map(f)
    }

    pub fn with_pattern_mut<R>(
        &self,
        id: PatternId,
        f: impl FnOnce(&mut RequestPattern) -> R,
    ) -> Option<R> {
        self.inner.lock().get_mut(id).map(f)
    }

    /// Direct access for multi-step inspection. Do not hold the guard across calls.
    pub fn lock(&self) -> MutexGuard<'_, PatternRegistry> {
        self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_concurrent_calls_consume_each_response_once() {
        let mut pattern = RequestPattern::new().method("GET").uri("/counter");
        for code in 200..208 {
            pattern.push_response(MockResponse::new().status_code(code)).unwrap();
        }

        let registry = SharedRegistry::default();
        let id = registry.register(pattern);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    registry
                        .resolve("GET", "/counter", &RequestOptions::new())
                        .unwrap()
                        .code()
                        .unwrap()
                })
            })
            .collect();

        let mut codes: Vec<u16> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        codes.sort_unstable();
        assert_eq!(codes, (200..208).collect::<Vec<_>>());

        assert_eq!(registry.with_pattern(id, |p| p.calls().len()), Some(8));
        assert!(registry
            .resolve("GET", "/counter", &RequestOptions::new())
            .is_err());
    }

    #[test]
    fn test_with_pattern_mut() {
        let registry = SharedRegistry::new(PatternRegistry::new());
        let id = registry.register(RequestPattern::new().method("GET"));

        registry
            .with_pattern_mut(id, |pattern| {
                pattern.push_always(MockResponse::new().content("late")).map(|_| ())
            })
            .unwrap()
            .unwrap();

        let response = registry.resolve("GET", "/", &RequestOptions::new()).unwrap();
        assert_eq!(response.body(), Some("late"));
        assert_eq!(registry.call_stack().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_on_match_may_use_the_registry() {
        let registry = SharedRegistry::default();
        let seen = Arc::new(AtomicUsize::new(0));

        let handle = registry.clone();
        let counter = Arc::clone(&seen);
        registry.register(
            RequestPattern::new()
                .method("GET")
                .on_match(move |_| {
                    counter.store(handle.call_stack().len(), Ordering::SeqCst);
                })
                .will_always_respond(MockResponse::new().status_code(204))
                .unwrap(),
        );

        let (tx, rx) = mpsc::channel();
        let caller = registry.clone();
        thread::spawn(move || {
            let code = caller
                .resolve("GET", "/ping", &RequestOptions::new())
                .map(|response| response.code());
            let _ = tx.send(code);
        });

        let code = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("resolve returned while on_match used the registry");
        assert_eq!(code.unwrap(), Some(204));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
