//! Deferred reporting of unmatched requests.
//!
//! Code under test often swallows transport errors (logs them, maps them to a
//! 500, retries). The recorder is handed every error the host sees and keeps the
//! last `NoMatchingMockRequest` found anywhere in its source chain, so the test
//! can still fail with the original diagnosis at the end.

use super::Failer;
use crate::error::MockError;
use parking_lot::Mutex;
use std::error::Error;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct NoMatchRecorder {
    last: Arc<Mutex<Option<String>>>,
}

impl NoMatchRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect an error and its sources. Returns whether a no-match was recorded.
    pub fn observe(&self, error: &(dyn Error + 'static)) -> bool {
        let mut current = Some(error);
        while let Some(error) = current {
            if let Some(no_match @ MockError::NoMatchingMockRequest { .. }) =
                error.downcast_ref::<MockError>()
            {
                debug!("Recorded unmatched mock request");
                *self.last.lock() = Some(no_match.to_string());
                return true;
            }
            current = error.source();
        }
        false
    }

    pub fn observe_result<T, E>(&self, result: &Result<T, E>) -> bool
    where
        E: Error + 'static,
    {
        match result {
            Ok(_) => false,
            Err(error) => self.observe(error),
        }
    }

    pub fn last_message(&self) -> Option<String> {
        self.last.lock().clone()
    }

    pub fn clear(&self) {
        *self.last.lock() = None;
    }

    /// Fail with the recorded message, if any.
    pub fn assert_clean(&self, failer: &dyn Failer) {
        let recorded = self.last.lock().take();
        if let Some(message) = recorded {
            failer.fail(message);
        }
    }
}
