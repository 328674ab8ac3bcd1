//! Best-match selection across all registered patterns.

use super::request_matcher::RequestMatcher;
use crate::error::MockError;
use crate::pattern::RequestPattern;
use tracing::{debug, trace};

/// Picks the pattern that should answer a real request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    matcher: RequestMatcher,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of the winning pattern.
    ///
    /// The highest score wins. Among equally scored patterns the first one that
    /// still has a response left is chosen; if none has, the last of them is
    /// returned so its queue reports the exhaustion.
    pub fn resolve(
        &self,
        patterns: &[RequestPattern],
        real: &RequestPattern,
    ) -> Result<usize, MockError> {
        let mut best_score = 0;
        let mut candidates: Vec<usize> = Vec::new();
        let mut reasons = Vec::new();

        for (index, pattern) in patterns.iter().enumerate() {
            let result = self.matcher.matches(pattern, real);
            trace!(pattern = index, score = result.score(), "Scored pattern");

            if result.is_mismatch() {
                if let Some(reason) = result.reason() {
                    reasons.push(reason.to_string());
                }
                continue;
            }

            if result.score() > best_score {
                best_score = result.score();
                candidates.clear();
                candidates.push(index);
            } else if result.score() == best_score {
                candidates.push(index);
            }
        }

        let Some(&last) = candidates.last() else {
            debug!(
                request = %real,
                candidates = patterns.len(),
                "No matching mock request"
            );
            return Err(MockError::NoMatchingMockRequest {
                request: real.to_string(),
                reasons,
            });
        };

        let winner = candidates
            .iter()
            .copied()
            .find(|&index| patterns[index].has_next_response())
            .unwrap_or(last);

        debug!(pattern = winner, score = best_score, "Resolved mock request");
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::MockResponse;

    fn with_response(pattern: RequestPattern) -> RequestPattern {
        pattern.will_respond(MockResponse::new()).unwrap()
    }

    #[test]
    fn test_equal_scores_prefer_pattern_with_response() {
        let mut patterns = vec![
            with_response(RequestPattern::new().method("GET").uri("/bar")),
            with_response(RequestPattern::new().method("GET").uri("/bar")),
        ];
        let real = RequestPattern::new().method("GET").uri("/bar");
        let resolver = Resolver::new();

        assert_eq!(resolver.resolve(&patterns, &real).unwrap(), 0);
        patterns[0].next_response().unwrap();
        assert_eq!(resolver.resolve(&patterns, &real).unwrap(), 1);
    }

    #[test]
    fn test_exhausted_top_score_beats_lower_score() {
        let mut patterns = vec![
            with_response(RequestPattern::new().method("GET").uri("/bar?foo=1337")),
            with_response(RequestPattern::new().method("GET").uri("/bar")),
        ];
        patterns[0].next_response().unwrap();

        let real = RequestPattern::new().method("GET").uri("/bar?foo=1337");
        assert_eq!(Resolver::new().resolve(&patterns, &real).unwrap(), 0);
    }

    #[test]
    fn test_all_exhausted_returns_last_candidate() {
        let patterns = vec![
            RequestPattern::new().method("GET"),
            RequestPattern::new().method("GET"),
            RequestPattern::new(),
        ];
        let real = RequestPattern::new().method("GET").uri("/x");
        assert_eq!(Resolver::new().resolve(&patterns, &real).unwrap(), 1);
    }

    #[test]
    fn test_fallback_pattern() {
        let patterns = vec![RequestPattern::new(), RequestPattern::new().method("GET")];
        let resolver = Resolver::new();

        let delete = RequestPattern::new().method("DELETE").uri("/x");
        assert_eq!(resolver.resolve(&patterns, &delete).unwrap(), 0);

        let get = RequestPattern::new().method("GET").uri("/x");
        assert_eq!(resolver.resolve(&patterns, &get).unwrap(), 1);
    }

    #[test]
    fn test_no_match_collects_reasons() {
        let patterns = vec![
            RequestPattern::new().method("GET").uri("/foo"),
            RequestPattern::new().method("POST"),
        ];
        let real = RequestPattern::new().method("GET").uri("/bar");

        let error = Resolver::new().resolve(&patterns, &real).unwrap_err();
        assert_eq!(
            error.to_string(),
            "No matching mock request builder found for:\nGET /bar\n\nReasons:\n\
             - Mismatching uri, expected /foo, got /bar\n\
             - Mismatching method, expected POST, got GET\n"
        );
    }

    #[test]
    fn test_no_patterns() {
        let real = RequestPattern::new().method("GET").uri("/bar");
        let error = Resolver::new().resolve(&[], &real).unwrap_err();
        assert!(matches!(
            error,
            MockError::NoMatchingMockRequest { ref reasons, .. } if reasons.is_empty()
        ));
    }
}
