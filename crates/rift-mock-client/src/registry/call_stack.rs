//! Ordered history of real requests matched by a pattern.

use crate::pattern::RequestPattern;
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct CallStack {
    calls: Vec<RequestPattern>,
}

impl CallStack {
    pub fn new(calls: Vec<RequestPattern>) -> Self {
        Self { calls }
    }

    /// Concatenate several stacks, keeping their order.
    pub fn merged(stacks: impl IntoIterator<Item = CallStack>) -> Self {
        Self {
            calls: stacks.into_iter().flat_map(|stack| stack.calls).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn first(&self) -> Option<&RequestPattern> {
        self.calls.first()
    }

    pub fn last(&self) -> Option<&RequestPattern> {
        self.calls.last()
    }

    pub fn get(&self, index: usize) -> Option<&RequestPattern> {
        self.calls.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RequestPattern> {
        self.calls.iter()
    }
}

impl<'a> IntoIterator for &'a CallStack {
    type Item = &'a RequestPattern;
    type IntoIter = std::slice::Iter<'a, RequestPattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}

impl IntoIterator for CallStack {
    type Item = RequestPattern;
    type IntoIter = std::vec::IntoIter<RequestPattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.into_iter()
    }
}

impl FromIterator<RequestPattern> for CallStack {
    fn from_iter<I: IntoIterator<Item = RequestPattern>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for CallStack {
    /// One numbered line per call, starting at 1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, call) in self.calls.iter().enumerate() {
            writeln!(f, "{} {}", index + 1, call)?;
        }
        Ok(())
    }
}
