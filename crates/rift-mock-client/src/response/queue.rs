//! Response queue state machine.
//!
//! A queue starts `Unset` and commits to exactly one mode on its first addition:
//!
//! - `Always`: a single item handed out on every call, never exhausted
//! - `Sequential`: items handed out once each, in insertion order
//!
//! The modes exclude each other, so the mode is the queue's state rather than a flag.

use super::mock_response::MockResponse;
use crate::error::{ConfiguredError, QueueError};
use std::fmt;

/// A queued answer: either a canned response or an error to raise.
#[derive(Clone)]
pub enum QueueItem {
    Response(MockResponse),
    Error(ConfiguredError),
}

impl QueueItem {
    pub fn as_response(&self) -> Option<&MockResponse> {
        match self {
            QueueItem::Response(response) => Some(response),
            QueueItem::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ConfiguredError> {
        match self {
            QueueItem::Error(error) => Some(error),
            QueueItem::Response(_) => None,
        }
    }
}

impl fmt::Debug for QueueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueItem::Response(response) => f.debug_tuple("Response").field(response).finish(),
            QueueItem::Error(error) => f.debug_tuple("Error").field(&error.to_string()).finish(),
        }
    }
}

impl From<MockResponse> for QueueItem {
    fn from(response: MockResponse) -> Self {
        QueueItem::Response(response)
    }
}

impl From<ConfiguredError> for QueueItem {
    fn from(error: ConfiguredError) -> Self {
        QueueItem::Error(error)
    }
}

/// Queue mode, carrying the items that belong to it.
#[derive(Debug, Clone, Default)]
pub enum ResponseMode {
    #[default]
    Unset,
    Always(QueueItem),
    Sequential { items: Vec<QueueItem>, cursor: usize },
}

/// Per-pattern queue of canned responses and errors.
#[derive(Debug, Clone, Default)]
pub struct ResponseQueue {
    mode: ResponseMode,
}

impl ResponseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to the sequential queue.
    pub fn add(&mut self, item: impl Into<QueueItem>) -> Result<(), QueueError> {
        match &mut self.mode {
            ResponseMode::Unset => {
                self.mode = ResponseMode::Sequential {
                    items: vec![item.into()],
                    cursor: 0,
                };
                Ok(())
            }
            ResponseMode::Always(_) => Err(QueueError::SingleResponseAlreadyAdded),
            ResponseMode::Sequential { items, .. } => {
                items.push(item.into());
                Ok(())
            }
        }
    }

    /// Set the single item returned for every call. Only valid on an empty queue.
    pub fn add_always(&mut self, item: impl Into<QueueItem>) -> Result<(), QueueError> {
        match self.mode {
            ResponseMode::Unset => {
                self.mode = ResponseMode::Always(item.into());
                Ok(())
            }
            ResponseMode::Always(_) | ResponseMode::Sequential { .. } => {
                Err(QueueError::ResponseAlreadyAdded)
            }
        }
    }

    /// Hand out the next item.
    ///
    /// `Always` items repeat forever; sequential items are consumed one per call.
    pub fn next(&mut self) -> Result<QueueItem, QueueError> {
        match &mut self.mode {
            ResponseMode::Unset => Err(QueueError::NoResponseConfigured),
            ResponseMode::Always(item) => Ok(item.clone()),
            ResponseMode::Sequential { items, cursor } => {
                let item = items
                    .get(*cursor)
                    .cloned()
                    .ok_or(QueueError::AllResponsesProcessed)?;
                *cursor += 1;
                Ok(item)
            }
        }
    }

    pub fn has_next(&self) -> bool {
        match &self.mode {
            ResponseMode::Unset => false,
            ResponseMode::Always(_) => true,
            ResponseMode::Sequential { items, cursor } => *cursor < items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.mode, ResponseMode::Unset)
    }

    /// Number of configured items (consumed or not).
    pub fn len(&self) -> usize {
        match &self.mode {
            ResponseMode::Unset => 0,
            ResponseMode::Always(_) => 1,
            ResponseMode::Sequential { items, .. } => items.len(),
        }
    }

    pub fn mode(&self) -> &ResponseMode {
        &self.mode
    }

    pub fn reset(&mut self) {
        self.mode = ResponseMode::Unset;
    }
}
