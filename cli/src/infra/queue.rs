//! In-memory implementation of the `VerificationQueue` port.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;

use crate::application::ports::VerificationQueue;

/// FIFO of template names awaiting re-verification. Each name appears at
/// most once.
#[derive(Debug, Default)]
pub struct InMemoryVerificationQueue {
    pending: Mutex<VecDeque<String>>,
}

impl InMemoryVerificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of queued names, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// Remove and return the oldest queued name.
    pub fn take_next(&self) -> Option<String> {
        self.lock().pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VerificationQueue for InMemoryVerificationQueue {
    async fn register(&self, template_name: &str) -> Result<bool> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| anyhow::anyhow!("verification queue lock poisoned"))?;
        if pending.iter().any(|name| name == template_name) {
            return Ok(false);
        }
        pending.push_back(template_name.to_string());
        Ok(true)
    }
}
