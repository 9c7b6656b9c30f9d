// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A message delivered to a worker's mailbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailboxEntry {
    pub from: String,
    pub timestamp: DateTime<Utc>,
    pub message: Value,
}

/// Per-recipient message lists.
///
/// Reads never consume: every call to [`Mailbox::messages`] returns the full history for the
/// recipient in delivery order. Recipients are not validated, so messages can be left for a
/// worker that registers later.
#[derive(Debug, Default)]
pub struct Mailbox {
    boxes: RwLock<HashMap<String, Vec<MailboxEntry>>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn send(&self, from: &str, to: &str, message: Value) {
        let entry = MailboxEntry {
            from: from.to_string(),
            timestamp: Utc::now(),
            message,
        };
        tracing::debug!(from = from, to = to, "Delivering message from '{}' to '{}'", from, to);
        self.boxes.write().await.entry(to.to_string()).or_default().push(entry);
    }

    pub async fn messages(&self, recipient: &str) -> Vec<MailboxEntry> {
        self.boxes
            .read()
            .await
            .get(recipient)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn count(&self, recipient: &str) -> usize {
        self.boxes.read().await.get(recipient).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reads_are_idempotent_and_ordered() {
        let mailbox = Mailbox::new();
        mailbox.send("a", "b", json!({"n": 1})).await;
        mailbox.send("c", "b", json!({"n": 2})).await;

        let first = mailbox.messages("b").await;
        let second = mailbox.messages("b").await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].from, "a");
        assert_eq!(first[1].message, json!({"n": 2}));
        assert_eq!(mailbox.count("b").await, 2);
    }

    #[tokio::test]
    async fn unknown_recipient_has_empty_mailbox() {
        let mailbox = Mailbox::new();
        assert!(mailbox.messages("nobody").await.is_empty());
        assert_eq!(mailbox.count("nobody").await, 0);
    }
}
