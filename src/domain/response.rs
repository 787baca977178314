use serde::{Deserialize, Serialize};

use crate::domain::value::{KnownMessageStatus, MessageStatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PackageStatus {
    #[default]
    Draft,
    Sent,
}

/// Gateway outcome for one message of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMessage {
    pub local_message_id: String,
    pub remote_message_id: String,
    pub message_status: MessageStatusCode,
}

/// Per-message outcomes keyed by local message id, in reply order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteMessages(Vec<RemoteMessage>);

impl RemoteMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; a record with the same local id is replaced in place.
    pub fn insert(&mut self, message: RemoteMessage) {
        match self
            .0
            .iter_mut()
            .find(|it| it.local_message_id == message.local_message_id)
        {
            Some(existing) => *existing = message,
            None => self.0.push(message),
        }
    }

    pub fn get(&self, local_message_id: &str) -> Option<&RemoteMessage> {
        self.0
            .iter()
            .find(|it| it.local_message_id == local_message_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RemoteMessage> {
        self.0.iter()
    }

    /// Tally outcomes by known status code.
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for message in &self.0 {
            match message.message_status.known() {
                Some(KnownMessageStatus::Accepted) => counts.success += 1,
                Some(KnownMessageStatus::SenderFailed) => counts.failed_sender += 1,
                Some(KnownMessageStatus::IncorrectNumber) => counts.failed_number += 1,
                Some(KnownMessageStatus::InternalErrorOrBlacklisted) => {
                    counts.failed_internal += 1
                }
                Some(KnownMessageStatus::InsufficientCredit) => counts.insufficient_credit += 1,
                None => {}
            }
            counts.total += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a RemoteMessages {
    type Item = &'a RemoteMessage;
    type IntoIter = std::slice::Iter<'a, RemoteMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Outcome counters for a sent package. `total` includes unknown codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub success: usize,
    pub failed_sender: usize,
    pub failed_number: usize,
    pub failed_internal: usize,
    pub insufficient_credit: usize,
    pub total: usize,
}

/// Accepted gateway reply for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResponse {
    pub remote_package_id: String,
    pub messages: RemoteMessages,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(local: &str, remote: &str, status: &str) -> RemoteMessage {
        RemoteMessage {
            local_message_id: local.to_owned(),
            remote_message_id: remote.to_owned(),
            message_status: MessageStatusCode::new(status),
        }
    }

    #[test]
    fn insert_replaces_duplicate_local_id_in_place() {
        let mut messages = RemoteMessages::new();
        messages.insert(record("1", "9001", "3"));
        messages.insert(record("2", "9002", "3"));
        messages.insert(record("1", "9003", "4"));

        assert_eq!(messages.len(), 2);
        let order = messages
            .iter()
            .map(|m| m.remote_message_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["9003", "9002"]);
        assert_eq!(messages.get("1").unwrap().message_status.as_str(), "4");
    }

    #[test]
    fn status_counts_tally_each_code() {
        let mut messages = RemoteMessages::new();
        for (i, status) in ["3", "3", "1", "2", "4", "5", "x"].iter().enumerate() {
            messages.insert(record(&i.to_string(), "0", status));
        }
        assert_eq!(
            messages.status_counts(),
            StatusCounts {
                success: 2,
                failed_sender: 1,
                failed_number: 1,
                failed_internal: 1,
                insufficient_credit: 1,
                total: 7,
            }
        );
    }

    #[test]
    fn remote_message_serializes_with_gateway_field_names() {
        let json = serde_json::to_value(record("1", "9001", "3")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "localMessageId": "1",
                "remoteMessageId": "9001",
                "messageStatus": "3"
            })
        );
    }
}
