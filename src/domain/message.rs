use std::collections::BTreeMap;

use crate::domain::validation::ValidationError;
use crate::domain::value::{LocalMessageId, MessageText, ReceiverNumber, SenderId, UnixTimestamp};

/// One queued SMS, already validated and sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub local_message_id: LocalMessageId,
    pub receiver_number: ReceiverNumber,
    pub sender_id: SenderId,
    pub message_text: MessageText,
    pub timestamp_programmed: UnixTimestamp,
}

impl MessageEntry {
    /// Validate the id and receiver, sanitize the text.
    pub fn new(
        local_message_id: impl ToString,
        receiver_number: impl Into<String>,
        sender_id: impl Into<SenderId>,
        message_text: impl AsRef<str>,
        timestamp_programmed: UnixTimestamp,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            local_message_id: LocalMessageId::new(local_message_id)?,
            receiver_number: ReceiverNumber::new(receiver_number)?,
            sender_id: sender_id.into(),
            message_text: MessageText::new(message_text),
            timestamp_programmed,
        })
    }
}

/// Ordered message collection keyed by store-assigned handles.
///
/// Handles come from a per-store counter and are never reused, so iteration
/// order is insertion order. They are not contiguous after removals.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    entries: BTreeMap<u64, MessageEntry>,
    next_handle: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return the handle it was stored under.
    pub fn insert(&mut self, entry: MessageEntry) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.insert(handle, entry);
        handle
    }

    /// Remove the first entry whose local id matches. Returns the removed entry, if any.
    ///
    /// Duplicate local ids are allowed; each call removes one of them.
    pub fn remove(&mut self, local_message_id: &str) -> Option<MessageEntry> {
        let handle = self
            .entries
            .iter()
            .find(|(_, entry)| entry.local_message_id.as_str() == local_message_id)
            .map(|(handle, _)| *handle)?;
        self.entries.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.values()
    }

    #[cfg(test)]
    fn handles(&self) -> impl Iterator<Item = (u64, &MessageEntry)> {
        self.entries.iter().map(|(handle, entry)| (*handle, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, text: &str) -> MessageEntry {
        MessageEntry::new(id, "0712345678", "numeric", text, UnixTimestamp::IMMEDIATE).unwrap()
    }

    #[test]
    fn entry_rejects_bad_id_or_number() {
        assert!(matches!(
            MessageEntry::new("x1", "0712345678", "numeric", "hi", UnixTimestamp::IMMEDIATE),
            Err(ValidationError::NotNumeric { .. })
        ));
        assert!(matches!(
            MessageEntry::new(1, "no digits", "numeric", "hi", UnixTimestamp::IMMEDIATE),
            Err(ValidationError::InvalidReceiverNumber { .. })
        ));
    }

    #[test]
    fn handles_start_at_zero_and_keep_increasing() {
        let mut store = MessageStore::new();
        assert_eq!(store.insert(entry(1, "a")), 0);
        assert_eq!(store.insert(entry(2, "b")), 1);
        store.remove("2");
        assert_eq!(store.insert(entry(3, "c")), 2);

        let handles = store.handles().map(|(h, _)| h).collect::<Vec<_>>();
        assert_eq!(handles, vec![0, 2]);
    }

    #[test]
    fn remove_drops_first_match_only() {
        let mut store = MessageStore::new();
        store.insert(entry(7, "first"));
        store.insert(entry(8, "other"));
        store.insert(entry(7, "second"));
        assert_eq!(store.len(), 3);

        let removed = store.remove("7").unwrap();
        assert_eq!(removed.message_text.as_str(), "first");
        assert_eq!(store.len(), 2);

        let removed = store.remove("7").unwrap();
        assert_eq!(removed.message_text.as_str(), "second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut store = MessageStore::new();
        store.insert(entry(1, "a"));
        assert!(store.remove("99").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut store = MessageStore::new();
        store.insert(entry(30, "c"));
        store.insert(entry(10, "a"));
        store.insert(entry(20, "b"));
        let ids = store
            .iter()
            .map(|e| e.local_message_id.as_str().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["30", "10", "20"]);
    }
}
