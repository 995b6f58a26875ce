//! In-memory registry of tracked beta codes.
//!
//! State is process-lifetime only: a restart forgets everything and the
//! next cycle rebuilds it from fresh checks. Iteration order is insertion
//! order so scheduled cycles walk codes deterministically.
//!
//! The registry itself is not synchronized. The scheduler serializes all
//! writes; callers that share it across tasks wrap it in a lock.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use betawatch_common::types::{BetaRecord, ChatId};

#[derive(Debug, Default)]
pub struct MonitorRegistry {
    records: HashMap<String, BetaRecord>,
    order: Vec<String>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed from a static code list (broadcast deployments). Seeded
    /// records start `Unchecked` with no subscribers and are never removed.
    pub fn seed<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut registry = Self::new();
        for code in codes {
            registry.upsert(&code, |_| {});
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&BetaRecord> {
        self.records.get(code)
    }

    /// Apply a patch to the record for `code`, creating it on first touch.
    pub fn upsert(&mut self, code: &str, patch: impl FnOnce(&mut BetaRecord)) -> &BetaRecord {
        let record = match self.records.entry(code.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(code.to_string());
                entry.insert(BetaRecord::new(code))
            }
        };
        patch(record);
        record
    }

    /// Register a chat's interest in a code. Returns `false` when the chat
    /// was already subscribed.
    pub fn add_subscriber(&mut self, code: &str, chat_id: ChatId) -> bool {
        let mut added = false;
        self.upsert(code, |record| {
            if !record.subscribers.contains(&chat_id) {
                record.subscribers.push(chat_id);
                added = true;
            }
        });
        added
    }

    /// Drop a chat's interest in a code. Removing the last subscriber
    /// deletes the record entirely.
    pub fn remove_subscriber(&mut self, code: &str, chat_id: ChatId) -> bool {
        let Some(record) = self.records.get_mut(code) else {
            return false;
        };
        let before = record.subscribers.len();
        record.subscribers.retain(|c| *c != chat_id);
        let removed = record.subscribers.len() < before;
        if removed && record.subscribers.is_empty() {
            self.records.remove(code);
            self.order.retain(|c| c != code);
        }
        removed
    }

    /// Snapshot of all tracked codes in insertion order.
    pub fn all_codes(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Records a given chat is subscribed to, in insertion order.
    pub fn subscribed_to(&self, chat_id: ChatId) -> Vec<BetaRecord> {
        self.order
            .iter()
            .filter_map(|code| self.records.get(code))
            .filter(|record| record.subscribers.contains(&chat_id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use betawatch_common::types::BetaStatus;

    #[test]
    fn test_upsert_creates_then_patches() {
        let mut registry = MonitorRegistry::new();
        registry.upsert("code1", |rec| rec.status = BetaStatus::Full);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("code1").map(|r| r.status), Some(BetaStatus::Full));

        registry.upsert("code1", |rec| rec.app_name = "Foo".to_string());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("code1").map(|r| r.app_name.as_str()), Some("Foo"));
    }

    #[test]
    fn test_all_codes_insertion_order() {
        let mut registry = MonitorRegistry::new();
        for code in ["c", "a", "b"] {
            registry.upsert(code, |_| {});
        }
        assert_eq!(registry.all_codes(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_seed_preserves_order_and_dedupes() {
        let registry = MonitorRegistry::seed(
            ["x", "y", "x"].into_iter().map(String::from),
        );
        assert_eq!(registry.all_codes(), vec!["x", "y"]);
        assert_eq!(registry.get("x").map(|r| r.status), Some(BetaStatus::Unchecked));
    }

    #[test]
    fn test_duplicate_subscriber_not_added() {
        let mut registry = MonitorRegistry::new();
        assert!(registry.add_subscriber("code1", 42));
        assert!(!registry.add_subscriber("code1", 42));
        assert_eq!(registry.get("code1").map(|r| r.subscribers.len()), Some(1));
    }

    #[test]
    fn test_removing_last_subscriber_deletes_record() {
        let mut registry = MonitorRegistry::new();
        registry.add_subscriber("code1", 1);
        registry.add_subscriber("code1", 2);

        assert!(registry.remove_subscriber("code1", 1));
        assert!(registry.get("code1").is_some());

        assert!(registry.remove_subscriber("code1", 2));
        assert!(registry.get("code1").is_none());
        assert!(registry.all_codes().is_empty());
    }

    #[test]
    fn test_remove_unknown_subscriber_is_noop() {
        let mut registry = MonitorRegistry::new();
        registry.add_subscriber("code1", 1);
        assert!(!registry.remove_subscriber("code1", 99));
        assert!(!registry.remove_subscriber("missing", 1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_subscribed_to_filters_by_chat() {
        let mut registry = MonitorRegistry::new();
        registry.add_subscriber("code1", 1);
        registry.add_subscriber("code2", 2);
        registry.add_subscriber("code3", 1);

        let mine: Vec<String> = registry
            .subscribed_to(1)
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(mine, vec!["code1", "code3"]);
    }
}
