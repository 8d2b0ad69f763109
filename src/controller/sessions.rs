//! In-memory session table, keyed by partition.

use std::collections::{BTreeMap, BTreeSet};

use crate::controller::types::{ControllerError, ControllerResult, Session};

#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: BTreeMap<String, Session>,
    /// Partitions claimed by a create that has not finished yet.
    pending: BTreeSet<String>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session. A partition holds at most one session. Inserting
    /// completes any pending claim on the partition.
    pub fn insert(&mut self, session: Session) -> ControllerResult<()> {
        if self.sessions.contains_key(&session.partition) {
            return Err(ControllerError::DuplicatePartition(session.partition));
        }
        self.pending.remove(&session.partition);
        self.sessions.insert(session.partition.clone(), session);
        Ok(())
    }

    /// Claim `partition` ahead of `insert`. Fails if the partition has a
    /// session or another claim.
    pub fn reserve(&mut self, partition: &str) -> ControllerResult<()> {
        if self.sessions.contains_key(partition) || self.pending.contains(partition) {
            return Err(ControllerError::DuplicatePartition(partition.to_string()));
        }
        self.pending.insert(partition.to_string());
        Ok(())
    }

    /// Drop a claim made with `reserve`.
    pub fn release(&mut self, partition: &str) {
        self.pending.remove(partition);
    }

    pub fn remove(&mut self, partition: &str) -> Option<Session> {
        self.sessions.remove(partition)
    }

    pub fn get(&self, partition: &str) -> Option<&Session> {
        self.sessions.get(partition)
    }

    pub fn contains(&self, partition: &str) -> bool {
        self.sessions.contains_key(partition)
    }

    /// All sessions ordered by partition.
    pub fn list(&self) -> Vec<Session> {
        self.sessions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut table = SessionTable::new();
        table.insert(Session::new("b")).unwrap();
        table.insert(Session::new("a")).unwrap();

        let partitions: Vec<_> = table.list().into_iter().map(|s| s.partition).collect();
        assert_eq!(partitions, vec!["a", "b"]);

        assert!(table.remove("a").is_some());
        assert!(table.remove("a").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_partition() {
        let mut table = SessionTable::new();
        let first = Session::new("p");
        let id = first.session;
        table.insert(first).unwrap();

        let err = table.insert(Session::new("p")).unwrap_err();
        assert!(matches!(err, ControllerError::DuplicatePartition(ref p) if p == "p"));
        assert_eq!(table.get("p").map(|s| s.session), Some(id));
    }

    #[test]
    fn test_reserve_blocks_second_claim() {
        let mut table = SessionTable::new();
        table.reserve("p").unwrap();
        assert!(matches!(table.reserve("p"), Err(ControllerError::DuplicatePartition(_))));
        assert!(!table.contains("p"));

        table.insert(Session::new("p")).unwrap();
        assert!(table.reserve("p").is_err());

        table.reserve("q").unwrap();
        table.release("q");
        table.reserve("q").unwrap();
    }
}
