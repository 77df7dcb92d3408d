use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::domain::UserId;

/// The word currently shown to a user and awaiting a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWord {
    pub dictionary_id: Uuid,
    pub word_id: Uuid,
}

/// At most one pending word per user. Process-lifetime only.
///
/// The lock guards the whole table and is held only for the map access
/// itself, never across an await point.
#[derive(Debug, Default)]
pub struct PendingWords {
    entries: RwLock<HashMap<UserId, PendingWord>>,
}

impl PendingWords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: UserId) -> Option<PendingWord> {
        self.entries.read().get(&user_id).copied()
    }

    /// Replaces whatever was pending for the user.
    pub fn set(&self, user_id: UserId, pending: PendingWord) {
        self.entries.write().insert(user_id, pending);
    }

    pub fn clear(&self, user_id: UserId) -> Option<PendingWord> {
        self.entries.write().remove(&user_id)
    }

    /// Users currently presented with a word.
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }
}

/// Per-user async gates. Holding a [`SessionPermit`] serializes every
/// session operation of that user; different users never share a gate.
#[derive(Debug, Default)]
pub struct SessionGates {
    gates: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionGates {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: UserId) -> SessionPermit<'_> {
        let gate = {
            let mut gates = self.gates.lock();
            Arc::clone(gates.entry(user_id).or_default())
        };
        let guard = Arc::clone(&gate).lock_owned().await;

        SessionPermit {
            gates: self,
            user_id,
            gate,
            guard: Some(guard),
        }
    }

    /// Number of users with a live gate (held or awaited).
    pub fn active(&self) -> usize {
        self.gates.lock().len()
    }
}

pub struct SessionPermit<'a> {
    gates: &'a SessionGates,
    user_id: UserId,
    gate: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionPermit<'_> {
    fn drop(&mut self) {
        // release before pruning so a waiter can proceed
        drop(self.guard.take());

        let mut gates = self.gates.gates.lock();
        // one reference in the map, one here: nobody else is waiting
        if Arc::strong_count(&self.gate) == 2 {
            gates.remove(&self.user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn pending(n: u128) -> PendingWord {
        PendingWord {
            dictionary_id: Uuid::from_u128(n),
            word_id: Uuid::from_u128(n + 1000),
        }
    }

    #[test]
    fn set_replaces_instead_of_accumulating() {
        let table = PendingWords::new();
        table.set(1, pending(1));
        table.set(1, pending(2));
        assert_eq!(table.count(), 1);
        assert_eq!(table.get(1), Some(pending(2)));

        table.set(2, pending(3));
        assert_eq!(table.count(), 2);
        assert_eq!(table.clear(1), Some(pending(2)));
        assert_eq!(table.clear(1), None);
        assert_eq!(table.get(2), Some(pending(3)));
    }

    #[tokio::test]
    async fn gate_is_pruned_after_last_permit() {
        let gates = SessionGates::new();
        {
            let _permit = gates.acquire(42).await;
            assert_eq!(gates.active(), 1);
        }
        assert_eq!(gates.active(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_user_operations_never_overlap() {
        let gates = Arc::new(SessionGates::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let gates = Arc::clone(&gates);
            let inside = Arc::clone(&inside);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _permit = gates.acquire(9).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(gates.active(), 0);
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let gates = SessionGates::new();
        let _first = gates.acquire(1).await;
        let second = tokio::time::timeout(Duration::from_millis(100), gates.acquire(2)).await;
        assert!(second.is_ok());
    }
}
