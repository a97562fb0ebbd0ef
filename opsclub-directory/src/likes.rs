//! Like toggle service
//!
//! Flips the like relationship between a user and a directory entity and
//! keeps the entity's denormalized `like_count` roughly in step. The record
//! set is the source of truth; the counter is a cache that is allowed to
//! drift by one under concurrent toggles on the fallback path.

use serde::Serialize;

use crate::error::Result;

/// The two families of likeable directory entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Company,
    Repo,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::Repo => "repo",
        }
    }
}

/// Result of a toggle call, serialized straight into the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: i32,
}

/// Storage operations the toggle service needs.
///
/// The counter side is a two-step strategy: `try_atomic_adjust` reaches for a
/// store-side function that bumps and clamps in one statement, and returns
/// `Ok(None)` when the store doesn't have it; `read_count`/`write_count` are
/// the primitives of the non-atomic fallback.
#[allow(async_fn_in_trait)]
pub trait LikeStore {
    async fn find_like(
        &self,
        kind: EntityKind,
        entity_id: i32,
        user_identity: &str,
    ) -> Result<bool>;

    async fn insert_like(
        &self,
        kind: EntityKind,
        entity_id: i32,
        user_identity: &str,
    ) -> Result<()>;

    async fn delete_like(
        &self,
        kind: EntityKind,
        entity_id: i32,
        user_identity: &str,
    ) -> Result<()>;

    async fn try_atomic_adjust(
        &self,
        kind: EntityKind,
        entity_id: i32,
        delta: i32,
    ) -> Result<Option<i32>>;

    async fn read_count(&self, kind: EntityKind, entity_id: i32) -> Result<i32>;

    async fn write_count(&self, kind: EntityKind, entity_id: i32, count: i32) -> Result<i32>;
}

/// Toggle the like relationship for one user and one entity.
///
/// The record mutation always happens before the counter step; if it fails
/// nothing else is touched, so a retry can't double-adjust the counter. A
/// counter failure after a successful record mutation is reported as a
/// failure even though the record change persisted.
pub async fn toggle_like<S: LikeStore>(
    store: &S,
    kind: EntityKind,
    entity_id: i32,
    user_identity: &str,
) -> Result<LikeOutcome> {
    if store.find_like(kind, entity_id, user_identity).await? {
        store.delete_like(kind, entity_id, user_identity).await?;
        let like_count = adjust_like_count(store, kind, entity_id, -1).await?;
        Ok(LikeOutcome {
            liked: false,
            like_count,
        })
    } else {
        store.insert_like(kind, entity_id, user_identity).await?;
        let like_count = adjust_like_count(store, kind, entity_id, 1).await?;
        Ok(LikeOutcome {
            liked: true,
            like_count,
        })
    }
}

/// Adjust the denormalized counter, preferring the store-side atomic bump
pub async fn adjust_like_count<S: LikeStore>(
    store: &S,
    kind: EntityKind,
    entity_id: i32,
    delta: i32,
) -> Result<i32> {
    if let Some(count) = store.try_atomic_adjust(kind, entity_id, delta).await? {
        return Ok(count);
    }
    fallback_adjust(store, kind, entity_id, delta).await
}

/// Read-modify-write counter adjustment, clamped at zero.
///
/// Concurrent toggles on the same entity can clobber each other's write and
/// leave the counter off by one from the record set. Accepted: the counter is
/// a display cache, not the source of truth.
pub async fn fallback_adjust<S: LikeStore>(
    store: &S,
    kind: EntityKind,
    entity_id: i32,
    delta: i32,
) -> Result<i32> {
    let current = store.read_count(kind, entity_id).await?;
    let next = (current + delta).max(0);
    store.write_count(kind, entity_id, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory LikeStore with the same uniqueness behavior as the
    /// composite-keyed table: a second insert for the same pair errors.
    struct MemoryStore {
        likes: Mutex<HashSet<(EntityKind, i32, String)>>,
        counts: Mutex<HashMap<(EntityKind, i32), i32>>,
        atomic_supported: bool,
        fail_inserts: bool,
        atomic_calls: Mutex<u32>,
        write_calls: Mutex<u32>,
    }

    impl MemoryStore {
        fn new(atomic_supported: bool) -> Self {
            Self {
                likes: Mutex::new(HashSet::new()),
                counts: Mutex::new(HashMap::new()),
                atomic_supported,
                fail_inserts: false,
                atomic_calls: Mutex::new(0),
                write_calls: Mutex::new(0),
            }
        }

        fn with_count(self, kind: EntityKind, entity_id: i32, count: i32) -> Self {
            self.counts.lock().unwrap().insert((kind, entity_id), count);
            self
        }

        fn has_like(&self, kind: EntityKind, entity_id: i32, user: &str) -> bool {
            self.likes
                .lock()
                .unwrap()
                .contains(&(kind, entity_id, user.to_string()))
        }

        fn count(&self, kind: EntityKind, entity_id: i32) -> i32 {
            *self
                .counts
                .lock()
                .unwrap()
                .get(&(kind, entity_id))
                .unwrap_or(&0)
        }
    }

    impl LikeStore for MemoryStore {
        async fn find_like(
            &self,
            kind: EntityKind,
            entity_id: i32,
            user_identity: &str,
        ) -> Result<bool> {
            Ok(self.has_like(kind, entity_id, user_identity))
        }

        async fn insert_like(
            &self,
            kind: EntityKind,
            entity_id: i32,
            user_identity: &str,
        ) -> Result<()> {
            if self.fail_inserts {
                return Err(Error::Internal("store rejected insert".to_string()));
            }
            let inserted = self
                .likes
                .lock()
                .unwrap()
                .insert((kind, entity_id, user_identity.to_string()));
            if inserted {
                Ok(())
            } else {
                Err(Error::Internal("duplicate key value".to_string()))
            }
        }

        async fn delete_like(
            &self,
            kind: EntityKind,
            entity_id: i32,
            user_identity: &str,
        ) -> Result<()> {
            self.likes
                .lock()
                .unwrap()
                .remove(&(kind, entity_id, user_identity.to_string()));
            Ok(())
        }

        async fn try_atomic_adjust(
            &self,
            kind: EntityKind,
            entity_id: i32,
            delta: i32,
        ) -> Result<Option<i32>> {
            if !self.atomic_supported {
                return Ok(None);
            }
            *self.atomic_calls.lock().unwrap() += 1;
            let mut counts = self.counts.lock().unwrap();
            let entry = counts.entry((kind, entity_id)).or_insert(0);
            *entry = (*entry + delta).max(0);
            Ok(Some(*entry))
        }

        async fn read_count(&self, kind: EntityKind, entity_id: i32) -> Result<i32> {
            Ok(self.count(kind, entity_id))
        }

        async fn write_count(&self, kind: EntityKind, entity_id: i32, count: i32) -> Result<i32> {
            *self.write_calls.lock().unwrap() += 1;
            self.counts.lock().unwrap().insert((kind, entity_id), count);
            Ok(count)
        }
    }

    #[tokio::test]
    async fn test_like_then_unlike() {
        let store = MemoryStore::new(true).with_count(EntityKind::Repo, 7, 5);

        let outcome = toggle_like(&store, EntityKind::Repo, 7, "ops@example.com")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            LikeOutcome {
                liked: true,
                like_count: 6
            }
        );
        assert!(store.has_like(EntityKind::Repo, 7, "ops@example.com"));

        let outcome = toggle_like(&store, EntityKind::Repo, 7, "ops@example.com")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            LikeOutcome {
                liked: false,
                like_count: 5
            }
        );
        assert!(!store.has_like(EntityKind::Repo, 7, "ops@example.com"));
    }

    #[tokio::test]
    async fn test_toggle_parity() {
        let store = MemoryStore::new(true).with_count(EntityKind::Company, 1, 3);

        for _ in 0..4 {
            toggle_like(&store, EntityKind::Company, 1, "u1").await.unwrap();
        }

        assert!(!store.has_like(EntityKind::Company, 1, "u1"));
        assert_eq!(store.count(EntityKind::Company, 1), 3);
    }

    #[tokio::test]
    async fn test_no_double_insert() {
        let store = MemoryStore::new(true);

        store
            .insert_like(EntityKind::Repo, 7, "ops@example.com")
            .await
            .unwrap();
        let second = store.insert_like(EntityKind::Repo, 7, "ops@example.com").await;
        assert!(second.is_err());

        assert!(store.has_like(EntityKind::Repo, 7, "ops@example.com"));
        assert_eq!(store.likes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_clamps_at_zero() {
        // Record present but the counter already at zero: the unlike must
        // not drive it negative.
        let store = MemoryStore::new(false).with_count(EntityKind::Company, 2, 0);
        store
            .insert_like(EntityKind::Company, 2, "u1")
            .await
            .unwrap();

        let outcome = toggle_like(&store, EntityKind::Company, 2, "u1").await.unwrap();
        assert_eq!(
            outcome,
            LikeOutcome {
                liked: false,
                like_count: 0
            }
        );
    }

    #[tokio::test]
    async fn test_atomic_path_preferred() {
        let store = MemoryStore::new(true).with_count(EntityKind::Repo, 9, 10);

        toggle_like(&store, EntityKind::Repo, 9, "u1").await.unwrap();

        assert_eq!(*store.atomic_calls.lock().unwrap(), 1);
        assert_eq!(*store.write_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fallback_used_when_atomic_unsupported() {
        let store = MemoryStore::new(false).with_count(EntityKind::Repo, 9, 10);

        let outcome = toggle_like(&store, EntityKind::Repo, 9, "u1").await.unwrap();

        assert_eq!(outcome.like_count, 11);
        assert_eq!(*store.atomic_calls.lock().unwrap(), 0);
        assert_eq!(*store.write_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fallback_lost_update_keeps_records_exact() {
        // Two users interleave on the fallback path: both reads happen
        // before either write. The counter loses one update; the record set
        // stays exact.
        let store = MemoryStore::new(false).with_count(EntityKind::Repo, 3, 10);

        store.insert_like(EntityKind::Repo, 3, "u1").await.unwrap();
        store.insert_like(EntityKind::Repo, 3, "u2").await.unwrap();

        let c1 = store.read_count(EntityKind::Repo, 3).await.unwrap();
        let c2 = store.read_count(EntityKind::Repo, 3).await.unwrap();
        store
            .write_count(EntityKind::Repo, 3, (c1 + 1).max(0))
            .await
            .unwrap();
        store
            .write_count(EntityKind::Repo, 3, (c2 + 1).max(0))
            .await
            .unwrap();

        assert_eq!(store.count(EntityKind::Repo, 3), 11);
        assert!(store.has_like(EntityKind::Repo, 3, "u1"));
        assert!(store.has_like(EntityKind::Repo, 3, "u2"));
    }

    #[tokio::test]
    async fn test_insert_failure_leaves_counter_untouched() {
        let mut store = MemoryStore::new(true).with_count(EntityKind::Repo, 4, 5);
        store.fail_inserts = true;

        let result = toggle_like(&store, EntityKind::Repo, 4, "u1").await;
        assert!(result.is_err());

        // Aborted before the counter step
        assert_eq!(store.count(EntityKind::Repo, 4), 5);
        assert_eq!(*store.atomic_calls.lock().unwrap(), 0);
        assert_eq!(*store.write_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let outcome = LikeOutcome {
            liked: true,
            like_count: 6,
        };
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"liked":true,"likeCount":6}"#
        );
    }
}
