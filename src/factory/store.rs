//! Storage abstraction over the box inventory.
//!
//! The API handlers only ever see `dyn BoxStore`, so the same router runs
//! against Postgres in production and against [`MemoryStore`] in tests and
//! in `serve --in-memory`.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::errors::StoreError;
use crate::factory::models::{BoxDraft, BoxPayload, BoxRecord};

/// Operations the inventory endpoints need from a backing store.
#[async_trait]
pub trait BoxStore: Send + Sync {
    /// Case-insensitive substring search across size, material and color.
    ///
    /// `None` or an empty term matches every box. Results are ordered by id.
    async fn search(&self, term: Option<&str>) -> Result<Vec<BoxRecord>, StoreError>;

    /// Fetch a single box, `None` when the id is unknown.
    async fn get(&self, id: i32) -> Result<Option<BoxRecord>, StoreError>;

    /// Insert a validated box and return it with its assigned id.
    async fn insert(&self, draft: &BoxDraft) -> Result<BoxRecord, StoreError>;

    /// Replace every field of an existing box. `None` when the id is unknown.
    async fn replace(&self, id: i32, draft: &BoxDraft) -> Result<Option<BoxRecord>, StoreError>;

    /// Cheap connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Store kept entirely in process memory.
///
/// Ids behave like the identity column in Postgres: assigned from 1 upward
/// and never reused, even after a replace.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Shelves>,
}

#[derive(Default)]
struct Shelves {
    rows: Vec<BoxRecord>,
    last_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a payload without validating it, the way seed rows and
    /// hand-written SQL reach the table without passing through the API.
    pub fn insert_raw(&self, payload: &BoxPayload) -> Result<BoxRecord, StoreError> {
        let mut shelves = self.write()?;
        shelves.last_id += 1;
        let record = BoxRecord {
            id: shelves.last_id,
            size: payload.size.clone(),
            weight: payload.weight,
            price: payload.price,
            material: payload.material.clone(),
            color: payload.color.clone(),
            quantity: payload.quantity,
        };
        shelves.rows.push(record.clone());
        Ok(record)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Shelves>, StoreError> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Shelves>, StoreError> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl BoxStore for MemoryStore {
    async fn search(&self, term: Option<&str>) -> Result<Vec<BoxRecord>, StoreError> {
        let term = term.unwrap_or("");
        let shelves = self.read()?;
        // Rows are appended with ascending ids and replaced in place, so
        // iteration order already matches ORDER BY id.
        Ok(shelves
            .rows
            .iter()
            .filter(|row| row.matches(term))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i32) -> Result<Option<BoxRecord>, StoreError> {
        let shelves = self.read()?;
        Ok(shelves.rows.iter().find(|row| row.id == id).cloned())
    }

    async fn insert(&self, draft: &BoxDraft) -> Result<BoxRecord, StoreError> {
        let mut shelves = self.write()?;
        shelves.last_id += 1;
        let record = draft.into_record(shelves.last_id);
        shelves.rows.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, id: i32, draft: &BoxDraft) -> Result<Option<BoxRecord>, StoreError> {
        let mut shelves = self.write()?;
        match shelves.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                *row = draft.into_record(id);
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(size: &str, material: &str, color: &str) -> BoxDraft {
        BoxPayload {
            size: size.into(),
            weight: 5.0,
            price: 2.0,
            material: material.into(),
            color: color.into(),
            quantity: 1,
        }
        .validate()
        .unwrap()
    }

    /// Alternating inventory: even ids are small cardboard red boxes, odd
    /// ids medium plastic blue ones.
    fn seeded_store(count: i32) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 1..=count {
            let payload = if i % 2 == 0 {
                BoxPayload {
                    size: "Small".into(),
                    weight: 5.0,
                    price: 2.0,
                    material: "Cardboard".into(),
                    color: "Red".into(),
                    quantity: 1,
                }
            } else {
                BoxPayload {
                    size: "Medium".into(),
                    weight: 5.0,
                    price: 2.0,
                    material: "Plastic".into(),
                    color: "Blue".into(),
                    quantity: 1,
                }
            };
            store.insert_raw(&payload).unwrap();
        }
        store
    }

    // ── insert / get ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn insert_assigns_sequential_ids_from_one() {
        let store = MemoryStore::new();
        let first = store.insert(&draft("small", "paper", "red")).await.unwrap();
        let second = store.insert(&draft("large", "wood", "blue")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn insert_canonicalizes_draft_fields() {
        let store = MemoryStore::new();
        let record = store.insert(&draft("small", "paper", "red")).await.unwrap();
        assert_eq!(record.size, "small");
        assert_eq!(record.material, "paper");
        assert_eq!(record.color, "red");
    }

    #[tokio::test]
    async fn get_finds_inserted_box() {
        let store = seeded_store(3);
        let found = store.get(2).await.unwrap().unwrap();
        assert_eq!(found.size, "Small");
        assert_eq!(found.material, "Cardboard");
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let store = seeded_store(3);
        assert!(store.get(99).await.unwrap().is_none());
    }

    // ── replace ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn replace_overwrites_every_field() {
        let store = seeded_store(2);
        let updated = store
            .replace(1, &draft("large", "metal", "green"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.size, "large");
        assert_eq!(updated.material, "metal");
        assert_eq!(updated.color, "green");

        let refetched = store.get(1).await.unwrap().unwrap();
        assert_eq!(refetched, updated);
    }

    #[tokio::test]
    async fn replace_unknown_id_returns_none() {
        let store = seeded_store(2);
        let outcome = store.replace(42, &draft("big", "wood", "clear")).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn replace_does_not_disturb_id_sequence() {
        let store = seeded_store(2);
        store
            .replace(1, &draft("big", "wood", "clear"))
            .await
            .unwrap();
        let next = store.insert(&draft("small", "paper", "red")).await.unwrap();
        assert_eq!(next.id, 3);
    }

    // ── search ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn search_without_term_returns_everything_in_id_order() {
        let store = seeded_store(10);
        let all = store.search(None).await.unwrap();
        assert_eq!(all.len(), 10);
        let ids: Vec<i32> = all.iter().map(|b| b.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<i32>>());
    }

    #[tokio::test]
    async fn search_empty_term_matches_everything() {
        let store = seeded_store(10);
        assert_eq!(store.search(Some("")).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_text_fields() {
        let store = seeded_store(10);
        assert_eq!(store.search(Some("Small")).await.unwrap().len(), 5);
        assert_eq!(store.search(Some("medium")).await.unwrap().len(), 5);
        assert_eq!(store.search(Some("Red")).await.unwrap().len(), 5);
        assert_eq!(store.search(Some("Cardboard")).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn search_unmatched_term_returns_nothing() {
        let store = seeded_store(10);
        assert!(store
            .search(Some("NonExistentResult"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn search_matches_substrings() {
        let store = seeded_store(10);
        // "ard" sits inside "Cardboard" only.
        assert_eq!(store.search(Some("ard")).await.unwrap().len(), 5);
    }
}
