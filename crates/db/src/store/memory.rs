//! In-process entity store.
//!
//! Rows live in an id-ordered map behind a `tokio` `RwLock`; each operation
//! takes the lock exactly once, which makes it atomic. Ids come from a
//! monotonic counter and are never handed out twice, even after deletes.
//!
//! When opened with a file path the table is loaded at startup and
//! rewritten after every mutation (written to a sibling temp file, then
//! renamed over the original).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use todolist_core::entity::Entity;
use todolist_core::error::CoreError;
use todolist_core::filter::{Filter, Where};
use todolist_core::types::DbId;
use todolist_core::validation::validate_dto;
use tokio::sync::RwLock;

use crate::store::{not_found, EntityStore, StoreResult};

struct Table<E> {
    next_id: DbId,
    rows: BTreeMap<DbId, E>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// On-disk layout written by [`MemoryStore`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot<'a, E> {
    next_id: DbId,
    rows: Vec<&'a E>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound = "E: DeserializeOwned")]
struct SnapshotFile<E> {
    next_id: DbId,
    rows: Vec<E>,
}

pub struct MemoryStore<E: Entity> {
    table: RwLock<Table<E>>,
    file: Option<PathBuf>,
}

impl<E: Entity> fmt::Debug for MemoryStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entity", &E::NAME)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

/// The id after `id`, or an error once the id space is used up.
fn next_id<E: Entity>(id: DbId) -> StoreResult<DbId> {
    id.checked_add(1).ok_or_else(|| {
        CoreError::Internal(format!("{} id space exhausted at {id}", E::NAME)).into()
    })
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryStore<E> {
    /// A volatile, empty store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
            file: None,
        }
    }

    /// A store mirrored to `path`, loading existing rows if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let table = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: SnapshotFile<E> = serde_json::from_slice(&bytes)?;
                let rows: BTreeMap<DbId, E> =
                    file.rows.into_iter().map(|row| (row.id(), row)).collect();
                let past_last = match rows.keys().next_back() {
                    Some(&last) => next_id::<E>(last)?,
                    None => 1,
                };
                tracing::debug!(
                    entity = E::NAME,
                    path = %path.display(),
                    rows = rows.len(),
                    "Loaded data file"
                );
                Table {
                    next_id: file.next_id.max(past_last),
                    rows,
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Table::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            table: RwLock::new(table),
            file: Some(path),
        })
    }

    /// Backing file, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Rewrite the backing file from `table`. Called with the write lock
    /// held so snapshots land in mutation order.
    async fn persist(&self, table: &Table<E>) -> StoreResult<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };

        let snapshot = Snapshot {
            next_id: table.next_id,
            rows: table.rows.values().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn matches<E: Entity>(predicate: Option<&Where>, row: &E) -> bool {
    predicate.map_or(true, |w| w.matches(row))
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    async fn create(&self, input: &E::Create) -> StoreResult<E> {
        validate_dto(E::FIELDS, input)?;

        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id = next_id::<E>(id)?;
        let entity = E::from_create(id, input);
        table.rows.insert(id, entity.clone());
        self.persist(&table).await?;
        Ok(entity)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<E> {
        let table = self.table.read().await;
        table.rows.get(&id).cloned().ok_or_else(|| not_found::<E>(id))
    }

    async fn exists(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.table.read().await.rows.contains_key(&id))
    }

    async fn find(&self, filter: &Filter) -> StoreResult<Vec<E>> {
        let table = self.table.read().await;
        Ok(filter
            .apply(table.rows.values())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn update_by_id(&self, id: DbId, patch: &E::Update) -> StoreResult<()> {
        validate_dto(E::FIELDS, patch)?;

        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or_else(|| not_found::<E>(id))?;
        row.apply_update(patch);
        self.persist(&table).await
    }

    async fn update_all(&self, patch: &E::Update, predicate: Option<&Where>) -> StoreResult<u64> {
        validate_dto(E::FIELDS, patch)?;

        let mut table = self.table.write().await;
        let mut updated = 0;
        for row in table.rows.values_mut() {
            if matches(predicate, row) {
                row.apply_update(patch);
                updated += 1;
            }
        }
        if updated > 0 {
            self.persist(&table).await?;
        }
        Ok(updated)
    }

    async fn replace_by_id(&self, id: DbId, input: &E::Create) -> StoreResult<()> {
        validate_dto(E::FIELDS, input)?;

        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or_else(|| not_found::<E>(id))?;
        *row = E::from_create(id, input);
        self.persist(&table).await
    }

    async fn delete_by_id(&self, id: DbId) -> StoreResult<()> {
        let mut table = self.table.write().await;
        table.rows.remove(&id).ok_or_else(|| not_found::<E>(id))?;
        self.persist(&table).await
    }

    async fn delete_all(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, row| !matches(predicate, row));
        let removed = (before - table.rows.len()) as u64;
        if removed > 0 {
            self.persist(&table).await?;
        }
        Ok(removed)
    }

    async fn count(&self, predicate: Option<&Where>) -> StoreResult<u64> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|row| matches(predicate, *row))
            .count() as u64)
    }
}
