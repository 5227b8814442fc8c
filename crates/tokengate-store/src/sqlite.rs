//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use tokengate_core::{
    AssetRef, CollectionId, Generation, GrantRecord, Identity, PermissionMask, RegistryHandle,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Bumped, GrantView, Provisioned, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime, and every call runs inside one
/// transaction.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` inside a transaction on a blocking thread, committing on success.
    async fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;

            let tx = conn.transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row helpers
// ─────────────────────────────────────────────────────────────────────────────

fn blob32(bytes: Vec<u8>, column: &str) -> rusqlite::Result<[u8; 32]> {
    bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, column.into(), rusqlite::types::Type::Blob)
    })
}

fn row_to_grant(row: &rusqlite::Row<'_>) -> rusqlite::Result<GrantRecord> {
    let grantee: Vec<u8> = row.get("grantee")?;
    let mask: Vec<u8> = row.get("mask")?;
    let generation: i64 = row.get("generation_at_grant")?;

    Ok(GrantRecord {
        grantee: Identity::from_bytes(blob32(grantee, "grantee")?),
        mask: PermissionMask::from_be_bytes(blob32(mask, "mask")?),
        expiration: row.get("expiration")?,
        source: row.get("source")?,
        generation_at_grant: Generation(generation as u64),
    })
}

fn find_handle(tx: &Transaction<'_>, asset: &AssetRef) -> Result<Option<RegistryHandle>> {
    let handle: Option<i64> = tx
        .query_row(
            "SELECT handle FROM registries WHERE collection_id = ?1 AND token_id = ?2",
            params![asset.collection.as_bytes().as_slice(), asset.token_id as i64],
            |row| row.get(0),
        )
        .optional()?;
    Ok(handle.map(|h| RegistryHandle(h as u64)))
}

fn provision(tx: &Transaction<'_>, asset: &AssetRef) -> Result<Provisioned> {
    if let Some(handle) = find_handle(tx, asset)? {
        return Ok(Provisioned {
            handle,
            created: false,
        });
    }

    tx.execute(
        "INSERT INTO registries (collection_id, token_id) VALUES (?1, ?2)",
        params![asset.collection.as_bytes().as_slice(), asset.token_id as i64],
    )?;
    let handle = tx.last_insert_rowid();

    tx.execute(
        "INSERT INTO generations (handle, generation) VALUES (?1, ?2)",
        params![handle, Generation::INITIAL.get() as i64],
    )?;

    Ok(Provisioned {
        handle: RegistryHandle(handle as u64),
        created: true,
    })
}

fn read_generation(tx: &Transaction<'_>, handle: RegistryHandle) -> Result<Generation> {
    let generation: Option<i64> = tx
        .query_row(
            "SELECT generation FROM generations WHERE handle = ?1",
            params![handle.get() as i64],
            |row| row.get(0),
        )
        .optional()?;

    generation
        .map(|g| Generation(g as u64))
        .ok_or_else(|| StoreError::InvalidData(format!("{} has no generation row", handle)))
}

fn read_grant(
    tx: &Transaction<'_>,
    handle: RegistryHandle,
    grantee: &Identity,
) -> Result<Option<GrantRecord>> {
    tx.query_row(
        "SELECT grantee, mask, expiration, source, generation_at_grant
         FROM grants WHERE handle = ?1 AND grantee = ?2",
        params![handle.get() as i64, grantee.as_bytes().as_slice()],
        row_to_grant,
    )
    .optional()
    .map_err(StoreError::from)
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_or_get_registry(&self, asset: &AssetRef) -> Result<Provisioned> {
        let asset = *asset;
        self.with_tx(move |tx| provision(tx, &asset)).await
    }

    async fn lookup_registry(&self, asset: &AssetRef) -> Result<Option<RegistryHandle>> {
        let asset = *asset;
        self.with_tx(move |tx| find_handle(tx, &asset)).await
    }

    async fn list_registries(&self) -> Result<Vec<(AssetRef, RegistryHandle)>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT handle, collection_id, token_id FROM registries ORDER BY handle",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    let handle: i64 = row.get(0)?;
                    let collection: Vec<u8> = row.get(1)?;
                    let token_id: i64 = row.get(2)?;
                    Ok((
                        AssetRef::new(
                            CollectionId::from_bytes(blob32(collection, "collection_id")?),
                            token_id as u64,
                        ),
                        RegistryHandle(handle as u64),
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(rows)
        })
        .await
    }

    async fn generation(&self, asset: &AssetRef) -> Result<Generation> {
        let asset = *asset;
        self.with_tx(move |tx| match find_handle(tx, &asset)? {
            Some(handle) => read_generation(tx, handle),
            None => Ok(Generation::INITIAL),
        })
        .await
    }

    async fn bump_generation(&self, asset: &AssetRef) -> Result<Bumped> {
        let asset = *asset;
        self.with_tx(move |tx| {
            let provisioned = provision(tx, &asset)?;
            let next = read_generation(tx, provisioned.handle)?.next()?;

            tx.execute(
                "UPDATE generations SET generation = ?2 WHERE handle = ?1",
                params![provisioned.handle.get() as i64, next.get() as i64],
            )?;

            Ok(Bumped {
                handle: provisioned.handle,
                generation: next,
                registry_created: provisioned.created,
            })
        })
        .await
    }

    async fn put_grant(&self, handle: RegistryHandle, record: &GrantRecord) -> Result<()> {
        let record = record.clone();
        self.with_tx(move |tx| {
            let known: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM registries WHERE handle = ?1)",
                params![handle.get() as i64],
                |row| row.get(0),
            )?;
            if !known {
                return Err(StoreError::UnknownRegistry(handle));
            }

            tx.execute(
                "INSERT INTO grants (
                    handle, grantee, mask, expiration, source, generation_at_grant
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(handle, grantee) DO UPDATE SET
                    mask = excluded.mask,
                    expiration = excluded.expiration,
                    source = excluded.source,
                    generation_at_grant = excluded.generation_at_grant",
                params![
                    handle.get() as i64,
                    record.grantee.as_bytes().as_slice(),
                    record.mask.to_be_bytes().as_slice(),
                    record.expiration,
                    &record.source,
                    record.generation_at_grant.get() as i64,
                ],
            )?;

            Ok(())
        })
        .await
    }

    async fn get_grant(
        &self,
        handle: RegistryHandle,
        grantee: &Identity,
    ) -> Result<Option<GrantRecord>> {
        let grantee = *grantee;
        self.with_tx(move |tx| read_grant(tx, handle, &grantee)).await
    }

    async fn grant_view(&self, asset: &AssetRef, grantee: &Identity) -> Result<GrantView> {
        let asset = *asset;
        let grantee = *grantee;
        self.with_tx(move |tx| {
            let Some(handle) = find_handle(tx, &asset)? else {
                return Ok(GrantView::unprovisioned());
            };

            Ok(GrantView {
                handle: Some(handle),
                generation: read_generation(tx, handle)?,
                record: read_grant(tx, handle, &grantee)?,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(token_id: u64) -> AssetRef {
        AssetRef::new(CollectionId::from_bytes([0xbb; 32]), token_id)
    }

    fn record(grantee: Identity, mask: u64, generation: u64) -> GrantRecord {
        GrantRecord {
            grantee,
            mask: PermissionMask::from(mask),
            expiration: 1_900_000_000_000,
            source: "sqlite-test".to_string(),
            generation_at_grant: Generation(generation),
        }
    }

    #[tokio::test]
    async fn test_provision_idempotent() {
        let store = SqliteStore::open_memory().unwrap();

        let first = store.create_or_get_registry(&asset(1)).await.unwrap();
        let second = store.create_or_get_registry(&asset(1)).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.handle, second.handle);
        assert_eq!(store.lookup_registry(&asset(1)).await.unwrap(), Some(first.handle));
        assert_eq!(store.lookup_registry(&asset(2)).await.unwrap(), None);
        assert_eq!(store.generation(&asset(1)).await.unwrap(), Generation(1));
    }

    #[tokio::test]
    async fn test_grant_upsert_and_view() {
        let store = SqliteStore::open_memory().unwrap();
        let grantee = Identity::from_bytes([3; 32]);
        let handle = store.create_or_get_registry(&asset(1)).await.unwrap().handle;

        store.put_grant(handle, &record(grantee, 816, 1)).await.unwrap();
        store.put_grant(handle, &record(grantee, 3, 1)).await.unwrap();

        let stored = store.get_grant(handle, &grantee).await.unwrap().unwrap();
        assert_eq!(stored.mask, PermissionMask::from(3u64));

        let view = store.grant_view(&asset(1), &grantee).await.unwrap();
        assert_eq!(view.handle, Some(handle));
        assert_eq!(view.generation, Generation(1));
        assert_eq!(view.record, Some(stored));
    }

    #[tokio::test]
    async fn test_bump_provisions_unseen_asset() {
        let store = SqliteStore::open_memory().unwrap();

        let bumped = store.bump_generation(&asset(4)).await.unwrap();
        assert!(bumped.registry_created);
        assert_eq!(bumped.generation, Generation(2));

        let bumped = store.bump_generation(&asset(4)).await.unwrap();
        assert!(!bumped.registry_created);
        assert_eq!(bumped.generation, Generation(3));
        assert_eq!(store.generation(&asset(4)).await.unwrap(), Generation(3));
    }

    #[tokio::test]
    async fn test_put_unknown_handle_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        let grantee = Identity::from_bytes([3; 32]);

        let result = store.put_grant(RegistryHandle(42), &record(grantee, 816, 1)).await;
        assert!(matches!(result, Err(StoreError::UnknownRegistry(RegistryHandle(42)))));
    }

    #[tokio::test]
    async fn test_high_bits_survive_storage() {
        let store = SqliteStore::open_memory().unwrap();
        let grantee = Identity::from_bytes([3; 32]);
        let handle = store.create_or_get_registry(&asset(u64::MAX)).await.unwrap().handle;

        let mut wide = record(grantee, 0, 1);
        wide.mask = PermissionMask::from_slots([0, 64, 127]);
        store.put_grant(handle, &wide).await.unwrap();

        let stored = store.get_grant(handle, &grantee).await.unwrap().unwrap();
        assert_eq!(stored.mask, wide.mask);

        let listed = store.list_registries().await.unwrap();
        assert_eq!(listed, vec![(asset(u64::MAX), handle)]);
    }

    #[tokio::test]
    async fn test_reopen_persists_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.db");
        let grantee = Identity::from_bytes([8; 32]);

        {
            let store = SqliteStore::open(&path).unwrap();
            let handle = store.create_or_get_registry(&asset(1)).await.unwrap().handle;
            store.put_grant(handle, &record(grantee, 816, 1)).await.unwrap();
            store.bump_generation(&asset(1)).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let view = store.grant_view(&asset(1), &grantee).await.unwrap();
        assert_eq!(view.generation, Generation(2));
        assert_eq!(view.record.unwrap().mask, PermissionMask::from(816u64));
    }
}
