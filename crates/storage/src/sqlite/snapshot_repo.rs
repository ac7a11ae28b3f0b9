use chrono::Utc;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{
    EntryRecord, PlotRecord, RECORD_FARM_STATE, RECORD_WORD_DB, Snapshot, SnapshotRepository,
    StorageError,
};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn load_snapshot(&self) -> Result<Option<Snapshot>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT name, payload FROM snapshots
            WHERE name IN (?1, ?2)
            ",
        )
        .bind(RECORD_WORD_DB)
        .bind(RECORD_FARM_STATE)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut db_payload: Option<String> = None;
        let mut farm_payload: Option<String> = None;
        for row in rows {
            let name: String = row.try_get("name").map_err(conn)?;
            let payload: String = row.try_get("payload").map_err(conn)?;
            match name.as_str() {
                RECORD_WORD_DB => db_payload = Some(payload),
                RECORD_FARM_STATE => farm_payload = Some(payload),
                _ => {}
            }
        }

        let (Some(db), Some(farm)) = (db_payload, farm_payload) else {
            return Ok(None);
        };

        // A corrupt payload reads back as "no prior progress" rather than
        // failing the whole load.
        let entries: Vec<EntryRecord> = match serde_json::from_str(&db) {
            Ok(entries) => entries,
            Err(_) => return Ok(None),
        };
        let plots: Vec<PlotRecord> = match serde_json::from_str(&farm) {
            Ok(plots) => plots,
            Err(_) => return Ok(None),
        };

        Ok(Some(Snapshot { entries, plots }))
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let db = serde_json::to_string(&snapshot.entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let farm = serde_json::to_string(&snapshot.plots)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        // Both records move in one transaction so a reader never observes a
        // half-written pair.
        let mut tx = self.pool().begin().await.map_err(conn)?;
        for (name, payload) in [(RECORD_WORD_DB, &db), (RECORD_FARM_STATE, &farm)] {
            sqlx::query(
                r"
                INSERT INTO snapshots (name, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(name)
            .bind(payload)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM snapshots WHERE name IN (?1, ?2)")
            .bind(RECORD_WORD_DB)
            .bind(RECORD_FARM_STATE)
            .execute(self.pool())
            .await
            .map_err(conn)?;
        Ok(())
    }
}
