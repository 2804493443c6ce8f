use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::{ApiKey, DbError};

fn row_to_api_key(row: &Row) -> rusqlite::Result<ApiKey> {
    Ok(ApiKey {
        id: row.get("id")?,
        name: row.get("name")?,
        key_hash: row.get("key_hash")?,
        created_at: row.get("created_at")?,
        last_used_at: row.get("last_used_at")?,
    })
}

impl SqliteDatabase {
    pub fn insert_api_key_sync(&self, name: &str, key_hash: &str) -> Result<ApiKey, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO api_keys (id, name, key_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, name, key_hash, now],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM api_keys WHERE id = ?1",
                params![id],
                row_to_api_key,
            )
            .to_db()
        })
    }

    pub fn find_api_key_by_hash_sync(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM api_keys WHERE key_hash = ?1",
                params![key_hash],
                row_to_api_key,
            )
            .optional()
            .to_db()
        })
    }

    pub fn touch_api_key_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE api_keys SET last_used_at = ?1 WHERE id = ?2",
                params![Utc::now(), id],
            )
            .to_db()?;
            Ok(())
        })
    }

    pub fn has_api_keys_sync(&self) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT count(*) FROM api_keys", [], |row| row.get(0))
                .to_db()?;
            Ok(count > 0)
        })
    }

    pub fn list_api_keys_sync(&self) -> Result<Vec<ApiKey>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM api_keys ORDER BY created_at ASC")
                .to_db()?;
            let keys = stmt
                .query_map([], row_to_api_key)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(keys)
        })
    }

    pub fn delete_api_key_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM api_keys WHERE id = ?1", params![id])
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("api key {id}")));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_find_by_hash() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        assert!(!db.has_api_keys_sync().unwrap());

        let key = db.insert_api_key_sync("ci", "hash-abc").unwrap();
        assert_eq!(key.name, "ci");
        assert!(key.last_used_at.is_none());
        assert!(db.has_api_keys_sync().unwrap());

        let found = db.find_api_key_by_hash_sync("hash-abc").unwrap();
        assert_eq!(found.unwrap().id, key.id);
        assert!(db.find_api_key_by_hash_sync("other").unwrap().is_none());
    }

    #[test]
    fn touch_sets_last_used() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let key = db.insert_api_key_sync("", "hash-1").unwrap();
        db.touch_api_key_sync(&key.id).unwrap();
        let found = db.find_api_key_by_hash_sync("hash-1").unwrap().unwrap();
        assert!(found.last_used_at.is_some());
    }

    #[test]
    fn delete_removes_key() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let key = db.insert_api_key_sync("", "hash-2").unwrap();
        db.delete_api_key_sync(&key.id).unwrap();
        assert!(db.find_api_key_by_hash_sync("hash-2").unwrap().is_none());
        assert!(db.delete_api_key_sync(&key.id).is_err());
    }
}
