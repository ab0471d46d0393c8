//! SQLite-backed document store.
//!
//! Every record is a JSON object stored in the `documents` table and tagged
//! with the collection it belongs to. Ids are UUIDs generated on insert and
//! surface in documents as the `_id` field.

mod collection;

pub use collection::{
    Collection, DeleteResult, Filter, FindOptions, InsertOneResult, UpdateResult, FOODS, ORDERS,
};

use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// A JSON object as stored in a collection.
pub type Document = serde_json::Map<String, Value>;

/// Field carrying the store-generated id in returned documents.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid document: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a value into a top-level JSON object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Initialize the database connection pool and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_db_creates_documents_table() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let pool = init_db(&db_path).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, vec!["documents"]);
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(matches!(
            to_document(&json!([1, 2, 3])),
            Err(StoreError::NotAnObject)
        ));
        assert_eq!(
            to_document(&json!({ "a": 1 })).unwrap()["a"],
            json!(1)
        );
    }
}
