use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{Document, StoreError, ID_FIELD};

/// Collection holding food items.
pub const FOODS: &str = "foods";
/// Collection holding orders.
pub const ORDERS: &str = "orders";

/// Equality filter on top-level string fields.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(&'static str, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match documents whose `field` equals `value`.
    pub fn eq(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push((field, value.into()));
        self
    }
}

/// Sort/skip/limit modifiers for [`Collection::find`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    sort_desc: Option<&'static str>,
    skip: u64,
    limit: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by `field` descending. Ties keep insertion order.
    pub fn sort_desc(mut self, field: &'static str) -> Self {
        self.sort_desc = Some(field);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: String,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document, StoreError> {
        let mut doc: Document = serde_json::from_str(&self.body)?;
        doc.insert(ID_FIELD.to_string(), self.id.into());
        Ok(doc)
    }
}

fn json_path(field: &str) -> String {
    format!("$.{}", field)
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Handle to one named collection. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Collection {
    pool: SqlitePool,
    name: &'static str,
}

impl Collection {
    pub fn new(pool: SqlitePool, name: &'static str) -> Self {
        Self { pool, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns matching documents in insertion order unless a sort is given.
    pub async fn find(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
        for _ in &filter.clauses {
            sql.push_str(" AND json_extract(body, ?) = ?");
        }
        match options.sort_desc {
            Some(_) => sql.push_str(" ORDER BY json_extract(body, ?) DESC, seq ASC"),
            None => sql.push_str(" ORDER BY seq ASC"),
        }
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        sql.push_str(" LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, DocumentRow>(&sql).bind(self.name);
        for (field, value) in &filter.clauses {
            query = query.bind(json_path(field)).bind(value);
        }
        if let Some(field) = options.sort_desc {
            query = query.bind(json_path(field));
        }
        let limit = options.limit.map(to_sql_int).unwrap_or(-1);
        query = query.bind(limit).bind(to_sql_int(options.skip));

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT id, body FROM documents WHERE collection = ? AND id = ?")
                .bind(self.name)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    /// Inserts a document under a freshly generated id.
    ///
    /// Any caller-supplied `_id` is discarded.
    pub async fn insert_one(&self, mut doc: Document) -> Result<InsertOneResult, StoreError> {
        doc.remove(ID_FIELD);
        let id = Uuid::new_v4();
        let body = serde_json::to_string(&doc)?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(self.name)
            .bind(id.to_string())
            .bind(&body)
            .execute(&self.pool)
            .await?;

        tracing::debug!(collection = self.name, %id, "inserted document");

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// Sets the given top-level fields on the document with `id`.
    ///
    /// The merge runs as a single `UPDATE`, so concurrent updates only wait
    /// on SQLite's write lock. `modified_count` is 0 when every field already
    /// held the given value.
    pub async fn update_one(&self, id: Uuid, set: Document) -> Result<UpdateResult, StoreError> {
        let id_str = id.to_string();
        let fields = set
            .into_iter()
            .filter(|(field, _)| field != ID_FIELD)
            .map(|(field, value)| Ok((json_path(&field), serde_json::to_string(&value)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;

        let modified = if fields.is_empty() {
            0
        } else {
            let merged = format!("json_set(body{})", ", ?, json(?)".repeat(fields.len()));
            let sql = format!(
                "UPDATE documents SET body = {merged} \
                 WHERE collection = ? AND id = ? AND {merged} IS NOT json(body)"
            );

            let mut query = sqlx::query(&sql);
            for (path, value) in &fields {
                query = query.bind(path).bind(value);
            }
            query = query.bind(self.name).bind(&id_str);
            for (path, value) in &fields {
                query = query.bind(path).bind(value);
            }
            query.execute(&self.pool).await?.rows_affected()
        };

        let matched = if modified > 0 {
            modified
        } else {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM documents WHERE collection = ? AND id = ?",
            )
            .bind(self.name)
            .bind(&id_str)
            .fetch_one(&self.pool)
            .await?;
            count.max(0) as u64
        };

        if modified > 0 {
            tracing::debug!(collection = self.name, %id, "updated document");
        }

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched,
            modified_count: modified,
        })
    }

    pub async fn delete_one(&self, id: Uuid) -> Result<DeleteResult, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(self.name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(self.name)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
