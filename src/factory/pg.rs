//! Postgres-backed box store.
//!
//! All queries run against the `box_factory` schema. [`PgStore::rebuild`]
//! recreates that schema from scratch, which is how the verification harness
//! guarantees a known starting state.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::{DEFAULT_POOL_SIZE, PgParams};
use crate::errors::StoreError;
use crate::factory::models::{BoxDraft, BoxPayload, BoxRecord};
use crate::factory::store::BoxStore;

/// Statements run in order by [`PgStore::rebuild`]. The drop cascades, so a
/// rebuild also clears any leftover rows from earlier runs.
const REBUILD_STATEMENTS: [&str; 3] = [
    "DROP SCHEMA IF EXISTS box_factory CASCADE",
    "CREATE SCHEMA box_factory",
    "CREATE TABLE box_factory.boxes (\
     id integer GENERATED BY DEFAULT AS IDENTITY, \
     size text, \
     weight float, \
     price float, \
     material text, \
     color text, \
     quantity integer, \
     CONSTRAINT boxes_pk PRIMARY KEY (id))",
];

const SELECT_COLUMNS: &str = "id, size, weight, price, material, color, quantity";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a small pool against the configured database.
    ///
    /// The pool establishes its first connection eagerly, so a wrong host or
    /// password fails here instead of on the first query.
    pub async fn connect(params: &PgParams) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .username(&params.user)
            .password(&params.password)
            .database(&params.dbname);

        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_POOL_SIZE)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Unreachable {
                host: params.host.clone(),
                port: params.port,
                source,
            })?;

        Ok(Self { pool })
    }

    /// Drop and recreate the `box_factory` schema and its `boxes` table.
    pub async fn rebuild(&self) -> Result<(), StoreError> {
        for statement in REBUILD_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a payload without validating it, mirroring rows that reach the
    /// table through seed scripts rather than the API.
    pub async fn insert_raw(&self, payload: &BoxPayload) -> Result<BoxRecord, StoreError> {
        let row = sqlx::query_as::<_, BoxRecord>(
            "INSERT INTO box_factory.boxes (size, weight, price, material, color, quantity) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, size, weight, price, material, color, quantity",
        )
        .bind(&payload.size)
        .bind(payload.weight)
        .bind(payload.price)
        .bind(&payload.material)
        .bind(&payload.color)
        .bind(payload.quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM box_factory.boxes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl BoxStore for PgStore {
    async fn search(&self, term: Option<&str>) -> Result<Vec<BoxRecord>, StoreError> {
        let term = term.unwrap_or("");
        let rows = if term.is_empty() {
            sqlx::query_as::<_, BoxRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM box_factory.boxes ORDER BY id"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            let pattern = format!("%{}%", escape_like(term));
            sqlx::query_as::<_, BoxRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM box_factory.boxes \
                 WHERE size ILIKE $1 OR material ILIKE $1 OR color ILIKE $1 \
                 ORDER BY id"
            ))
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    async fn get(&self, id: i32) -> Result<Option<BoxRecord>, StoreError> {
        let row = sqlx::query_as::<_, BoxRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM box_factory.boxes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, draft: &BoxDraft) -> Result<BoxRecord, StoreError> {
        let row = sqlx::query_as::<_, BoxRecord>(
            "INSERT INTO box_factory.boxes (size, weight, price, material, color, quantity) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, size, weight, price, material, color, quantity",
        )
        .bind(draft.size.as_str())
        .bind(draft.weight)
        .bind(draft.price)
        .bind(draft.material.as_str())
        .bind(draft.color.as_str())
        .bind(draft.quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn replace(&self, id: i32, draft: &BoxDraft) -> Result<Option<BoxRecord>, StoreError> {
        let row = sqlx::query_as::<_, BoxRecord>(
            "UPDATE box_factory.boxes \
             SET size = $1, weight = $2, price = $3, material = $4, color = $5, quantity = $6 \
             WHERE id = $7 \
             RETURNING id, size, weight, price, material, color, quantity",
        )
        .bind(draft.size.as_str())
        .bind(draft.weight)
        .bind(draft.price)
        .bind(draft.material.as_str())
        .bind(draft.color.as_str())
        .bind(draft.quantity)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Escape LIKE wildcards so a search for a literal `%` or `_` matches the
/// character instead of everything.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── escape_like ───────────────────────────────────────────────────────────

    #[test]
    fn escape_like_passes_plain_terms_through() {
        assert_eq!(escape_like("Cardboard"), "Cardboard");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    // ── rebuild statements ────────────────────────────────────────────────────

    #[test]
    fn rebuild_drops_before_creating() {
        assert!(REBUILD_STATEMENTS[0].starts_with("DROP SCHEMA IF EXISTS box_factory"));
        assert!(REBUILD_STATEMENTS[1].starts_with("CREATE SCHEMA"));
        assert!(REBUILD_STATEMENTS[2].contains("CREATE TABLE box_factory.boxes"));
    }

    #[test]
    fn rebuild_table_has_identity_primary_key() {
        let table = REBUILD_STATEMENTS[2];
        assert!(table.contains("GENERATED BY DEFAULT AS IDENTITY"));
        assert!(table.contains("CONSTRAINT boxes_pk PRIMARY KEY (id)"));
    }
}
