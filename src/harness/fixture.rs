//! Database fixture: schema rebuild and the canonical seed inventory.

use anyhow::{Context, Result};

use crate::config::PgParams;
use crate::factory::models::{BoxPayload, BoxRecord};
use crate::factory::pg::PgStore;

/// Rows the canonical seed writes.
pub const SEED_COUNT: i32 = 10;

/// Payload for seed row `i`: even rows are small cardboard red boxes, odd
/// rows medium plastic blue ones.
///
/// Seed rows go straight to the table, so their casing (and "Cardboard",
/// which is outside the API's material set) does not have to satisfy
/// payload validation.
pub fn seed_payload(i: i32) -> BoxPayload {
    if i % 2 == 0 {
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
    }
}

/// Open a pool against the configured database.
pub async fn connect(params: &PgParams) -> Result<PgStore> {
    PgStore::connect(params).await.with_context(|| {
        format!(
            "Failed to reach Postgres at {}:{}",
            params.host, params.port
        )
    })
}

/// Drop and recreate the `box_factory` schema.
pub async fn rebuild(store: &PgStore) -> Result<()> {
    store
        .rebuild()
        .await
        .context("Failed to rebuild the box_factory schema")
}

/// Insert the canonical inventory, returning the rows as stored.
pub async fn seed(store: &PgStore, count: i32) -> Result<Vec<BoxRecord>> {
    let mut rows = Vec::with_capacity(count as usize);
    for i in 1..=count {
        let row = store
            .insert_raw(&seed_payload(i))
            .await
            .with_context(|| format!("Failed to insert seed row {i}"))?;
        rows.push(row);
    }
    tracing::info!(rows = rows.len(), "Seeded box inventory");
    Ok(rows)
}
