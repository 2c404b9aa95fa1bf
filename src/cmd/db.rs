//! Database lifecycle commands.

use anyhow::Result;

use boxfactory::config::PgParams;
use boxfactory::harness::fixture;

/// Drop and recreate the `box_factory` schema, leaving an empty table.
pub async fn cmd_rebuild() -> Result<()> {
    let params = PgParams::from_env()?;
    let store = fixture::connect(&params).await?;
    fixture::rebuild(&store).await?;
    println!(
        "Rebuilt box_factory.boxes on {}:{}/{}",
        params.host, params.port, params.dbname
    );
    Ok(())
}

/// Rebuild the schema, then insert the canonical inventory.
pub async fn cmd_seed(count: i32) -> Result<()> {
    let params = PgParams::from_env()?;
    let store = fixture::connect(&params).await?;
    fixture::rebuild(&store).await?;
    let rows = fixture::seed(&store, count).await?;
    match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => {
            println!("Seeded {} boxes (ids {}..={})", rows.len(), first.id, last.id)
        }
        _ => println!("Seeded 0 boxes"),
    }
    Ok(())
}
