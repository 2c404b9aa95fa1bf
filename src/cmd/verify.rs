//! End-to-end verification command.
//!
//! Runs against a live server in four stages: rebuild and reseed the
//! database, exercise the REST surface over real HTTP, check the CORS
//! preflight answer, then drive a browser through the search page.

use anyhow::{Context, Result, ensure};

use boxfactory::config::{self, PgParams};
use boxfactory::factory::models::BoxPayload;
use boxfactory::harness::fixture::{self, SEED_COUNT};
use boxfactory::harness::probe::ApiProbe;
use boxfactory::harness::ui::{self, BoxesPage};

/// Search terms every run asserts, with the row counts the canonical
/// seed guarantees for each.
const EXPECTED_COUNTS: [(&str, usize); 5] = [
    ("Small", 5),
    ("medium", 5),
    ("Red", 5),
    ("Cardboard", 5),
    ("NonExistentResult", 0),
];

/// Origin the preflight probe presents; any value works against a
/// wildcard server, a pinned server must allow this one.
const PROBE_ORIGIN: &str = "http://localhost:3000";

pub async fn cmd_verify(base_url: Option<String>, skip_ui: bool, headed: bool) -> Result<()> {
    let base_url = base_url.unwrap_or_else(config::api_base_url);
    println!("Verifying {}", base_url);

    // 1. Server reachable at all? Cheapest failure first.
    let probe = ApiProbe::new(&base_url);
    probe.health().await?;
    println!("  server is up");

    // 2. Fresh database
    let params = PgParams::from_env()?;
    let store = fixture::connect(&params).await?;
    fixture::rebuild(&store).await?;
    fixture::seed(&store, SEED_COUNT).await?;
    println!("  database rebuilt and seeded ({} boxes)", SEED_COUNT);

    // 3. REST surface
    let all = probe.search(None).await?;
    ensure!(
        all.len() == SEED_COUNT as usize,
        "Expected {} boxes without a search term, got {}",
        SEED_COUNT,
        all.len()
    );

    for (term, expected) in EXPECTED_COUNTS {
        let found = probe.search(Some(term)).await?;
        ensure!(
            found.len() == expected,
            "Search {:?} returned {} boxes, expected {}",
            term,
            found.len(),
            expected
        );
    }

    let first = probe.get(1).await?.context("Seed box 1 is missing")?;
    ensure!(
        first.size == "Medium",
        "Box 1 should hold the odd seed shape, found size {:?}",
        first.size
    );
    ensure!(
        probe.get(SEED_COUNT + 1).await?.is_none(),
        "Id {} is unseeded and should answer 404",
        SEED_COUNT + 1
    );

    let created = probe.create(&valid_payload()).await?;
    ensure!(
        created.id == SEED_COUNT + 1,
        "Created box should take the next identity, got id {}",
        created.id
    );
    ensure!(created.size == "small", "Create should store the canonical size");

    let replaced = probe
        .replace(created.id, &replacement_payload())
        .await?
        .context("Replacing the box just created should succeed")?;
    ensure!(replaced.id == created.id, "Replace must keep the id");
    ensure!(
        replaced.size == "large",
        "Replace should store the new size, got {:?}",
        replaced.size
    );
    ensure!(
        replaced.material == "metal",
        "Replace should store the new material, got {:?}",
        replaced.material
    );

    let rejection = probe.create_expecting_rejection(&invalid_payload()).await?;
    ensure!(
        rejection.contains("Invalid size"),
        "Rejection should name the bad field, got {:?}",
        rejection
    );
    println!("  REST surface ok");

    // 4. CORS preflight
    probe.preflight(PROBE_ORIGIN).await?;
    println!("  CORS preflight ok");

    // 5. Browser flow
    if skip_ui {
        println!("  browser flow skipped");
    } else {
        // The writes above disturbed the canonical inventory; reset it so
        // the page sees exactly the seeded rows.
        fixture::rebuild(&store).await?;
        fixture::seed(&store, SEED_COUNT).await?;

        let page = BoxesPage::open(&config::webdriver_url(), &base_url, !headed).await?;
        let outcome = ui::verify_search_flow(&page).await;
        page.close().await?;
        outcome?;
        println!("  browser flow ok");
    }

    println!("Verification passed");
    Ok(())
}

fn valid_payload() -> BoxPayload {
    BoxPayload {
        size: "small".to_string(),
        weight: 5.0,
        price: 2.0,
        material: "paper".to_string(),
        color: "red".to_string(),
        quantity: 1,
    }
}

fn replacement_payload() -> BoxPayload {
    BoxPayload {
        size: "large".to_string(),
        weight: 12.5,
        price: 9.0,
        material: "metal".to_string(),
        color: "green".to_string(),
        quantity: 4,
    }
}

fn invalid_payload() -> BoxPayload {
    BoxPayload {
        size: "gigantic".to_string(),
        ..valid_payload()
    }
}
