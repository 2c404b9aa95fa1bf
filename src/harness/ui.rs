//! Browser flow for the search page.
//!
//! Drives a real browser through the same motions a person would take:
//! open `/boxes`, type into the search field, watch result cards appear
//! and disappear.

use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use tokio::time::Instant;

use super::fixture::SEED_COUNT;
use super::webdriver::WebDriverSession;
use crate::errors::WebDriverError;

/// CSS selector for the search input on the embedded page.
pub const SEARCH_INPUT: &str = "#search-text";

/// CSS selector for one result card.
pub const BOX_CARD: &str = ".box-card";

const POLL_INTERVAL: Duration = Duration::from_millis(150);
const POLL_TIMEOUT: Duration = Duration::from_secs(3);

pub struct BoxesPage {
    session: WebDriverSession,
}

impl BoxesPage {
    /// Start a browser session and open the search page.
    pub async fn open(webdriver_url: &str, base_url: &str, headless: bool) -> Result<Self> {
        let session = WebDriverSession::start(webdriver_url, headless)
            .await
            .context("Failed to start a WebDriver session")?;
        session
            .goto(&format!("{}/boxes", base_url.trim_end_matches('/')))
            .await
            .context("Failed to open the search page")?;
        Ok(Self { session })
    }

    /// Click the search field and type a fresh term into it.
    pub async fn search(&self, term: &str) -> Result<()> {
        let input = self
            .session
            .find(SEARCH_INPUT)
            .await
            .context("Search input is not on the page")?;
        self.session
            .click(&input)
            .await
            .context("Failed to focus the search input")?;
        self.session
            .clear(&input)
            .await
            .context("Failed to clear the search input")?;
        self.session
            .send_keys(&input, term)
            .await
            .context("Failed to type the search term")?;
        Ok(())
    }

    /// Poll until exactly `expected` result cards are present and, when any
    /// are expected, the first one is visible.
    ///
    /// The page rewrites its result list on every keystroke, so element
    /// handles can go stale between polls; staleness just means try again.
    pub async fn wait_for_cards(&self, expected: usize) -> Result<()> {
        let deadline = Instant::now() + POLL_TIMEOUT;
        loop {
            let cards = self.session.find_all(BOX_CARD).await?;
            if cards.len() == expected {
                match cards.first() {
                    None => return Ok(()),
                    Some(first) => match self.session.is_displayed(first).await {
                        Ok(true) => return Ok(()),
                        Ok(false) => {}
                        Err(err) if is_stale(&err) => {}
                        Err(err) => return Err(err.into()),
                    },
                }
            }
            if Instant::now() >= deadline {
                bail!(
                    "Expected {expected} result card(s), saw {} after {POLL_TIMEOUT:?}",
                    cards.len()
                );
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Text of the first result card, for spot-checking rendered content.
    pub async fn first_card_text(&self) -> Result<String> {
        let card = self
            .session
            .find(BOX_CARD)
            .await
            .context("No result card on the page")?;
        self.session
            .text(&card)
            .await
            .context("Failed to read the card text")
    }

    /// Close the browser.
    pub async fn close(self) -> Result<()> {
        self.session
            .quit()
            .await
            .context("Failed to end the WebDriver session")
    }
}

/// The full browser pass over a freshly seeded inventory: the page lists
/// everything on load, narrows to five cards for seeded terms, and empties
/// for a term nothing matches.
pub async fn verify_search_flow(page: &BoxesPage) -> Result<()> {
    page.wait_for_cards(SEED_COUNT as usize)
        .await
        .context("Initial page load should list the whole inventory")?;

    page.search("Small").await?;
    page.wait_for_cards(5)
        .await
        .context("Search for \"Small\" should leave five cards")?;

    let text = page.first_card_text().await?;
    ensure!(
        text.to_lowercase().contains("small"),
        "First card text {text:?} does not mention the size searched for"
    );

    page.search("NonExistentResult").await?;
    page.wait_for_cards(0)
        .await
        .context("Search for an unmatched term should clear the list")?;

    page.search("Red").await?;
    page.wait_for_cards(5)
        .await
        .context("Search for \"Red\" should leave five cards")?;

    Ok(())
}

fn is_stale(err: &WebDriverError) -> bool {
    matches!(err, WebDriverError::Protocol { message } if message.starts_with("stale element reference"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::embedded::Assets;

    #[test]
    fn selectors_exist_in_embedded_page() {
        let index = Assets::get("index.html").expect("index.html embedded");
        let html = String::from_utf8_lossy(&index.data);
        assert!(html.contains(r#"id="search-text""#));
        assert!(html.contains("box-card"));
    }

    #[test]
    fn poll_interval_fits_inside_timeout() {
        assert!(POLL_INTERVAL < POLL_TIMEOUT);
    }

    #[test]
    fn staleness_is_detected_by_message() {
        let stale = WebDriverError::Protocol {
            message: "stale element reference: element is not attached".to_string(),
        };
        assert!(is_stale(&stale));

        let other = WebDriverError::Protocol {
            message: "invalid session id".to_string(),
        };
        assert!(!is_stale(&other));
    }
}
