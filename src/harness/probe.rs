//! REST assertions against a running server, from outside the process.
//!
//! The probe talks to the same endpoints the search page uses, including
//! the browser-style preflight, so a passing probe means a browser on
//! another origin would get through too.

use anyhow::{Context, Result, ensure};
use reqwest::StatusCode;

use crate::factory::models::{BoxPayload, BoxRecord};

pub struct ApiProbe {
    client: reqwest::Client,
    base_url: String,
}

impl ApiProbe {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Expect `/health` to answer `ok`.
    pub async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to reach the health endpoint")?
            .error_for_status()
            .context("Health endpoint returned error status")?;
        let body = response.text().await.context("Failed to read health body")?;
        ensure!(body == "ok", "Health endpoint answered {body:?} instead of \"ok\"");
        Ok(())
    }

    pub async fn search(&self, term: Option<&str>) -> Result<Vec<BoxRecord>> {
        let mut request = self
            .client
            .get(format!("{}/api/boxes", self.base_url))
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(term) = term {
            request = request.query(&[("searchTerm", term)]);
        }
        request
            .send()
            .await
            .context("Failed to send search request")?
            .error_for_status()
            .context("Search returned error status")?
            .json()
            .await
            .context("Failed to parse search results")
    }

    /// Fetch one box, `None` on 404.
    pub async fn get(&self, id: i32) -> Result<Option<BoxRecord>> {
        let response = self
            .client
            .get(format!("{}/api/boxes/{id}", self.base_url))
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .context("Failed to send get request")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record = response
            .error_for_status()
            .context("Get returned error status")?
            .json()
            .await
            .context("Failed to parse box")?;
        Ok(Some(record))
    }

    /// Create a box, expecting 201.
    pub async fn create(&self, payload: &BoxPayload) -> Result<BoxRecord> {
        let response = self
            .client
            .post(format!("{}/api/boxes", self.base_url))
            .header("X-Requested-With", "XMLHttpRequest")
            .json(payload)
            .send()
            .await
            .context("Failed to send create request")?;
        ensure!(
            response.status() == StatusCode::CREATED,
            "Create returned {} instead of 201 Created",
            response.status()
        );
        response.json().await.context("Failed to parse created box")
    }

    /// Send an intentionally invalid payload and return the 400 message.
    pub async fn create_expecting_rejection(&self, payload: &BoxPayload) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/boxes", self.base_url))
            .header("X-Requested-With", "XMLHttpRequest")
            .json(payload)
            .send()
            .await
            .context("Failed to send create request")?;
        ensure!(
            response.status() == StatusCode::BAD_REQUEST,
            "Invalid payload returned {} instead of 400 Bad Request",
            response.status()
        );
        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse rejection body")?;
        body.get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .context("Rejection body has no message field")
    }

    /// Replace a box, `None` on 404.
    pub async fn replace(&self, id: i32, payload: &BoxPayload) -> Result<Option<BoxRecord>> {
        let response = self
            .client
            .put(format!("{}/api/boxes/{id}", self.base_url))
            .header("X-Requested-With", "XMLHttpRequest")
            .json(payload)
            .send()
            .await
            .context("Failed to send replace request")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record = response
            .error_for_status()
            .context("Replace returned error status")?
            .json()
            .await
            .context("Failed to parse replaced box")?;
        Ok(Some(record))
    }

    /// Send the preflight a browser would send for a cross-origin `GET` and
    /// run the three checks: the origin is covered, `GET` is allowed, and
    /// the `X-Requested-With` header is allowed.
    pub async fn preflight(&self, origin: &str) -> Result<()> {
        let response = self
            .client
            .request(
                reqwest::Method::OPTIONS,
                format!("{}/api/boxes", self.base_url),
            )
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "GET")
            .header("Access-Control-Request-Headers", "X-Requested-With")
            .send()
            .await
            .context("Failed to send preflight request")?;
        ensure!(
            response.status().is_success(),
            "Preflight returned {}",
            response.status()
        );

        check_preflight(
            origin,
            &header_value(&response, "access-control-allow-origin")?,
            &header_value(&response, "access-control-allow-methods")?,
            &header_value(&response, "access-control-allow-headers")?,
        )
    }
}

/// The three checks a conforming preflight answer passes. A server may
/// allow more methods and headers than the page needs; only `GET` and
/// `X-Requested-With` are required.
fn check_preflight(
    origin: &str,
    allow_origin: &str,
    allow_methods: &str,
    allow_headers: &str,
) -> Result<()> {
    ensure!(
        allow_origin == "*" || allow_origin == origin,
        "Preflight allow-origin {allow_origin:?} does not cover {origin:?}"
    );
    ensure!(
        allow_methods.to_uppercase().contains("GET"),
        "Preflight allow-methods {allow_methods:?} is missing GET"
    );
    ensure!(
        allow_headers.to_lowercase().contains("x-requested-with"),
        "Preflight allow-headers {allow_headers:?} is missing X-Requested-With"
    );
    Ok(())
}

fn header_value(response: &reqwest::Response, name: &str) -> Result<String> {
    let value = response
        .headers()
        .get(name)
        .with_context(|| format!("Preflight response missing {name} header"))?;
    Ok(value
        .to_str()
        .with_context(|| format!("Preflight {name} header is not valid text"))?
        .to_string())
}
