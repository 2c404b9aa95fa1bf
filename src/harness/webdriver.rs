//! Minimal W3C WebDriver client.
//!
//! Speaks just enough of the wire protocol for the search-page flow:
//! create a session, navigate, find elements by CSS selector, click, type,
//! read text and visibility. Tested against chromedriver; any W3C driver
//! listening on `WEBDRIVER_URL` speaks the same commands.

use reqwest::Method;
use serde_json::{Value, json};

use crate::errors::WebDriverError;

/// Key the protocol uses for element references in JSON payloads.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Handle to an element, only meaningful within the session that found it.
#[derive(Debug, Clone)]
pub struct ElementRef {
    id: String,
}

pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverSession {
    /// Open a browser session against a WebDriver endpoint, typically a
    /// local chromedriver on port 4444.
    pub async fn start(webdriver_url: &str, headless: bool) -> Result<Self, WebDriverError> {
        let client = reqwest::Client::new();
        let base_url = webdriver_url.trim_end_matches('/').to_string();
        let response = client
            .post(format!("{base_url}/session"))
            .json(&new_session_payload(headless))
            .send()
            .await?;
        let status = response.status();
        let wire: Value = response.json().await?;
        if !status.is_success() {
            let (code, message) = error_of(wire.get("value").unwrap_or(&Value::Null));
            return Err(WebDriverError::Session {
                message: format!("{code}: {message}"),
            });
        }
        let session_id = session_id_of(&wire).ok_or_else(|| WebDriverError::Session {
            message: "Response carried no sessionId".to_string(),
        })?;
        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    pub async fn goto(&self, url: &str) -> Result<(), WebDriverError> {
        self.execute(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    /// Find one element, `NoSuchElement` when the selector matches nothing.
    pub async fn find(&self, css: &str) -> Result<ElementRef, WebDriverError> {
        let value = self
            .execute(Method::POST, "element", Some(locator(css)))
            .await
            .map_err(|err| no_such_element(err, css))?;
        element_id_of(&value)
            .map(|id| ElementRef { id })
            .ok_or_else(|| WebDriverError::Protocol {
                message: "Element response carried no element id".to_string(),
            })
    }

    /// Find every matching element; an empty list is not an error.
    pub async fn find_all(&self, css: &str) -> Result<Vec<ElementRef>, WebDriverError> {
        let value = self
            .execute(Method::POST, "elements", Some(locator(css)))
            .await?;
        let items = value.as_array().cloned().unwrap_or_default();
        Ok(items
            .iter()
            .filter_map(element_id_of)
            .map(|id| ElementRef { id })
            .collect())
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.execute(
            Method::POST,
            &format!("element/{}/click", element.id),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    pub async fn clear(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.execute(
            Method::POST,
            &format!("element/{}/clear", element.id),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), WebDriverError> {
        self.execute(
            Method::POST,
            &format!("element/{}/value", element.id),
            Some(json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    pub async fn text(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        let value = self
            .execute(Method::GET, &format!("element/{}/text", element.id), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn is_displayed(&self, element: &ElementRef) -> Result<bool, WebDriverError> {
        let value = self
            .execute(
                Method::GET,
                &format!("element/{}/displayed", element.id),
                None,
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// End the session and close the browser window.
    pub async fn quit(self) -> Result<(), WebDriverError> {
        self.execute(Method::DELETE, "", None).await?;
        Ok(())
    }

    /// Issue one command under `/session/{id}` and unwrap the `value` field.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WebDriverError> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.base_url, self.session_id, path)
        };
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let wire: Value = response.json().await?;
        let value = wire.get("value").cloned().unwrap_or(Value::Null);
        if !status.is_success() {
            let (code, message) = error_of(&value);
            return Err(WebDriverError::Protocol {
                message: format!("{code}: {message}"),
            });
        }
        Ok(value)
    }
}

fn new_session_payload(headless: bool) -> Value {
    let args: Vec<&str> = if headless {
        vec!["--headless=new", "--window-size=1280,900"]
    } else {
        Vec::new()
    };
    json!({
        "capabilities": {
            "alwaysMatch": {
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

fn locator(css: &str) -> Value {
    json!({ "using": "css selector", "value": css })
}

/// Session ids arrive under `value.sessionId` per W3C; some drivers still
/// answer with a top-level `sessionId`.
fn session_id_of(wire: &Value) -> Option<String> {
    wire.get("value")
        .and_then(|value| value.get("sessionId"))
        .or_else(|| wire.get("sessionId"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn element_id_of(value: &Value) -> Option<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn error_of(value: &Value) -> (String, String) {
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    (code, message)
}

fn no_such_element(err: WebDriverError, selector: &str) -> WebDriverError {
    match err {
        WebDriverError::Protocol { message } if message.starts_with("no such element") => {
            WebDriverError::NoSuchElement {
                selector: selector.to_string(),
            }
        }
        other => other,
    }
}
