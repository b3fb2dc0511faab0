use std::time::Duration;

use serde_json::Value;

use crate::error::IconError;
use crate::types::{self, SearchHit};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The icon search/generate service.
pub trait IconApi {
    /// Search for candidate images by term. An empty result is not an error.
    fn search(&self, term: &str) -> Result<Vec<SearchHit>, IconError>;

    /// Recolor/convert an image into an SVG icon with the given background.
    /// Returns the SVG URL or markup, or `None` if the service produced nothing.
    fn generate(&self, image_url: &str, color: &str) -> Result<Option<String>, IconError>;
}

/// Blocking HTTP client for the icon service.
pub struct HttpIconApi {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl HttpIconApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, IconError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, IconError> {
        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(params)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(IconError::RateLimit);
        }
        if !status.is_success() {
            return Err(IconError::ServerError {
                status: status.as_u16(),
                message: snippet(&text).to_string(),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            IconError::api(format!(
                "Failed to parse response from {path}: {e}. Response: {}",
                snippet(&text)
            ))
        })
    }
}

impl IconApi for HttpIconApi {
    fn search(&self, term: &str) -> Result<Vec<SearchHit>, IconError> {
        let doc = self.get_json("/api/search", &[("s", term), ("l", "en")])?;
        Ok(types::extract_hits(&doc))
    }

    fn generate(&self, image_url: &str, color: &str) -> Result<Option<String>, IconError> {
        let color = color.trim_start_matches('#');
        let doc = self.get_json("/api/generate", &[("image", image_url), ("color", color)])?;
        Ok(types::extract_svg(&doc))
    }
}

fn snippet(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}
