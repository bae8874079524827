//! reqwest-backed transport with token authentication.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::GridResult;
use crate::transport::{Method, Transport, TransportResponse};

/// Joins URL parts, normalizing stray slashes.
fn url_join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Production transport: one HTTP request per call, authenticated with a
/// database token. Connection pooling is handled by the inner client.
pub struct HttpTransport {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<JsonValue>,
    ) -> GridResult<TransportResponse> {
        let url = url_join(&self.base_url, path);
        let reqwest_method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .client
            .request(reqwest_method, &url)
            .header("Authorization", format!("Token {}", self.token))
            .query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        // Error bodies may be HTML or empty; a parse failure is not fatal.
        let body = response.json::<JsonValue>().await.ok();
        tracing::debug!(method = method.as_str(), %url, status, "remote request");

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::url_join;

    #[test]
    fn url_join_normalizes_slashes() {
        assert_eq!(
            url_join("https://grid.example.com/", "/api/database/rows/table/1/"),
            "https://grid.example.com/api/database/rows/table/1/"
        );
        assert_eq!(url_join("https://grid.example.com", "health"), "https://grid.example.com/health");
    }
}
