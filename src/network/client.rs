//! HTTP client wrapper - talks to the TurfScout REST API

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::models::{Credentials, ItemBody, PageBody, Turf, TurfDraft, TurfId, TurfPatch};
use crate::source::ListingSource;
use crate::store::ListingError;

/// REST implementation of [`ListingSource`]
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("building HTTP client")?;

        Ok(ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn listings_url(&self) -> String {
        format!("{}/turf", self.base_url)
    }

    pub fn listing_url(&self, id: TurfId) -> String {
        format!("{}/turf/{}", self.base_url, id)
    }

    /// Attach the common headers and the bearer token, if any
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header("Accept", "application/json");
        match self.credentials.token.as_deref() {
            Some(token) if !token.is_empty() => req.bearer_auth(token),
            _ => req,
        }
    }

    /// Send a request and map the status to a listing error
    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        id: Option<TurfId>,
    ) -> Result<reqwest::Response, ListingError> {
        let resp = self.authorize(req).send().await.map_err(describe_transport_error)?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(status_error(status, id, &body))
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ListingError> {
        let body = resp
            .text()
            .await
            .map_err(|e| ListingError::FetchFailed(format!("Error reading body: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| ListingError::FetchFailed(format!("Malformed response: {}", e)))
    }

    async fn draft_form(draft: &TurfDraft) -> Result<Form, ListingError> {
        let mut form = Form::new()
            .text("name", draft.name.clone())
            .text("location", draft.location.clone())
            .text("description", draft.description.clone())
            .text("price", draft.price.to_string());

        if let Some(pitches) = draft.number_of_pitches {
            form = form.text("number_of_pitches", pitches.to_string());
        }

        if let Some(path) = &draft.image_path {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                ListingError::FetchFailed(format!("Cannot read image {}: {}", path.display(), e))
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| String::from("image"));
            form = form.part("image", Part::bytes(bytes).file_name(file_name));
        }

        Ok(form)
    }
}

#[async_trait]
impl ListingSource for ApiClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Turf>, ListingError> {
        let req = self.http.get(self.listings_url()).query(&[("page", page)]);
        let resp = self.send(req, None).await?;
        let body: PageBody = Self::decode(resp).await?;
        Ok(body.into_items())
    }

    async fn create_item(&self, draft: &TurfDraft) -> Result<Turf, ListingError> {
        let form = Self::draft_form(draft).await?;
        let req = self.http.post(self.listings_url()).multipart(form);
        let resp = self.send(req, None).await?;
        let body: ItemBody = Self::decode(resp).await?;
        Ok(body.into_item())
    }

    async fn update_item(&self, id: TurfId, patch: &TurfPatch) -> Result<Turf, ListingError> {
        let req = self.http.put(self.listing_url(id)).json(patch);
        let resp = self.send(req, Some(id)).await?;
        let body: ItemBody = Self::decode(resp).await?;
        Ok(body.into_item())
    }

    async fn delete_item(&self, id: TurfId) -> Result<(), ListingError> {
        let req = self.http.delete(self.listing_url(id));
        self.send(req, Some(id)).await?;
        Ok(())
    }
}

fn describe_transport_error(e: reqwest::Error) -> ListingError {
    let msg = if e.is_timeout() {
        format!("Request timed out ({}s)", REQUEST_TIMEOUT_SECS)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    };
    ListingError::FetchFailed(msg)
}

/// Map a non-2xx status to a listing error. Only requests addressed to a
/// single listing can report it missing.
fn status_error(status: StatusCode, id: Option<TurfId>, body: &str) -> ListingError {
    match id {
        Some(id) if status == StatusCode::NOT_FOUND => ListingError::NotFound(id),
        _ => ListingError::FetchFailed(format!(
            "HTTP {}: {}",
            status.as_u16(),
            server_message(body).unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string())
        )),
    }
}

/// Pull `message` out of a JSON error body
fn server_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("message")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:8000/api/", Credentials::default()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000/api");
        assert_eq!(client.listings_url(), "http://127.0.0.1:8000/api/turf");
        assert_eq!(client.listing_url(12), "http://127.0.0.1:8000/api/turf/12");
    }

    #[test]
    fn test_server_message() {
        assert_eq!(
            server_message(r#"{"message":"The price field is required."}"#).as_deref(),
            Some("The price field is required.")
        );
        assert_eq!(server_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, Some(4), ""),
            ListingError::NotFound(4)
        );
        // Collection endpoints carry no listing id
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, None, ""),
            ListingError::FetchFailed(String::from("HTTP 404: Not Found"))
        );
        assert_eq!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, None, r#"{"message":"The name field is required."}"#),
            ListingError::FetchFailed(String::from("HTTP 422: The name field is required."))
        );
    }

    #[tokio::test]
    async fn test_draft_form_missing_image_fails() {
        let draft = TurfDraft {
            name: String::from("Arena"),
            image_path: Some(std::path::PathBuf::from("/definitely/not/here.jpg")),
            ..Default::default()
        };
        let err = ApiClient::draft_form(&draft).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_draft_form_reads_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pitch.jpg");
        std::fs::write(&path, b"\xff\xd8\xff").unwrap();

        let draft = TurfDraft {
            name: String::from("Arena"),
            image_path: Some(path),
            ..Default::default()
        };
        assert!(ApiClient::draft_form(&draft).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_fetch_failure() {
        // Port 9 (discard) is closed on any sane test host
        let client = ApiClient::new("http://127.0.0.1:9/api", Credentials::default()).unwrap();
        let err = client.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, ListingError::FetchFailed(_)));
    }
}
