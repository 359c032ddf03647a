//! Remote blob store backend
//!
//! The document lives at `{base_url}/{key}`. Reads are `GET`, writes are
//! `PUT`, both bearer-authenticated. A `404` on read means the document has
//! not been created yet.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};

use super::error::{Result, StoreError};
use super::StorageBackend;
use crate::entry::ContentDocument;

const BLOB_VERSION_HEADER: &str = "x-vercel-blob-version";
const BLOB_VERSION: &str = "1";

pub struct RemoteBlobBackend {
    url: String,
    client: Client,
}

impl RemoteBlobBackend {
    pub fn new(base_url: &str, key: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| StoreError::InvalidCredential)?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(BLOB_VERSION_HEADER, header::HeaderValue::from_static(BLOB_VERSION));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: blob_url(base_url, key),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Join the base URL and key, percent-encoding each key segment.
fn blob_url(base_url: &str, key: &str) -> String {
    let path = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

#[async_trait]
impl StorageBackend for RemoteBlobBackend {
    async fn read(&self) -> Result<ContentDocument> {
        let response = self
            .client
            .get(&self.url)
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!(url = %self.url, "Content blob missing, initializing empty document");
            let empty = ContentDocument::empty();
            self.write(&empty).await?;
            return Ok(empty);
        }

        if !status.is_success() {
            tracing::warn!(url = %self.url, status = status.as_u16(), "Content blob read failed");
            return Err(StoreError::Status {
                operation: "read",
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Ok(ContentDocument::empty());
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn write(&self, document: &ContentDocument) -> Result<()> {
        let body = serde_json::to_vec(document)?;
        let response = self
            .client
            .put(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, status = status.as_u16(), "Content blob write failed");
            return Err(StoreError::Status {
                operation: "persist",
                status: status.as_u16(),
            });
        }

        tracing::debug!(url = %self.url, entries = document.len(), "Content blob written");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "remote-blob"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ContentEntry, Language};
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{body_json, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn backend(server: &MockServer) -> RemoteBlobBackend {
        RemoteBlobBackend::new(&server.uri(), "content/content.json", "secret", TIMEOUT).unwrap()
    }

    /// Answers GET with whatever the last PUT stored, or 404.
    #[derive(Clone, Default)]
    struct BlobSlot(Arc<Mutex<Option<Vec<u8>>>>);

    impl Respond for BlobSlot {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let mut slot = self.0.lock().unwrap();
            match request.method.as_str() {
                "PUT" => {
                    *slot = Some(request.body.clone());
                    ResponseTemplate::new(200)
                }
                _ => match slot.as_ref() {
                    Some(body) => ResponseTemplate::new(200).set_body_bytes(body.clone()),
                    None => ResponseTemplate::new(404),
                },
            }
        }
    }

    #[test]
    fn url_encodes_key_segments() {
        assert_eq!(
            blob_url("https://blob.example.com//", "my content/data file.json"),
            "https://blob.example.com/my%20content/data%20file.json"
        );
    }

    #[tokio::test]
    async fn missing_blob_is_initialized_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/content.json"))
            .and(header_eq("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/content/content.json"))
            .and(header_eq("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "zh": [], "jp": [], "en": [] })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let doc = backend(&server).read().await.unwrap();
        assert_eq!(doc, ContentDocument::empty());
    }

    #[tokio::test]
    async fn empty_body_reads_as_empty_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert_eq!(backend(&server).read().await.unwrap(), ContentDocument::empty());
    }

    #[tokio::test]
    async fn server_error_is_not_treated_as_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = backend(&server).read().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Status {
                operation: "read",
                status: 500
            }
        ));
    }

    #[tokio::test]
    async fn corrupt_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2"))
            .mount(&server)
            .await;

        let err = backend(&server).read().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[tokio::test]
    async fn rejected_write_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = backend(&server)
            .write(&ContentDocument::empty())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Status {
                operation: "persist",
                status: 403
            }
        ));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let server = MockServer::start().await;
        Mock::given(path("/content/content.json"))
            .respond_with(BlobSlot::default())
            .mount(&server)
            .await;

        let mut doc = ContentDocument::empty();
        doc.en.push(ContentEntry {
            id: uuid::Uuid::new_v4().to_string(),
            slug: "en-20240501083000123".to_string(),
            language: Language::En,
            text: "Hello".to_string(),
            source_text: "你好".to_string(),
            published_at: "2024-05-01T08:30:00.123Z".to_string(),
            timezone: "UTC".to_string(),
            city: "Tokyo".to_string(),
            weather_summary: "Sunny".to_string(),
            extra: Default::default(),
        });

        let backend = backend(&server);
        backend.write(&doc).await.unwrap();
        assert_eq!(backend.read().await.unwrap(), doc);
    }

    #[tokio::test]
    async fn stored_json_survives_read_then_write() {
        let stored = serde_json::json!({
            "zh": [],
            "jp": [{
                "id": "LEGACY-7",
                "slug": "jp-imported",
                "language": "jp",
                "text": "こんにちは",
                "sourceText": "你好",
                "publishedAt": "2024-05-01T17:30:00+09:00",
                "timezone": "Asia/Tokyo",
                "city": "东京",
                "weatherSummary": "晴",
                "mood": "happy"
            }],
            "en": []
        });
        let slot = BlobSlot::default();
        *slot.0.lock().unwrap() = Some(serde_json::to_vec(&stored).unwrap());

        let server = MockServer::start().await;
        Mock::given(path("/content/content.json"))
            .respond_with(slot.clone())
            .mount(&server)
            .await;

        let backend = backend(&server);
        let doc = backend.read().await.unwrap();
        backend.write(&doc).await.unwrap();

        let written = slot.0.lock().unwrap().clone().unwrap();
        let written: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(written, stored);
    }
}
