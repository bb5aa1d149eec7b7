//! Neocities collection store.
//!
//! Reads the collection from the public site and replaces it through the
//! Neocities upload API, authenticated with a bearer API key.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CACHE_CONTROL;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use quill_core::domain::Post;
use quill_core::ports::{CollectionStore, StoreError};

/// Default Neocities upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://neocities.org/api/upload";

/// Default name of the collection document on the site.
pub const DEFAULT_FILE_NAME: &str = "posts.json";

/// Neocities store configuration.
#[derive(Debug, Clone)]
pub struct NeocitiesConfig {
    pub api_key: String,
    pub username: String,
    /// Public base URL of the site, e.g. `https://example.neocities.org`.
    pub site_url: String,
    pub upload_url: String,
    pub file_name: String,
}

impl NeocitiesConfig {
    /// Public URL of the collection document.
    pub fn document_url(&self) -> String {
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            self.file_name.trim_start_matches('/')
        )
    }
}

/// Body returned by the upload API.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    result: String,
    #[serde(default)]
    message: Option<String>,
}

/// Check that the upload API reported success.
fn check_upload_response(body: &str) -> Result<(), StoreError> {
    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|_| StoreError::Upload(format!("unexpected response: {}", body)))?;

    if response.result == "success" {
        return Ok(());
    }

    Err(StoreError::Upload(
        response.message.unwrap_or_else(|| body.to_string()),
    ))
}

/// Collection store publishing to a Neocities site.
pub struct NeocitiesStore {
    config: NeocitiesConfig,
    client: reqwest::Client,
}

impl NeocitiesStore {
    pub fn new(config: NeocitiesConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &NeocitiesConfig {
        &self.config
    }
}

#[async_trait]
impl CollectionStore for NeocitiesStore {
    async fn try_fetch(&self) -> Result<Option<Vec<Post>>, StoreError> {
        let url = self.config.document_url();

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Unreachable(format!("{} returned {}", url, status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn publish_collection(&self, posts: &[Post]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(posts)
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        let part = Part::text(json)
            .file_name(self.config.file_name.clone())
            .mime_str("application/json")
            .map_err(|e| StoreError::Upload(e.to_string()))?;
        let form = Form::new().part(format!("files[{}]", self.config.file_name), part);

        let response = self
            .client
            .post(&self.config.upload_url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Upload(e.to_string()))?;
        check_upload_response(&body)?;

        tracing::info!(
            site = %self.config.username,
            posts = posts.len(),
            "Neocities upload succeeded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(site_url: &str, upload_url: &str) -> NeocitiesConfig {
        NeocitiesConfig {
            api_key: "secret".to_string(),
            username: "blog".to_string(),
            site_url: site_url.to_string(),
            upload_url: upload_url.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    #[test]
    fn test_document_url_joins_cleanly() {
        let cfg = config("https://blog.neocities.org/", DEFAULT_UPLOAD_URL);
        assert_eq!(cfg.document_url(), "https://blog.neocities.org/posts.json");
    }

    #[test]
    fn test_upload_success() {
        let body = r#"{"result":"success","message":"your file(s) have been successfully uploaded"}"#;
        assert!(check_upload_response(body).is_ok());
    }

    #[test]
    fn test_upload_error_carries_message() {
        let err = check_upload_response(
            r#"{"result":"error","error_type":"invalid_auth","message":"invalid credentials"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Upload(ref m) if m == "invalid credentials"));
    }

    #[test]
    fn test_upload_non_json_is_error() {
        assert!(matches!(
            check_upload_response("<html>502 Bad Gateway</html>"),
            Err(StoreError::Upload(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_site_fetches_empty() {
        let store = NeocitiesStore::new(config("http://127.0.0.1:9", "http://127.0.0.1:9/upload"));

        assert!(matches!(
            store.try_fetch().await,
            Err(StoreError::Unreachable(_))
        ));
        assert!(store.fetch_collection().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_upload_fails() {
        let store = NeocitiesStore::new(config("http://127.0.0.1:9", "http://127.0.0.1:9/upload"));
        let posts = vec![Post::create("A", "B", vec![]).unwrap()];

        assert!(matches!(
            store.publish_collection(&posts).await,
            Err(StoreError::Upload(_))
        ));
    }

    mod against_site {
        use std::sync::Mutex;

        use actix_web::http::header::AUTHORIZATION;
        use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
        use serde_json::json;

        use super::*;

        /// A stand-in Neocities site: serves one document and accepts uploads.
        #[derive(Default)]
        struct Site {
            document: Mutex<Option<String>>,
            uploads: Mutex<Vec<Upload>>,
        }

        struct Upload {
            authorization: Option<String>,
            body: String,
        }

        /// Contents of the single file part in a multipart body.
        fn file_part(raw: &str) -> Option<String> {
            let start = raw.find("\r\n\r\n")? + 4;
            let end = raw.rfind("\r\n--")?;
            (start <= end).then(|| raw[start..end].to_string())
        }

        async fn serve_document(site: web::Data<Site>) -> HttpResponse {
            match site.document.lock().unwrap().clone() {
                Some(document) => HttpResponse::Ok()
                    .content_type("application/json")
                    .body(document),
                None => HttpResponse::NotFound().finish(),
            }
        }

        async fn accept_upload(
            site: web::Data<Site>,
            req: HttpRequest,
            body: web::Bytes,
        ) -> HttpResponse {
            let raw = String::from_utf8_lossy(&body).into_owned();
            let authorization = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if let Some(document) = file_part(&raw) {
                *site.document.lock().unwrap() = Some(document);
            }
            site.uploads.lock().unwrap().push(Upload {
                authorization,
                body: raw,
            });

            HttpResponse::Ok().json(json!({
                "result": "success",
                "message": "your file(s) have been successfully uploaded"
            }))
        }

        /// Serve `site` on an ephemeral port and return its base URL.
        fn start(site: web::Data<Site>) -> String {
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(site.clone())
                    .route("/posts.json", web::get().to(serve_document))
                    .route(
                        "/broken/posts.json",
                        web::get().to(|| async { HttpResponse::InternalServerError().finish() }),
                    )
                    .route("/api/upload", web::post().to(accept_upload))
                    .route(
                        "/api/rejecting",
                        web::post().to(|| async {
                            HttpResponse::BadRequest().json(json!({
                                "result": "error",
                                "error_type": "invalid_auth",
                                "message": "invalid credentials"
                            }))
                        }),
                    )
            })
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .unwrap();

            let addr = server.addrs()[0];
            actix_web::rt::spawn(server.run());
            format!("http://{}", addr)
        }

        fn store_for(base: &str) -> NeocitiesStore {
            NeocitiesStore::new(config(base, &format!("{}/api/upload", base)))
        }

        #[actix_web::test]
        async fn test_unpublished_document_is_none() {
            let base = start(web::Data::new(Site::default()));
            let store = store_for(&base);

            assert!(matches!(store.try_fetch().await, Ok(None)));
            assert!(store.fetch_collection().await.unwrap().is_empty());
        }

        #[actix_web::test]
        async fn test_server_error_is_unreachable() {
            let base = start(web::Data::new(Site::default()));
            let store = NeocitiesStore::new(config(
                &format!("{}/broken", base),
                &format!("{}/api/upload", base),
            ));

            assert!(matches!(
                store.try_fetch().await,
                Err(StoreError::Unreachable(_))
            ));
        }

        #[actix_web::test]
        async fn test_published_array_is_parsed() {
            let site = web::Data::new(Site::default());
            *site.document.lock().unwrap() = Some(
                r#"[{"id":"5f0c3f0e-8a57-4d34-9d1e-2b7f1c9a0e11","title":"A","content":"B","tags":["x"],"createdAt":"2024-05-01T10:00:00Z"}]"#
                    .to_string(),
            );
            let store = store_for(&start(site));

            let posts = store.try_fetch().await.unwrap().unwrap();
            assert_eq!(posts.len(), 1);
            assert_eq!(posts[0].title, "A");
            assert_eq!(posts[0].tags, vec!["x".to_string()]);
            assert_eq!(
                posts[0].id.to_string(),
                "5f0c3f0e-8a57-4d34-9d1e-2b7f1c9a0e11"
            );
        }

        #[actix_web::test]
        async fn test_malformed_document_is_an_error() {
            let site = web::Data::new(Site::default());
            *site.document.lock().unwrap() = Some("{\"posts\": oops".to_string());
            let store = store_for(&start(site));

            assert!(matches!(
                store.try_fetch().await,
                Err(StoreError::Malformed(_))
            ));
            assert!(store.fetch_collection().await.is_err());
        }

        #[actix_web::test]
        async fn test_publish_then_fetch_returns_same_posts() {
            let site = web::Data::new(Site::default());
            let store = store_for(&start(site.clone()));
            let posts = vec![
                Post::create("Second", "Two", vec!["x".to_string(), "y".to_string()]).unwrap(),
                Post::create("First", "One", vec![]).unwrap(),
            ];

            store.publish_collection(&posts).await.unwrap();

            {
                let uploads = site.uploads.lock().unwrap();
                assert_eq!(uploads.len(), 1);
                let upload = &uploads[0];
                assert_eq!(upload.authorization.as_deref(), Some("Bearer secret"));
                assert!(upload.body.contains(r#"name="files[posts.json]""#));
                assert!(upload.body.contains(r#"filename="posts.json""#));
                assert!(
                    upload
                        .body
                        .to_lowercase()
                        .contains("content-type: application/json")
                );
            }

            let fetched = store.try_fetch().await.unwrap().unwrap();
            assert_eq!(fetched, posts);
        }

        #[actix_web::test]
        async fn test_rejected_upload_carries_message() {
            let base = start(web::Data::new(Site::default()));
            let store =
                NeocitiesStore::new(config(&base, &format!("{}/api/rejecting", base)));
            let posts = vec![Post::create("A", "B", vec![]).unwrap()];

            let err = store.publish_collection(&posts).await.unwrap_err();
            assert!(matches!(err, StoreError::Upload(ref m) if m == "invalid credentials"));
        }
    }
}
