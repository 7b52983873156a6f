//! OpenAI-compatible images API client.
//!
//! One POST per prompt asking for [`IMAGES_PER_PROMPT`] base64-encoded images,
//! which are decoded and written as PNG files. There are no retries: a failed
//! request is reported to the caller as is.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{GenerationError, IMAGES_PER_PROMPT, OPENAI_IMAGES_URL};

/// Square size requested from the provider.
pub const IMAGE_SIZE: &str = "1024x1024";

/// Model name sent when none is configured.
pub const DEFAULT_MODEL: &str = "dall-e-2";

/// Request body for POST /v1/images/generations.
#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: usize,
    pub size: &'a str,
    pub response_format: &'a str,
}

/// Response body of the images endpoint.
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub created: Option<i64>,
    pub data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

/// Client for an OpenAI-compatible image generation endpoint.
pub struct GenerationClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GenerationClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: OPENAI_IMAGES_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Generate images for `prompt` and write them into `image_dir`.
    ///
    /// The prompt is sent as given; enrich it first if needed.
    pub async fn generate(&self, prompt: &str, image_dir: &Path) -> Result<Vec<PathBuf>, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let body = GenerationRequest {
            model: &self.model,
            prompt,
            n: IMAGES_PER_PROMPT,
            size: IMAGE_SIZE,
            response_format: "b64_json",
        };

        tracing::info!(url = %self.api_url, model = %self.model, "Requesting image generation");
        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let resp_body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Image generation failed");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: resp_body,
            });
        }

        let parsed: GenerationResponse = serde_json::from_str(&resp_body)?;
        let payloads = parsed
            .data
            .into_iter()
            .map(|img| {
                img.b64_json.ok_or_else(|| GenerationError::Api {
                    status: status.as_u16(),
                    message: "response image has no b64_json payload".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f").to_string();
        save_images(&payloads, image_dir, &stamp)
    }
}

/// Decode base64 image payloads and write them as `generation-<stamp>-<i>.png`.
pub fn save_images<S: AsRef<str>>(payloads: &[S], image_dir: &Path, stamp: &str) -> Result<Vec<PathBuf>, GenerationError> {
    std::fs::create_dir_all(image_dir)?;
    let mut paths = Vec::with_capacity(payloads.len());
    for (i, payload) in payloads.iter().enumerate() {
        let bytes = STANDARD.decode(payload.as_ref())?;
        let img = image::load_from_memory(&bytes)?;
        let path = image_dir.join(format!("generation-{stamp}-{i}.png"));
        img.save_with_format(&path, image::ImageFormat::Png)?;
        tracing::debug!(path = %path.display(), w = img.width(), h = img.height(), "Saved generated image");
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn png_base64(color: Rgba<u8>) -> String {
        let img = RgbaImage::from_pixel(4, 4, color);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        STANDARD.encode(buf.into_inner())
    }

    /// Serve a single canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/images/generations", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (url, handle)
    }

    fn client(url: &str) -> GenerationClient {
        GenerationClient::new("test-key")
            .with_api_url(url)
            .with_http_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn request_serializes_expected_fields() {
        let body = GenerationRequest {
            model: DEFAULT_MODEL,
            prompt: "a fox",
            n: IMAGES_PER_PROMPT,
            size: IMAGE_SIZE,
            response_format: "b64_json",
        };
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "dall-e-2");
        assert_eq!(json["prompt"], "a fox");
        assert_eq!(json["n"], 4);
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["response_format"], "b64_json");
    }

    #[test]
    fn save_images_writes_numbered_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("images");
        let payloads = [png_base64(Rgba([255, 0, 0, 255])), png_base64(Rgba([0, 0, 255, 255]))];
        let paths = save_images(&payloads, &target, "20260101T000000000").unwrap();

        assert_eq!(
            paths,
            vec![
                target.join("generation-20260101T000000000-0.png"),
                target.join("generation-20260101T000000000-1.png"),
            ]
        );
        let second = image::open(&paths[1]).unwrap().to_rgba8();
        assert_eq!(second.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn save_images_rejects_bad_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_images(&["%%%"], dir.path(), "x").unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));

        let not_an_image = STANDARD.encode(b"hello");
        let err = save_images(&[not_an_image], dir.path(), "x").unwrap_err();
        assert!(matches!(err, GenerationError::Image(_)));
    }

    #[tokio::test]
    async fn empty_prompt_and_missing_key_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let err = GenerationClient::new("k").generate("  ", dir.path()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyPrompt));
        let err = GenerationClient::new("").generate("a fox", dir.path()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_saves_images() {
        let body = serde_json::json!({
            "created": 1,
            "data": [
                { "b64_json": png_base64(Rgba([10, 20, 30, 255])) },
                { "b64_json": png_base64(Rgba([40, 50, 60, 255])) },
            ]
        })
        .to_string();
        let (url, server) = serve_once("200 OK", body).await;
        let dir = tempfile::tempdir().unwrap();

        let paths = client(&url).generate("a fox", dir.path()).await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
        let name = paths[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("generation-") && name.ends_with("-0.png"), "{name}");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/images/generations"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(request.contains(r#""prompt":"a fox""#));
        assert!(request.contains(r#""n":4"#));
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let (url, server) = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"bad key"}}"#.to_string(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = client(&url).generate("a fox", dir.path()).await.unwrap_err();
        match err {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("bad key"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }
}
