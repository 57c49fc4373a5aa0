use async_trait::async_trait;

use crate::document::model::EncodedImage;
use crate::foundation::error::LayrResult;

/// Multipart field file name used when the upload carries none.
pub const DEFAULT_UPLOAD_NAME: &str = "upload.png";

/// Turns a photo into its cutout: the subject on a transparent background.
///
/// One request, one response, no streaming. Implementations may take tens of seconds.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    async fn remove_background(&self, image: EncodedImage) -> LayrResult<EncodedImage>;
}

#[cfg(feature = "http-remover")]
pub use http::HttpBackgroundRemover;

#[cfg(feature = "http-remover")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{BackgroundRemover, DEFAULT_UPLOAD_NAME};
    use crate::document::model::EncodedImage;
    use crate::foundation::error::{LayrError, LayrResult};

    /// Separation service reached over HTTP.
    ///
    /// Posts the photo as multipart field `file` to `{base_url}/process` and takes the response
    /// body as the cutout.
    #[derive(Clone, Debug)]
    pub struct HttpBackgroundRemover {
        client: reqwest::Client,
        base_url: String,
        timeout: Option<Duration>,
    }

    impl HttpBackgroundRemover {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                client: reqwest::Client::new(),
                base_url: base_url.into(),
                timeout: None,
            }
        }

        /// Give up after `timeout`. Without one the call waits as long as the service does.
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        pub fn endpoint(&self) -> String {
            format!("{}/process", self.base_url.trim_end_matches('/'))
        }

        async fn post(&self, image: EncodedImage) -> LayrResult<EncodedImage> {
            let mime = image.mime_or_sniffed().to_owned();
            let file_name = image
                .file_name
                .clone()
                .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_owned());
            let part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
                .file_name(file_name)
                .mime_str(&mime)
                .map_err(|e| {
                    LayrError::separation(None, format!("invalid upload type '{mime}': {e}"))
                })?;
            let form = reqwest::multipart::Form::new().part("file", part);

            let res = self
                .client
                .post(self.endpoint())
                .multipart(form)
                .send()
                .await
                .map_err(|e| LayrError::separation(None, format!("request failed: {e}")))?;

            let status = res.status();
            if !status.is_success() {
                let text = res.text().await.unwrap_or_default();
                return Err(LayrError::separation(Some(status.as_u16()), text));
            }

            let content_type = res
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or("image/png")
                .to_owned();
            let bytes = res.bytes().await.map_err(|e| {
                LayrError::separation(Some(status.as_u16()), format!("failed to read body: {e}"))
            })?;
            if bytes.is_empty() {
                return Err(LayrError::separation(
                    Some(status.as_u16()),
                    "service returned an empty image",
                ));
            }
            Ok(EncodedImage::new(bytes.to_vec()).with_mime(content_type))
        }
    }

    #[async_trait]
    impl BackgroundRemover for HttpBackgroundRemover {
        #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint(), bytes = image.len()))]
        async fn remove_background(&self, image: EncodedImage) -> LayrResult<EncodedImage> {
            let out = match self.timeout {
                Some(limit) => tokio::time::timeout(limit, self.post(image))
                    .await
                    .map_err(|_| {
                        LayrError::separation(
                            None,
                            format!("timed out after {}s", limit.as_secs_f64()),
                        )
                    })?,
                None => self.post(image).await,
            };
            match &out {
                Ok(cutout) => tracing::debug!(bytes = cutout.len(), "cutout received"),
                Err(err) => tracing::warn!(%err, "background separation failed"),
            }
            out
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/separation/remover.rs"]
mod tests;
