use super::*;

struct Echo;

#[async_trait]
impl BackgroundRemover for Echo {
    async fn remove_background(&self, image: EncodedImage) -> LayrResult<EncodedImage> {
        Ok(image.with_mime("image/png"))
    }
}

#[tokio::test]
async fn trait_objects_can_be_shared() {
    let remover: std::sync::Arc<dyn BackgroundRemover> = std::sync::Arc::new(Echo);
    let out = remover
        .remove_background(EncodedImage::new(vec![1, 2, 3]))
        .await
        .unwrap();
    assert_eq!(&*out.bytes, &[1, 2, 3]);
    assert_eq!(out.mime.as_deref(), Some("image/png"));
}

#[cfg(feature = "http-remover")]
mod http_remover {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::foundation::error::LayrError;

    /// One-shot server: captures the request and answers with `response`.
    async fn serve_once(response: Vec<u8>) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut req = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
                if req.ends_with(b"--\r\n") || req.ends_with(b"0\r\n\r\n") {
                    break;
                }
            }
            sock.write_all(&response).await.unwrap();
            sock.shutdown().await.ok();
            req
        });
        (base, handle)
    }

    fn http_response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            HttpBackgroundRemover::new("http://host:8000/").endpoint(),
            "http://host:8000/process"
        );
    }

    #[tokio::test]
    async fn posts_multipart_file_and_returns_body() {
        let (base, server) =
            serve_once(http_response("200 OK", "image/png", b"cutout-bytes")).await;
        let photo = EncodedImage::new(b"\xFF\xD8\xFFphoto".to_vec());

        let out = HttpBackgroundRemover::new(base)
            .remove_background(photo)
            .await
            .unwrap();
        assert_eq!(&*out.bytes, b"cutout-bytes");
        assert_eq!(out.mime.as_deref(), Some("image/png"));

        let req = String::from_utf8_lossy(&server.await.unwrap()).into_owned();
        assert!(req.starts_with("POST /process"), "{req}");
        assert!(req.contains("name=\"file\""));
        assert!(req.contains("filename=\"upload.png\""));
        assert!(req.contains("image/jpeg"));
    }

    #[tokio::test]
    async fn error_status_becomes_separation_error() {
        let (base, _server) =
            serve_once(http_response("500 Internal Server Error", "text/plain", b"boom")).await;
        let err = HttpBackgroundRemover::new(base)
            .remove_background(EncodedImage::new(vec![0u8; 4]))
            .await
            .unwrap_err();
        match err {
            LayrError::Separation { status, details } => {
                assert_eq!(status, Some(500));
                assert_eq!(details, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn timeout_is_reported_without_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let _hold = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(sock);
        });

        let err = HttpBackgroundRemover::new(base)
            .with_timeout(Duration::from_millis(100))
            .remove_background(EncodedImage::new(vec![0u8; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, LayrError::Separation { status: None, .. }));
    }
}
