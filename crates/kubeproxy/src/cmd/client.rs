use std::time::Duration;

use anyhow::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Send a single `GET` to the control surface of a running daemon.
///
/// Failures are logged, never returned: client mode always exits cleanly.
pub async fn run_client(path: &str, listen_addr: &str) -> Result<()> {
    let url = request_url(listen_addr, path);
    tracing::debug!(%url, "Sending control request");

    let client = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {e}");
            return Ok(());
        }
    };

    match client.get(&url).send().await {
        Ok(response) => {
            tracing::info!(%url, status = response.status().as_u16(), "Control request sent");
        }
        Err(e) => tracing::error!(%url, "Control request failed: {e}"),
    }
    Ok(())
}

fn request_url(listen_addr: &str, path: &str) -> String {
    format!("http://{listen_addr}/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn request_url_joins_path_once() {
        assert_eq!(
            request_url("127.0.0.1:8000", "containers"),
            "http://127.0.0.1:8000/containers"
        );
        assert_eq!(
            request_url("127.0.0.1:8000", "/exec?cmd=ls%20-l"),
            "http://127.0.0.1:8000/exec?cmd=ls%20-l"
        );
    }

    #[tokio::test]
    async fn client_sends_get_to_control_surface() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nOK")
                .await
                .unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });

        run_client("containers", &addr).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /containers HTTP/1.1"));
    }

    #[tokio::test]
    async fn unreachable_daemon_is_not_an_error() {
        // Bind then drop to get a port nothing listens on.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().to_string()
        };

        run_client("containers", &addr).await.unwrap();
    }
}
