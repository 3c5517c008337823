use std::io;
use std::time::Duration;

use crate::errors::TransportError;
use crate::transport::ShardTransport;

/// Blocking HTTP transport rooted at a base URL.
///
/// Every request is bounded by one global timeout covering connect, send,
/// and body read.
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Transport rooted at `base_url` with one `timeout` per request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    /// Absolute URL of a transport-relative resource path.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn map_error(path: &str, err: ureq::Error) -> TransportError {
        match err {
            ureq::Error::StatusCode(404) => TransportError::NotFound(path.to_string()),
            ureq::Error::StatusCode(status) => TransportError::Status {
                path: path.to_string(),
                status,
            },
            ureq::Error::Timeout(_) => TransportError::Timeout(path.to_string()),
            ureq::Error::Io(io_err) if io_err.kind() == io::ErrorKind::TimedOut => {
                TransportError::Timeout(path.to_string())
            }
            other => TransportError::Transport {
                path: path.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl ShardTransport for HttpTransport {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch(&self, path: &str) -> Result<String, TransportError> {
        let url = self.url_for(path);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| Self::map_error(path, err))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|err| Self::map_error(path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn spawn_one_shot_http(status_line: &'static str, payload: Vec<u8>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request_buf = [0u8; 1024];
            let _ = stream.read(&mut request_buf);
            let headers = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                payload.len()
            );
            stream.write_all(headers.as_bytes()).unwrap();
            stream.write_all(&payload).unwrap();
            let _ = stream.flush();
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn url_for_joins_without_duplicate_slashes() {
        let transport = HttpTransport::new("https://cdn.example/site/", Duration::from_secs(1));
        assert_eq!(
            transport.url_for("/data/videos_page_1.json"),
            "https://cdn.example/site/data/videos_page_1.json"
        );
    }

    #[test]
    fn fetch_returns_body_on_success() {
        let (base, handle) = spawn_one_shot_http("200 OK", b"[{\"embed\":\"e\"}]".to_vec());
        let transport = HttpTransport::new(base, Duration::from_secs(5));
        let body = transport.fetch("data/videos_page_1.json").unwrap();
        assert_eq!(body, "[{\"embed\":\"e\"}]");
        handle.join().unwrap();
    }

    #[test]
    fn fetch_maps_status_codes() {
        let (base, handle) = spawn_one_shot_http("404 Not Found", Vec::new());
        let transport = HttpTransport::new(base, Duration::from_secs(5));
        assert!(matches!(
            transport.fetch("data/videos_page_2.json"),
            Err(TransportError::NotFound(_))
        ));
        handle.join().unwrap();

        let (base, handle) = spawn_one_shot_http("503 Service Unavailable", Vec::new());
        let transport = HttpTransport::new(base, Duration::from_secs(5));
        assert!(matches!(
            transport.fetch("data/videos_page_2.json"),
            Err(TransportError::Status { status: 503, .. })
        ));
        handle.join().unwrap();
    }

    #[test]
    fn fetch_times_out_when_server_stalls() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(600));
            drop(stream);
        });
        let transport = HttpTransport::new(format!("http://{addr}"), Duration::from_millis(150));
        let result = transport.fetch("data/videos_page_3.json");
        assert!(matches!(result, Err(TransportError::Timeout(_))), "{result:?}");
        handle.join().unwrap();
    }
}
