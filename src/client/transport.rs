//! HTTP transport for the Bottango REST API
//!
//! [`Transport`] is the seam between the client operations and the wire.
//! [`HttpTransport`] talks to a running Bottango instance with a blocking
//! reqwest client; tests substitute scripted transports.

use reqwest::blocking::Client;
use serde_json::Value;
use std::error::Error as _;
use std::io;
use std::time::Duration;

use crate::config::BottangoConfig;
use crate::error::{BottangoError, Result};

/// One request/response round-trip against an API endpoint
///
/// `endpoint` is relative to the API root, e.g. `"PlaybackState/"`.
pub trait Transport {
    /// GET the endpoint and return the decoded JSON body
    fn get(&self, endpoint: &str) -> Result<Value>;

    /// PUT `body` as JSON to the endpoint. The response body is ignored.
    fn put(&self, endpoint: &str, body: &Value) -> Result<()>;
}

/// Blocking HTTP transport for `http://{host}:{port}/`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    host: String,
    port: u16,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given host and port
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Result<Self> {
        let host = host.into();
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(BottangoError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: format!("http://{}:{}/", host, port),
            host,
            port,
        })
    }

    pub fn from_config(config: &BottangoConfig) -> Result<Self> {
        Self::new(
            config.host.clone(),
            config.port,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// API root, always ending with `/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn map_error(&self, endpoint: &str, err: reqwest::Error) -> BottangoError {
        if err.is_connect() || is_connection_lost(&err) {
            BottangoError::Connection {
                host: self.host.clone(),
                port: self.port,
            }
        } else {
            BottangoError::Request {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }

    fn check_status(endpoint: &str, response: &reqwest::blocking::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BottangoError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

/// Whether the request failed because the server went away, e.g. a reset
/// while sending the request or reading the body
fn is_connection_lost(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::NotConnected
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

impl Transport for HttpTransport {
    fn get(&self, endpoint: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .map_err(|e| self.map_error(endpoint, e))?;
        Self::check_status(endpoint, &response)?;

        let body = response.text().map_err(|e| self.map_error(endpoint, e))?;
        serde_json::from_str(&body).map_err(|source| BottangoError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    fn put(&self, endpoint: &str, body: &Value) -> Result<()> {
        let response = self
            .client
            .put(self.url(endpoint))
            .json(body)
            .send()
            .map_err(|e| self.map_error(endpoint, e))?;
        Self::check_status(endpoint, &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn transport_for(server: &mockito::ServerGuard) -> HttpTransport {
        let address = server.host_with_port();
        let (host, port) = address.rsplit_once(':').unwrap();
        HttpTransport::new(host, port.parse().unwrap(), Duration::from_secs(2)).unwrap()
    }

    /// Port on localhost with nothing listening
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    /// Server that reads the start of each request, optionally writes
    /// `partial_response`, then closes with unread input so the peer sees a reset
    fn resetting_server(connections: usize, partial_response: &'static [u8]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            for _ in 0..connections {
                let (mut stream, _) = listener.accept().unwrap();
                let mut first = [0u8; 1];
                let _ = stream.read_exact(&mut first);
                let _ = stream.write_all(partial_response);
            }
        });
        port
    }

    #[test]
    fn test_base_url() {
        let transport = HttpTransport::new("localhost", 59224, Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:59224/");
        assert_eq!(transport.url("CanAnimate/"), "http://localhost:59224/CanAnimate/");
    }

    #[test]
    fn test_get_decodes_json() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/Animations/")
            .with_header("content-type", "application/json")
            .with_body(r#"{"animations": ["Idle", "Wave"]}"#)
            .create();

        let body = transport_for(&server).get("Animations/").unwrap();
        assert_eq!(body, json!({"animations": ["Idle", "Wave"]}));
        mock.assert();
    }

    #[test]
    fn test_get_error_status() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/PlaybackState/")
            .with_status(500)
            .with_body("internal error")
            .create();

        let err = transport_for(&server).get("PlaybackState/").unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(
            err,
            BottangoError::Status { ref endpoint, status: 500 } if endpoint == "PlaybackState/"
        ));
    }

    #[test]
    fn test_get_malformed_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/CanAnimate/")
            .with_body("<html>not json</html>")
            .create();

        let err = transport_for(&server).get("CanAnimate/").unwrap_err();
        assert!(matches!(err, BottangoError::Decode { .. }));
    }

    #[test]
    fn test_put_sends_json_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/PlaybackState/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"isPlaying": true})))
            .create();

        transport_for(&server)
            .put("PlaybackState/", &json!({"isPlaying": true}))
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_put_error_status() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("PUT", "/Stop/").with_status(409).create();

        let err = transport_for(&server)
            .put("Stop/", &json!(""))
            .unwrap_err();
        assert!(matches!(err, BottangoError::Status { status: 409, .. }));
    }

    #[test]
    fn test_connection_refused_is_fatal() {
        let port = closed_port();
        let transport = HttpTransport::new("127.0.0.1", port, Duration::from_secs(2)).unwrap();

        let err = transport.get("CanAnimate/").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            format!("Error connecting to bottango API at 127.0.0.1:{}", port)
        );

        let err = transport.put("Stop/", &json!("")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_connection_reset_is_fatal() {
        let port = resetting_server(2, b"");
        let transport = HttpTransport::new("127.0.0.1", port, Duration::from_secs(2)).unwrap();

        let err = transport.get("CanAnimate/").unwrap_err();
        assert!(err.is_fatal(), "got {:?}", err);
        assert_eq!(
            err.to_string(),
            format!("Error connecting to bottango API at 127.0.0.1:{}", port)
        );

        let err = transport.put("Stop/", &json!("")).unwrap_err();
        assert!(err.is_fatal(), "got {:?}", err);
    }

    #[test]
    fn test_reset_while_reading_body_is_fatal() {
        let port = resetting_server(
            1,
            concat!(
                "HTTP/1.1 200 OK\r\n",
                "content-type: application/json\r\n",
                "content-length: 100\r\n\r\n",
                "{\"can"
            )
            .as_bytes(),
        );
        let transport = HttpTransport::new("127.0.0.1", port, Duration::from_secs(2)).unwrap();

        let err = transport.get("CanAnimate/").unwrap_err();
        assert!(err.is_fatal(), "got {:?}", err);
    }
}
