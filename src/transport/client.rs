use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::BackendConfig;
use crate::transport::error::{
    classify_status, is_connectivity_error, ErrorKind, RemoteCallResult, StatusClass,
    TransportFault,
};

/// A binary attachment sent alongside a multipart call.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub mime: Option<String>,
}

impl FilePart {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            mime: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// JSON-over-HTTP client for the remote service.
///
/// Every call is a `POST <host>/<method>` with the session cookie attached.
/// Outcomes are classified, never retried: retry is a query concern.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    host: Arc<str>,
}

impl Transport {
    /// Build a transport from backend settings.
    ///
    /// The underlying client keeps a cookie store so the session cookie set
    /// by `login` accompanies every later call.
    pub fn new(settings: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds.into()))
            .timeout(Duration::from_secs(settings.request_timeout_seconds.into()))
            .build()?;

        Ok(Self {
            client,
            host: Arc::from(settings.host.trim_end_matches('/')),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.host, method)
    }

    /// Call `method` with `args` serialized as the JSON request body.
    pub async fn call<A, T>(
        &self,
        method: &str,
        args: &A,
    ) -> Result<RemoteCallResult<T>, TransportFault>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(args).map_err(|source| TransportFault::Encode {
            method: method.to_string(),
            source,
        })?;

        let request = self
            .client
            .post(self.url(method))
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone());

        self.dispatch(method, request, || format!("arguments {}", body))
            .await
    }

    /// Call `method` as `multipart/form-data`: a `body` field holding the
    /// JSON-encoded arguments plus one `file_<i>` part per attachment.
    pub async fn call_with_files<A, T>(
        &self,
        method: &str,
        args: &A,
        files: Vec<FilePart>,
    ) -> Result<RemoteCallResult<T>, TransportFault>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(args).map_err(|source| TransportFault::Encode {
            method: method.to_string(),
            source,
        })?;

        let file_count = files.len();
        let mut form = Form::new().text("body", body.clone());
        for (index, file) in files.into_iter().enumerate() {
            let mut part = Part::bytes(file.bytes);
            if let Some(name) = file.file_name {
                part = part.file_name(name);
            }
            if let Some(mime) = file.mime {
                part = part
                    .mime_str(&mime)
                    .map_err(|source| TransportFault::Request {
                        method: method.to_string(),
                        source,
                    })?;
            }
            form = form.part(format!("file_{}", index), part);
        }

        let request = self.client.post(self.url(method)).multipart(form);

        self.dispatch(method, request, || {
            format!("arguments {} and {} uploaded files", body, file_count)
        })
        .await
    }

    async fn dispatch<T>(
        &self,
        method: &str,
        request: RequestBuilder,
        context: impl FnOnce() -> String,
    ) -> Result<RemoteCallResult<T>, TransportFault>
    where
        T: DeserializeOwned,
    {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) if is_connectivity_error(&err) => {
                tracing::warn!(method, error = %err, "Remote call did not reach the service");
                return Ok(Err(ErrorKind::Network));
            }
            Err(source) => {
                return Err(TransportFault::Request {
                    method: method.to_string(),
                    source,
                })
            }
        };

        let status = response.status();
        tracing::debug!(method, status = status.as_u16(), "Remote call completed");

        match classify_status(status) {
            StatusClass::Success => {}
            StatusClass::Failure(kind) => return Ok(Err(kind)),
            StatusClass::Unexpected => {
                let fault = TransportFault::UnexpectedStatus {
                    method: method.to_string(),
                    status,
                    context: context(),
                };
                tracing::error!(method, status = status.as_u16(), "{}", fault);
                return Err(fault);
            }
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) if is_connectivity_error(&err) => {
                tracing::warn!(method, error = %err, "Response body was cut off");
                return Ok(Err(ErrorKind::Network));
            }
            Err(source) => {
                return Err(TransportFault::Request {
                    method: method.to_string(),
                    source,
                })
            }
        };

        // Methods returning nothing may answer with an empty body.
        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        let value = serde_json::from_slice(payload).map_err(|source| TransportFault::Decode {
            method: method.to_string(),
            source,
        })?;

        Ok(Ok(value))
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").field("host", &self.host).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(host: &str) -> BackendConfig {
        BackendConfig {
            host: host.to_string(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_url_joins_host_and_method() {
        let transport = Transport::new(&settings("http://localhost:8000/")).unwrap();
        assert_eq!(transport.host(), "http://localhost:8000");
        assert_eq!(transport.url("get_session"), "http://localhost:8000/get_session");
    }

    #[test]
    fn test_file_part_builder() {
        let part = FilePart::new(vec![1, 2, 3])
            .with_file_name("avatar.png")
            .with_mime("image/png");
        assert_eq!(part.bytes, vec![1, 2, 3]);
        assert_eq!(part.file_name.as_deref(), Some("avatar.png"));
        assert_eq!(part.mime.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_failure() {
        // Bind then drop to obtain a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = Transport::new(&settings(&format!("http://{}", addr))).unwrap();
        let result = transport
            .call::<_, serde_json::Value>("get_session", &serde_json::json!({}))
            .await
            .expect("refused connection is not a fault");
        assert_eq!(result, Err(ErrorKind::Network));
    }
}
