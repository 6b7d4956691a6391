use crate::configuration::HttpSettings;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::time::Duration;

/// The closed set of methods the client can issue. Selection in the UI
/// cycles through these, so an unsupported method is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }

    /// The next method in the cycle. With two entries this is a toggle.
    pub fn next(&self) -> Self {
        match self {
            Method::Get => Method::Post,
            Method::Post => Method::Get,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("failed to send request: {0}")]
    Transport(String),
    #[error("failed to read response: {0}")]
    Read(String),
}

/// The outcome of one dispatched request. At most one of these is ever
/// produced per tag; a stale tag means the result gets dropped unread.
#[derive(Debug, Clone)]
pub struct RequestResult {
    pub tag: u64,
    pub body: String,
    pub error: Option<RequestError>,
}

impl RequestResult {
    pub fn ok(tag: u64, body: String) -> Self {
        Self {
            tag,
            body,
            error: None,
        }
    }

    pub fn err(tag: u64, error: RequestError) -> Self {
        Self {
            tag,
            body: String::new(),
            error: Some(error),
        }
    }
}

/// The transport seam. The real implementation wraps reqwest; tests swap
/// in stubs with scripted replies.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        method: Method,
        url: &str,
        body: &str,
    ) -> impl Future<Output = Result<String, RequestError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn build(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &str, body: &str) -> Result<String, RequestError> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_owned()),
        };
        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| RequestError::Read(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_cycle_covers_both_values() {
        assert_eq!(Method::Get.next(), Method::Post);
        assert_eq!(Method::Post.next(), Method::Get);
        assert_eq!(Method::default(), Method::Get);
    }

    #[test]
    fn request_error_messages_carry_the_cause() {
        let err = RequestError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "failed to send request: connection refused");
        let err = RequestError::Read("unexpected eof".into());
        assert_eq!(err.to_string(), "failed to read response: unexpected eof");
    }
}
