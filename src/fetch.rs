//! Blocking HTTP access behind a small trait so the collectors and the
//! robots gate can run against canned responses in tests.

use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Status and decoded body of a GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpFetch {
    /// GET `url`. Non-2xx statuses are returned, not raised.
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;

    /// GET `url` and return the body of a 2xx response.
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url)?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            })
        }
    }
}

/// `reqwest` blocking client with a fixed user agent and timeout.
pub struct BlockingFetcher {
    client: Client,
}

impl BlockingFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl HttpFetch for BlockingFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        // Undecodable bytes become U+FFFD.
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned responses keyed by URL; anything else is a 404.
    #[derive(Default)]
    pub struct CannedFetcher {
        pub responses: HashMap<String, HttpResponse>,
        pub requests: RefCell<Vec<String>>,
    }

    impl CannedFetcher {
        pub fn with(mut self, url: &str, response: HttpResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        pub fn request_count(&self, url: &str) -> usize {
            self.requests.borrow().iter().filter(|u| *u == url).count()
        }
    }

    impl HttpFetch for CannedFetcher {
        fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            Ok(self
                .responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| HttpResponse::status(404)))
        }
    }
}
