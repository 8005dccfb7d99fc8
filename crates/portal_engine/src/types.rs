use std::fmt;

use thiserror::Error;

/// Failure of a single API call. Messages follow the `METHOD url: status` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{method} {url}: {status}")]
    HttpStatus {
        method: Method,
        status: u16,
        url: String,
        /// Response body, when the server sent one.
        body: Option<String>,
    },
    #[error("{method} {url}: timed out")]
    Timeout { method: Method, url: String },
    #[error("{method} {url}: response larger than {max_bytes} bytes")]
    TooLarge {
        method: Method,
        url: String,
        max_bytes: u64,
    },
    #[error("{method} {url}: {reason}")]
    Network {
        method: Method,
        url: String,
        reason: String,
    },
    #[error("{url}: could not encode request body: {reason}")]
    Encode { url: String, reason: String },
    #[error("{url}: unexpected response body: {reason}")]
    Decode { url: String, reason: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}
