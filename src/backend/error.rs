#![cfg(feature = "server")]
use thiserror::Error;

/// Longest body excerpt kept in an error message.
pub const BODY_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request failed: {status} {status_text}{}", body_suffix(.body))]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Invalid JSON from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
        snippet: String,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            FetchError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            FetchError::Parse { .. } => None,
        }
    }

    /// What the server sent back, when there is something worth showing.
    pub fn body_excerpt(&self) -> Option<&str> {
        match self {
            FetchError::Http { body, .. } if !body.is_empty() => Some(body),
            FetchError::Parse { snippet, .. } => Some(snippet),
            _ => None,
        }
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {body}")
    }
}

pub fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}
