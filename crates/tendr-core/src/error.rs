//! Error types for the tendr-core library.
//!
//! Extraction and comparison never fail: these errors only surface at the
//! I/O seams (files, PDFs, configuration) and at the hosted completion
//! boundary, where the analyzer converts them into a fallback run.

use thiserror::Error;

/// Main error type for the tendr library.
#[derive(Error, Debug)]
pub enum TendrError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Hosted completion service error.
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text loading.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Failures reported by a hosted completion service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Usage quota or prepaid credit exhausted.
    #[error("quota or credit exceeded: {0}")]
    QuotaExceeded(String),

    /// API key missing, revoked or rejected.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The service answered, but not with the expected JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No service is configured.
    #[error("completion service unavailable")]
    Unavailable,

    /// Any other failure (network, timeout, server error).
    #[error("completion failed: {0}")]
    Failed(String),
}

impl CompletionError {
    /// Map a raw provider error message onto the taxonomy.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("quota")
            || lower.contains("credit")
            || lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("insufficient_quota")
        {
            Self::QuotaExceeded(message.to_string())
        } else if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("api_key")
            || lower.contains("unauthorized")
            || lower.contains("authentication")
        {
            Self::InvalidCredentials(message.to_string())
        } else if lower.contains("json") || lower.contains("parse") || lower.contains("malformed") {
            Self::MalformedResponse(message.to_string())
        } else {
            Self::Failed(message.to_string())
        }
    }
}

/// Result type for the tendr library.
pub type Result<T> = std::result::Result<T, TendrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_quota() {
        assert!(matches!(
            CompletionError::classify("Error 429: You exceeded your current quota"),
            CompletionError::QuotaExceeded(_)
        ));
        assert!(matches!(
            CompletionError::classify("Your credit balance is too low"),
            CompletionError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_classify_credentials() {
        assert!(matches!(
            CompletionError::classify("401 Unauthorized: invalid API key"),
            CompletionError::InvalidCredentials(_)
        ));
    }

    #[test]
    fn test_classify_other() {
        assert!(matches!(
            CompletionError::classify("Unexpected token < in JSON at position 0"),
            CompletionError::MalformedResponse(_)
        ));
        assert!(matches!(
            CompletionError::classify("connection reset by peer"),
            CompletionError::Failed(_)
        ));
    }
}
