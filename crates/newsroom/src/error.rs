// ABOUTME: Error types for the newsroom engine including ErrorCode enum and NewsroomError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

use serde::Serialize;

/// Error codes representing different categories of engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidUrl,
    Render,
    ProtectionBypass,
    Extraction,
    PruneVerification,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Render => "render error",
            ErrorCode::ProtectionBypass => "protection bypass failed",
            ErrorCode::Extraction => "extraction error",
            ErrorCode::PruneVerification => "prune verification mismatch",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for discovery and extraction operations.
#[derive(Debug, thiserror::Error)]
pub struct NewsroomError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for NewsroomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "newsroom: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl NewsroomError {
    fn with_code(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Render error.
    pub fn render(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Render, url, op, source)
    }

    /// Create a ProtectionBypass error. Fatal for the URL being processed.
    pub fn protection_bypass(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::ProtectionBypass, url, op, source)
    }

    /// Create an Extraction error.
    pub fn extraction(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Extraction, url, op, source)
    }

    /// Create a PruneVerification error.
    pub fn prune_verification(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::PruneVerification, url, op, source)
    }

    /// Map a renderer failure onto the engine taxonomy.
    pub fn from_render(
        url: impl Into<String>,
        op: impl Into<String>,
        err: crate::discovery::renderer::RenderError,
    ) -> Self {
        let code = if err.is_protection_bypass() {
            ErrorCode::ProtectionBypass
        } else {
            ErrorCode::Render
        };
        Self::with_code(code, url, op, Some(anyhow::Error::new(err)))
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Render error.
    pub fn is_render(&self) -> bool {
        self.code == ErrorCode::Render
    }

    /// Returns true if this is a ProtectionBypass error.
    pub fn is_protection_bypass(&self) -> bool {
        self.code == ErrorCode::ProtectionBypass
    }

    /// Returns true if this is an Extraction error.
    pub fn is_extraction(&self) -> bool {
        self.code == ErrorCode::Extraction
    }

    /// Returns true if this is a PruneVerification error.
    pub fn is_prune_verification(&self) -> bool {
        self.code == ErrorCode::PruneVerification
    }
}
