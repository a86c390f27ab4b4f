//! Validation and canonicalisation of redirect targets.

use url::Url;

/// Errors that can occur while checking a redirect target.
#[derive(Debug, thiserror::Error)]
pub enum TargetUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS targets are allowed")]
    UnsupportedProtocol,

    #[error("Target URL must include a host")]
    MissingHost,

    #[error("Target URL must not embed credentials")]
    EmbeddedCredentials,
}

/// Returns the canonical form of a redirect target.
///
/// # Rules
///
/// 1. **Protocol**: only `http` and `https`
/// 2. **Host**: required, lowercased by the parser
/// 3. **Credentials**: `user:pass@` is rejected
/// 4. **Default ports**: removed (80 for HTTP, 443 for HTTPS)
/// 5. **Path, query, fragment**: preserved
///
/// # Errors
///
/// See [`TargetUrlError`].
pub fn normalize_target(input: &str) -> Result<String, TargetUrlError> {
    let url = Url::parse(input.trim()).map_err(|e| TargetUrlError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TargetUrlError::UnsupportedProtocol);
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(TargetUrlError::MissingHost);
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(TargetUrlError::EmbeddedCredentials);
    }

    // `Url` already drops the scheme's default port during parsing.
    Ok(url.to_string())
}
