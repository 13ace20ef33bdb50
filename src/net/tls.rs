//! TLS credential pairing and certificate loading.

use std::io;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

use crate::error::ServerError;

/// Certificate and private key paths (PEM).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsPaths {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }

    /// Both-or-neither check.
    ///
    /// Returns `Ok(true)` when TLS is configured, `Ok(false)` when neither path
    /// is set and `InvalidCertOrKey` when exactly one of them is.
    pub fn validate(&self) -> Result<bool, ServerError> {
        let has_cert = !self.cert.as_os_str().is_empty();
        let has_key = !self.key.as_os_str().is_empty();
        match (has_cert, has_key) {
            (true, true) => Ok(true),
            (false, false) => Ok(false),
            _ => Err(ServerError::InvalidCertOrKey),
        }
    }
}

/// Load TLS configuration from certificate and key files.
///
/// The resulting config advertises `h2` and `http/1.1` over ALPN.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, ServerError> {
    if !cert_path.exists() {
        return Err(ServerError::Tls(io::Error::new(
            io::ErrorKind::NotFound,
            format!("certificate file not found: {:?}", cert_path),
        )));
    }
    if !key_path.exists() {
        return Err(ServerError::Tls(io::Error::new(
            io::ErrorKind::NotFound,
            format!("private key file not found: {:?}", key_path),
        )));
    }

    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(ServerError::Tls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_rules() {
        assert!(!TlsPaths::default().validate().unwrap());
        assert!(TlsPaths::new("a.pem", "b.pem").validate().unwrap());
        assert!(TlsPaths::new("a.pem", "").validate().unwrap_err().is_config_error());
        assert!(TlsPaths::new("", "b.pem").validate().unwrap_err().is_config_error());
    }

    #[tokio::test]
    async fn missing_files_are_tls_errors() {
        let err = load_tls_config(Path::new("/nonexistent/cert.pem"), Path::new("/nonexistent/key.pem"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Tls(e) if e.kind() == io::ErrorKind::NotFound));
    }
}
