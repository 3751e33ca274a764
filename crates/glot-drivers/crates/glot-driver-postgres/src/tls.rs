//! TLS connector construction for PostgreSQL connections

use native_tls::{Certificate, Identity, TlsConnector};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::config::SslMode;

use glot_core::{GlotError, Result};

/// libpq-style SSL mode, parsed from the `ssl_mode` connection parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TlsMode {
    Disable,
    Allow,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl TlsMode {
    /// Unknown values fall back to `prefer`, matching the libpq default.
    pub(crate) fn from_param(raw: Option<&str>) -> Self {
        match raw.map(|mode| mode.trim().to_ascii_lowercase()).as_deref() {
            Some("disable") => TlsMode::Disable,
            Some("allow") => TlsMode::Allow,
            Some("require") => TlsMode::Require,
            Some("verify-ca") => TlsMode::VerifyCa,
            Some("verify-full") => TlsMode::VerifyFull,
            _ => TlsMode::Prefer,
        }
    }

    pub(crate) fn uses_tls(self) -> bool {
        self != TlsMode::Disable
    }

    /// Wire-level negotiation mode handed to tokio-postgres.
    pub(crate) fn negotiation(self) -> SslMode {
        match self {
            TlsMode::Disable => SslMode::Disable,
            TlsMode::Allow | TlsMode::Prefer => SslMode::Prefer,
            TlsMode::Require | TlsMode::VerifyCa | TlsMode::VerifyFull => SslMode::Require,
        }
    }
}

/// Build a TLS connector for the requested mode.
///
/// Mirrors libpq semantics: below `verify-ca` the certificate chain is not
/// checked, and below `verify-full` the hostname is not checked.
pub(crate) fn build_tls_connector(
    mode: TlsMode,
    ca_cert_path: Option<&str>,
    client_cert_path: Option<&str>,
    client_key_path: Option<&str>,
) -> Result<MakeTlsConnector> {
    let mut builder = TlsConnector::builder();

    match mode {
        TlsMode::VerifyFull => {}
        TlsMode::VerifyCa => {
            builder.danger_accept_invalid_hostnames(true);
        }
        _ => {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
    }

    if let Some(path) = ca_cert_path {
        let pem = std::fs::read(path).map_err(|e| {
            GlotError::Configuration(format!("Failed to read CA certificate {}: {}", path, e))
        })?;
        let certificate = Certificate::from_pem(&pem).map_err(|e| {
            GlotError::Configuration(format!("Invalid CA certificate {}: {}", path, e))
        })?;
        builder.add_root_certificate(certificate);
    }

    if let (Some(cert_path), Some(key_path)) = (client_cert_path, client_key_path) {
        let cert = std::fs::read(cert_path).map_err(|e| {
            GlotError::Configuration(format!(
                "Failed to read client certificate {}: {}",
                cert_path, e
            ))
        })?;
        let key = std::fs::read(key_path).map_err(|e| {
            GlotError::Configuration(format!("Failed to read client key {}: {}", key_path, e))
        })?;
        let identity = Identity::from_pkcs8(&cert, &key).map_err(|e| {
            GlotError::Configuration(format!("Invalid client certificate pair: {}", e))
        })?;
        builder.identity(identity);
    }

    let connector = builder
        .build()
        .map_err(|e| GlotError::Configuration(format!("Failed to build TLS connector: {}", e)))?;
    Ok(MakeTlsConnector::new(connector))
}
