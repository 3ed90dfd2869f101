//! TLS configuration for client certificate authentication
//!
//! The server requests a client certificate signed by a trusted CA but does
//! not require one: connections without a certificate complete the handshake
//! and are rejected later by authentication with a proper error.

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use thiserror::Error;
use tracing::warn;

use crate::config::{AccessConfig, ENV_CLIENT_CA_FILE};

#[derive(Error, Debug)]
pub enum TlsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),
    #[error("No certificates found in file")]
    NoCertificates,
    #[error("No private key found in file")]
    NoPrivateKey,
    #[error("Client verifier error: {0}")]
    Verifier(String),
    #[error("No client CA configured ({0} is not set)")]
    NoClientCa(&'static str),
}

fn provider() -> Arc<CryptoProvider> {
    Arc::new(ring::default_provider())
}

fn parse_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut BufReader::new(pem))
        .filter_map(|r| r.ok())
        .collect();

    if certs.is_empty() {
        return Err(TlsError::NoCertificates);
    }
    Ok(certs)
}

fn parse_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut BufReader::new(pem))?.ok_or(TlsError::NoPrivateKey)
}

fn root_store(ca_certs: Vec<CertificateDer<'static>>) -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    for ca_cert in ca_certs {
        if let Err(e) = root_store.add(ca_cert) {
            warn!("Failed to add CA cert to root store: {}", e);
        }
    }
    root_store
}

/// Server side TLS configuration requesting client certificates
#[derive(Clone)]
pub struct ClientCertTlsConfig {
    server_config: Arc<ServerConfig>,
}

impl ClientCertTlsConfig {
    /// Create server TLS config from certificate, key, and client CA files
    pub async fn from_files(cert_path: &Path, key_path: &Path, client_ca_path: &Path) -> Result<Self, TlsError> {
        let cert_data = tokio::fs::read(cert_path).await?;
        let key_data = tokio::fs::read(key_path).await?;
        let ca_data = tokio::fs::read(client_ca_path).await?;

        Self::from_pem(&cert_data, &key_data, &ca_data)
    }

    /// Create server TLS config verifying clients against the configured CA
    pub async fn from_config(config: &AccessConfig, cert_path: &Path, key_path: &Path) -> Result<Self, TlsError> {
        let ca_path = config
            .client_ca_file
            .as_deref()
            .ok_or(TlsError::NoClientCa(ENV_CLIENT_CA_FILE))?;
        Self::from_files(cert_path, key_path, ca_path).await
    }

    /// Create server TLS config from PEM-encoded data
    ///
    /// Client certificates are verified against `client_ca_pem`.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8], client_ca_pem: &[u8]) -> Result<Self, TlsError> {
        let certs = parse_certs(cert_pem)?;
        let key = parse_key(key_pem)?;
        let roots = root_store(parse_certs(client_ca_pem)?);

        let client_verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider())
            .allow_unauthenticated()
            .build()
            .map_err(|e| TlsError::Verifier(e.to_string()))?;

        let server_config = ServerConfig::builder_with_provider(provider())
            .with_safe_default_protocol_versions()?
            .with_client_cert_verifier(client_verifier)
            .with_single_cert(certs, key)?;

        Ok(Self {
            server_config: Arc::new(server_config),
        })
    }

    /// Get the server TLS config
    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

/// Client TLS configuration trusting `server_ca_pem`
///
/// With `identity` (certificate and key PEM) the client presents a
/// certificate; without it the connection is anonymous.
pub fn client_config(server_ca_pem: &[u8], identity: Option<(&[u8], &[u8])>) -> Result<Arc<ClientConfig>, TlsError> {
    let roots = root_store(parse_certs(server_ca_pem)?);
    let builder = ClientConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots);

    let config = match identity {
        Some((cert_pem, key_pem)) => builder.with_client_auth_cert(parse_certs(cert_pem)?, parse_key(key_pem)?)?,
        None => builder.with_no_client_auth(),
    };
    Ok(Arc::new(config))
}
