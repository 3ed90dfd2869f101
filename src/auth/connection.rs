//! Connection properties used for authentication

use rustls::pki_types::CertificateDer;

/// Protocol a client connected with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// PostgreSQL wire protocol
    Postgres,
    /// HTTP endpoint
    Http,
    /// Node-to-node transport
    Transport,
}

impl Protocol {
    /// Whether an empty user name means "take it from the certificate"
    pub fn allows_empty_user(&self) -> bool {
        matches!(self, Protocol::Http)
    }
}

/// Certificate presented by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCertificate {
    X509(CertificateDer<'static>),
    /// RFC 7250 raw public key; carries no subject
    RawPublicKey(Vec<u8>),
}

/// What is known about a connection before authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProperties {
    pub has_ssl: bool,
    pub client_cert: Option<ClientCertificate>,
    pub protocol: Protocol,
}

impl ConnectionProperties {
    /// Unencrypted connection
    pub fn plain(protocol: Protocol) -> Self {
        ConnectionProperties {
            has_ssl: false,
            client_cert: None,
            protocol,
        }
    }

    /// TLS connection presenting `cert`
    pub fn with_certificate(cert: CertificateDer<'static>, protocol: Protocol) -> Self {
        ConnectionProperties {
            has_ssl: true,
            client_cert: Some(ClientCertificate::X509(cert)),
            protocol,
        }
    }

    /// Properties of an accepted TLS connection
    ///
    /// The end-entity certificate is the first one of the peer's chain.
    pub fn from_tls_stream<IO>(stream: &tokio_rustls::server::TlsStream<IO>, protocol: Protocol) -> Self {
        let (_, connection) = stream.get_ref();
        let client_cert = connection
            .peer_certificates()
            .and_then(|chain| chain.first())
            .map(|cert| ClientCertificate::X509(cert.clone().into_owned()));

        ConnectionProperties {
            has_ssl: true,
            client_cert,
            protocol,
        }
    }
}
