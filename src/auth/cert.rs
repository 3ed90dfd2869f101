//! Client certificate authentication
//!
//! A client authenticates as the user named by the Common Name of its
//! certificate's subject. The requested user name must match the CN exactly
//! and the user must exist.

use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use tracing::{debug, warn};

use crate::error::{AccessError, AccessResult};
use crate::user::User;

use super::connection::{ClientCertificate, ConnectionProperties};
use super::{AuthenticationMethod, UserLookup};

pub const CLIENT_CERT_METHOD: &str = "cert";

/// Authenticates users by the CN of their client certificate
pub struct ClientCertAuth {
    users: Arc<dyn UserLookup>,
}

impl ClientCertAuth {
    pub fn new(users: Arc<dyn UserLookup>) -> Self {
        ClientCertAuth { users }
    }
}

impl AuthenticationMethod for ClientCertAuth {
    fn name(&self) -> &'static str {
        CLIENT_CERT_METHOD
    }

    fn authenticate(&self, user_name: &str, connection: &ConnectionProperties) -> AccessResult<Arc<User>> {
        let fail = || AccessError::authentication_failed(user_name);

        if !connection.has_ssl {
            debug!(user = %user_name, "Client certificate auth without TLS");
            return Err(fail());
        }
        let cert = match &connection.client_cert {
            Some(ClientCertificate::X509(cert)) => cert,
            Some(ClientCertificate::RawPublicKey(_)) => {
                debug!(user = %user_name, "Raw public key cannot identify a user");
                return Err(fail());
            }
            None => {
                debug!(user = %user_name, "No client certificate presented");
                return Err(fail());
            }
        };

        let cn = common_name(cert).ok_or_else(fail)?;
        let user_name = if user_name.is_empty() && connection.protocol.allows_empty_user() {
            cn.as_str()
        } else {
            user_name
        };

        if user_name != cn {
            debug!(user = %user_name, cn = %cn, "Certificate CN does not match user");
            return Err(AccessError::authentication_failed(user_name));
        }

        match self.users.find_user(user_name) {
            Some(user) => {
                debug!(user = %user_name, "Authenticated by client certificate");
                Ok(user)
            }
            None => {
                debug!(user = %user_name, "Unknown user");
                Err(AccessError::authentication_failed(user_name))
            }
        }
    }
}

/// First CN attribute of the certificate subject, in DER order
pub fn common_name(cert: &CertificateDer<'_>) -> Option<String> {
    let (_, certificate) = match x509_parser::parse_x509_certificate(cert.as_ref()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to decode client certificate: {}", e);
            return None;
        }
    };
    let attribute = certificate.subject().iter_common_name().next()?;
    match attribute.as_str() {
        Ok(cn) => Some(cn.to_string()),
        Err(e) => {
            warn!("Client certificate CN is not a string: {}", e);
            None
        }
    }
}
