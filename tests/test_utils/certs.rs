//! TLS certificate generation for tests using rcgen

use std::path::PathBuf;

use rcgen::{BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair};
use roodb_access::tls::ClientCertTlsConfig;
use tempfile::TempDir;

/// Certificate and private key, PEM encoded
pub struct PemPair {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Test CA with a server certificate for `localhost`
pub struct TestPki {
    ca_cert: Certificate,
    ca_key: KeyPair,
    pub server: PemPair,
}

fn params_with_cn(sans: Vec<String>, common_name: &str) -> CertificateParams {
    let mut params = CertificateParams::new(sans).expect("Failed to create certificate params");
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params
}

impl TestPki {
    /// Generate a CA and a server certificate signed by it
    pub fn generate() -> Self {
        let ca_key = KeyPair::generate().expect("Failed to generate CA key");
        let mut ca_params = params_with_cn(Vec::new(), "RooDB Test CA");
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let ca_cert = ca_params.self_signed(&ca_key).expect("Failed to self-sign CA");

        let mut pki = TestPki {
            ca_cert,
            ca_key,
            server: PemPair {
                cert_pem: String::new(),
                key_pem: String::new(),
            },
        };
        pki.server = pki.issue(vec!["localhost".to_string()], "localhost");
        pki
    }

    pub fn ca_pem(&self) -> String {
        self.ca_cert.pem()
    }

    /// Client certificate with the given subject CN, signed by the test CA
    pub fn client(&self, common_name: &str) -> PemPair {
        self.issue(vec![format!("{}.clients.test", common_name)], common_name)
    }

    fn issue(&self, sans: Vec<String>, common_name: &str) -> PemPair {
        let key = KeyPair::generate().expect("Failed to generate key");
        let cert = params_with_cn(sans, common_name)
            .signed_by(&key, &self.ca_cert, &self.ca_key)
            .expect("Failed to sign certificate");
        PemPair {
            cert_pem: cert.pem(),
            key_pem: key.serialize_pem(),
        }
    }

    /// Server TLS config verifying clients against the test CA
    pub fn server_tls_config(&self) -> ClientCertTlsConfig {
        ClientCertTlsConfig::from_pem(
            self.server.cert_pem.as_bytes(),
            self.server.key_pem.as_bytes(),
            self.ca_pem().as_bytes(),
        )
        .expect("Failed to build server TLS config")
    }
}

/// Self-signed certificate not issued by the test CA
pub fn self_signed(common_name: &str) -> PemPair {
    let key = KeyPair::generate().expect("Failed to generate key");
    let cert = params_with_cn(vec![format!("{}.clients.test", common_name)], common_name)
        .self_signed(&key)
        .expect("Failed to self-sign certificate");
    PemPair {
        cert_pem: cert.pem(),
        key_pem: key.serialize_pem(),
    }
}

/// TLS certificate files written to disk
pub struct TlsCertFiles {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub ca_path: PathBuf,
    pub _cert_dir: TempDir,
}

/// Write the server certificate, key and CA to temporary files
pub fn write_test_cert_files(pki: &TestPki) -> TlsCertFiles {
    let cert_dir = TempDir::new().expect("Failed to create cert temp dir");
    let cert_path = cert_dir.path().join("server.crt");
    let key_path = cert_dir.path().join("server.key");
    let ca_path = cert_dir.path().join("ca.crt");

    std::fs::write(&cert_path, &pki.server.cert_pem).expect("Failed to write cert");
    std::fs::write(&key_path, &pki.server.key_pem).expect("Failed to write key");
    std::fs::write(&ca_path, pki.ca_pem()).expect("Failed to write CA");

    TlsCertFiles {
        cert_path,
        key_path,
        ca_path,
        _cert_dir: cert_dir,
    }
}
