use crate::config::Options;
use crate::error::reqwest::WrappedReqwestError;
use crate::error::transport::BuildTransportError;
use crate::error::transport::BuildTransportError::{
    ParseCaCertificateFailed, ParseClientIdentityFailed, ReadCaCertificateFailed,
    ReadClientIdentityFailed,
};
use reqwest::blocking::ClientBuilder;
use reqwest::{Certificate, Identity};
use std::path::Path;

/// TLS material layered onto reqwest's default rustls configuration.
pub struct TlsSettings {
    /// Replaces the built-in roots when present.
    pub root_certificate: Option<Certificate>,
    pub identity: Option<Identity>,
    pub skip_verify: bool,
}

impl TlsSettings {
    /// Returns `None` when nothing beyond the platform defaults is configured.
    pub fn from_options(options: &Options) -> Result<Option<Self>, BuildTransportError> {
        let root_certificate = match &options.tls.ca {
            Some(path) => Some(load_ca_certificate(path)?),
            None => None,
        };

        let identity = match (&options.tls.cert, &options.tls.key) {
            (Some(cert), Some(key)) => Some(load_client_identity(cert, key)?),
            _ => None,
        };

        if root_certificate.is_none() && identity.is_none() && !options.skip_ssl_verify {
            return Ok(None);
        }

        Ok(Some(TlsSettings {
            root_certificate,
            identity,
            skip_verify: options.skip_ssl_verify,
        }))
    }

    pub fn apply(self, mut builder: ClientBuilder) -> ClientBuilder {
        if let Some(certificate) = self.root_certificate {
            builder = builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(certificate);
        }
        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }
        builder.danger_accept_invalid_certs(self.skip_verify)
    }
}

fn load_ca_certificate(path: &Path) -> Result<Certificate, BuildTransportError> {
    let pem = std::fs::read(path).map_err(|err| ReadCaCertificateFailed(path.to_path_buf(), err))?;
    Certificate::from_pem(&pem)
        .map_err(|err| ParseCaCertificateFailed(path.to_path_buf(), WrappedReqwestError(err)))
}

fn load_client_identity(cert: &Path, key: &Path) -> Result<Identity, BuildTransportError> {
    let read = |path: &Path| {
        std::fs::read(path).map_err(|source| ReadClientIdentityFailed {
            cert: cert.to_path_buf(),
            key: key.to_path_buf(),
            source,
        })
    };
    let mut pem = read(key)?;
    pem.push(b'\n');
    pem.extend(read(cert)?);

    Identity::from_pem(&pem).map_err(|err| ParseClientIdentityFailed {
        cert: cert.to_path_buf(),
        key: key.to_path_buf(),
        source: WrappedReqwestError(err),
    })
}
