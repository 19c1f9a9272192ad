//! Password-protected PKCS#12 bundles.
//!
//! Each bundle holds one certificate and its PKCS#8 private key. Exporting a
//! chain is all-or-nothing: every bundle is staged in a temporary file inside
//! the output directory first, and only then renamed into place. If anything
//! fails, staged files are dropped and already renamed bundles are removed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use p12_keystore::{EncryptionAlgorithm, KeyStore, KeyStoreEntry, MacAlgorithm, PrivateKeyChain};
use sha1::{Digest, Sha1};
use tempfile::NamedTempFile;

use crate::cert::{Certificate, CertificateWithPrivateKey};
use crate::chain::{Chain, IssuedCertificate};
use crate::config::ExportConfig;
use crate::error::{ChainKitError, Result};
use crate::key::KeyPair;

/// File extension of exported bundles.
pub const BUNDLE_EXTENSION: &str = "pfx";

/// An encoded PKCS#12 bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Friendly name stored in the bundle and used as the file stem.
    pub name: String,
    pub der: Vec<u8>,
}

impl Bundle {
    /// Encodes `cert` and `key` under `password`.
    ///
    /// The bags are encrypted with PBES2 (PBKDF2-HMAC-SHA256, AES-256-CBC) and
    /// the bundle is authenticated with HMAC-SHA256, which OpenSSL 3 reads
    /// without the legacy provider.
    pub fn new(name: &str, cert: &Certificate, key: &KeyPair, password: &str) -> Result<Self> {
        let cert_der = cert.to_der()?;
        let key_der = key.to_pkcs8_der()?;
        let local_key_id = Sha1::digest(&cert_der);

        let bag_cert = p12_keystore::Certificate::from_der(&cert_der)
            .map_err(|e| ChainKitError::ExportError(format!("{name} bundle: {e}")))?;
        let key_chain = PrivateKeyChain::new(key_der.as_bytes(), local_key_id, [bag_cert]);

        let mut store = KeyStore::new();
        store.add_entry(name, KeyStoreEntry::PrivateKeyChain(key_chain));
        let der = store
            .writer(password)
            .encryption_algorithm(EncryptionAlgorithm::PbeWithHmacSha256AndAes256)
            .mac_algorithm(MacAlgorithm::HmacSha256)
            .write()
            .map_err(|e| ChainKitError::ExportError(format!("{name} bundle: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            der,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}.{BUNDLE_EXTENSION}", self.name)
    }

    /// Decodes a bundle and returns its certificate and private key.
    ///
    /// Fails when the password is wrong or the bundle does not hold exactly
    /// one certificate and one key.
    pub fn open(der: &[u8], password: &str) -> Result<CertificateWithPrivateKey> {
        let store = KeyStore::from_pkcs12(der, password)
            .map_err(|e| ChainKitError::DecodingError(e.to_string()))?;

        let entries = store.entries().count();
        let Some((_, key_chain)) = store.private_key_chain() else {
            return Err(ChainKitError::DecodingError(
                "bundle holds no private key".to_string(),
            ));
        };
        let ([cert], 1) = (key_chain.chain(), entries) else {
            return Err(ChainKitError::DecodingError(format!(
                "expected one certificate and one key, found {} certificates in {entries} entries",
                key_chain.chain().len()
            )));
        };

        Ok(CertificateWithPrivateKey {
            cert: Certificate::from_der(cert.as_der())?,
            key: KeyPair::from_pkcs8_der(key_chain.key())?,
        })
    }
}

/// Writes chains as one bundle per tier.
#[derive(Debug, Clone)]
pub struct BundleExporter {
    config: ExportConfig,
}

impl BundleExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Encodes one issued certificate, named after its tier.
    pub fn bundle(&self, issued: &IssuedCertificate) -> Result<Bundle> {
        Bundle::new(
            issued.tier().as_str(),
            issued.certificate(),
            issued.key_pair(),
            &self.config.password,
        )
    }

    /// Writes `root.pfx`, `intermediate.pfx` and `leaf.pfx` and returns their
    /// paths. Consumes the chain so no key material outlives the export.
    pub fn export(&self, chain: Chain) -> Result<Vec<PathBuf>> {
        let bundles = chain
            .iter()
            .map(|issued| self.bundle(issued))
            .collect::<Result<Vec<_>>>()?;
        drop(chain);

        self.write_all(&bundles)
    }

    /// Writes `bundles` into the output directory, all or none.
    pub fn write_all(&self, bundles: &[Bundle]) -> Result<Vec<PathBuf>> {
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir)?;

        let staged = bundles
            .iter()
            .map(|bundle| stage(dir, bundle))
            .collect::<Result<Vec<_>>>()?;

        let mut written = Vec::with_capacity(staged.len());
        for (file, bundle) in staged.into_iter().zip(bundles) {
            let path = dir.join(bundle.file_name());
            match file.persist(&path) {
                Ok(_) => {
                    tracing::info!(path = %path.display(), "wrote bundle");
                    written.push(path);
                }
                Err(err) => {
                    // remaining staged files are deleted when dropped
                    remove_written(&written);
                    return Err(ChainKitError::ExportError(format!(
                        "{}: {}",
                        path.display(),
                        err.error
                    )));
                }
            }
        }
        Ok(written)
    }
}

fn stage(dir: &Path, bundle: &Bundle) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&bundle.der)?;
    file.as_file().sync_all()?;
    Ok(file)
}

fn remove_written(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), "failed to remove partial bundle: {err}");
        }
    }
}
