//! Root -> intermediate -> leaf chain construction.
//!
//! [`ChainBuilder::build`] runs three [`ChainBuilder::issue_tier`] steps in
//! order, each taking the previous step's certificate as its issuer. The first
//! failure aborts the chain and nothing from it is returned.

use time::OffsetDateTime;

use crate::cert::extensions::SubjectKeyIdentifier;
use crate::cert::params::{CertificateSpec, DistinguishedName, Validity};
use crate::cert::{Certificate, CertificateWithPrivateKey, SelfIssuer};
use crate::clock::{Clock, SystemClock};
use crate::config::ChainConfig;
use crate::error::{ChainConstructionError, ChainKitError};
use crate::issuer::Issuer;
use crate::key::{KeyPair, KeyProvider, OsKeyProvider};
use crate::policy;
use crate::serial::{Serial, SerialNumberGenerator, TimeSerialGenerator};
use crate::tier::CertificateTier;
use crate::validity;

/// A signed certificate of one tier, still holding its private key.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    tier: CertificateTier,
    signer: CertificateWithPrivateKey,
    validity: Validity,
    serial: Serial,
    subject_key_id: SubjectKeyIdentifier,
}

impl IssuedCertificate {
    pub fn tier(&self) -> CertificateTier {
        self.tier
    }

    pub fn certificate(&self) -> &Certificate {
        &self.signer.cert
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.signer.key
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn serial(&self) -> Serial {
        self.serial
    }

    pub fn subject_key_identifier(&self) -> &SubjectKeyIdentifier {
        &self.subject_key_id
    }

    /// Gives up the certificate and its key, e.g. to hand them to an exporter.
    pub fn into_parts(self) -> CertificateWithPrivateKey {
        self.signer
    }
}

/// The signer of the next tier is the full certificate + key pair.
impl Issuer for IssuedCertificate {
    fn issuer_name(&self) -> DistinguishedName {
        self.signer.issuer_name()
    }

    fn issuer_x509_name(&self) -> Result<x509_cert::name::Name, ChainKitError> {
        self.signer.issuer_x509_name()
    }

    fn signing_key(&self) -> &KeyPair {
        self.signer.signing_key()
    }
}

/// A complete three-tier chain.
#[derive(Debug, Clone)]
pub struct Chain {
    pub root: IssuedCertificate,
    pub intermediate: IssuedCertificate,
    pub leaf: IssuedCertificate,
}

impl Chain {
    /// The certificates in issuance order.
    pub fn iter(&self) -> impl Iterator<Item = &IssuedCertificate> {
        [&self.root, &self.intermediate, &self.leaf].into_iter()
    }
}

/// Issues a root, an intermediate signed by it, and a leaf signed by the
/// intermediate.
///
/// # Example
/// ```rust,no_run
/// use chainkit::chain::ChainBuilder;
/// use chainkit::config::ChainConfig;
///
/// # fn main() -> Result<(), chainkit::error::ChainConstructionError> {
/// let chain = ChainBuilder::new(ChainConfig::default()).build()?;
/// assert!(chain.root.validity().contains(chain.intermediate.validity()));
/// # Ok(())
/// # }
/// ```
pub struct ChainBuilder {
    config: ChainConfig,
    clock: Box<dyn Clock>,
    keys: Box<dyn KeyProvider>,
    serials: Box<dyn SerialNumberGenerator>,
}

impl ChainBuilder {
    /// System clock, OS random keys and time-derived serials.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            clock: Box::new(SystemClock),
            keys: Box::new(OsKeyProvider),
            serials: Box::new(TimeSerialGenerator::new()),
        }
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn key_provider(mut self, keys: impl KeyProvider + 'static) -> Self {
        self.keys = Box::new(keys);
        self
    }

    pub fn serial_numbers(mut self, serials: impl SerialNumberGenerator + 'static) -> Self {
        self.serials = Box::new(serials);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Builds the whole chain.
    ///
    /// Every tier's desired window is taken relative to the same `now`,
    /// truncated to whole seconds since certificates cannot carry more.
    pub fn build(mut self) -> Result<Chain, ChainConstructionError> {
        let now = whole_seconds(self.clock.now());

        let spec = self.config.spec_for(CertificateTier::Root, now);
        let root = self.issue_tier(spec, None)?;

        let spec = self.config.spec_for(CertificateTier::Intermediate, now);
        let intermediate = self.issue_tier(spec, Some(&root))?;

        let spec = self.config.spec_for(CertificateTier::Leaf, now);
        let leaf = self.issue_tier(spec, Some(&intermediate))?;

        Ok(Chain {
            root,
            intermediate,
            leaf,
        })
    }

    /// Issues one certificate.
    ///
    /// `issuer` must be `None` exactly when `spec.tier` is the root.
    pub fn issue_tier(
        &mut self,
        spec: CertificateSpec,
        issuer: Option<&IssuedCertificate>,
    ) -> Result<IssuedCertificate, ChainConstructionError> {
        let tier = spec.tier;
        self.issue(spec, issuer)
            .map_err(|source| ChainConstructionError::new(tier, source))
    }

    fn issue(
        &mut self,
        spec: CertificateSpec,
        issuer: Option<&IssuedCertificate>,
    ) -> Result<IssuedCertificate, ChainKitError> {
        let tier = spec.tier;
        let expected = tier.issuer_tier();
        if issuer.map(IssuedCertificate::tier) != expected {
            return Err(ChainKitError::InvalidInput(format!(
                "{tier} certificate needs issuer {expected:?}, got {:?}",
                issuer.map(IssuedCertificate::tier)
            )));
        }

        let key = self.keys.generate_key_pair(self.config.curve)?;
        let public_key = key.public_key();

        let extensions = policy::extensions_for(
            tier,
            &public_key,
            issuer.map(IssuedCertificate::subject_key_identifier),
            &spec.dns_names,
        );
        let window = validity::clamp(&spec.validity, issuer.map(IssuedCertificate::validity))?;
        let serial = self.serials.next(self.clock.now());
        tracing::debug!(
            %tier,
            not_before = %window.not_before,
            not_after = %window.not_after,
            %serial,
            "computed certificate fields"
        );

        let encoded = policy::encode(&extensions)
            .map_err(|e| ChainKitError::SigningError(e.to_string()))?;
        let cert = match issuer {
            None => {
                let self_issuer = SelfIssuer {
                    name: spec.subject.clone(),
                    key: &key,
                };
                self_issuer.issue(&spec, &public_key, encoded, window, serial.as_bytes())?
            }
            Some(issuer) => issuer.issue(&spec, &public_key, encoded, window, serial.as_bytes())?,
        };
        tracing::info!(%tier, subject = %spec.subject, %serial, "issued certificate");

        Ok(IssuedCertificate {
            tier,
            signer: CertificateWithPrivateKey { cert, key },
            validity: window,
            serial,
            subject_key_id: SubjectKeyIdentifier::from_public_key(&public_key),
        })
    }
}

fn whole_seconds(now: OffsetDateTime) -> OffsetDateTime {
    now - time::Duration::nanoseconds(i64::from(now.nanosecond()))
}
