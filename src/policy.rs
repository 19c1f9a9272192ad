//! Per-tier extension policy.
//!
//! [`extensions_for`] is a pure function of its inputs: no clock, no
//! randomness, so calling it twice yields identical records and encodings.

use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage,
    KeyUsages, SubjectAltName, SubjectKeyIdentifier, ToAndFromX509Extension,
};
use crate::cert::params::ExtensionParam;
use crate::error::Result;
use crate::key::PublicKey;
use crate::tier::CertificateTier;

/// A typed extension value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
    BasicConstraints(BasicConstraints),
    KeyUsage(KeyUsage),
    SubjectKeyIdentifier(SubjectKeyIdentifier),
    AuthorityKeyIdentifier(AuthorityKeyIdentifier),
    SubjectAltName(SubjectAltName),
    ExtendedKeyUsage(ExtendedKeyUsage),
}

/// One entry of an [`ExtensionSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRecord {
    pub extension: Extension,
    pub critical: bool,
}

impl ExtensionRecord {
    fn new(extension: Extension, critical: bool) -> Self {
        Self {
            extension,
            critical,
        }
    }

    /// DER-encodes the record.
    pub fn to_param(&self) -> Result<ExtensionParam> {
        match &self.extension {
            Extension::BasicConstraints(ext) => ExtensionParam::from_extension(ext, self.critical),
            Extension::KeyUsage(ext) => ExtensionParam::from_extension(ext, self.critical),
            Extension::SubjectKeyIdentifier(ext) => {
                ExtensionParam::from_extension(ext, self.critical)
            }
            Extension::AuthorityKeyIdentifier(ext) => {
                ExtensionParam::from_extension(ext, self.critical)
            }
            Extension::SubjectAltName(ext) => ExtensionParam::from_extension(ext, self.critical),
            Extension::ExtendedKeyUsage(ext) => ExtensionParam::from_extension(ext, self.critical),
        }
    }

    pub fn oid(&self) -> const_oid::ObjectIdentifier {
        match &self.extension {
            Extension::BasicConstraints(_) => BasicConstraints::OID,
            Extension::KeyUsage(_) => KeyUsage::OID,
            Extension::SubjectKeyIdentifier(_) => SubjectKeyIdentifier::OID,
            Extension::AuthorityKeyIdentifier(_) => AuthorityKeyIdentifier::OID,
            Extension::SubjectAltName(_) => SubjectAltName::OID,
            Extension::ExtendedKeyUsage(_) => ExtendedKeyUsage::OID,
        }
    }
}

/// Ordered extensions for one certificate.
pub type ExtensionSet = Vec<ExtensionRecord>;

/// Encodes every record of `set`, keeping order.
pub fn encode(set: &[ExtensionRecord]) -> Result<Vec<ExtensionParam>> {
    set.iter().map(ExtensionRecord::to_param).collect()
}

/// Builds the extension set for a certificate of `tier`.
///
/// # Arguments
/// * `tier` - The certificate's position in the chain.
/// * `public_key` - The certificate's own public key, hashed into its SKI.
/// * `issuer_key_id` - The issuer's subject key identifier. Ignored for the root.
/// * `dns_names` - Subject alternative names. Only used for the leaf.
pub fn extensions_for(
    tier: CertificateTier,
    public_key: &PublicKey,
    issuer_key_id: Option<&SubjectKeyIdentifier>,
    dns_names: &[String],
) -> ExtensionSet {
    let subject_key_id = ExtensionRecord::new(
        Extension::SubjectKeyIdentifier(SubjectKeyIdentifier::from_public_key(public_key)),
        false,
    );
    let authority_key_id = issuer_key_id.map(|issuer| {
        ExtensionRecord::new(
            Extension::AuthorityKeyIdentifier(AuthorityKeyIdentifier {
                key_identifier: issuer.0.clone(),
            }),
            false,
        )
    });

    match tier {
        CertificateTier::Root => vec![basic_constraints(tier), subject_key_id],
        CertificateTier::Intermediate => {
            let mut set = vec![
                key_usage(KeyUsages::KeyCertSign | KeyUsages::CRLSign),
                basic_constraints(tier),
                subject_key_id,
            ];
            set.extend(authority_key_id);
            set
        }
        CertificateTier::Leaf => {
            let mut set = vec![
                key_usage(
                    KeyUsages::KeyEncipherment
                        | KeyUsages::DataEncipherment
                        | KeyUsages::DigitalSignature
                        | KeyUsages::NonRepudiation,
                ),
                basic_constraints(tier),
                subject_key_id,
            ];
            set.extend(authority_key_id);
            set.push(ExtensionRecord::new(
                Extension::SubjectAltName(SubjectAltName {
                    names: dns_names.to_vec(),
                }),
                false,
            ));
            set.push(ExtensionRecord::new(
                Extension::ExtendedKeyUsage(ExtendedKeyUsage {
                    usage: vec![
                        ExtendedKeyUsageOption::ClientAuth,
                        ExtendedKeyUsageOption::ServerAuth,
                    ],
                }),
                false,
            ));
            set
        }
    }
}

/// CA tiers get the CA flag; only the intermediate is limited to signing
/// end entities (path length 0).
fn basic_constraints(tier: CertificateTier) -> ExtensionRecord {
    ExtensionRecord::new(
        Extension::BasicConstraints(BasicConstraints {
            is_ca: tier.is_ca(),
            has_path_length_constraint: tier == CertificateTier::Intermediate,
            path_length: 0,
        }),
        true,
    )
}

fn key_usage(flags: impl Into<der::flagset::FlagSet<KeyUsages>>) -> ExtensionRecord {
    ExtensionRecord::new(Extension::KeyUsage(KeyUsage(flags.into())), true)
}
