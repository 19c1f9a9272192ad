use std::fmt;
use std::str::FromStr;

use bon::Builder;
use const_oid::ObjectIdentifier;
use time::OffsetDateTime;
use x509_cert::name::RdnSequence;

use super::extensions::ToAndFromX509Extension;
use crate::error::ChainKitError;
use crate::tier::CertificateTier;

/// Declarative input for issuing one certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject.
/// * `tier` - Where the certificate sits in the chain.
/// * `validity` - The desired window, before clamping to the issuer.
/// * `dns_names` - Subject alternative names; only used for leaf certificates.
#[derive(Clone, Debug, Builder)]
pub struct CertificateSpec {
    pub subject: DistinguishedName,
    pub tier: CertificateTier,
    pub validity: Validity,
    #[builder(default)]
    pub dns_names: Vec<String>,
}

/// Distinguished name in RFC 4514 string form, e.g. `CN=Experimental Leaf Node`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistinguishedName(String);

impl DistinguishedName {
    /// Wraps a name without parsing it; [`Self::as_x509_name`] reports bad input.
    pub fn from_rfc4514_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Parses the name into its X.509 form.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName, ChainKitError> {
        RdnSequence::from_str(&self.0)
            .map_err(|e| ChainKitError::InvalidInput(format!("{}: {e}", self.0)))
    }

    /// Renders an X.509 name back into RFC 4514 form.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Self {
        Self(x509dn.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DistinguishedName {
    type Err = ChainKitError;

    /// Accepts any name `x509-cert` can parse, so bad input fails early.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = Self(s.to_string());
        name.as_x509_name()?;
        Ok(name)
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    pub fn new(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Self {
        Self {
            not_before,
            not_after,
        }
    }

    /// Whether `other` lies entirely inside this window, bounds included.
    pub fn contains(&self, other: &Validity) -> bool {
        self.not_before <= other.not_before
            && other.not_before <= other.not_after
            && other.not_after <= self.not_after
    }
}

/// Represents an encoded X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Encodes a typed extension.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: &E,
        critical: bool,
    ) -> Result<Self, ChainKitError> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, ChainKitError> {
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn distinguished_name_round_trips_through_x509() {
        let dn: DistinguishedName = "CN=Experimental Leaf Node".parse().unwrap();
        let x509 = dn.as_x509_name().unwrap();
        assert_eq!(DistinguishedName::from_x509_name(&x509), dn);
    }

    #[test]
    fn malformed_distinguished_name_is_rejected() {
        assert!("no equals sign".parse::<DistinguishedName>().is_err());
    }

    #[test]
    fn validity_containment_includes_bounds() {
        let outer = Validity::new(
            datetime!(2024-01-01 0:00 UTC),
            datetime!(2024-12-31 0:00 UTC),
        );
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&Validity::new(
            datetime!(2023-12-31 0:00 UTC),
            datetime!(2024-06-01 0:00 UTC),
        )));
    }
}
