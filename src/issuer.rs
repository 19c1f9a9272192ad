use der::Encode;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;

use crate::cert::Certificate;
use crate::cert::params::{CertificateSpec, DistinguishedName, ExtensionParam, Validity};
use crate::error::ChainKitError;
use crate::key::{KeyPair, PublicKey};
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// This trait provides methods to retrieve issuer details and issue certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// The issuer name as it goes into the issued certificate.
    fn issuer_x509_name(&self) -> Result<Name, ChainKitError> {
        self.issuer_name().as_x509_name()
    }

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Encodes and signs a certificate for `spec`.
    ///
    /// # Arguments
    /// * `spec` - Subject details of the certificate to issue.
    /// * `subject_public_key` - The key the certificate certifies.
    /// * `extensions` - Encoded extensions, already in final order.
    /// * `validity` - The clamped validity window.
    /// * `serial_number` - Big-endian serial number bytes.
    ///
    /// # Returns
    /// The signed certificate. Every failure is reported as a `SigningError`.
    fn issue(
        &self,
        spec: &CertificateSpec,
        subject_public_key: &PublicKey,
        extensions: Vec<ExtensionParam>,
        validity: Validity,
        serial_number: &[u8],
    ) -> Result<Certificate, ChainKitError> {
        let sign = || -> Result<Certificate, ChainKitError> {
            let signature_algo = self.signing_key().signature_algorithm();

            let tbs_cert = TbsCertificate {
                serial_number: serial_number.to_vec(),
                signature_algorithm: signature_algo,
                issuer: self.issuer_x509_name()?,
                validity,
                subject: spec.subject.as_x509_name()?,
                subject_public_key: *subject_public_key,
                extensions,
            };

            let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
            let signature = self.signing_key().sign_data(&tbs_cert_inner.to_der()?)?;

            let cert_inner = CertificateInner {
                tbs_certificate: tbs_cert_inner,
                signature_algorithm: signature_algo.into(),
                signature: der::asn1::BitString::from_bytes(&signature)?,
            };

            Ok(Certificate { inner: cert_inner })
        };

        sign().map_err(|e| match e {
            ChainKitError::SigningError(_) => e,
            other => ChainKitError::SigningError(other.to_string()),
        })
    }
}
