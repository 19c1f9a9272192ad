use std::fmt;
use std::str::FromStr;

use der::Encode;
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey};
use pkcs8::SecretDocument;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::error::{ChainKitError, Result};

/// Named elliptic curves a key pair can be generated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedCurve {
    /// NIST P-256 (secp256r1).
    P256,
    /// NIST P-384 (secp384r1).
    P384,
}

impl fmt::Display for NamedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedCurve::P256 => write!(f, "nistP256"),
            NamedCurve::P384 => write!(f, "nistP384"),
        }
    }
}

impl FromStr for NamedCurve {
    type Err = ChainKitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p256" | "p-256" | "nistp256" | "prime256v1" | "secp256r1" => Ok(NamedCurve::P256),
            "p384" | "p-384" | "nistp384" | "secp384r1" => Ok(NamedCurve::P384),
            other => Err(ChainKitError::KeyGenerationError(format!(
                "unsupported curve: {other}"
            ))),
        }
    }
}

/// An ECDSA key pair on one of the supported named curves.
///
/// The signing keys zeroize their secret scalar when dropped.
#[derive(Clone)]
pub enum KeyPair {
    EcdsaP256 { signing_key: p256::ecdsa::SigningKey },
    EcdsaP384 { signing_key: p384::ecdsa::SigningKey },
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("curve", &self.curve())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let mut rng = rand_core::OsRng;
        KeyPair::EcdsaP256 {
            signing_key: p256::ecdsa::SigningKey::random(&mut rng),
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let mut rng = rand_core::OsRng;
        KeyPair::EcdsaP384 {
            signing_key: p384::ecdsa::SigningKey::random(&mut rng),
        }
    }

    pub fn curve(&self) -> NamedCurve {
        match self {
            KeyPair::EcdsaP256 { .. } => NamedCurve::P256,
            KeyPair::EcdsaP384 { .. } => NamedCurve::P384,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_key_pair(self)
    }

    /// Signature algorithm matching the key's curve.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::EcdsaP256 { .. } => SignatureAlgorithm::Sha256WithECDSA,
            KeyPair::EcdsaP384 { .. } => SignatureAlgorithm::Sha384WithECDSA,
        }
    }

    /// Signs `data` and returns the ASN.1 DER encoded ECDSA signature.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>> {
        use ecdsa::signature::Signer;

        match self {
            KeyPair::EcdsaP256 { signing_key } => {
                let signature: p256::ecdsa::DerSignature = signing_key
                    .try_sign(data)
                    .map_err(|e| ChainKitError::SigningError(e.to_string()))?;
                Ok(signature.as_bytes().to_vec())
            }
            KeyPair::EcdsaP384 { signing_key } => {
                let signature: p384::ecdsa::DerSignature = signing_key
                    .try_sign(data)
                    .map_err(|e| ChainKitError::SigningError(e.to_string()))?;
                Ok(signature.as_bytes().to_vec())
            }
        }
    }

    /// Exports the private key as an unencrypted PKCS#8 document.
    pub fn to_pkcs8_der(&self) -> Result<SecretDocument> {
        let document = match self {
            KeyPair::EcdsaP256 { signing_key } => signing_key.to_pkcs8_der()?,
            KeyPair::EcdsaP384 { signing_key } => signing_key.to_pkcs8_der()?,
        };
        Ok(document)
    }

    /// Imports a PKCS#8 private key, trying P-256 first and then P-384.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        if let Ok(signing_key) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(KeyPair::EcdsaP256 { signing_key });
        }
        p384::ecdsa::SigningKey::from_pkcs8_der(der)
            .map(|signing_key| KeyPair::EcdsaP384 { signing_key })
            .map_err(|e| ChainKitError::DecodingError(e.to_string()))
    }
}

/// The public half of a [`KeyPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKey {
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        match key_pair {
            KeyPair::EcdsaP256 { signing_key } => PublicKey::EcdsaP256(*signing_key.verifying_key()),
            KeyPair::EcdsaP384 { signing_key } => PublicKey::EcdsaP384(*signing_key.verifying_key()),
        }
    }

    /// The uncompressed SEC1 point, i.e. the contents of the SPKI bit string.
    pub fn key_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::EcdsaP256(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            PublicKey::EcdsaP384(key) => key.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            PublicKey::EcdsaP256(key) => SubjectPublicKeyInfoOwned::from_key(*key),
            PublicKey::EcdsaP384(key) => SubjectPublicKeyInfoOwned::from_key(*key),
        };
        spki.map_err(|e| ChainKitError::EncodingError(e.to_string()))
    }

    /// Reads a public key back out of a certificate's SPKI.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let der = spki.to_der()?;
        if let Ok(key) = p256::ecdsa::VerifyingKey::from_public_key_der(&der) {
            return Ok(PublicKey::EcdsaP256(key));
        }
        p384::ecdsa::VerifyingKey::from_public_key_der(&der)
            .map(PublicKey::EcdsaP384)
            .map_err(|e| ChainKitError::DecodingError(e.to_string()))
    }
}

/// Source of fresh key pairs, one per issued certificate.
pub trait KeyProvider {
    fn generate_key_pair(&self, curve: NamedCurve) -> Result<KeyPair>;
}

/// Generates keys from the operating system's random number generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeyProvider;

impl KeyProvider for OsKeyProvider {
    fn generate_key_pair(&self, curve: NamedCurve) -> Result<KeyPair> {
        Ok(match curve {
            NamedCurve::P256 => KeyPair::generate_ecdsa_p256(),
            NamedCurve::P384 => KeyPair::generate_ecdsa_p384(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_names_parse() {
        assert_eq!("nistP256".parse::<NamedCurve>().unwrap(), NamedCurve::P256);
        assert_eq!("secp384r1".parse::<NamedCurve>().unwrap(), NamedCurve::P384);
        assert!(matches!(
            "brainpoolP256r1".parse::<NamedCurve>(),
            Err(ChainKitError::KeyGenerationError(_))
        ));
    }

    #[test]
    fn pkcs8_export_import_keeps_public_key() {
        for curve in [NamedCurve::P256, NamedCurve::P384] {
            let key = OsKeyProvider.generate_key_pair(curve).unwrap();
            let document = key.to_pkcs8_der().unwrap();
            let imported = KeyPair::from_pkcs8_der(document.as_bytes()).unwrap();
            assert_eq!(imported.curve(), curve);
            assert_eq!(imported.public_key(), key.public_key());
        }
    }

    #[test]
    fn spki_carries_the_encoded_point() {
        let key = KeyPair::generate_ecdsa_p256();
        let public_key = key.public_key();
        let spki = public_key.to_spki().unwrap();
        assert_eq!(spki.subject_public_key.raw_bytes(), public_key.key_bytes());
        assert_eq!(PublicKey::from_x509spki(&spki).unwrap(), public_key);
    }

    #[test]
    fn signatures_verify() {
        use ecdsa::signature::Verifier;

        let key = KeyPair::generate_ecdsa_p256();
        let signature = key.sign_data(b"tbs").unwrap();
        let PublicKey::EcdsaP256(verifying_key) = key.public_key() else {
            panic!("expected a P-256 key");
        };
        let signature = p256::ecdsa::DerSignature::from_bytes(&signature).unwrap();
        assert!(verifying_key.verify(b"tbs", &signature).is_ok());
    }
}
