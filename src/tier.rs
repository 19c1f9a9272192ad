use std::fmt;

/// Position of a certificate in the trust hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateTier {
    Root,
    Intermediate,
    Leaf,
}

impl CertificateTier {
    /// Tiers in issuance order; each one is signed by the one before it.
    pub const ALL: [CertificateTier; 3] = [
        CertificateTier::Root,
        CertificateTier::Intermediate,
        CertificateTier::Leaf,
    ];

    /// Whether certificates of this tier may sign other certificates.
    pub fn is_ca(self) -> bool {
        !matches!(self, CertificateTier::Leaf)
    }

    /// The tier that signs this one, `None` for the self-signed root.
    pub fn issuer_tier(self) -> Option<CertificateTier> {
        match self {
            CertificateTier::Root => None,
            CertificateTier::Intermediate => Some(CertificateTier::Root),
            CertificateTier::Leaf => Some(CertificateTier::Intermediate),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CertificateTier::Root => "root",
            CertificateTier::Intermediate => "intermediate",
            CertificateTier::Leaf => "leaf",
        }
    }
}

impl fmt::Display for CertificateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
