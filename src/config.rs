//! Chain and export configuration.
//!
//! The defaults reproduce the reference fixture: a P-256 chain named
//! "Experimental ...", a leaf for `www.test.com` and `test.com`, and bundles
//! protected by the password `export`.

use std::path::PathBuf;

use bon::Builder;
use time::{Duration, OffsetDateTime};

use crate::cert::params::{CertificateSpec, DistinguishedName, Validity};
use crate::key::NamedCurve;
use crate::tier::CertificateTier;

/// Default password for exported bundles.
pub const DEFAULT_EXPORT_PASSWORD: &str = "export";

/// Subject and desired lifetime of one tier.
///
/// The desired window is `[now - backdate, now + lifetime)`.
#[derive(Clone, Debug, Builder)]
pub struct TierProfile {
    pub subject: DistinguishedName,
    pub backdate: Duration,
    pub lifetime: Duration,
}

impl TierProfile {
    pub fn root() -> Self {
        Self::days("CN=Experimental Issuing Authority", 45, 3650)
    }

    pub fn intermediate() -> Self {
        Self::days("CN=Experimental Intermediate Issuing Authority", 1, 90)
    }

    pub fn leaf() -> Self {
        Self::days("CN=Experimental Leaf Node", 1, 365)
    }

    fn days(subject: &str, backdate: i64, lifetime: i64) -> Self {
        Self {
            subject: DistinguishedName::from_rfc4514_unchecked(subject),
            backdate: Duration::days(backdate),
            lifetime: Duration::days(lifetime),
        }
    }

    pub fn desired_window(&self, now: OffsetDateTime) -> Validity {
        Validity::new(now - self.backdate, now + self.lifetime)
    }
}

/// Everything the chain builder needs besides its collaborators.
#[derive(Clone, Debug, Builder)]
pub struct ChainConfig {
    #[builder(default = NamedCurve::P256)]
    pub curve: NamedCurve,
    #[builder(default = TierProfile::root())]
    pub root: TierProfile,
    #[builder(default = TierProfile::intermediate())]
    pub intermediate: TierProfile,
    #[builder(default = TierProfile::leaf())]
    pub leaf: TierProfile,
    #[builder(default = vec!["www.test.com".to_string(), "test.com".to_string()])]
    pub leaf_dns_names: Vec<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ChainConfig {
    pub fn profile(&self, tier: CertificateTier) -> &TierProfile {
        match tier {
            CertificateTier::Root => &self.root,
            CertificateTier::Intermediate => &self.intermediate,
            CertificateTier::Leaf => &self.leaf,
        }
    }

    /// The issuance request for `tier` at `now`.
    pub fn spec_for(&self, tier: CertificateTier, now: OffsetDateTime) -> CertificateSpec {
        let profile = self.profile(tier);
        let dns_names = match tier {
            CertificateTier::Leaf => self.leaf_dns_names.clone(),
            _ => Vec::new(),
        };
        CertificateSpec::builder()
            .subject(profile.subject.clone())
            .tier(tier)
            .validity(profile.desired_window(now))
            .dns_names(dns_names)
            .build()
    }
}

/// Where and how bundles are written.
#[derive(Clone, Debug, Builder)]
pub struct ExportConfig {
    #[builder(default = PathBuf::from("."))]
    pub output_dir: PathBuf,
    #[builder(default = DEFAULT_EXPORT_PASSWORD.to_string())]
    pub password: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn default_windows_match_reference_offsets() {
        let config = ChainConfig::default();
        let now = datetime!(2024-01-01 0:00 UTC);

        let root = config.spec_for(CertificateTier::Root, now);
        assert_eq!(root.validity.not_before, datetime!(2023-11-17 0:00 UTC));
        assert_eq!(root.validity.not_after, datetime!(2033-12-29 0:00 UTC));
        assert!(root.dns_names.is_empty());

        let intermediate = config.spec_for(CertificateTier::Intermediate, now);
        assert_eq!(intermediate.validity.not_before, datetime!(2023-12-31 0:00 UTC));
        assert_eq!(intermediate.validity.not_after, datetime!(2024-03-31 0:00 UTC));

        let leaf = config.spec_for(CertificateTier::Leaf, now);
        assert_eq!(leaf.validity.not_after, datetime!(2024-12-31 0:00 UTC));
        assert_eq!(leaf.dns_names, ["www.test.com", "test.com"]);
        assert_eq!(leaf.subject.as_str(), "CN=Experimental Leaf Node");
    }

    #[test]
    fn export_defaults() {
        let export = ExportConfig::default();
        assert_eq!(export.password, "export");
        assert_eq!(export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn builder_overrides_curve() {
        let config = ChainConfig::builder().curve(NamedCurve::P384).build();
        assert_eq!(config.curve, NamedCurve::P384);
        assert_eq!(config.root.subject.as_str(), "CN=Experimental Issuing Authority");
    }
}
