//! # ChainKit - A Three-Tier Test PKI Generator
//!
//! ChainKit builds a minimal public-key infrastructure for tests, using rustcrypto
//! libraries only: a self-signed root authority, an intermediate authority signed
//! by the root, and a leaf certificate signed by the intermediate. Each
//! certificate gets its own ECDSA key and is exported together with that key as
//! a password-protected PKCS#12 bundle.
//!
//! ## What goes into each certificate
//!
//! - **Root**: CA basic constraints without a path length limit and a subject
//!   key identifier.
//! - **Intermediate**: `keyCertSign | cRLSign` key usage, CA basic constraints
//!   with path length 0, subject and authority key identifiers.
//! - **Leaf**: end-entity key usage, non-CA basic constraints, key identifiers,
//!   DNS subject alternative names and TLS client/server extended key usage.
//!
//! Every certificate's validity is clamped to its issuer's, and every authority
//! key identifier equals the issuer's subject key identifier.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chainkit::{
//!     bundle::BundleExporter,
//!     chain::ChainBuilder,
//!     config::{ChainConfig, ExportConfig},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chain = ChainBuilder::new(ChainConfig::default()).build()?;
//! let paths = BundleExporter::new(ExportConfig::default()).export(chain)?;
//! assert_eq!(paths.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reproducible chains
//!
//! The clock, key source and serial numbers are injectable:
//!
//! ```rust
//! use chainkit::{chain::ChainBuilder, clock::FixedClock, config::ChainConfig};
//! use time::macros::datetime;
//!
//! let chain = ChainBuilder::new(ChainConfig::default())
//!     .clock(FixedClock(datetime!(2024-01-01 0:00 UTC)))
//!     .build()
//!     .unwrap();
//! assert_eq!(chain.intermediate.validity().not_after, datetime!(2024-03-31 0:00 UTC));
//! ```
//!
//! ## Module Organization
//!
//! - [`chain`]: the root -> intermediate -> leaf pipeline
//! - [`policy`]: which extensions each tier carries
//! - [`validity`]: clamping validity windows to the issuer
//! - [`serial`]: time-derived serial numbers
//! - [`bundle`]: PKCS#12 encoding and atomic export
//! - [`cert`], [`issuer`], [`tbs_certificate`]: X.509 encoding and signing
//! - [`key`]: key generation and the [`key::KeyProvider`] seam
//! - [`config`], [`clock`], [`tier`], [`error`]

pub mod bundle;
pub mod cert;
pub mod chain;
pub mod clock;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key;
pub mod policy;
pub mod serial;
pub mod tbs_certificate;
pub mod tier;
pub mod validity;
