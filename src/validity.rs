//! Validity window clamping.
//!
//! A certificate may never be valid outside its issuer's window, so the desired
//! window is intersected with the issuer's. The root has no issuer and keeps
//! its desired window.

use crate::cert::params::Validity;
use crate::error::{ChainKitError, Result};

/// Clamps `desired` to `issuer`.
///
/// # Errors
/// `InvalidValidityWindow` when the resulting window is empty, i.e. the issuer
/// has already expired or is not yet valid relative to the desired window.
pub fn clamp(desired: &Validity, issuer: Option<&Validity>) -> Result<Validity> {
    let window = match issuer {
        None => *desired,
        Some(issuer) => Validity {
            not_before: desired.not_before.max(issuer.not_before),
            not_after: desired.not_after.min(issuer.not_after),
        },
    };

    if window.not_before > window.not_after {
        return Err(ChainKitError::InvalidValidityWindow {
            not_before: window.not_before,
            not_after: window.not_after,
        });
    }
    Ok(window)
}
