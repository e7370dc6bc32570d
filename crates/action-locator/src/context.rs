//! Memoised document representations.

use locus_perceiver_structural::{DocumentSimplifier, SimplifyStrength};
use tracing::debug;

/// Last raw snapshot and the representations derived from it.
///
/// Derived strings are reused only while the raw snapshot is byte-identical.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    raw: Option<String>,
    standard: Option<String>,
    aggressive: Option<String>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn representation(
        &mut self,
        raw: &str,
        strength: SimplifyStrength,
        simplifier: &dyn DocumentSimplifier,
    ) -> String {
        if self.raw.as_deref() != Some(raw) {
            debug!(bytes = raw.len(), "document snapshot changed; dropping derived representations");
            self.raw = Some(raw.to_string());
            self.standard = None;
            self.aggressive = None;
        }
        let slot = match strength {
            SimplifyStrength::Standard => &mut self.standard,
            SimplifyStrength::Aggressive => &mut self.aggressive,
        };
        if let Some(cached) = slot {
            debug!(%strength, "reusing simplified representation");
            return cached.clone();
        }
        let derived = simplifier.simplify(raw, strength);
        *slot = Some(derived.clone());
        derived
    }
}
