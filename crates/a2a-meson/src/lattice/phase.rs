//! Momentum phase fields and their run-scoped cache.

use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::debug;

use super::{ComplexField, Lattice, LatticeField};
use crate::error::{A2AError, Result};
use crate::scalar::c64;

/// Parse a whitespace-separated momentum such as `"1 0 -1"`.
///
/// # Errors
///
/// Returns [`A2AError::Config`] when a component is not a number or when the
/// number of components is not `nd - 1` (one per spatial direction).
///
/// # Example
///
/// ```
/// use a2a_meson::lattice::parse_momentum;
///
/// assert_eq!(parse_momentum("1 0 -1", 4).unwrap(), vec![1.0, 0.0, -1.0]);
/// assert!(parse_momentum("1 0", 4).is_err());
/// ```
pub fn parse_momentum(spec: &str, nd: usize) -> Result<Vec<f64>> {
    let p = spec
        .split_whitespace()
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| A2AError::config(format!("invalid momentum component '{s}'")))
        })
        .collect::<Result<Vec<_>>>()?;
    let expected = nd.saturating_sub(1);
    if p.len() != expected {
        return Err(A2AError::config(format!(
            "Momentum has {} components instead of {}",
            p.len(),
            expected
        )));
    }
    Ok(p)
}

/// Plane-wave field `exp(2πi Σ_mu p_mu x_mu / L_mu)` over the spatial axes.
pub fn momentum_phase(lattice: &Lattice, p: &[f64]) -> ComplexField {
    LatticeField::from_fn(lattice, 1, |site, _| {
        let arg: f64 = p
            .iter()
            .enumerate()
            .map(|(mu, &p_mu)| {
                p_mu / lattice.dim(mu) as f64 * lattice.coordinate_component(site, mu) as f64
            })
            .sum();
        let (sin, cos) = (2.0 * PI * arg).sin_cos();
        c64::new(cos, sin)
    })
}

#[derive(Debug, Default)]
struct PhaseEntry {
    computed: bool,
    momenta: Vec<Vec<f64>>,
    volume: usize,
    fields: Vec<ComplexField>,
}

/// Phase fields cached for the lifetime of a run, keyed by a stable name.
///
/// Each entry carries a `computed` flag; a later request with the same key,
/// momenta and lattice returns the stored fields without regenerating them.
#[derive(Debug, Default)]
pub struct MomentumPhaseCache {
    entries: HashMap<String, PhaseEntry>,
    generations: usize,
}

impl MomentumPhaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` holds computed phases.
    pub fn is_computed(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| e.computed)
    }

    /// Number of times phase fields were generated since the cache was created.
    pub fn generation_count(&self) -> usize {
        self.generations
    }

    /// Drop the entry under `key`, forcing regeneration on the next request.
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Phase fields for `momenta` under `key`, generated on first use.
    ///
    /// # Errors
    ///
    /// Returns [`A2AError::Config`] if a momentum does not have one component
    /// per spatial direction of `lattice`.
    pub fn get_or_compute(
        &mut self,
        key: &str,
        lattice: &Lattice,
        momenta: &[Vec<f64>],
    ) -> Result<&[ComplexField]> {
        let spatial = lattice.nd() - 1;
        if let Some(p) = momenta.iter().find(|p| p.len() != spatial) {
            return Err(A2AError::config(format!(
                "Momentum has {} components instead of {}",
                p.len(),
                spatial
            )));
        }

        let entry = self.entries.entry(key.to_string()).or_default();
        let fresh = entry.computed && entry.momenta == momenta && entry.volume == lattice.volume();
        if !fresh {
            debug!(key, n_momenta = momenta.len(), "generating momentum phases");
            entry.fields = momenta.iter().map(|p| momentum_phase(lattice, p)).collect();
            entry.momenta = momenta.to_vec();
            entry.volume = lattice.volume();
            entry.computed = true;
            self.generations += 1;
        }
        Ok(&entry.fields)
    }
}
