//! Site-major lattice fields.

use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use super::Lattice;
use crate::error::{A2AError, Result};
use crate::scalar::{Scalar, c64};
use crate::storage::Dense;

/// Dirac spin components of a Wilson-type fermion.
pub const SPINS: usize = 4;
/// Colour components of a fermion.
pub const COLOURS: usize = 3;
/// Components per site of a Wilson-type fermion, spin-major (`spin * 3 + colour`).
pub const WILSON_COMPONENTS: usize = SPINS * COLOURS;

/// Trait for types that can be sampled from a standard normal distribution.
pub trait RandomNormal: Scalar {
    /// Sample one value.
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomNormal for f64 {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl RandomNormal for c64 {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // Real and imaginary parts N(0, 1/2) so that |z|^2 has mean 1
        let scale = std::f64::consts::FRAC_1_SQRT_2;
        c64::new(
            rng.sample::<f64, _>(StandardNormal) * scale,
            rng.sample::<f64, _>(StandardNormal) * scale,
        )
    }
}

/// A field with `n_comp` scalar components on every lattice site.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeField<T: Scalar> {
    n_sites: usize,
    n_comp: usize,
    storage: Dense<T>,
}

/// One complex number per site (momentum phases).
pub type ComplexField = LatticeField<c64>;
/// Wilson-type fermion: 4 spins x 3 colours per site.
pub type FermionField = LatticeField<c64>;
/// Staggered fermion: 3 colours per site.
pub type StaggeredField = LatticeField<c64>;

impl<T: Scalar> LatticeField<T> {
    /// Zero field.
    ///
    /// # Panics
    /// Panics if `n_comp == 0`.
    pub fn zeros(lattice: &Lattice, n_comp: usize) -> Self {
        assert!(n_comp > 0, "LatticeField: require n_comp >= 1");
        Self {
            n_sites: lattice.volume(),
            n_comp,
            storage: Dense::zeros(lattice.volume() * n_comp),
        }
    }

    /// Field with component `c` at `site` set to `f(site, c)`, filled in parallel.
    pub fn from_fn<F>(lattice: &Lattice, n_comp: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> T + Sync,
    {
        let mut field = Self::zeros(lattice, n_comp);
        field
            .storage
            .as_mut_slice()
            .par_chunks_mut(n_comp)
            .enumerate()
            .for_each(|(site, values)| {
                for (c, v) in values.iter_mut().enumerate() {
                    *v = f(site, c);
                }
            });
        field
    }

    /// Gaussian random field drawn from `rng` (sequential, so seeded runs reproduce).
    pub fn random_with_rng<R: Rng + ?Sized>(lattice: &Lattice, n_comp: usize, rng: &mut R) -> Self
    where
        T: RandomNormal,
    {
        assert!(n_comp > 0, "LatticeField: require n_comp >= 1");
        let len = lattice.volume() * n_comp;
        Self {
            n_sites: lattice.volume(),
            n_comp,
            storage: Dense::from_vec((0..len).map(|_| T::sample_normal(rng)).collect()),
        }
    }

    #[inline]
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    #[inline]
    pub fn n_comp(&self) -> usize {
        self.n_comp
    }

    /// Components at one site.
    #[inline]
    pub fn site(&self, site: usize) -> &[T] {
        let start = site * self.n_comp;
        &self.storage.as_slice()[start..start + self.n_comp]
    }

    /// Mutable components at one site.
    #[inline]
    pub fn site_mut(&mut self, site: usize) -> &mut [T] {
        let start = site * self.n_comp;
        &mut self.storage.as_mut_slice()[start..start + self.n_comp]
    }

    /// All components, site-major.
    #[inline]
    pub fn data(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Check the field lives on `lattice` with `n_comp` components per site.
    pub fn check_layout(&self, lattice: &Lattice, n_comp: usize, what: &'static str) -> Result<()> {
        if self.n_sites != lattice.volume() {
            return Err(A2AError::SizeMismatch {
                what,
                expected: lattice.volume(),
                actual: self.n_sites,
            });
        }
        if self.n_comp != n_comp {
            return Err(A2AError::SizeMismatch {
                what,
                expected: n_comp,
                actual: self.n_comp,
            });
        }
        Ok(())
    }
}

/// Gauge links: one 3x3 colour matrix (row-major) per site and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeField {
    nd: usize,
    links: LatticeField<c64>,
}

const LINK_LEN: usize = COLOURS * COLOURS;

impl GaugeField {
    /// All links set to the identity (free field).
    pub fn unit(lattice: &Lattice) -> Self {
        Self::from_fn(lattice, |_, _| {
            let mut m = [c64::new(0.0, 0.0); LINK_LEN];
            for a in 0..COLOURS {
                m[a * COLOURS + a] = c64::new(1.0, 0.0);
            }
            m
        })
    }

    /// Links given by `f(site, mu)`.
    pub fn from_fn<F>(lattice: &Lattice, f: F) -> Self
    where
        F: Fn(usize, usize) -> [c64; LINK_LEN] + Sync,
    {
        let nd = lattice.nd();
        let links = LatticeField::from_fn(lattice, nd * LINK_LEN, |site, c| {
            f(site, c / LINK_LEN)[c % LINK_LEN]
        });
        Self { nd, links }
    }

    /// Gaussian random links, not projected onto SU(3).
    pub fn random_with_rng<R: Rng + ?Sized>(lattice: &Lattice, rng: &mut R) -> Self {
        Self {
            nd: lattice.nd(),
            links: LatticeField::random_with_rng(lattice, lattice.nd() * LINK_LEN, rng),
        }
    }

    /// Number of link directions.
    #[inline]
    pub fn nd(&self) -> usize {
        self.nd
    }

    /// The link `U_mu(site)` as a row-major 3x3 matrix.
    #[inline]
    pub fn link(&self, site: usize, mu: usize) -> &[c64] {
        &self.links.site(site)[mu * LINK_LEN..(mu + 1) * LINK_LEN]
    }

    /// Check the links live on `lattice`.
    pub fn check_layout(&self, lattice: &Lattice) -> Result<()> {
        self.links
            .check_layout(lattice, lattice.nd() * LINK_LEN, "gauge field")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_from_fn_layout() {
        let lattice = Lattice::new(&[2, 2]).unwrap();
        let field: LatticeField<f64> =
            LatticeField::from_fn(&lattice, 3, |site, c| (site * 10 + c) as f64);
        assert_eq!(field.n_sites(), 4);
        assert_eq!(field.site(2), &[20.0, 21.0, 22.0]);
        assert_eq!(field.data().len(), 12);
    }

    #[test]
    fn test_site_mut() {
        let lattice = Lattice::new(&[2, 2]).unwrap();
        let mut field: StaggeredField = LatticeField::zeros(&lattice, COLOURS);
        field.site_mut(3)[1] = c64::new(2.0, -1.0);
        assert_eq!(field.data()[3 * COLOURS + 1], c64::new(2.0, -1.0));
        assert_eq!(field.site(2), &[c64::new(0.0, 0.0); COLOURS]);
    }

    #[test]
    fn test_random_is_reproducible() {
        let lattice = Lattice::new(&[2, 2, 2]).unwrap();
        let a: FermionField =
            LatticeField::random_with_rng(&lattice, WILSON_COMPONENTS, &mut StdRng::seed_from_u64(7));
        let b: FermionField =
            LatticeField::random_with_rng(&lattice, WILSON_COMPONENTS, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_check_layout() {
        let lattice = Lattice::new(&[2, 2]).unwrap();
        let other = Lattice::new(&[2, 4]).unwrap();
        let field: StaggeredField = LatticeField::zeros(&lattice, COLOURS);
        assert!(field.check_layout(&lattice, COLOURS, "left").is_ok());
        assert!(field.check_layout(&other, COLOURS, "left").is_err());
        assert!(field.check_layout(&lattice, WILSON_COMPONENTS, "left").is_err());
    }

    #[test]
    fn test_unit_gauge() {
        let lattice = Lattice::new(&[2, 2, 2]).unwrap();
        let u = GaugeField::unit(&lattice);
        assert_eq!(u.nd(), 3);
        let link = u.link(5, 2);
        assert_eq!(link[0], c64::new(1.0, 0.0));
        assert_eq!(link[1], c64::new(0.0, 0.0));
        assert_eq!(link[4], c64::new(1.0, 0.0));
        assert!(u.check_layout(&lattice).is_ok());
    }
}
