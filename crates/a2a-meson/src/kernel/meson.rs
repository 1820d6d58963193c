//! Wilson-type meson-field kernel.

use super::gemm::SliceOperands;
use super::{A2AKernel, check_output};
use crate::error::{A2AError, Result};
use crate::gamma::{Gamma, SpinMatrix};
use crate::lattice::{COLOURS, ComplexField, FermionField, Lattice, SPINS, WILSON_COMPONENTS};
use crate::matrix_set::MatrixSet;
use crate::scalar::c64;

/// Meson-field kernel with a Dirac matrix insertion:
///
/// ```text
/// M[m, g, t, i, j] = Σ_{x ∈ t} Σ_{ab} conj(L_i(x)_a) Γ_g[a, b] ph_m(x) R_j(x)_b
/// ```
///
/// summed over colour. Each time slice is one GEMM per `(g, m)`.
pub struct MesonKernel<'a> {
    lattice: &'a Lattice,
    gammas: Vec<SpinMatrix>,
    phases: &'a [ComplexField],
    vol: f64,
}

impl<'a> MesonKernel<'a> {
    /// Build the kernel for `gammas` and the precomputed momentum `phases`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operator set is empty or a phase field does not
    /// live on `lattice`.
    pub fn new(lattice: &'a Lattice, gammas: &[Gamma], phases: &'a [ComplexField]) -> Result<Self> {
        if gammas.is_empty() {
            return Err(A2AError::config("meson kernel needs at least one gamma matrix"));
        }
        for ph in phases {
            ph.check_layout(lattice, 1, "momentum phase")?;
        }
        Ok(Self {
            lattice,
            gammas: gammas.iter().map(|g| g.matrix()).collect(),
            phases,
            vol: lattice.volume() as f64,
        })
    }
}

impl A2AKernel<c64, FermionField> for MesonKernel<'_> {
    fn apply(
        &self,
        out: &mut MatrixSet<c64>,
        left: &[FermionField],
        right: &[FermionField],
    ) -> Result<()> {
        let lattice = self.lattice;
        check_output(
            out,
            left.len(),
            right.len(),
            self.phases.len(),
            self.gammas.len(),
            lattice.time_extent(),
        )?;
        for field in left.iter().chain(right) {
            field.check_layout(lattice, WILSON_COMPONENTS, "fermion field")?;
        }

        let sv = lattice.slice_volume();
        let k = sv * WILSON_COMPONENTS;
        let mut ops = SliceOperands::new(left.len(), right.len(), k);

        for t in 0..lattice.time_extent() {
            let sites = lattice.time_slice(t);
            ops.load_left(left, sites.clone());

            for (g, gamma) in self.gammas.iter().enumerate() {
                for (j, field) in right.iter().enumerate() {
                    let column = &mut ops.inserted[j * k..(j + 1) * k];
                    for (local, site) in sites.clone().enumerate() {
                        let psi = field.site(site);
                        let dst = &mut column[local * WILSON_COMPONENTS..(local + 1) * WILSON_COMPONENTS];
                        for (s, row) in gamma.iter().enumerate() {
                            for c in 0..COLOURS {
                                dst[s * COLOURS + c] = (0..SPINS)
                                    .map(|sp| row[sp] * psi[sp * COLOURS + c])
                                    .sum();
                            }
                        }
                    }
                }
                for (m, ph) in self.phases.iter().enumerate() {
                    ops.apply_phase(&ph.data()[sites.clone()], WILSON_COMPONENTS);
                    ops.multiply_into(out.matrix_mut(m, g, t));
                }
            }
        }
        Ok(())
    }

    fn flops(&self, block_i: usize, block_j: usize) -> f64 {
        let nmom = self.phases.len() as f64;
        let ngamma = self.gammas.len() as f64;
        self.vol * (2.0 * 8.0 + 6.0 + 8.0 * nmom) * (block_i * block_j) as f64 * ngamma
    }

    fn bytes(&self, block_i: usize, block_j: usize) -> f64 {
        let size = std::mem::size_of::<c64>() as f64;
        let nmom = self.phases.len() as f64;
        let ngamma = self.gammas.len() as f64;
        let pairs = (block_i * block_j) as f64;
        self.vol * (12.0 * size) * pairs + self.vol * (2.0 * size * nmom) * pairs * ngamma
    }

    fn n_momenta(&self) -> usize {
        self.phases.len()
    }

    fn n_operators(&self) -> usize {
        self.gammas.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{LatticeField, momentum_phase};
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn direct_sum(
        lattice: &Lattice,
        gamma: Gamma,
        ph: &ComplexField,
        l: &FermionField,
        r: &FermionField,
        t: usize,
    ) -> c64 {
        let g = gamma.matrix();
        let mut acc = c64::new(0.0, 0.0);
        for site in lattice.time_slice(t) {
            for a in 0..SPINS {
                for b in 0..SPINS {
                    for c in 0..COLOURS {
                        acc += l.site(site)[a * COLOURS + c].conj()
                            * g[a][b]
                            * ph.site(site)[0]
                            * r.site(site)[b * COLOURS + c];
                    }
                }
            }
        }
        acc
    }

    #[test]
    fn test_matches_direct_sum() {
        let lattice = Lattice::new(&[2, 2, 2, 3]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let left: Vec<FermionField> = (0..2)
            .map(|_| LatticeField::random_with_rng(&lattice, WILSON_COMPONENTS, &mut rng))
            .collect();
        let right: Vec<FermionField> = (0..3)
            .map(|_| LatticeField::random_with_rng(&lattice, WILSON_COMPONENTS, &mut rng))
            .collect();
        let phases = vec![
            momentum_phase(&lattice, &[0.0, 0.0, 0.0]),
            momentum_phase(&lattice, &[1.0, 0.0, -1.0]),
        ];
        let gammas = [Gamma::Gamma5, Gamma::GammaY, Gamma::SigmaXT];
        let kernel = MesonKernel::new(&lattice, &gammas, &phases).unwrap();

        let mut out = MatrixSet::new(2, 3, 3, 2, 3);
        kernel.apply(&mut out, &left, &right).unwrap();

        for (m, ph) in phases.iter().enumerate() {
            for (g, &gamma) in gammas.iter().enumerate() {
                for t in 0..3 {
                    for i in 0..2 {
                        for j in 0..3 {
                            let expected = direct_sum(&lattice, gamma, ph, &left[i], &right[j], t);
                            let got = out.get(m, g, t, i, j);
                            assert_relative_eq!(got.re, expected.re, epsilon = 1e-10);
                            assert_relative_eq!(got.im, expected.im, epsilon = 1e-10);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rejects_wrong_output_shape() {
        let lattice = Lattice::new(&[2, 2]).unwrap();
        let phases = vec![momentum_phase(&lattice, &[0.0])];
        let kernel = MesonKernel::new(&lattice, &[Gamma::Identity], &phases).unwrap();
        let fields: Vec<FermionField> = vec![LatticeField::zeros(&lattice, WILSON_COMPONENTS); 2];
        let mut out = MatrixSet::new(1, 1, 2, 1, 2);
        assert!(matches!(
            kernel.apply(&mut out, &fields, &fields),
            Err(A2AError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_phase_on_other_lattice() {
        let lattice = Lattice::new(&[2, 2]).unwrap();
        let other = Lattice::new(&[4, 2]).unwrap();
        let phases = vec![momentum_phase(&other, &[0.0])];
        assert!(MesonKernel::new(&lattice, &[Gamma::Identity], &phases).is_err());
        assert!(MesonKernel::new(&lattice, &[], &[]).is_err());
    }

    #[test]
    fn test_cost_model_scales_with_block_area() {
        let lattice = Lattice::new(&[2, 2, 2, 2]).unwrap();
        let phases = vec![momentum_phase(&lattice, &[0.0, 0.0, 0.0])];
        let kernel = MesonKernel::new(&lattice, &[Gamma::GammaX], &phases).unwrap();
        assert_relative_eq!(kernel.flops(2, 3), 6.0 * kernel.flops(1, 1));
        assert_relative_eq!(kernel.flops(1, 1), 16.0 * 30.0);
        assert_relative_eq!(kernel.bytes(1, 1), 16.0 * (12.0 * 16.0 + 32.0));
    }
}
