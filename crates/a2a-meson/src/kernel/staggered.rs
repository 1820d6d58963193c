//! Staggered meson-field kernel.

use super::gemm::SliceOperands;
use super::{A2AKernel, check_output};
use crate::error::{A2AError, Result};
use crate::gamma::Gamma;
use crate::lattice::{COLOURS, ComplexField, GaugeField, Lattice, StaggeredField};
use crate::matrix_set::MatrixSet;
use crate::scalar::c64;

/// Where the operator sits between the two staggered vectors.
#[derive(Debug, Clone, Copy)]
pub enum Insertion<'a> {
    /// Same-site bilinear. Operators: `Identity`, `Gamma5` (taste phase `(-1)^{Σx}`).
    Local,
    /// One-link conserved current `η_mu(x) U_mu(x) R(x + mu)`.
    /// Operators: `GammaX`, `GammaY`, `GammaZ`, `GammaT` select `mu`.
    ///
    /// `η_mu(x) = (-1)^{x_0 + ... + x_{mu-1}}` is applied here, so the gauge
    /// field must not carry staggered phases already.
    OneLink(&'a GaugeField),
}

#[derive(Debug, Clone, Copy)]
enum Operator {
    Local { taste_sign: bool },
    Link { mu: usize },
}

/// Staggered meson-field kernel:
///
/// ```text
/// M[m, g, t, i, j] = Σ_{x ∈ t} conj(L_i(x)) · D_g R_j(x) ph_m(x)
/// ```
///
/// with `D_g` the local or one-link insertion of operator `g`, contracted over colour.
pub struct StaggeredKernel<'a> {
    lattice: &'a Lattice,
    insertion: Insertion<'a>,
    operators: Vec<Operator>,
    phases: &'a [ComplexField],
    vol: f64,
}

impl<'a> StaggeredKernel<'a> {
    /// Local insertion kernel.
    ///
    /// # Errors
    ///
    /// [`A2AError::UnsupportedOperator`] for anything but `Identity` and `Gamma5`.
    pub fn local(lattice: &'a Lattice, gammas: &[Gamma], phases: &'a [ComplexField]) -> Result<Self> {
        let operators = gammas
            .iter()
            .map(|&g| match g {
                Gamma::Identity => Ok(Operator::Local { taste_sign: false }),
                Gamma::Gamma5 => Ok(Operator::Local { taste_sign: true }),
                other => Err(unsupported(other, "staggered local")),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::build(lattice, Insertion::Local, operators, phases)
    }

    /// One-link (conserved current) kernel dressed with `gauge`.
    ///
    /// # Errors
    ///
    /// [`A2AError::UnsupportedOperator`] for operators that are not a lattice
    /// direction, or a size error if `gauge` does not live on `lattice`.
    pub fn one_link(
        lattice: &'a Lattice,
        gauge: &'a GaugeField,
        gammas: &[Gamma],
        phases: &'a [ComplexField],
    ) -> Result<Self> {
        gauge.check_layout(lattice)?;
        let operators = gammas
            .iter()
            .map(|&g| match g.direction() {
                Some(mu) if mu < lattice.nd() => Ok(Operator::Link { mu }),
                _ => Err(unsupported(g, "staggered one-link")),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::build(lattice, Insertion::OneLink(gauge), operators, phases)
    }

    fn build(
        lattice: &'a Lattice,
        insertion: Insertion<'a>,
        operators: Vec<Operator>,
        phases: &'a [ComplexField],
    ) -> Result<Self> {
        if operators.is_empty() {
            return Err(A2AError::config("staggered kernel needs at least one operator"));
        }
        for ph in phases {
            ph.check_layout(lattice, 1, "momentum phase")?;
        }
        Ok(Self {
            lattice,
            insertion,
            operators,
            phases,
            vol: lattice.volume() as f64,
        })
    }

    /// `(-1)^{x_0 + ... + x_{n-1}}`, negative when odd.
    fn parity_negative(&self, site: usize, n: usize) -> bool {
        (0..n)
            .map(|nu| self.lattice.coordinate_component(site, nu))
            .sum::<usize>()
            % 2
            == 1
    }

    fn insert(&self, op: Operator, field: &StaggeredField, site: usize, dst: &mut [c64]) {
        match (op, self.insertion) {
            (Operator::Local { taste_sign }, _) => {
                let negative = taste_sign && self.parity_negative(site, self.lattice.nd());
                let sign = if negative { -1.0 } else { 1.0 };
                for (d, &v) in dst.iter_mut().zip(field.site(site)) {
                    *d = v * sign;
                }
            }
            (Operator::Link { mu }, Insertion::OneLink(gauge)) => {
                let sign = if self.parity_negative(site, mu) { -1.0 } else { 1.0 };
                let link = gauge.link(site, mu);
                let chi = field.site(self.lattice.neighbor(site, mu, 1));
                for (a, d) in dst.iter_mut().enumerate() {
                    let v: c64 = (0..COLOURS).map(|b| link[a * COLOURS + b] * chi[b]).sum();
                    *d = v * sign;
                }
            }
            (Operator::Link { .. }, Insertion::Local) => {
                unreachable!("link operators are only built with a gauge field")
            }
        }
    }
}

fn unsupported(gamma: Gamma, kernel: &'static str) -> A2AError {
    A2AError::UnsupportedOperator {
        operator: gamma.to_string(),
        kernel,
    }
}

impl A2AKernel<c64, StaggeredField> for StaggeredKernel<'_> {
    fn apply(
        &self,
        out: &mut MatrixSet<c64>,
        left: &[StaggeredField],
        right: &[StaggeredField],
    ) -> Result<()> {
        let lattice = self.lattice;
        check_output(
            out,
            left.len(),
            right.len(),
            self.phases.len(),
            self.operators.len(),
            lattice.time_extent(),
        )?;
        for field in left.iter().chain(right) {
            field.check_layout(lattice, COLOURS, "staggered field")?;
        }

        let k = lattice.slice_volume() * COLOURS;
        let mut ops = SliceOperands::new(left.len(), right.len(), k);

        for t in 0..lattice.time_extent() {
            let sites = lattice.time_slice(t);
            ops.load_left(left, sites.clone());

            for (g, &op) in self.operators.iter().enumerate() {
                for (j, field) in right.iter().enumerate() {
                    let column = &mut ops.inserted[j * k..(j + 1) * k];
                    for (local, site) in sites.clone().enumerate() {
                        self.insert(op, field, site, &mut column[local * COLOURS..(local + 1) * COLOURS]);
                    }
                }
                for (m, ph) in self.phases.iter().enumerate() {
                    ops.apply_phase(&ph.data()[sites.clone()], COLOURS);
                    ops.multiply_into(out.matrix_mut(m, g, t));
                }
            }
        }
        Ok(())
    }

    fn flops(&self, block_i: usize, block_j: usize) -> f64 {
        let nmom = self.phases.len() as f64;
        let nop = self.operators.len() as f64;
        let dressing = match self.insertion {
            Insertion::Local => 0.0,
            Insertion::OneLink(_) => 66.0,
        };
        self.vol * (dressing + 3.0 * 8.0 + 6.0 * nmom) * (block_i * block_j) as f64 * nop
    }

    fn bytes(&self, block_i: usize, block_j: usize) -> f64 {
        let size = std::mem::size_of::<c64>() as f64;
        let nmom = self.phases.len() as f64;
        let nop = self.operators.len() as f64;
        let pairs = (block_i * block_j) as f64;
        self.vol * (3.0 * size) * pairs + self.vol * (2.0 * size * nmom) * pairs * nop
    }

    fn n_momenta(&self) -> usize {
        self.phases.len()
    }

    fn n_operators(&self) -> usize {
        self.operators.len()
    }
}
