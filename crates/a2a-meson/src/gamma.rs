//! Dirac algebra tags and their matrices.
//!
//! The basis is the chiral one with `γ5 = γx γy γz γt = diag(1, 1, -1, -1)`.
//! Tensor elements are `σ_{μν} = (i/2)[γμ, γν] = i γμ γν`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{A2AError, Result};
use crate::scalar::c64;

/// A 4x4 spin matrix, row-major.
pub type SpinMatrix = [[c64; 4]; 4];

/// The 16 elements of the Dirac algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gamma {
    Gamma5,
    Identity,
    GammaX,
    GammaY,
    GammaZ,
    GammaT,
    GammaXGamma5,
    GammaYGamma5,
    GammaZGamma5,
    GammaTGamma5,
    SigmaXY,
    SigmaXZ,
    SigmaXT,
    SigmaYZ,
    SigmaYT,
    SigmaZT,
}

impl Gamma {
    /// Every element, in the order selected by `gammas = "all"`.
    pub const ALL: [Gamma; 16] = [
        Gamma::Gamma5,
        Gamma::Identity,
        Gamma::GammaX,
        Gamma::GammaY,
        Gamma::GammaZ,
        Gamma::GammaT,
        Gamma::GammaXGamma5,
        Gamma::GammaYGamma5,
        Gamma::GammaZGamma5,
        Gamma::GammaTGamma5,
        Gamma::SigmaXY,
        Gamma::SigmaXZ,
        Gamma::SigmaXT,
        Gamma::SigmaYZ,
        Gamma::SigmaYT,
        Gamma::SigmaZT,
    ];

    /// Direction index of a vector element (`GammaX` -> 0, ..., `GammaT` -> 3).
    pub fn direction(self) -> Option<usize> {
        match self {
            Gamma::GammaX => Some(0),
            Gamma::GammaY => Some(1),
            Gamma::GammaZ => Some(2),
            Gamma::GammaT => Some(3),
            _ => None,
        }
    }

    /// Name as used in configuration and output file names.
    pub fn name(self) -> &'static str {
        match self {
            Gamma::Gamma5 => "Gamma5",
            Gamma::Identity => "Identity",
            Gamma::GammaX => "GammaX",
            Gamma::GammaY => "GammaY",
            Gamma::GammaZ => "GammaZ",
            Gamma::GammaT => "GammaT",
            Gamma::GammaXGamma5 => "GammaXGamma5",
            Gamma::GammaYGamma5 => "GammaYGamma5",
            Gamma::GammaZGamma5 => "GammaZGamma5",
            Gamma::GammaTGamma5 => "GammaTGamma5",
            Gamma::SigmaXY => "SigmaXY",
            Gamma::SigmaXZ => "SigmaXZ",
            Gamma::SigmaXT => "SigmaXT",
            Gamma::SigmaYZ => "SigmaYZ",
            Gamma::SigmaYT => "SigmaYT",
            Gamma::SigmaZT => "SigmaZT",
        }
    }

    /// Spin matrix of this element.
    pub fn matrix(self) -> SpinMatrix {
        let [x, y, z, t] = basis();
        let i = c64::new(0.0, 1.0);
        match self {
            Gamma::Gamma5 => gamma5(),
            Gamma::Identity => identity(),
            Gamma::GammaX => x,
            Gamma::GammaY => y,
            Gamma::GammaZ => z,
            Gamma::GammaT => t,
            Gamma::GammaXGamma5 => mul(&x, &gamma5()),
            Gamma::GammaYGamma5 => mul(&y, &gamma5()),
            Gamma::GammaZGamma5 => mul(&z, &gamma5()),
            Gamma::GammaTGamma5 => mul(&t, &gamma5()),
            Gamma::SigmaXY => scale(i, &mul(&x, &y)),
            Gamma::SigmaXZ => scale(i, &mul(&x, &z)),
            Gamma::SigmaXT => scale(i, &mul(&x, &t)),
            Gamma::SigmaYZ => scale(i, &mul(&y, &z)),
            Gamma::SigmaYT => scale(i, &mul(&y, &t)),
            Gamma::SigmaZT => scale(i, &mul(&z, &t)),
        }
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gamma {
    type Err = A2AError;

    fn from_str(s: &str) -> Result<Self> {
        Gamma::ALL
            .into_iter()
            .find(|g| g.name() == s)
            .ok_or_else(|| A2AError::config(format!("unknown gamma matrix '{s}'")))
    }
}

/// Parse `"all"` or a whitespace-separated list of gamma names.
///
/// # Example
///
/// ```
/// use a2a_meson::gamma::{Gamma, parse_gamma_list};
///
/// assert_eq!(parse_gamma_list("all").unwrap().len(), 16);
/// assert_eq!(
///     parse_gamma_list("Gamma5 GammaX").unwrap(),
///     vec![Gamma::Gamma5, Gamma::GammaX]
/// );
/// assert!(parse_gamma_list("Gamma7").is_err());
/// ```
pub fn parse_gamma_list(spec: &str) -> Result<Vec<Gamma>> {
    if spec.trim() == "all" {
        return Ok(Gamma::ALL.to_vec());
    }
    let gammas = spec
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<Gamma>>>()?;
    if gammas.is_empty() {
        return Err(A2AError::config("empty gamma matrix list"));
    }
    Ok(gammas)
}

fn c(re: f64, im: f64) -> c64 {
    c64::new(re, im)
}

fn basis() -> [SpinMatrix; 4] {
    let o = c(0.0, 0.0);
    let one = c(1.0, 0.0);
    let m1 = c(-1.0, 0.0);
    let i = c(0.0, 1.0);
    let mi = c(0.0, -1.0);
    [
        [[o, o, o, i], [o, o, i, o], [o, mi, o, o], [mi, o, o, o]],
        [[o, o, o, m1], [o, o, one, o], [o, one, o, o], [m1, o, o, o]],
        [[o, o, i, o], [o, o, o, mi], [mi, o, o, o], [o, i, o, o]],
        [[o, o, one, o], [o, o, o, one], [one, o, o, o], [o, one, o, o]],
    ]
}

fn identity() -> SpinMatrix {
    let mut m = [[c(0.0, 0.0); 4]; 4];
    for (a, row) in m.iter_mut().enumerate() {
        row[a] = c(1.0, 0.0);
    }
    m
}

fn gamma5() -> SpinMatrix {
    let mut m = identity();
    m[2][2] = c(-1.0, 0.0);
    m[3][3] = c(-1.0, 0.0);
    m
}

fn mul(a: &SpinMatrix, b: &SpinMatrix) -> SpinMatrix {
    let mut m = [[c(0.0, 0.0); 4]; 4];
    for r in 0..4 {
        for col in 0..4 {
            m[r][col] = (0..4).map(|k| a[r][k] * b[k][col]).sum();
        }
    }
    m
}

fn scale(s: c64, a: &SpinMatrix) -> SpinMatrix {
    a.map(|row| row.map(|v| s * v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_matrix_eq(a: &SpinMatrix, b: &SpinMatrix) {
        for r in 0..4 {
            for col in 0..4 {
                assert_relative_eq!(a[r][col].re, b[r][col].re, epsilon = 1e-12);
                assert_relative_eq!(a[r][col].im, b[r][col].im, epsilon = 1e-12);
            }
        }
    }

    fn add(a: &SpinMatrix, b: &SpinMatrix) -> SpinMatrix {
        let mut m = *a;
        for r in 0..4 {
            for col in 0..4 {
                m[r][col] += b[r][col];
            }
        }
        m
    }

    fn dagger(a: &SpinMatrix) -> SpinMatrix {
        let mut m = *a;
        for r in 0..4 {
            for col in 0..4 {
                m[r][col] = a[col][r].conj();
            }
        }
        m
    }

    #[test]
    fn test_clifford_algebra() {
        let g = basis();
        for mu in 0..4 {
            for nu in 0..4 {
                let anti = add(&mul(&g[mu], &g[nu]), &mul(&g[nu], &g[mu]));
                let expected = if mu == nu {
                    scale(c(2.0, 0.0), &identity())
                } else {
                    [[c(0.0, 0.0); 4]; 4]
                };
                assert_matrix_eq(&anti, &expected);
            }
        }
    }

    #[test]
    fn test_gamma5_is_product() {
        let [x, y, z, t] = basis();
        assert_matrix_eq(&mul(&mul(&mul(&x, &y), &z), &t), &Gamma::Gamma5.matrix());
    }

    #[test]
    fn test_all_elements_hermitian_and_square_to_one() {
        for g in [Gamma::Gamma5, Gamma::GammaX, Gamma::GammaT, Gamma::SigmaXY, Gamma::SigmaZT] {
            let m = g.matrix();
            assert_matrix_eq(&m, &dagger(&m));
            assert_matrix_eq(&mul(&m, &m), &identity());
        }
    }

    #[test]
    fn test_name_roundtrip() {
        for g in Gamma::ALL {
            assert_eq!(g.to_string().parse::<Gamma>().unwrap(), g);
        }
        assert_eq!(Gamma::GammaZ.direction(), Some(2));
        assert_eq!(Gamma::SigmaXY.direction(), None);
    }

    #[test]
    fn test_parse_gamma_list_rejects_empty() {
        assert!(parse_gamma_list("   ").is_err());
    }
}
