//! Flat storage shared by lattice fields and contraction workspaces.
//!
//! Storage is always a flat vector; shapes and strides live in the wrapper
//! (`LatticeField`, `MatrixSet`).

mod dense;

pub use dense::Dense;
