//! Integration tests for slice files written through the block engine.

use std::fs;
use std::path::Path;

use a2a_meson::{
    A2AError, A2AKernel, BlockComputation, FileSink, IndexSpace, MatrixSet, NamingFns, Result,
    Slice, c64, read_slice,
};

/// `(i + 1) + i (j + 1)` scaled by `m + 1`, shifted by `t` and `g`.
struct ComplexIndexKernel {
    n_operators: usize,
}

fn value(t: usize, m: usize, g: usize, i: usize, j: usize) -> c64 {
    c64::new((i + 1) as f64, (j + 1) as f64) * (m + 1) as f64 + c64::new(t as f64, g as f64)
}

impl A2AKernel<c64, usize> for ComplexIndexKernel {
    fn apply(&self, out: &mut MatrixSet<c64>, left: &[usize], right: &[usize]) -> Result<()> {
        for m in 0..out.n_momenta() {
            for g in 0..out.n_operators() {
                for t in 0..out.time_extent() {
                    for (i, &li) in left.iter().enumerate() {
                        for (j, &rj) in right.iter().enumerate() {
                            out.set(m, g, t, i, j, value(t, m, g, li, rj));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn flops(&self, _block_i: usize, _block_j: usize) -> f64 {
        0.0
    }

    fn bytes(&self, _block_i: usize, _block_j: usize) -> f64 {
        0.0
    }

    fn n_momenta(&self) -> usize {
        2
    }

    fn n_operators(&self) -> usize {
        self.n_operators
    }
}

fn execute_into(root: &Path, nl: usize, nr: usize, block: usize) -> Result<()> {
    let space = IndexSpace::new(3, 2, 2, nl, nr, block, 2)?;
    let left: Vec<usize> = (0..nl).collect();
    let right: Vec<usize> = (0..nr).collect();
    let root = root.to_path_buf();
    let naming = NamingFns::new(
        |m, g| format!("m{m}_g{g}"),
        move |m, g| root.join(format!("m{m}_g{g}.a2am")),
        |m, g| vec![m as f64, g as f64],
    );
    let mut sink = FileSink::new();
    BlockComputation::<c64>::new(space).execute(
        &left,
        &right,
        &ComplexIndexKernel { n_operators: 2 },
        &naming,
        &mut sink,
    )?;
    Ok(())
}

#[test]
fn test_ragged_blocks_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("run.17");
    execute_into(&root, 7, 5, 3).unwrap();

    for m in 0..2 {
        for g in 0..2 {
            let path = root.join(format!("m{m}_g{g}.a2am"));
            let slice: Slice<c64, Vec<f64>> = read_slice(&path).unwrap();
            assert_eq!(slice.name, format!("m{m}_g{g}"));
            assert_eq!(slice.metadata, vec![m as f64, g as f64]);
            assert_eq!(slice.data.len(), 3 * 7 * 5);
            for t in 0..3 {
                for i in 0..7 {
                    for j in 0..5 {
                        assert_eq!(slice.get(t, i, j), value(t, m, g, i, j));
                    }
                }
            }
        }
    }
}

#[test]
fn test_files_identical_across_blockings() {
    let dir = tempfile::tempdir().unwrap();
    let coarse = dir.path().join("coarse");
    let fine = dir.path().join("fine");
    execute_into(&coarse, 6, 4, 6).unwrap();
    execute_into(&fine, 6, 4, 1).unwrap();
    for name in ["m0_g0.a2am", "m1_g1.a2am"] {
        let a = fs::read(coarse.join(name)).unwrap();
        let b = fs::read(fine.join(name)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_unwritable_destination_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the output directory should be
    let blocker = dir.path().join("run.1");
    fs::write(&blocker, b"").unwrap();

    let err = execute_into(&blocker, 2, 2, 1).unwrap_err();
    match err {
        A2AError::Io { path, .. } => assert!(path.starts_with(&blocker)),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_file_size_matches_shape() {
    let dir = tempfile::tempdir().unwrap();
    execute_into(dir.path(), 3, 2, 2).unwrap();
    let bytes = fs::read(dir.path().join("m0_g1.a2am")).unwrap();
    assert_eq!(&bytes[..4], b"A2AM");
    let header_len = u64::from_le_bytes(bytes[8..16].try_into().unwrap()) as usize;
    assert_eq!(bytes.len(), 16 + header_len + 3 * 3 * 2 * 16);
    let header: serde_json::Value = serde_json::from_slice(&bytes[16..16 + header_len]).unwrap();
    assert_eq!(header["dtype"], "complex128");
    assert_eq!(header["shape"]["n_left"], 3);
}
