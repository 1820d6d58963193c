//! Binary slice files.
//!
//! ```text
//! "A2AM"  u32 version  u64 header length  JSON header  data
//! ```
//!
//! The header holds `{name, dtype, shape, metadata}`; data is little-endian
//! `f64` parts in row-major `[t][i][j]` order. The file is preallocated in
//! `begin_slice` and each outer block's rows are written at their offsets.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{OutputSink, Slice, SliceBlock, SliceShape, SliceTarget};
use crate::error::{A2AError, Result};
use crate::scalar::Scalar;

/// Extension appended to slice file names.
pub const SLICE_FILE_EXTENSION: &str = "a2am";

const MAGIC: &[u8; 4] = b"A2AM";
const VERSION: u32 = 1;
const PREAMBLE_LEN: u64 = 16;

#[derive(Serialize, Deserialize)]
struct Header<M> {
    name: String,
    dtype: String,
    shape: SliceShape,
    metadata: M,
}

struct OpenSlice {
    file: BufWriter<File>,
    data_offset: u64,
    // Byte position the next buffered write lands at
    cursor: u64,
    shape: SliceShape,
}

/// Sink writing one binary file per slice.
#[derive(Default)]
pub struct FileSink {
    open: HashMap<PathBuf, OpenSlice>,
}

impl FileSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slices begun but not yet finished.
    pub fn open_slices(&self) -> usize {
        self.open.len()
    }

    /// Close every unfinished slice.
    ///
    /// Files already created stay on disk with whatever rows reached them.
    /// Buffered rows are flushed on drop and write errors there are ignored.
    /// A failed `write_block` does this automatically.
    pub fn abort(&mut self) {
        if !self.open.is_empty() {
            debug!(count = self.open.len(), "dropping unfinished slice files");
        }
        self.open.clear();
    }
}

impl<T: Scalar, M: Serialize> OutputSink<T, M> for FileSink {
    fn begin_slice(&mut self, target: &SliceTarget<M>, shape: SliceShape) -> Result<()> {
        let path = &target.path;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| A2AError::io(dir, e))?;
        }
        let header = serde_json::to_vec(&Header {
            name: target.name.clone(),
            dtype: T::DTYPE.to_string(),
            shape,
            metadata: &target.metadata,
        })?;

        let mut file = File::create(path).map_err(|e| A2AError::io(path, e))?;
        let mut preamble = Vec::with_capacity(PREAMBLE_LEN as usize + header.len());
        preamble.extend_from_slice(MAGIC);
        preamble.extend_from_slice(&VERSION.to_le_bytes());
        preamble.extend_from_slice(&(header.len() as u64).to_le_bytes());
        preamble.extend_from_slice(&header);
        file.write_all(&preamble).map_err(|e| A2AError::io(path, e))?;

        let data_offset = preamble.len() as u64;
        let data_len = (shape.len() * T::PARTS * 8) as u64;
        file.set_len(data_offset + data_len)
            .map_err(|e| A2AError::io(path, e))?;

        debug!(slice = %target.name, path = %path.display(), "created slice file");
        self.open.insert(
            path.clone(),
            OpenSlice {
                file: BufWriter::new(file),
                data_offset,
                cursor: data_offset,
                shape,
            },
        );
        Ok(())
    }

    fn write_block(&mut self, target: &SliceTarget<M>, block: &SliceBlock<'_, T>) -> Result<()> {
        let result = write_rows(&mut self.open, target, block);
        if result.is_err() {
            self.abort();
        }
        result
    }

    fn finish_slice(&mut self, target: &SliceTarget<M>) -> Result<()> {
        let path = &target.path;
        if let Some(mut open) = self.open.remove(path) {
            open.file.flush().map_err(|e| A2AError::io(path, e))?;
            debug!(slice = %target.name, path = %path.display(), "finished slice file");
        }
        Ok(())
    }
}

fn write_rows<T: Scalar, M>(
    slices: &mut HashMap<PathBuf, OpenSlice>,
    target: &SliceTarget<M>,
    block: &SliceBlock<'_, T>,
) -> Result<()> {
    let path = &target.path;
    let open = slices.get_mut(path).ok_or_else(|| A2AError::Format {
        path: path.clone(),
        message: "block written to a slice that was not begun".to_string(),
    })?;
    let shape = open.shape;
    if block.row_offset + block.rows > shape.n_left
        || block.col_offset + block.cols > shape.n_right
        || block.time_extent != shape.time_extent
    {
        return Err(A2AError::Format {
            path: path.clone(),
            message: format!(
                "block at ({}, {}) of {}x{} does not fit slice {:?}",
                block.row_offset, block.col_offset, block.rows, block.cols, shape
            ),
        });
    }

    let element = (T::PARTS * 8) as u64;
    let mut row = Vec::with_capacity(block.cols * T::PARTS * 8);
    for t in 0..block.time_extent {
        for i in 0..block.rows {
            row.clear();
            for j in 0..block.cols {
                encode(block.get(t, i, j), &mut row);
            }
            let offset = shape.offset(t, block.row_offset + i, block.col_offset) as u64;
            let at = open.data_offset + offset * element;
            // Rows spanning the full slice width are contiguous and stay buffered
            if at != open.cursor {
                open.file
                    .seek(SeekFrom::Start(at))
                    .map_err(|e| A2AError::io(path, e))?;
            }
            open.file
                .write_all(&row)
                .map_err(|e| A2AError::io(path, e))?;
            open.cursor = at + row.len() as u64;
        }
    }
    trace!(
        slice = %target.name,
        row_offset = block.row_offset,
        col_offset = block.col_offset,
        "wrote block"
    );
    Ok(())
}

fn encode<T: Scalar>(value: T, out: &mut Vec<u8>) {
    let (re, im) = value.to_re_im();
    out.extend_from_slice(&re.to_le_bytes());
    if T::PARTS == 2 {
        out.extend_from_slice(&im.to_le_bytes());
    }
}

fn format_error(path: &Path, message: impl Into<String>) -> A2AError {
    A2AError::Format {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Load a slice file written by [`FileSink`].
///
/// # Errors
///
/// I/O errors, a wrong magic number or version, a dtype that is not `T`, or
/// a data section whose length disagrees with the header shape.
pub fn read_slice<T: Scalar, M: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Slice<T, M>> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|e| A2AError::io(path, e))?;

    if bytes.len() < PREAMBLE_LEN as usize || &bytes[..4] != MAGIC {
        return Err(format_error(path, "not a slice file"));
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != VERSION {
        return Err(format_error(path, format!("unsupported version {version}")));
    }
    let data_start = usize::try_from(read_u64(&bytes, 8))
        .ok()
        .and_then(|header_len| (PREAMBLE_LEN as usize).checked_add(header_len))
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| format_error(path, "truncated header"))?;
    let header: Header<M> = serde_json::from_slice(&bytes[PREAMBLE_LEN as usize..data_start])?;
    if header.dtype != T::DTYPE {
        return Err(format_error(
            path,
            format!("dtype {} cannot be read as {}", header.dtype, T::DTYPE),
        ));
    }

    let payload = &bytes[data_start..];
    let element = T::PARTS * 8;
    let expected = header
        .shape
        .time_extent
        .checked_mul(header.shape.n_left)
        .and_then(|n| n.checked_mul(header.shape.n_right))
        .and_then(|n| n.checked_mul(element));
    if expected != Some(payload.len()) {
        return Err(format_error(
            path,
            format!(
                "data holds {} bytes, shape {:?} does not match",
                payload.len(),
                header.shape
            ),
        ));
    }
    let data = payload
        .chunks_exact(element)
        .map(|chunk| {
            let re = read_f64(chunk, 0);
            let im = if T::PARTS == 2 { read_f64(chunk, 8) } else { 0.0 };
            T::from_re_im(re, im)
        })
        .collect();

    Ok(Slice {
        name: header.name,
        shape: header.shape,
        metadata: header.metadata,
        data,
    })
}

fn read_f64(bytes: &[u8], at: usize) -> f64 {
    f64::from_bits(read_u64(bytes, at))
}
