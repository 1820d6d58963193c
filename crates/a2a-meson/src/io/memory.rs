use std::collections::HashMap;

use super::{OutputSink, Slice, SliceBlock, SliceShape, SliceTarget};
use crate::error::{A2AError, Result};
use crate::scalar::Scalar;

/// One call made on a [`MemorySink`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Begin {
        name: String,
    },
    Block {
        name: String,
        row_offset: usize,
        col_offset: usize,
        rows: usize,
        cols: usize,
    },
    Finish {
        name: String,
    },
}

/// Sink that assembles slices in memory and records every call.
///
/// Slices appear in [`slices`](Self::slices) in the order they are finished.
#[derive(Debug, Clone)]
pub struct MemorySink<T, M> {
    pending: HashMap<(usize, usize), Slice<T, M>>,
    finished: Vec<Slice<T, M>>,
    events: Vec<SinkEvent>,
}

impl<T, M> Default for MemorySink<T, M> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            finished: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl<T: Scalar, M> MemorySink<T, M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished slices.
    pub fn slices(&self) -> &[Slice<T, M>] {
        &self.finished
    }

    /// Finished slice with the given name.
    pub fn slice(&self, name: &str) -> Option<&Slice<T, M>> {
        self.finished.iter().find(|s| s.name == name)
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn into_slices(self) -> Vec<Slice<T, M>> {
        self.finished
    }
}

impl<T: Scalar, M: Clone> OutputSink<T, M> for MemorySink<T, M> {
    fn begin_slice(&mut self, target: &SliceTarget<M>, shape: SliceShape) -> Result<()> {
        self.events.push(SinkEvent::Begin {
            name: target.name.clone(),
        });
        self.pending.insert(
            (target.momentum, target.operator),
            Slice {
                name: target.name.clone(),
                shape,
                metadata: target.metadata.clone(),
                data: vec![T::zero(); shape.len()],
            },
        );
        Ok(())
    }

    fn write_block(&mut self, target: &SliceTarget<M>, block: &SliceBlock<'_, T>) -> Result<()> {
        let slice = self
            .pending
            .get_mut(&(target.momentum, target.operator))
            .ok_or_else(|| A2AError::Format {
                path: target.path.clone(),
                message: format!("slice {} was not begun", target.name),
            })?;
        let shape = slice.shape;
        for t in 0..block.time_extent {
            for j in 0..block.cols {
                for i in 0..block.rows {
                    let at = shape.offset(t, block.row_offset + i, block.col_offset + j);
                    slice.data[at] = block.get(t, i, j);
                }
            }
        }
        self.events.push(SinkEvent::Block {
            name: target.name.clone(),
            row_offset: block.row_offset,
            col_offset: block.col_offset,
            rows: block.rows,
            cols: block.cols,
        });
        Ok(())
    }

    fn finish_slice(&mut self, target: &SliceTarget<M>) -> Result<()> {
        if let Some(slice) = self.pending.remove(&(target.momentum, target.operator)) {
            self.finished.push(slice);
        }
        self.events.push(SinkEvent::Finish {
            name: target.name.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_assembles_blocks() {
        let target = SliceTarget {
            momentum: 0,
            operator: 1,
            name: "s".to_string(),
            path: PathBuf::from("s"),
            metadata: (),
        };
        let shape = SliceShape {
            time_extent: 1,
            n_left: 2,
            n_right: 2,
        };
        let mut sink = MemorySink::<f64, ()>::new();
        sink.begin_slice(&target, shape).unwrap();
        sink.write_block(&target, &SliceBlock::new(0, 0, 2, 1, 1, &[1.0, 2.0]))
            .unwrap();
        sink.write_block(&target, &SliceBlock::new(0, 1, 2, 1, 1, &[3.0, 4.0]))
            .unwrap();
        assert!(sink.slices().is_empty());
        sink.finish_slice(&target).unwrap();

        let slice = sink.slice("s").unwrap();
        assert_eq!(slice.matrix(0), &[1.0, 3.0, 2.0, 4.0]);
        assert_eq!(sink.events().len(), 4);
        assert_eq!(
            sink.events()[0],
            SinkEvent::Begin {
                name: "s".to_string()
            }
        );
    }
}
