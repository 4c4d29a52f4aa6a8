//! # Chunks Module
//!
//! Per-axis block sizes of a lazy array.
//!
//! A layout lists, for every axis, the sizes of the blocks that axis is split
//! into. The sizes of each axis must sum to that axis' length. Execution maps
//! elementwise kernels over the blocks of axis 0.

use crate::enums::error::UnitArrowError;

/// Block size used per axis by [`ChunkSpec::Auto`].
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// How a constructor or `rechunk` should split an array.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChunkSpec {
    /// Blocks of [`DEFAULT_CHUNK_SIZE`] along every axis.
    #[default]
    Auto,
    /// One block size per axis; the last block of an axis may be shorter.
    Uniform(Vec<usize>),
    /// Explicit block sizes per axis.
    Explicit(Vec<Vec<usize>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLayout {
    chunks: Vec<Vec<usize>>,
}

impl ChunkLayout {
    /// Resolves `spec` against `shape`.
    pub fn from_spec(spec: &ChunkSpec, shape: &[usize]) -> Result<Self, UnitArrowError> {
        match spec {
            ChunkSpec::Auto => Ok(Self::auto(shape)),
            ChunkSpec::Uniform(sizes) => {
                if sizes.len() != shape.len() {
                    return Err(UnitArrowError::ChunkLayoutError {
                        message: format!(
                            "chunk sizes {:?} do not match {} dimensions",
                            sizes,
                            shape.len()
                        ),
                    });
                }
                if let Some(k) = sizes.iter().position(|&s| s == 0) {
                    return Err(UnitArrowError::ChunkLayoutError {
                        message: format!("chunk size along axis {} must be positive", k),
                    });
                }
                Ok(Self {
                    chunks: shape
                        .iter()
                        .zip(sizes)
                        .map(|(&dim, &size)| split_axis(dim, size))
                        .collect(),
                })
            }
            ChunkSpec::Explicit(chunks) => Self::new(chunks.clone(), shape),
        }
    }

    /// Validates explicit chunks against `shape`.
    pub fn new(chunks: Vec<Vec<usize>>, shape: &[usize]) -> Result<Self, UnitArrowError> {
        let layout = Self { chunks };
        layout.validate(shape)?;
        Ok(layout)
    }

    /// [`DEFAULT_CHUNK_SIZE`] blocks along every axis of `shape`.
    pub fn auto(shape: &[usize]) -> Self {
        Self {
            chunks: shape
                .iter()
                .map(|&dim| split_axis(dim, DEFAULT_CHUNK_SIZE))
                .collect(),
        }
    }

    pub fn validate(&self, shape: &[usize]) -> Result<(), UnitArrowError> {
        if self.chunks.len() != shape.len() {
            return Err(UnitArrowError::ChunkLayoutError {
                message: format!(
                    "chunks describe {} dimensions but shape {:?} has {}",
                    self.chunks.len(),
                    shape,
                    shape.len()
                ),
            });
        }
        for (axis, (blocks, &dim)) in self.chunks.iter().zip(shape).enumerate() {
            let total: usize = blocks.iter().sum();
            if total != dim {
                return Err(UnitArrowError::ChunkLayoutError {
                    message: format!(
                        "chunks {:?} along axis {} sum to {}, expected {}",
                        blocks, axis, total, dim
                    ),
                });
            }
            if dim > 0 && blocks.contains(&0) {
                return Err(UnitArrowError::ChunkLayoutError {
                    message: format!("empty chunk along axis {} of length {}", axis, dim),
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn chunks(&self) -> &[Vec<usize>] {
        &self.chunks
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.chunks.len()
    }

    /// Largest block along each axis.
    pub fn chunksize(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .map(|b| b.iter().copied().max().unwrap_or(0))
            .collect()
    }

    /// Number of blocks along each axis.
    pub fn numblocks(&self) -> Vec<usize> {
        self.chunks.iter().map(Vec::len).collect()
    }

    /// Block sizes of axis 0, or a single block for a zero-dimensional array.
    pub(crate) fn row_blocks(&self) -> Vec<usize> {
        match self.chunks.first() {
            Some(blocks) => blocks.clone(),
            None => vec![1],
        }
    }

    pub(crate) fn drop_axis(&self, axis: usize) -> Self {
        let mut chunks = self.chunks.clone();
        if axis < chunks.len() {
            chunks.remove(axis);
        }
        Self { chunks }
    }

    pub(crate) fn swap_axes(&self, a: usize, b: usize) -> Self {
        let mut chunks = self.chunks.clone();
        chunks.swap(a, b);
        Self { chunks }
    }

    pub(crate) fn with_axis(&self, axis: usize, blocks: Vec<usize>) -> Self {
        let mut chunks = self.chunks.clone();
        chunks[axis] = blocks;
        Self { chunks }
    }
}

/// Splits `dim` into blocks of at most `size`.
pub(crate) fn split_axis(dim: usize, size: usize) -> Vec<usize> {
    if dim == 0 {
        return vec![0];
    }
    let size = size.max(1);
    let mut blocks = vec![size; dim / size];
    if dim % size != 0 {
        blocks.push(dim % size);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_split() {
        let layout = ChunkLayout::from_spec(&ChunkSpec::Uniform(vec![2, 3]), &[5, 3]).unwrap();
        assert_eq!(layout.chunks(), &[vec![2, 2, 1], vec![3]]);
        assert_eq!(layout.chunksize(), vec![2, 3]);
        assert_eq!(layout.numblocks(), vec![3, 1]);
    }

    #[test]
    fn test_auto() {
        let layout = ChunkLayout::auto(&[10_000, 4]);
        assert_eq!(layout.chunks()[0], vec![8192, 1808]);
        assert_eq!(layout.chunks()[1], vec![4]);
        assert_eq!(ChunkLayout::auto(&[]).row_blocks(), vec![1]);
    }

    #[test]
    fn test_explicit_validation() {
        assert!(ChunkLayout::new(vec![vec![1, 1], vec![2]], &[2, 2]).is_ok());
        let err = ChunkLayout::new(vec![vec![1, 2], vec![2]], &[2, 2]).unwrap_err();
        assert!(matches!(err, UnitArrowError::ChunkLayoutError { .. }));
        assert!(ChunkLayout::new(vec![vec![2]], &[2, 2]).is_err());
        assert!(ChunkLayout::new(vec![vec![2, 0]], &[2]).is_err());
        assert!(ChunkLayout::from_spec(&ChunkSpec::Uniform(vec![0]), &[2]).is_err());
    }

    #[test]
    fn test_zero_length_axis() {
        let layout = ChunkLayout::auto(&[0]);
        assert_eq!(layout.chunks(), &[vec![0]]);
        assert!(layout.validate(&[0]).is_ok());
    }
}
