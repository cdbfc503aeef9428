/// Borrowed view over a contiguous world-matrix array with an element
/// stride, as exposed by the scene graph's transform system.
///
/// The stride may be larger than a matrix (interleaved per-transform data).
/// Matrices are read with `bytemuck` so no alignment is required.

use std::mem::size_of;
use glam::Mat4;
use crate::error::{Error, Result};

/// Size in bytes of one column-major 4x4 `f32` matrix
pub const MATRIX_SIZE: usize = size_of::<Mat4>();

#[derive(Debug, Clone, Copy)]
pub struct MatrixArray<'a> {
    data: &'a [u8],
    count: usize,
    stride: usize,
}

impl<'a> MatrixArray<'a> {
    /// View `count` matrices spaced `stride` bytes apart in `data`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if the stride is smaller than a matrix or
    /// `data` is too short to hold `count` elements.
    pub fn new(data: &'a [u8], count: usize, stride: usize) -> Result<Self> {
        if stride < MATRIX_SIZE {
            return Err(Error::InvalidArgument(format!(
                "matrix stride {} is smaller than a matrix ({} bytes)",
                stride, MATRIX_SIZE
            )));
        }
        let required = match count {
            0 => 0,
            n => (n - 1)
                .checked_mul(stride)
                .and_then(|offset| offset.checked_add(MATRIX_SIZE))
                .ok_or_else(|| Error::InvalidArgument(format!(
                    "matrix array of {} elements with stride {} overflows",
                    count, stride
                )))?,
        };
        if data.len() < required {
            return Err(Error::InvalidArgument(format!(
                "matrix array needs {} bytes for {} elements, got {}",
                required, count, data.len()
            )));
        }
        Ok(Self { data, count, stride })
    }

    /// Tightly packed view over a matrix slice
    pub fn from_matrices(matrices: &'a [Mat4]) -> Self {
        Self {
            data: bytemuck::cast_slice(matrices),
            count: matrices.len(),
            stride: MATRIX_SIZE,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Matrix at `index`, `None` if out of range
    pub fn get(&self, index: usize) -> Option<Mat4> {
        if index >= self.count {
            return None;
        }
        let offset = index * self.stride;
        Some(bytemuck::pod_read_unaligned(&self.data[offset..offset + MATRIX_SIZE]))
    }

    /// Iterate over all matrices in order
    pub fn iter(&self) -> impl Iterator<Item = Mat4> + '_ {
        (0..self.count).filter_map(move |i| self.get(i))
    }
}

#[cfg(test)]
#[path = "matrix_array_tests.rs"]
mod tests;
