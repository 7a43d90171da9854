//! Memory-ordering helpers for `ndarray` tensors
//!
//! Views produced by `permuted_axes`, `reversed_axes` or slicing may alias the
//! caller's storage with non-standard strides. Reshapes that depend on element
//! order go through [`to_c_order`] first, which copies only when needed.

use ndarray::{ArrayBase, CowArray, Data, Dimension};
use tracing::trace;

/// Element ordering of a tensor's backing memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Row-major: the last axis is contiguous
    C,
    /// Column-major: the first axis is contiguous
    F,
    /// Neither, e.g. a permuted or strided view
    Strided,
}

/// Reports the memory ordering of `array`.
///
/// Arrays that are both C and F contiguous (zero or one non-trivial axis)
/// report [`Ordering::C`].
pub fn ordering<S, D>(array: &ArrayBase<S, D>) -> Ordering
where
    S: Data,
    D: Dimension,
{
    if array.is_standard_layout() {
        Ordering::C
    } else if array.t().is_standard_layout() {
        Ordering::F
    } else {
        Ordering::Strided
    }
}

/// Returns `array` with identical logical shape in row-major memory order.
///
/// Borrows when the array is already row-major, otherwise materializes a copy.
/// The caller's storage is never modified.
pub fn to_c_order<'a, A, S, D>(array: &'a ArrayBase<S, D>) -> CowArray<'a, A, D>
where
    A: Clone,
    S: Data<Elem = A>,
    D: Dimension,
{
    if !array.is_standard_layout() {
        trace!(shape = ?array.shape(), order = ?ordering(array), "copying tensor into C order");
    }
    array.as_standard_layout()
}
