//! The capability set shared by every image backing store.
//!
//! An analysis engine walks filesystem structures by asking for bytes at
//! absolute offsets. Each backing store answers with what is physically
//! present and declares how it behaves when asked for bytes it does not have.

use crate::error::Result;
use crate::types::OverrunPolicy;

/// A random-access source of image bytes.
///
/// # Example
///
/// ```ignore
/// struct MemorySource(Vec<u8>);
///
/// impl ImageSource for MemorySource {
///     fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
///         // copy what is available at offset
///     }
///
///     fn physical_len(&self) -> Option<u64> {
///         Some(self.0.len() as u64)
///     }
///
///     fn overrun(&self) -> OverrunPolicy {
///         OverrunPolicy::Empty
///     }
/// }
/// ```
pub trait ImageSource {
    /// Reads bytes starting at `offset` into `buffer`.
    ///
    /// Returns the number of bytes read. The count is less than
    /// `buffer.len()` when the physical end of the source is reached, and
    /// zero when `offset` is already at or past it.
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize>;

    /// Returns the true number of bytes behind this source, if it can be known.
    fn physical_len(&self) -> Option<u64>;

    /// How reads at or beyond the physical end are answered.
    fn overrun(&self) -> OverrunPolicy;
}
