//! Backing store implementations

mod raw;
mod segment;
mod split;
mod stream;

pub use raw::RawImage;
pub use segment::Segment;
pub use split::segment_paths;
pub use stream::StreamSource;
