//! Visual attributes derived from feed data: colors and depth buckets.

pub mod color;
pub mod depth;

pub use color::Color;
pub use depth::{color_for_depth, ColorBucket, DEPTH_BUCKETS};
