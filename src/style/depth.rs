//! Depth buckets shared by marker coloring and the legend.

use crate::style::color::Color;

/// One row of the depth table: depths strictly above `lower_km` (up to the
/// next bucket's bound) take `color`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBucket {
    pub lower_km: i32,
    /// `None` for the open-ended deepest bucket
    pub upper_km: Option<i32>,
    pub color: Color,
}

impl ColorBucket {
    /// Legend label, e.g. `10-30` or `90+`
    pub fn label(&self) -> String {
        match self.upper_km {
            Some(upper) => format!("{}-{}", self.lower_km, upper),
            None => format!("{}+", self.lower_km),
        }
    }
}

/// Shallow to deep. The first bucket's lower bound is only a legend label:
/// anything not deeper than 10 km, including depths below -10, lands there.
pub const DEPTH_BUCKETS: [ColorBucket; 6] = [
    ColorBucket {
        lower_km: -10,
        upper_km: Some(10),
        color: Color::rgb(0xA8, 0xDA, 0xDC),
    },
    ColorBucket {
        lower_km: 10,
        upper_km: Some(30),
        color: Color::rgb(0x4C, 0x9F, 0x70),
    },
    ColorBucket {
        lower_km: 30,
        upper_km: Some(50),
        color: Color::rgb(0x2D, 0x6A, 0x4F),
    },
    ColorBucket {
        lower_km: 50,
        upper_km: Some(70),
        color: Color::rgb(0xF4, 0xA2, 0x61),
    },
    ColorBucket {
        lower_km: 70,
        upper_km: Some(90),
        color: Color::rgb(0xF2, 0x6C, 0x4F),
    },
    ColorBucket {
        lower_km: 90,
        upper_km: None,
        color: Color::rgb(0x9B, 0x1C, 0x31),
    },
];

/// Bucket for a hypocenter depth in km.
///
/// Thresholds are checked deepest first and are exclusive (`depth > 90`
/// for the deepest bucket). NaN compares false everywhere and falls through
/// to the shallowest bucket like any other unmatched depth.
pub fn bucket_for_depth(depth_km: f64) -> &'static ColorBucket {
    DEPTH_BUCKETS[1..]
        .iter()
        .rev()
        .find(|bucket| depth_km > f64::from(bucket.lower_km))
        .unwrap_or(&DEPTH_BUCKETS[0])
}

pub fn color_for_depth(depth_km: f64) -> Color {
    bucket_for_depth(depth_km).color
}
