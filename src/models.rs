use std::fmt;

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// Closed boundary of a connected foreground region, in scan order
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the closed polyline, including the segment from the last
    /// point back to the first
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                let dx = (b.x - a.x) as f64;
                let dy = (b.y - a.y) as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// Shoelace area; the sign follows the traversal direction
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();
        twice as f64 / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }
}

/// The contour kept by region selection, with the bookkeeping of what was dropped
#[derive(Debug, Clone)]
pub struct Region {
    pub contour: Contour,
    pub perimeter: f64,
    pub area: f64,
    pub contours_found: usize,
    pub contours_discarded: usize,
}

/// One pixel in the 8-bit HSV convention: hue 0-179, saturation and value 0-255
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvColor {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl HsvColor {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Color and shape descriptors of a single fruit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub average_hue: f64,
    pub average_saturation: f64,
    pub average_value: f64,
    pub compactness: f64,
}

impl FeatureVector {
    pub const LEN: usize = 4;
    pub const NAMES: [&'static str; 4] = ["hue", "saturation", "value", "compactness"];

    pub fn new(average_hue: f64, average_saturation: f64, average_value: f64, compactness: f64) -> Self {
        Self {
            average_hue,
            average_saturation,
            average_value,
            compactness,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [
            self.average_hue,
            self.average_saturation,
            self.average_value,
            self.compactness,
        ]
    }
}

impl From<[f64; 4]> for FeatureVector {
    fn from(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "H: {:.2} S: {:.2} V: {:.2} compactness: {:.2}",
            self.average_hue, self.average_saturation, self.average_value, self.compactness
        )
    }
}

/// A labeled example as stored in the training file
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub source: String,
    pub label: String,
    pub features: FeatureVector,
}

impl TrainingRecord {
    pub fn new(source: impl Into<String>, label: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            source: source.into(),
            label: label.into(),
            features,
        }
    }
}
