//! Plain data shared between the numerics modules.

use serde::{Deserialize, Serialize};

/// Closeness-to-zero threshold used by pivoting, root acceptance and the
/// default search tolerances. Values with a smaller magnitude count as zero.
pub const EPS: f64 = 1e-6;

/// A point in the plane.
///
/// Points handed to [`crate::simplify`] live in screen coordinates and may be
/// invalid: any NaN coordinate marks an undefined sample (a pen-up segment).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Marker point with both coordinates undefined.
    pub const fn invalid() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
        }
    }

    pub fn is_valid(&self) -> bool {
        !(self.x + self.y).is_nan()
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Zips parallel coordinate slices into points, truncating to the shorter one.
pub fn points_from_coords(xs: &[f64], ys: &[f64]) -> Vec<Point2> {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| Point2::new(x, y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_in_either_coordinate_invalidates_point() {
        assert!(Point2::new(1.0, 2.0).is_valid());
        assert!(!Point2::new(f64::NAN, 2.0).is_valid());
        assert!(!Point2::new(1.0, f64::NAN).is_valid());
        assert!(!Point2::invalid().is_valid());
    }

    #[test]
    fn points_from_coords_truncates_to_shorter_slice() {
        let points = points_from_coords(&[0.0, 1.0, 2.0], &[5.0, 6.0]);
        assert_eq!(points, vec![Point2::new(0.0, 5.0), Point2::new(1.0, 6.0)]);
    }
}
