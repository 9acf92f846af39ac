//! Piecewise cubic curves through or near control points: composite Bézier
//! curves and cardinal (Catmull–Rom style) splines.

use crate::traits::ParametricCurve;
use crate::types::Point2;

/// Composite cubic Bézier curve.
///
/// Points `3k..=3k+3` form segment `k`, which is traced for `t` in `[k, k+1]`.
/// Trailing points that do not complete a segment are ignored.
#[derive(Debug, Clone)]
pub struct BezierCurve {
    points: Vec<Point2>,
    segments: usize,
}

impl BezierCurve {
    pub fn new(points: Vec<Point2>) -> Self {
        let segments = points.len().saturating_sub(1) / 3;
        Self { points, segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    fn coordinate(&self, t: f64, coord: impl Fn(&Point2) -> f64) -> f64 {
        if t.is_nan() || self.points.is_empty() {
            return f64::NAN;
        }
        if t < 0.0 {
            return coord(&self.points[0]);
        }
        if t >= self.segments as f64 {
            return coord(&self.points[3 * self.segments]);
        }

        let z = 3 * t.floor() as usize;
        let t0 = t.fract();
        let t1 = 1.0 - t0;
        let p = &self.points[z..z + 4];
        t1 * t1 * (t1 * coord(&p[0]) + 3.0 * t0 * coord(&p[1]))
            + (3.0 * t1 * coord(&p[2]) + t0 * coord(&p[3])) * t0 * t0
    }
}

impl ParametricCurve for BezierCurve {
    fn x(&self, t: f64) -> f64 {
        self.coordinate(t, |p| p.x)
    }

    fn y(&self, t: f64) -> f64 {
        self.coordinate(t, |p| p.y)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.segments as f64)
    }
}

/// Cardinal spline through all control points with tension `tau`.
///
/// Two phantom points are added by reflecting the second and the
/// second-to-last point through the ends. Point `i` is reached at `t = i`.
#[derive(Debug, Clone)]
pub struct CardinalSpline {
    points: Vec<Point2>,
    tau: f64,
    /// Per segment: cubic coefficients for x and y, constant term first.
    coefficients: Vec<[[f64; 4]; 2]>,
}

impl CardinalSpline {
    pub fn new(points: Vec<Point2>, tau: f64) -> Self {
        let coefficients = if points.len() < 2 {
            Vec::new()
        } else {
            let n = points.len();
            let first = reflect(&points[1], &points[0]);
            let last = reflect(&points[n - 2], &points[n - 1]);
            let mut padded = Vec::with_capacity(n + 2);
            padded.push(first);
            padded.extend_from_slice(&points);
            padded.push(last);

            padded
                .windows(4)
                .map(|p| {
                    [
                        segment_coefficients(tau, [p[0].x, p[1].x, p[2].x, p[3].x]),
                        segment_coefficients(tau, [p[0].y, p[1].y, p[2].y, p[3].y]),
                    ]
                })
                .collect()
        };
        Self {
            points,
            tau,
            coefficients,
        }
    }

    /// Cardinal spline with `tau = 0.5`.
    pub fn catmull_rom(points: Vec<Point2>) -> Self {
        Self::new(points, 0.5)
    }

    pub fn tension(&self) -> f64 {
        self.tau
    }

    fn coordinate(&self, t: f64, axis: usize, coord: impl Fn(&Point2) -> f64) -> f64 {
        let n = self.points.len();
        if n < 2 || t.is_nan() {
            return f64::NAN;
        }
        if t <= 0.0 {
            return coord(&self.points[0]);
        }
        if t >= (n - 1) as f64 {
            return coord(&self.points[n - 1]);
        }

        let s = t.floor();
        let segment = s as usize;
        if s == t {
            return coord(&self.points[segment]);
        }

        let u = t - s;
        let c = &self.coefficients[segment][axis];
        self.tau * (((c[3] * u + c[2]) * u + c[1]) * u + c[0])
    }
}

fn reflect(inner: &Point2, end: &Point2) -> Point2 {
    Point2::new(2.0 * end.x - inner.x, 2.0 * end.y - inner.y)
}

fn segment_coefficients(tau: f64, p: [f64; 4]) -> [f64; 4] {
    [
        p[1] / tau,
        -p[0] + p[2],
        2.0 * p[0] + (-3.0 / tau + 1.0) * p[1] + (3.0 / tau - 2.0) * p[2] - p[3],
        -p[0] + (2.0 / tau - 1.0) * p[1] + (-2.0 / tau + 1.0) * p[2] + p[3],
    ]
}

impl ParametricCurve for CardinalSpline {
    fn x(&self, t: f64) -> f64 {
        self.coordinate(t, 0, |p| p.x)
    }

    fn y(&self, t: f64) -> f64 {
        self.coordinate(t, 1, |p| p.y)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.points.len().saturating_sub(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2> {
        coords.iter().map(|&c| Point2::from(c)).collect()
    }

    #[test]
    fn bezier_hits_segment_endpoints() {
        let curve = BezierCurve::new(pts(&[
            (0.0, 0.0),
            (1.0, 2.0),
            (3.0, 2.0),
            (4.0, 0.0),
            (5.0, -2.0),
            (7.0, -2.0),
            (8.0, 0.0),
        ]));
        assert_eq!(curve.domain(), (0.0, 2.0));
        assert_eq!(curve.point(0.0), (0.0, 0.0));
        assert_eq!(curve.point(1.0), (4.0, 0.0));
        assert_eq!(curve.point(2.0), (8.0, 0.0));
        assert_eq!(curve.point(-1.0), (0.0, 0.0));
        assert_eq!(curve.point(5.0), (8.0, 0.0));
    }

    #[test]
    fn bezier_midpoint_is_bernstein_blend() {
        let curve = BezierCurve::new(pts(&[(0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)]));
        // (p0 + 3 p1 + 3 p2 + p3) / 8
        let (x, y) = curve.point(0.5);
        assert!((x - 2.0).abs() < 1e-12);
        assert!((y - 1.5).abs() < 1e-12);
        assert!(curve.x(f64::NAN).is_nan());
    }

    #[test]
    fn bezier_ignores_incomplete_trailing_segment() {
        let curve = BezierCurve::new(pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0), (9.0, 9.0)]));
        assert_eq!(curve.segment_count(), 1);
        assert_eq!(curve.point(1.5), (3.0, 0.0));
    }

    #[test]
    fn catmull_rom_interpolates_control_points() {
        let points = pts(&[(0.0, 0.0), (1.0, 2.0), (3.0, 1.0), (4.0, 4.0)]);
        let spline = CardinalSpline::catmull_rom(points.clone());
        assert_eq!(spline.domain(), (0.0, 3.0));
        for (i, p) in points.iter().enumerate() {
            assert_eq!(spline.point(i as f64), (p.x, p.y));
        }
        // Segment ends agree with the control points from the inside as well.
        let (x, y) = spline.point(1.0 - 1e-9);
        assert!((x - 1.0).abs() < 1e-6);
        assert!((y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn catmull_rom_on_collinear_points_stays_on_the_line() {
        let spline = CardinalSpline::catmull_rom(pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]));
        let (x, y) = spline.point(0.25);
        assert!((x - 0.25).abs() < 1e-12);
        assert!((y - 0.25).abs() < 1e-12);
    }

    #[test]
    fn cardinal_spline_needs_two_points() {
        let spline = CardinalSpline::new(pts(&[(1.0, 1.0)]), 0.5);
        assert!(spline.x(0.0).is_nan());
    }
}
