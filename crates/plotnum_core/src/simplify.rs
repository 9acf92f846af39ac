//! Ramer–Douglas–Peucker polyline simplification.
//!
//! Points are expected in screen coordinates, so `eps` is a distance in
//! pixels. Invalid points (any NaN coordinate) split the polyline: leading
//! and trailing ones are dropped, and each interior run of them is replaced by
//! a single invalid marker so the renderer lifts the pen there.

use crate::types::{Point2, EPS};
use log::debug;

enum Task {
    /// Simplify `points[i..=j]`; `points[i]` is already in the output and
    /// `points[j]` is valid.
    Span(usize, usize),
    Emit(usize),
}

/// Reduces `points` to a sparser polyline that stays within `eps` of the
/// original. The first and last valid points are always kept.
///
/// A negative or NaN `eps` behaves like 0.
pub fn simplify(points: &[Point2], eps: f64) -> Vec<Point2> {
    let eps = eps.max(0.0);
    let Some(first) = points.iter().position(Point2::is_valid) else {
        return Vec::new();
    };
    let last = points
        .iter()
        .rposition(Point2::is_valid)
        .unwrap_or(first);

    let mut out = vec![points[first]];
    let mut stack = vec![Task::Span(first, last)];

    while let Some(task) = stack.pop() {
        let (i, j) = match task {
            Task::Emit(k) => {
                out.push(points[k]);
                continue;
            }
            Task::Span(i, j) => (i, j),
        };
        if j <= i {
            continue;
        }

        if let Some(k) = (i + 1..j).find(|&k| !points[k].is_valid()) {
            // j is valid, so the gap ends before it.
            let resume = (k + 1..=j).find(|&m| points[m].is_valid()).unwrap_or(j);
            stack.push(Task::Span(resume, j));
            stack.push(Task::Emit(resume));
            stack.push(Task::Emit(k));
            stack.push(Task::Span(i, k - 1));
            continue;
        }

        match farthest_from_chord(points, i, j) {
            Some((distance, split)) if distance > eps => {
                stack.push(Task::Span(split, j));
                stack.push(Task::Span(i, split));
            }
            _ => out.push(points[j]),
        }
    }

    debug!("Simplified polyline from {} to {} points.", points.len(), out.len());
    out
}

/// Interior point of `points[i..=j]` farthest from the segment `p_i p_j`,
/// with its distance. `None` if there is no interior point.
fn farthest_from_chord(points: &[Point2], i: usize, j: usize) -> Option<(f64, usize)> {
    if j - i < 2 {
        return None;
    }
    let pi = points[i];
    let x1 = points[j].x - pi.x;
    let y1 = points[j].y - pi.y;
    let den = x1 * x1 + y1 * y1;

    let mut dist = 0.0;
    let mut split = i;
    for (k, pk) in points.iter().enumerate().take(j).skip(i + 1) {
        let mut x0 = pk.x - pi.x;
        let mut y0 = pk.y - pi.y;
        // Degenerate chords measure plain distance to p_i.
        if den >= EPS {
            let lambda = ((x0 * x1 + y0 * y1) / den).clamp(0.0, 1.0);
            x0 -= lambda * x1;
            y0 -= lambda * y1;
        }
        let d = x0 * x0 + y0 * y0;
        if d > dist {
            dist = d;
            split = k;
        }
    }
    Some((dist.sqrt(), split))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2> {
        coords.iter().map(|&c| Point2::from(c)).collect()
    }

    #[test]
    fn straight_line_collapses_to_endpoints() {
        let line: Vec<Point2> = (0..9).map(|i| Point2::new(i as f64, 2.0 * i as f64)).collect();
        let simplified = simplify(&line, 0.0);
        assert_eq!(simplified, vec![line[0], line[8]]);
    }

    #[test]
    fn negative_tolerance_acts_like_zero() {
        let line = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(simplify(&line, -1.0), pts(&[(0.0, 0.0), (2.0, 0.0)]));

        let bent = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        assert_eq!(simplify(&bent, -1.0), bent);
        assert_eq!(simplify(&bent, f64::NAN), bent);
    }

    #[test]
    fn keeps_corner_beyond_tolerance() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (2.0, 2.0)]);
        assert_eq!(simplify(&points, 0.5), pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)]));
        // A generous tolerance cuts the corner.
        assert_eq!(simplify(&points, 2.0), pts(&[(0.0, 0.0), (2.0, 2.0)]));
    }

    #[test]
    fn drops_small_wiggles() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.25), (2.0, -0.25), (3.0, 0.0), (4.0, 8.0)]);
        let simplified = simplify(&points, 0.5);
        assert_eq!(simplified, pts(&[(0.0, 0.0), (3.0, 0.0), (4.0, 8.0)]));
    }

    #[test]
    fn strips_invalid_ends() {
        let points = vec![
            Point2::invalid(),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(f64::NAN, 1.0),
        ];
        assert_eq!(simplify(&points, 0.1), pts(&[(0.0, 0.0), (2.0, 2.0)]));
    }

    #[test]
    fn interior_gap_becomes_one_marker() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::invalid(),
            Point2::invalid(),
            Point2::new(4.0, 4.0),
            Point2::new(5.0, 4.0),
            Point2::new(6.0, 4.0),
        ];
        let simplified = simplify(&points, 0.1);
        assert_eq!(simplified.len(), 5);
        assert_eq!(simplified[0], Point2::new(0.0, 0.0));
        assert_eq!(simplified[1], Point2::new(2.0, 0.0));
        assert!(!simplified[2].is_valid());
        assert_eq!(simplified[3], Point2::new(4.0, 4.0));
        assert_eq!(simplified[4], Point2::new(6.0, 4.0));
    }

    #[test]
    fn degenerate_inputs() {
        assert!(simplify(&[], 1.0).is_empty());
        assert!(simplify(&[Point2::invalid(), Point2::invalid()], 1.0).is_empty());
        assert_eq!(simplify(&pts(&[(3.0, 4.0)]), 1.0), pts(&[(3.0, 4.0)]));
    }

    #[test]
    fn zigzag_keeps_every_point() {
        let zigzag: Vec<Point2> = (0..2001)
            .map(|i| Point2::new(i as f64, if i % 2 == 0 { 0.0 } else { 10.0 }))
            .collect();
        let simplified = simplify(&zigzag, 1.0);
        assert_eq!(simplified.len(), zigzag.len());
        assert_eq!(simplified[simplified.len() - 1], zigzag[zigzag.len() - 1]);
    }
}
