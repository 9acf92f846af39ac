//! Definite integrals: composite Newton–Cotes quadrature and Riemann sums.

use crate::error::{NumericsError, Result};
use crate::traits::RealFunction;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sub-samples per rectangle used to estimate its extremum for
/// [`RiemannKind::Lower`] and [`RiemannKind::Upper`].
pub const RIEMANN_SUBSAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuadratureRule {
    Trapezoid,
    Simpson,
    Milne,
}

impl FromStr for QuadratureRule {
    type Err = NumericsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trapezoid" | "trapez" => Ok(QuadratureRule::Trapezoid),
            "simpson" => Ok(QuadratureRule::Simpson),
            "milne" => Ok(QuadratureRule::Milne),
            _ => Err(NumericsError::InvalidArgument(format!(
                "unknown quadrature rule '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureSettings {
    /// Number of sub-intervals; the rule evaluates `node_count + 1` points.
    pub node_count: usize,
    pub rule: QuadratureRule,
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self {
            node_count: 28,
            rule: QuadratureRule::Milne,
        }
    }
}

/// Integrates `f` over `interval` with the composite rule in `settings`.
///
/// Simpson's rule needs an even node count, Milne's rule a multiple of four.
pub fn quadrature<F: RealFunction + ?Sized>(
    interval: (f64, f64),
    f: &F,
    settings: &QuadratureSettings,
) -> Result<f64> {
    let n = settings.node_count;
    if n == 0 {
        return Err(NumericsError::InvalidArgument(
            "quadrature needs at least one node".to_string(),
        ));
    }
    match settings.rule {
        QuadratureRule::Trapezoid => Ok(trapezoid(interval, f, n)),
        QuadratureRule::Simpson if n % 2 != 0 => Err(NumericsError::InvalidNodeCount {
            rule: "Simpson",
            requirement: "an even node count",
            node_count: n,
        }),
        QuadratureRule::Simpson => Ok(simpson(interval, f, n)),
        QuadratureRule::Milne if n % 4 != 0 => Err(NumericsError::InvalidNodeCount {
            rule: "Milne",
            requirement: "a node count divisible by 4",
            node_count: n,
        }),
        QuadratureRule::Milne => Ok(milne(interval, f, n)),
    }
}

/// Milne's rule with 16 nodes, a reasonable default for smooth integrands.
pub fn integrate<F: RealFunction + ?Sized>(interval: (f64, f64), f: &F) -> f64 {
    milne(interval, f, 16)
}

fn trapezoid<F: RealFunction + ?Sized>((a, b): (f64, f64), f: &F, n: usize) -> f64 {
    let h = (b - a) / n as f64;
    let inner: f64 = (1..n).map(|i| f.value(a + i as f64 * h)).sum();
    (0.5 * (f.value(a) + f.value(b)) + inner) * h
}

fn simpson<F: RealFunction + ?Sized>((a, b): (f64, f64), f: &F, n: usize) -> f64 {
    let h = (b - a) / n as f64;
    let sum: f64 = (1..n)
        .map(|i| {
            let weight = if i % 2 == 0 { 2.0 } else { 4.0 };
            weight * f.value(a + i as f64 * h)
        })
        .sum();
    (f.value(a) + f.value(b) + sum) * h / 3.0
}

fn milne<F: RealFunction + ?Sized>((a, b): (f64, f64), f: &F, n: usize) -> f64 {
    let h = (b - a) / n as f64;
    let sum: f64 = (1..n)
        .map(|i| {
            let weight = match i % 4 {
                0 => 14.0,
                2 => 12.0,
                _ => 32.0,
            };
            weight * f.value(a + i as f64 * h)
        })
        .sum();
    (7.0 * (f.value(a) + f.value(b)) + sum) * 2.0 * h / 45.0
}

/// How the height of each Riemann rectangle is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiemannKind {
    Left,
    Right,
    Middle,
    /// Smallest sampled value on the sub-interval.
    Lower,
    /// Largest sampled value on the sub-interval.
    Upper,
    /// Trapezoids instead of rectangles.
    Trapezoidal,
    /// Simpson average of left, middle and right values.
    Simpson,
    /// Value at a uniformly random point of the sub-interval.
    Random,
}

impl FromStr for RiemannKind {
    type Err = NumericsError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "left" => RiemannKind::Left,
            "right" => RiemannKind::Right,
            "middle" => RiemannKind::Middle,
            "lower" => RiemannKind::Lower,
            "upper" => RiemannKind::Upper,
            "trapezoidal" => RiemannKind::Trapezoidal,
            "simpson" => RiemannKind::Simpson,
            "random" => RiemannKind::Random,
            _ => {
                return Err(NumericsError::InvalidArgument(format!(
                    "unknown Riemann sum type '{s}'"
                )))
            }
        };
        Ok(kind)
    }
}

/// Outline of the rectangles of a Riemann sum, ready to be drawn as one
/// polyline, together with the sum itself.
///
/// Starts at `(start, 0)`; each rectangle adds its top-left, top-right and
/// bottom-right corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiemannOutline {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub sum: f64,
}

/// Heights at the left and right edge of the rectangle `[x, x + delta]`.
/// They differ only for trapezoids.
fn edge_heights<F, R>(f: &F, x: f64, delta: f64, kind: RiemannKind, rng: &mut R) -> (f64, f64)
where
    F: RealFunction + ?Sized,
    R: Rng,
{
    let flat = |y: f64| (y, y);
    match kind {
        RiemannKind::Left => flat(f.value(x)),
        RiemannKind::Right => flat(f.value(x + delta)),
        RiemannKind::Middle => flat(f.value(x + 0.5 * delta)),
        RiemannKind::Lower => flat(sampled(f, x, delta).fold(f64::INFINITY, f64::min)),
        RiemannKind::Upper => flat(sampled(f, x, delta).fold(f64::NEG_INFINITY, f64::max)),
        RiemannKind::Trapezoidal => (f.value(x), f.value(x + delta)),
        RiemannKind::Simpson => flat(
            (f.value(x) + 4.0 * f.value(x + 0.5 * delta) + f.value(x + delta)) / 6.0,
        ),
        RiemannKind::Random => flat(f.value(x + delta * rng.random::<f64>())),
    }
}

/// `f` at the left end and at `RIEMANN_SUBSAMPLES` evenly spaced points up to
/// and including the right end.
fn sampled<'a, F: RealFunction + ?Sized>(
    f: &'a F,
    x: f64,
    delta: f64,
) -> impl Iterator<Item = f64> + 'a {
    (0..=RIEMANN_SUBSAMPLES)
        .map(move |i| f.value(x + delta * (i as f64 / RIEMANN_SUBSAMPLES as f64)))
}

/// Rectangle outline and sum for `n` rectangles of the given kind over `[start, end]`.
pub fn riemann<F: RealFunction + ?Sized>(
    f: &F,
    n: usize,
    kind: RiemannKind,
    start: f64,
    end: f64,
) -> RiemannOutline {
    let mut xs = Vec::with_capacity(1 + 3 * n);
    let mut ys = Vec::with_capacity(1 + 3 * n);
    xs.push(start);
    ys.push(0.0);

    let mut sum = 0.0;
    if n > 0 {
        let mut rng = rand::rng();
        let delta = (end - start) / n as f64;
        for i in 0..n {
            let x = start + i as f64 * delta;
            let right = start + (i + 1) as f64 * delta;
            let (left_height, right_height) = edge_heights(f, x, delta, kind, &mut rng);

            xs.extend_from_slice(&[x, right, right]);
            ys.extend_from_slice(&[left_height, right_height, 0.0]);
            sum += 0.5 * (left_height + right_height) * delta;
        }
    }

    RiemannOutline { xs, ys, sum }
}

/// The value of the Riemann sum [`riemann`] would draw.
pub fn riemann_sum<F: RealFunction + ?Sized>(
    f: &F,
    n: usize,
    kind: RiemannKind,
    start: f64,
    end: f64,
) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let mut rng = rand::rng();
    let delta = (end - start) / n as f64;
    (0..n)
        .map(|i| {
            let x = start + i as f64 * delta;
            let (left_height, right_height) = edge_heights(f, x, delta, kind, &mut rng);
            0.5 * (left_height + right_height) * delta
        })
        .sum()
}
