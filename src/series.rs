// 2.0: plain numeric series handed to the rendering layer.
// points are the source of truth; path strings are a convenience built from them.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| start + step * i as f64)
}

/// Samples `f` at `n` evenly spaced points across `[start, end]`.
pub fn sample(start: f64, end: f64, n: usize, mut f: impl FnMut(f64) -> f64) -> Vec<Point> {
    linspace(start, end, n).map(|x| Point::new(x, f(x))).collect()
}

// 2.1: data space → pixel space. y is flipped so larger values draw higher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(x_range: (f64, f64), y_range: (f64, f64), width: f64, height: f64) -> Self {
        Self {
            x_min: x_range.0,
            x_max: x_range.1,
            y_min: y_range.0,
            y_max: y_range.1,
            width,
            height,
        }
    }

    /// Tight box around `points`. Flat ranges are widened by one unit so mapping stays finite.
    pub fn fit(points: &[Point], width: f64, height: f64) -> Self {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        if points.is_empty() {
            return Self::new((0.0, 1.0), (0.0, 1.0), width, height);
        }
        if x_max - x_min <= 0.0 {
            x_max = x_min + 1.0;
        }
        if y_max - y_min <= 0.0 {
            y_max = y_min + 1.0;
        }
        Self::new((x_min, x_max), (y_min, y_max), width, height)
    }

    pub fn map(&self, p: Point) -> Point {
        let x_span = self.x_max - self.x_min;
        let y_span = self.y_max - self.y_min;
        let px = if x_span > 0.0 {
            (p.x - self.x_min) / x_span * self.width
        } else {
            0.0
        };
        let py = if y_span > 0.0 {
            self.height - (p.y - self.y_min) / y_span * self.height
        } else {
            self.height
        };
        Point::new(px, py)
    }
}

/// SVG style path: `M x y L x y ...`. Empty input gives an empty string.
pub fn svg_path(points: &[Point], viewport: &Viewport) -> String {
    let mut out = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        let m = viewport.map(*p);
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            out.push(' ');
        }
        // writing into a String cannot fail
        let _ = write!(out, "{} {:.2} {:.2}", cmd, m.x, m.y);
    }
    out
}
