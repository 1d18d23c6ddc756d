//! Touch-pair geometry: angles, axis distances and ratios.

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};

/// A single touch location in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Ordered touches, one per finger, in the input layer's stable order.
pub type TouchSet = Vec<Point>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

fn first_pair<'a>(touches: &'a [Point], op: &'static str) -> Result<(&'a Point, &'a Point)> {
    match touches {
        [a, b, ..] => Ok((a, b)),
        _ => Err(GestureError::InvalidInput {
            op,
            needed: 2,
            got: touches.len(),
        }),
    }
}

/// Angle in degrees of the line from the first touch to the second.
pub fn angle(touches: &[Point]) -> Result<f64> {
    let (a, b) = first_pair(touches, "angle")?;
    Ok((b.y - a.y).atan2(b.x - a.x).to_degrees())
}

pub fn axis_distance(touches: &[Point], axis: Axis) -> Result<f64> {
    let (a, b) = first_pair(touches, "axis_distance")?;
    Ok(match axis {
        Axis::X => (a.x - b.x).abs(),
        Axis::Y => (a.y - b.y).abs(),
    })
}

pub fn diagonal_distance(touches: &[Point]) -> Result<f64> {
    let (a, b) = first_pair(touches, "diagonal_distance")?;
    Ok((a.x - b.x).hypot(a.y - b.y))
}

/// `|current / previous|`, refusing to produce NaN or infinity.
pub fn ratio(current: f64, previous: f64) -> Result<f64> {
    let r = (current / previous).abs();
    if previous == 0.0 || !r.is_finite() {
        return Err(GestureError::DegenerateGeometry { current, previous });
    }
    Ok(r)
}
