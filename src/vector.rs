//! Classifies how a touch pair changed between two snapshots.

use log::trace;
use serde::Serialize;

use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::geometry::{self, Axis, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Vertical,
    Horizontal,
    Diagonal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinchVector {
    pub small: bool,
    pub direction: Direction,
    /// Ratios are `None` when the earlier distance was zero.
    pub scale_diagonal: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct VectorClassifier {
    min_movement: f64,
    tan_v: f64,
    tan_h: f64,
}

impl VectorClassifier {
    pub fn new(cfg: &ClassifierConfig) -> Self {
        Self {
            min_movement: cfg.min_movement,
            tan_v: (90.0 - cfg.vh_degrees).to_radians().tan(),
            tan_h: cfg.vh_degrees.to_radians().tan(),
        }
    }

    pub fn classify(&self, previous: &[Point], current: &[Point]) -> Result<PinchVector> {
        let v1 = geometry::axis_distance(previous, Axis::Y)?;
        let v2 = geometry::axis_distance(current, Axis::Y)?;
        let h1 = geometry::axis_distance(previous, Axis::X)?;
        let h2 = geometry::axis_distance(current, Axis::X)?;
        let d1 = geometry::diagonal_distance(previous)?;
        let d2 = geometry::diagonal_distance(current)?;

        let v_delta = v2 - v1;
        let h_delta = h2 - h1;
        let movement = v_delta.abs().max(h_delta.abs());

        let mut out = PinchVector {
            small: true,
            direction: Direction::Diagonal,
            scale_diagonal: geometry::ratio(d2, d1).ok(),
            scale_x: geometry::ratio(h2, h1).ok(),
            scale_y: geometry::ratio(v2, v1).ok(),
        };

        if movement > self.min_movement {
            out.small = false;
            // h_delta == 0 here implies a purely vertical change
            let tan_theta = if h_delta == 0.0 {
                f64::INFINITY
            } else {
                (v_delta / h_delta).abs()
            };
            if tan_theta > self.tan_v {
                out.direction = Direction::Vertical;
            } else if tan_theta < self.tan_h {
                out.direction = Direction::Horizontal;
            }
        }

        trace!(
            "pinch vector: v {v1:.1}->{v2:.1} h {h1:.1}->{h2:.1} movement {movement:.1} => {:?}",
            out
        );
        Ok(out)
    }
}

impl Default for VectorClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}
