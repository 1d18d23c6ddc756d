//! Cumulative transform state and the per-sample update rules for drag,
//! pinch-scale and rotation.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::bounds::{CandidateBox, ReferenceBox};
use crate::config::{Behavior, BoundsMode, Limits, Profile, ScaleAccumulation};
use crate::error::{GestureError, Result};
use crate::geometry::{self, Point, TouchSet};
use crate::vector::{Direction, VectorClassifier};

/// Committed transform. `dx`/`dy` hold the running drag of the current
/// gesture until it is folded into `move_x`/`move_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub move_x: f64,
    pub move_y: f64,
    pub dx: f64,
    pub dy: f64,
    pub rotation_deg: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            move_x: 0.0,
            move_y: 0.0,
            dx: 0.0,
            dy: 0.0,
            rotation_deg: 0.0,
        }
    }
}

impl Transform {
    pub fn left(&self) -> f64 {
        self.move_x + self.dx
    }

    pub fn top(&self) -> f64 {
        self.move_y + self.dy
    }

    pub fn fold_drag(&mut self) {
        self.move_x += self.dx;
        self.move_y += self.dy;
        self.dx = 0.0;
        self.dy = 0.0;
    }
}

/// Per-gesture bookkeeping, alive from touch start to touch end.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) initial_touches: TouchSet,
    pub(crate) initial_box: Option<ReferenceBox>,
    pub(crate) prev_angle: f64,
    pub(crate) direction: Option<Direction>,
    pub(crate) base_scale_x: f64,
    pub(crate) base_scale_y: f64,
}

impl SessionState {
    pub fn initial_touches(&self) -> &[Point] {
        &self.initial_touches
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }
}

/// Position the host would apply if a drag proposal is accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragProposal {
    pub left: f64,
    pub top: f64,
}

pub type DragFilter = Box<dyn Fn(&DragProposal) -> bool>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleOutcome {
    pub scale_x: f64,
    pub scale_y: f64,
    pub changed: bool,
}

pub struct TransformAccumulator {
    limits: Limits,
    behavior: Behavior,
    classifier: VectorClassifier,
    transform: Transform,
    drag_filter: Option<DragFilter>,
}

impl TransformAccumulator {
    pub fn new(profile: &Profile) -> Self {
        Self {
            limits: profile.limits.clone(),
            behavior: profile.behavior.clone(),
            classifier: VectorClassifier::new(&profile.classifier),
            transform: Transform::default(),
            drag_filter: None,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Commit `t` as-is apart from folding its running drag and clamping
    /// its scale into the limits.
    pub(crate) fn restore(&mut self, mut t: Transform) -> Transform {
        let (min, max) = (self.limits.min_scale, self.limits.max_scale);
        if !(min..=max).contains(&t.scale_x) || !(min..=max).contains(&t.scale_y) {
            debug!(
                "restored scale ({:.3}, {:.3}) clamped into [{min}, {max}]",
                t.scale_x, t.scale_y
            );
        }
        t.scale_x = clamp_scale(t.scale_x, min, max);
        t.scale_y = clamp_scale(t.scale_y, min, max);
        t.fold_drag();
        self.transform = t;
        t
    }

    pub fn set_drag_filter(&mut self, filter: Option<DragFilter>) {
        self.drag_filter = filter;
    }

    pub fn begin(&self, touches: TouchSet, initial_box: Option<ReferenceBox>) -> SessionState {
        let (base_scale_x, base_scale_y) = match self.behavior.scale_accumulation {
            ScaleAccumulation::Compound => (self.transform.scale_x, self.transform.scale_y),
            ScaleAccumulation::PerGesture => (1.0, 1.0),
        };
        SessionState {
            initial_touches: touches,
            initial_box,
            prev_angle: 0.0,
            direction: None,
            base_scale_x,
            base_scale_y,
        }
    }

    /// Measure later samples from `touches` without disturbing what is
    /// already committed: rotation and scale continue from their live values.
    pub fn reseed(&self, session: &mut SessionState, touches: TouchSet) {
        session.initial_touches = touches;
        session.prev_angle = 0.0;
        session.base_scale_x = self.transform.scale_x;
        session.base_scale_y = self.transform.scale_y;
    }

    /// Pinch-scale step. Candidates that break the aspect or containment
    /// limits are dropped and the previously committed scale is kept.
    pub fn apply_scale(
        &mut self,
        session: &mut SessionState,
        touches: &[Point],
    ) -> Result<ScaleOutcome> {
        let r = session
            .initial_box
            .ok_or(GestureError::UninitializedReferenceBox)?;
        let v = self.classifier.classify(&session.initial_touches, touches)?;

        let (mut ratio_x, mut ratio_y) = (None, None);
        if v.small {
            if self.behavior.relock_on_small {
                session.direction = None;
            }
        } else {
            let dir = *session.direction.get_or_insert(v.direction);
            match dir {
                Direction::Diagonal => {
                    ratio_x = v.scale_diagonal;
                    ratio_y = v.scale_diagonal;
                }
                Direction::Vertical => ratio_y = v.scale_y,
                Direction::Horizontal => ratio_x = v.scale_x,
            }
            if ratio_x.is_none() && ratio_y.is_none() {
                debug!("degenerate touch geometry along {dir:?}; scale unchanged");
            }
        }

        let prev_x = self.transform.scale_x;
        let prev_y = self.transform.scale_y;
        let (min, max) = (self.limits.min_scale, self.limits.max_scale);
        let mut sx = ratio_x.map_or(prev_x, |k| (k * session.base_scale_x).clamp(min, max));
        let mut sy = ratio_y.map_or(prev_y, |k| (k * session.base_scale_y).clamp(min, max));

        if sx != prev_x || sy != prev_y {
            let candidate = Transform {
                scale_x: sx,
                scale_y: sy,
                ..self.transform
            };
            let b = CandidateBox::from_transform(&candidate, &r);
            if !b.aspect_within(self.limits.min_aspect, self.limits.max_aspect) {
                debug!(
                    "rejecting scale ({sx:.3}, {sy:.3}): aspect ratio {:.3} out of range",
                    b.aspect_ratio
                );
                sx = prev_x;
                sy = prev_y;
            } else if self.behavior.bounds == BoundsMode::ClampToReference {
                if !b.fits_horizontally(&r) {
                    debug!("rejecting scale_x {sx:.3}: box leaves reference horizontally");
                    sx = prev_x;
                }
                if !b.fits_vertically(&r) {
                    debug!("rejecting scale_y {sy:.3}: box leaves reference vertically");
                    sy = prev_y;
                }
                // reverting one axis can break the aspect bound on its own
                let kept = Transform {
                    scale_x: sx,
                    scale_y: sy,
                    ..self.transform
                };
                if !CandidateBox::from_transform(&kept, &r)
                    .aspect_within(self.limits.min_aspect, self.limits.max_aspect)
                {
                    sx = prev_x;
                    sy = prev_y;
                }
            }
        }

        self.transform.scale_x = sx;
        self.transform.scale_y = sy;
        Ok(ScaleOutcome {
            scale_x: sx,
            scale_y: sy,
            changed: sx != prev_x || sy != prev_y,
        })
    }

    /// Rotation step; returns the change in degrees applied this sample.
    pub fn apply_rotation(&mut self, session: &mut SessionState, touches: &[Point]) -> Result<f64> {
        let current = geometry::angle(touches)?;
        let initial = if session.initial_touches.len() > 1 {
            geometry::angle(&session.initial_touches)?
        } else {
            current
        };
        let new_angle = current - initial;
        let diff = wrap_degrees(session.prev_angle - new_angle);
        self.transform.rotation_deg -= diff;
        session.prev_angle = new_angle;
        Ok(-diff)
    }

    /// Drag step. `raw` is the displacement since the gesture began.
    /// Returns `false` when the host's drag filter vetoed the proposal.
    pub fn apply_drag(&mut self, session: &SessionState, raw: Point) -> Result<bool> {
        let mut dx = if self.behavior.draggable.x() { raw.x } else { 0.0 };
        let mut dy = if self.behavior.draggable.y() { raw.y } else { 0.0 };

        if self.behavior.bounds == BoundsMode::ClampToReference {
            let r = session
                .initial_box
                .ok_or(GestureError::UninitializedReferenceBox)?;
            let candidate = Transform {
                dx,
                dy,
                ..self.transform
            };
            let b = CandidateBox::from_transform(&candidate, &r);
            if !b.fits_horizontally(&r) {
                trace!("drag dx {dx:.2} leaves reference; keeping {:.2}", self.transform.dx);
                dx = self.transform.dx;
            }
            if !b.fits_vertically(&r) {
                trace!("drag dy {dy:.2} leaves reference; keeping {:.2}", self.transform.dy);
                dy = self.transform.dy;
            }
        }

        if let Some(filter) = &self.drag_filter {
            let proposal = DragProposal {
                left: self.transform.move_x + dx,
                top: self.transform.move_y + dy,
            };
            if !filter(&proposal) {
                return Ok(false);
            }
        }

        self.transform.dx = dx;
        self.transform.dy = dy;
        Ok(true)
    }

    pub fn finish(&mut self, _session: SessionState) {
        self.transform.fold_drag();
    }

    pub fn discard(&mut self, _session: SessionState) {
        self.transform.dx = 0.0;
        self.transform.dy = 0.0;
    }
}

fn clamp_scale(s: f64, min: f64, max: f64) -> f64 {
    if s.is_nan() {
        1.0f64.clamp(min, max)
    } else {
        s.clamp(min, max)
    }
}

/// Map an angle difference into (-180, 180].
fn wrap_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}
