//! Gesture lifecycle: start / move / end, lifecycle notifications and the
//! snapshots handed back to the host.

use log::{debug, warn};
use serde::Serialize;

use crate::accumulator::{DragFilter, DragProposal, SessionState, Transform, TransformAccumulator};
use crate::bounds::{CandidateBox, ReferenceBox};
use crate::config::Profile;
use crate::error::{GestureError, Result};
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Move,
    MultiTouch,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    Change,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GestureEvent {
    pub kind: EventKind,
    pub phase: Phase,
}

impl GestureEvent {
    pub const fn new(kind: EventKind, phase: Phase) -> Self {
        Self { kind, phase }
    }
}

/// Live transform as the host should render it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveSnapshot {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation_deg: f64,
}

impl From<&Transform> for MoveSnapshot {
    fn from(t: &Transform) -> Self {
        Self {
            left: t.left(),
            top: t.top(),
            scale_x: t.scale_x,
            scale_y: t.scale_y,
            rotation_deg: t.rotation_deg,
        }
    }
}

/// Absolute box of the element once a gesture has ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalSnapshot {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl From<CandidateBox> for FinalSnapshot {
    fn from(b: CandidateBox) -> Self {
        Self {
            left: b.left,
            top: b.top,
            width: b.width,
            height: b.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleTransform {
    Rotate(String),
    ScaleX(f64),
    ScaleY(f64),
}

/// `{left, top, transform: [{rotate}, {scaleX}, {scaleY}]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleRecord {
    pub left: f64,
    pub top: f64,
    pub transform: Vec<StyleTransform>,
}

impl From<&Transform> for StyleRecord {
    fn from(t: &Transform) -> Self {
        Self {
            left: t.left(),
            top: t.top(),
            transform: vec![
                StyleTransform::Rotate(format!("{}deg", t.rotation_deg)),
                StyleTransform::ScaleX(t.scale_x),
                StyleTransform::ScaleY(t.scale_y),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureOutput<S> {
    pub snapshot: S,
    pub style: StyleRecord,
    pub events: Vec<GestureEvent>,
}

pub type Listener = Box<dyn FnMut(&GestureEvent, &StyleRecord)>;

#[derive(Debug)]
struct ActiveGesture {
    state: SessionState,
    multi_touch: bool,
    rotating: bool,
    scaling: bool,
}

/// Owns the committed transform and at most one in-flight gesture.
pub struct GestureController {
    acc: TransformAccumulator,
    reference: Option<ReferenceBox>,
    active: Option<ActiveGesture>,
    previous: Transform,
    listeners: Vec<Listener>,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(&Profile::default())
    }
}

impl GestureController {
    pub fn new(profile: &Profile) -> Self {
        Self {
            acc: TransformAccumulator::new(profile),
            reference: None,
            active: None,
            previous: Transform::default(),
            listeners: Vec::new(),
        }
    }

    pub fn transform(&self) -> &Transform {
        self.acc.transform()
    }

    /// Transform as it was when the most recent gesture started.
    pub fn previous_transform(&self) -> &Transform {
        &self.previous
    }

    pub fn reference_box(&self) -> Option<&ReferenceBox> {
        self.reference.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.active.as_ref().map(|g| &g.state)
    }

    /// Supply the element box measured by the host. Zero-sized boxes are
    /// ignored. An open gesture that started before any box was known adopts
    /// this one; a gesture that already has a box keeps it.
    pub fn set_reference_box(&mut self, r: ReferenceBox) {
        if r.is_measured() {
            self.reference = Some(r);
            if let Some(gesture) = self.active.as_mut() {
                gesture.state.initial_box.get_or_insert(r);
            }
        } else {
            warn!("ignoring unmeasured reference box {r:?}");
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GestureEvent, &StyleRecord) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_drag_filter(&mut self, filter: impl Fn(&DragProposal) -> bool + 'static) {
        self.acc.set_drag_filter(Some(Box::new(filter) as DragFilter));
    }

    pub fn clear_drag_filter(&mut self) {
        self.acc.set_drag_filter(None);
    }

    pub fn on_gesture_start(
        &mut self,
        touches: &[Point],
        reference: Option<ReferenceBox>,
    ) -> Result<GestureOutput<MoveSnapshot>> {
        if touches.is_empty() {
            return Err(GestureError::EmptyTouchSet);
        }
        if let Some(r) = reference {
            self.set_reference_box(r);
        }
        if self.active.is_some() {
            debug!("gesture started while another was open; abandoning the old one");
            self.abandon();
        }

        self.previous = *self.acc.transform();
        let state = self.acc.begin(touches.to_vec(), self.reference);
        let multi_touch = touches.len() > 1;
        self.active = Some(ActiveGesture {
            state,
            multi_touch,
            rotating: false,
            scaling: false,
        });
        debug!("gesture start: {} touch(es)", touches.len());

        let mut events = vec![GestureEvent::new(EventKind::Move, Phase::Start)];
        if multi_touch {
            events.push(GestureEvent::new(EventKind::MultiTouch, Phase::Start));
        }
        Ok(self.emit(MoveSnapshot::from(self.acc.transform()), events))
    }

    /// `raw_delta` is the displacement of the gesture since it started, as
    /// reported by the host's pan tracking.
    pub fn on_gesture_move(
        &mut self,
        touches: &[Point],
        raw_delta: Point,
    ) -> Result<GestureOutput<MoveSnapshot>> {
        let gesture = self.active.as_mut().ok_or(GestureError::NoActiveSession)?;
        if touches.is_empty() {
            return Err(GestureError::EmptyTouchSet);
        }

        let mut events = Vec::new();
        let mut multi_started = false;
        if touches.len() > 1 && !gesture.multi_touch {
            gesture.multi_touch = true;
            multi_started = true;
            events.push(GestureEvent::new(EventKind::MultiTouch, Phase::Start));
        }

        let mut failure = None;
        if touches.len() != gesture.state.initial_touches.len() {
            debug!(
                "touch count {} -> {}; reseeding",
                gesture.state.initial_touches.len(),
                touches.len()
            );
            self.acc.reseed(&mut gesture.state, touches.to_vec());
        } else if touches.len() == 1 {
            if let Err(e) = self.acc.apply_drag(&gesture.state, raw_delta) {
                failure = Some(e);
            }
        } else {
            let behavior = self.acc.behavior().clone();
            if behavior.scalable {
                match self.acc.apply_scale(&mut gesture.state, touches) {
                    Ok(_) => {
                        events.push(lifecycle(EventKind::Scale, &mut gesture.scaling));
                    }
                    Err(e) => failure = Some(e),
                }
            }
            if behavior.rotatable {
                match self.acc.apply_rotation(&mut gesture.state, touches) {
                    Ok(_) => {
                        events.push(lifecycle(EventKind::Rotate, &mut gesture.rotating));
                    }
                    Err(e) => debug!("rotation skipped: {e}"),
                }
            }
        }

        if gesture.multi_touch && !multi_started {
            events.push(GestureEvent::new(EventKind::MultiTouch, Phase::Change));
        }
        events.push(GestureEvent::new(EventKind::Move, Phase::Change));

        let out = self.emit(MoveSnapshot::from(self.acc.transform()), events);
        match failure {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    /// Folds the running drag into the committed offset and closes the
    /// session. Without an open session the committed transform is reported
    /// unchanged and no events fire.
    pub fn on_gesture_end(&mut self) -> Result<GestureOutput<FinalSnapshot>> {
        let mut events = Vec::new();
        let mut measured_against = self.reference;
        if let Some(gesture) = self.active.take() {
            if gesture.state.initial_box.is_some() {
                measured_against = gesture.state.initial_box;
            }
            events.push(GestureEvent::new(EventKind::Move, Phase::End));
            if gesture.rotating {
                events.push(GestureEvent::new(EventKind::Rotate, Phase::End));
            }
            if gesture.scaling {
                events.push(GestureEvent::new(EventKind::Scale, Phase::End));
            }
            if gesture.multi_touch {
                events.push(GestureEvent::new(EventKind::MultiTouch, Phase::End));
            }
            self.acc.finish(gesture.state);
            let t = self.acc.transform();
            debug!(
                "gesture end: move ({:.1}, {:.1}) scale ({:.3}, {:.3}) rotate {:.1}",
                t.move_x, t.move_y, t.scale_x, t.scale_y, t.rotation_deg
            );
        }

        let final_box = measured_against
            .map(|r| CandidateBox::from_transform(self.acc.transform(), &r));
        let style = StyleRecord::from(self.acc.transform());
        self.notify(&events, &style);
        let snapshot = final_box
            .map(FinalSnapshot::from)
            .ok_or(GestureError::UninitializedReferenceBox)?;
        Ok(GestureOutput {
            snapshot,
            style,
            events,
        })
    }

    /// Drop the open session, if any, without committing its drag.
    pub fn abandon(&mut self) {
        if let Some(gesture) = self.active.take() {
            debug!("gesture abandoned");
            self.acc.discard(gesture.state);
        }
    }

    /// Restore `snapshot` as the committed transform. Committed transforms
    /// carry no running drag, so a non-zero `dx`/`dy` is folded into the move
    /// offset (`left`/`top` are unchanged). Scales are clamped into the
    /// profile's limits.
    pub fn reset(&mut self, snapshot: &Transform) -> StyleRecord {
        self.abandon();
        let t = self.acc.restore(*snapshot);
        StyleRecord::from(&t)
    }

    /// Roll back to the transform from before the most recent gesture.
    pub fn restore_previous(&mut self) -> Transform {
        let prev = self.previous;
        self.reset(&prev);
        prev
    }

    fn emit<S>(&mut self, snapshot: S, events: Vec<GestureEvent>) -> GestureOutput<S> {
        let style = StyleRecord::from(self.acc.transform());
        self.notify(&events, &style);
        GestureOutput {
            snapshot,
            style,
            events,
        }
    }

    fn notify(&mut self, events: &[GestureEvent], style: &StyleRecord) {
        for ev in events {
            for l in self.listeners.iter_mut() {
                l(ev, style);
            }
        }
    }
}

fn lifecycle(kind: EventKind, started: &mut bool) -> GestureEvent {
    if *started {
        GestureEvent::new(kind, Phase::Change)
    } else {
        *started = true;
        GestureEvent::new(kind, Phase::Start)
    }
}
