//! Drive a recorded touch trace through a [`GestureController`].

use anyhow::{Result, anyhow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::accumulator::Transform;
use crate::bounds::ReferenceBox;
use crate::config::Profile;
use crate::geometry::{Point, TouchSet};
use crate::session::{FinalSnapshot, GestureController, GestureEvent, MoveSnapshot, StyleRecord};

#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub reference_box: Option<ReferenceBox>,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Sample {
    Start {
        touches: TouchSet,
        #[serde(default)]
        reference_box: Option<ReferenceBox>,
    },
    Move {
        touches: TouchSet,
        /// Displacement since start; derived from the first touch when absent.
        #[serde(default)]
        delta: Option<Point>,
    },
    End,
    Abandon,
}

impl Sample {
    fn phase(&self) -> &'static str {
        match self {
            Sample::Start { .. } => "start",
            Sample::Move { .. } => "move",
            Sample::End => "end",
            Sample::Abandon => "abandon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Move(MoveSnapshot),
    Final(FinalSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub index: usize,
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,
    pub events: Vec<GestureEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub records: Vec<SampleRecord>,
    pub transform: Transform,
}

pub fn load_trace(path: &Path) -> Result<Trace> {
    let txt = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))
}

/// Sample errors are recorded per sample; they never stop the replay.
pub fn replay(trace: &Trace, profile: &Profile) -> ReplayReport {
    let mut ctl = GestureController::new(profile);
    if let Some(r) = trace.reference_box {
        ctl.set_reference_box(r);
    }

    let mut origin: Option<Point> = None;
    let mut records = Vec::with_capacity(trace.samples.len());

    for (index, sample) in trace.samples.iter().enumerate() {
        let mut rec = SampleRecord {
            index,
            phase: sample.phase(),
            snapshot: None,
            style: None,
            events: Vec::new(),
            error: None,
        };

        let result = match sample {
            Sample::Start {
                touches,
                reference_box,
            } => {
                origin = touches.first().copied();
                ctl.on_gesture_start(touches, *reference_box)
                    .map(|o| (Snapshot::Move(o.snapshot), o.style, o.events))
            }
            Sample::Move { touches, delta } => {
                let raw = delta.unwrap_or_else(|| match (origin, touches.first()) {
                    (Some(o), Some(p)) => Point::new(p.x - o.x, p.y - o.y),
                    _ => Point::default(),
                });
                ctl.on_gesture_move(touches, raw)
                    .map(|o| (Snapshot::Move(o.snapshot), o.style, o.events))
            }
            Sample::End => {
                origin = None;
                ctl.on_gesture_end()
                    .map(|o| (Snapshot::Final(o.snapshot), o.style, o.events))
            }
            Sample::Abandon => {
                origin = None;
                ctl.abandon();
                Ok((
                    Snapshot::Move(MoveSnapshot::from(ctl.transform())),
                    StyleRecord::from(ctl.transform()),
                    Vec::new(),
                ))
            }
        };

        match result {
            Ok((snapshot, style, events)) => {
                rec.snapshot = Some(snapshot);
                rec.style = Some(style);
                rec.events = events;
            }
            Err(e) => {
                warn!("sample {index} ({}): {e}", rec.phase);
                rec.error = Some(e.to_string());
            }
        }
        records.push(rec);
    }

    if ctl.is_active() {
        info!("trace ended with a gesture still open");
    }

    ReplayReport {
        records,
        transform: *ctl.transform(),
    }
}
