//! Multi-touch gesture to transform engine.
//!
//! Raw touch samples go in through [`GestureController`]; drag offset,
//! rotation and per-axis scale come out, clamped to scale, aspect-ratio and
//! optional containment limits.

pub mod accumulator;
pub mod bounds;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod replay;
pub mod session;
pub mod vector;

pub use accumulator::{DragProposal, Transform};
pub use bounds::{CandidateBox, ReferenceBox};
pub use config::{BoundsMode, Profile, ScaleAccumulation};
pub use error::GestureError;
pub use geometry::Point;
pub use session::{
    EventKind, FinalSnapshot, GestureController, GestureEvent, GestureOutput, MoveSnapshot, Phase,
    StyleRecord,
};
pub use vector::{Direction, PinchVector, VectorClassifier};
