//! Errors raised by the gesture engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    #[error("invalid input: {op} needs at least {needed} touches, got {got}")]
    InvalidInput {
        op: &'static str,
        needed: usize,
        got: usize,
    },
    #[error("reference box is not known yet; supply it at gesture start or via set_reference_box")]
    UninitializedReferenceBox,
    #[error("degenerate geometry: cannot take the ratio {current} / {previous}")]
    DegenerateGeometry { current: f64, previous: f64 },
    #[error("no gesture in progress")]
    NoActiveSession,
    #[error("touch set is empty")]
    EmptyTouchSet,
}

pub type Result<T> = std::result::Result<T, GestureError>;
