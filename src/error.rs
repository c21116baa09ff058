//! Recoverable failures.
//!
//! Almost every operation in this crate either succeeds, reports a soft
//! failure through a `bool`, or treats misuse as a fatal precondition.
//! The few operations that hand back a `Result` use `ContainerError`.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// A non-overwriting ring buffer rejected a value because it is full.
    #[error("ring buffer is full ({capacity} slots)")]
    RingFull { capacity: usize },
    /// A pool key no longer refers to a live object.
    #[error("pool key does not refer to a live object")]
    StaleKey,
}
