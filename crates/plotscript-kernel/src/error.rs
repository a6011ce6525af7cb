//! Kernel errors.

use thiserror::Error;

/// Failures of the kernel itself, as opposed to failures of the programs
/// it runs (those come back as [`KernelOutput::Error`]).
///
/// [`KernelOutput::Error`]: crate::KernelOutput::Error
#[derive(Debug, Error)]
pub enum KernelError {
    /// A command was submitted while no worker was running.
    #[error("interpreter kernel not running")]
    NotRunning,

    /// The worker thread panicked outside of an evaluation.
    #[error("interpreter kernel worker panicked")]
    WorkerPanicked,

    #[error("failed to spawn interpreter kernel worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("invalid kernel configuration: {0}")]
    Config(#[from] serde_json::Error),
}
