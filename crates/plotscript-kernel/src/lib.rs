//! Plotscript kernel: runs an [`Interpreter`](plotscript_eval::Interpreter)
//! on a worker thread behind command, result and interrupt queues.
//!
//! ```no_run
//! use plotscript_kernel::{Kernel, KernelConfig};
//!
//! let mut kernel = Kernel::new(KernelConfig::default())?;
//! let out = kernel.eval("(+ 1 2)")?;
//! println!("{out}");
//! kernel.stop()?;
//! # Ok::<(), plotscript_kernel::KernelError>(())
//! ```

pub mod config;
pub mod error;
pub mod kernel;
pub mod output;

pub use config::{KernelConfig, DEFAULT_THREAD_NAME};
pub use error::KernelError;
pub use kernel::{InterruptHandle, Kernel};
pub use output::{KernelOutput, PARSE_FAILURE};
