//! Kernel configuration.

use crate::error::KernelError;
use plotscript_eval::EvalConfig;
use serde::{Deserialize, Serialize};

/// Name given to the worker thread unless configured otherwise.
pub const DEFAULT_THREAD_NAME: &str = "plotscript-kernel";

/// Settings for the worker thread and the interpreter it owns.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use plotscript_kernel::KernelConfig;
///
/// let config = KernelConfig::from_json(r#"{ "eval": { "max_depth": 64 } }"#).unwrap();
/// assert_eq!(config.eval.max_depth, 64);
/// assert_eq!(config.thread_name, "plotscript-kernel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub thread_name: String,
    /// Worker stack size in bytes; the platform default when unset.
    pub stack_size: Option<usize>,
    pub eval: EvalConfig,
}

impl KernelConfig {
    pub fn from_json(text: &str) -> Result<Self, KernelError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
            eval: EvalConfig::default(),
        }
    }
}
