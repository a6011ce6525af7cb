//! The interpreter kernel: one [`Interpreter`] owned by one worker thread.
//!
//! The caller and the worker talk only through three queues:
//!
//! ```text
//!   caller ── Command ──▶ input ──▶ worker ──▶ output ── KernelOutput ──▶ caller
//!   caller / InterruptHandle ──▶ interrupt ──▶ polled by the evaluator
//! ```
//!
//! Commands are served strictly in submission order, one at a time.

use crate::config::KernelConfig;
use crate::error::KernelError;
use crate::output::{KernelOutput, PARSE_FAILURE};
use plotscript_eval::Interpreter;
use plotscript_types::{ErrorKind, MessageQueue};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A message to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Parse and evaluate program text.
    Eval(String),
    /// Leave the loop and hand the interpreter back. Posts no output.
    Shutdown,
}

/// Signals the evaluation currently in flight to abort.
///
/// Cheap to clone and safe to move to another thread.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    queue: Arc<MessageQueue<bool>>,
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.queue.push(true);
    }
}

/// An interpreter running on a dedicated worker thread.
pub struct Kernel {
    config: KernelConfig,
    input: Arc<MessageQueue<Command>>,
    output: Arc<MessageQueue<KernelOutput>>,
    interrupt: Arc<MessageQueue<bool>>,
    worker: Option<JoinHandle<Interpreter>>,
    /// The interpreter recovered by the last `stop`, reused by `start`.
    idle: Option<Interpreter>,
}

impl Kernel {
    /// Build a kernel with a fresh interpreter and start its worker.
    pub fn new(config: KernelConfig) -> Result<Self, KernelError> {
        let mut kernel = Self {
            idle: Some(Interpreter::with_config(config.eval)),
            config,
            input: Arc::new(MessageQueue::new()),
            output: Arc::new(MessageQueue::new()),
            interrupt: Arc::new(MessageQueue::new()),
            worker: None,
        };
        kernel.start()?;
        Ok(kernel)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Start a worker if none is running.
    ///
    /// The worker takes over the interpreter the last [`stop`](Kernel::stop)
    /// recovered, so definitions made before the stop are still visible.
    /// With no interpreter to reuse it starts fresh, and results left by the
    /// old one are dropped.
    pub fn start(&mut self) -> Result<(), KernelError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let interp = match self.idle.take() {
            Some(interp) => interp,
            None => {
                self.discard_output();
                Interpreter::with_config(self.config.eval)
            }
        };

        let input = Arc::clone(&self.input);
        let output = Arc::clone(&self.output);
        let interrupt = Arc::clone(&self.interrupt);

        let mut builder = thread::Builder::new().name(self.config.thread_name.clone());
        if let Some(size) = self.config.stack_size {
            builder = builder.stack_size(size);
        }
        let handle = builder.spawn(move || run_worker(interp, &input, &output, &interrupt))?;

        tracing::info!(thread = %self.config.thread_name, "kernel worker started");
        self.worker = Some(handle);
        Ok(())
    }

    /// Shut the worker down and wait for it to exit.
    ///
    /// An evaluation in flight runs to completion first; call
    /// [`interrupt`](Kernel::interrupt) beforehand to cut it short.
    pub fn stop(&mut self) -> Result<(), KernelError> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        self.input.push(Command::Shutdown);
        match handle.join() {
            Ok(interp) => {
                self.idle = Some(interp);
                tracing::info!(thread = %self.config.thread_name, "kernel worker stopped");
                Ok(())
            }
            Err(payload) => {
                tracing::error!(
                    thread = %self.config.thread_name,
                    panic = %panic_message(payload.as_ref()),
                    "kernel worker panicked"
                );
                Err(KernelError::WorkerPanicked)
            }
        }
    }

    /// Stop the worker, discard its interpreter, and start over with a
    /// default environment.
    pub fn reset(&mut self) -> Result<(), KernelError> {
        let stopped = self.stop();
        self.idle = None;
        self.discard_output();
        tracing::info!(thread = %self.config.thread_name, "kernel reset");
        self.start()?;
        stopped
    }

    fn discard_output(&self) {
        let dropped = self.output.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "discarded results from previous interpreter");
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Queue program text for evaluation.
    ///
    /// Interrupts raised while nothing was running are discarded first so
    /// they cannot abort this command.
    pub fn submit(&self, text: impl Into<String>) -> Result<(), KernelError> {
        if self.worker.is_none() {
            return Err(KernelError::NotRunning);
        }
        let stale = self.interrupt.clear();
        if stale > 0 {
            tracing::debug!(stale, "discarded stale interrupts");
        }
        self.input.push(Command::Eval(text.into()));
        Ok(())
    }

    /// Block until the next result is posted.
    pub fn recv(&self) -> KernelOutput {
        self.output.wait_and_pop()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<KernelOutput> {
        self.output.wait_and_pop_timeout(timeout)
    }

    /// Submit `text` and wait for its result.
    pub fn eval(&self, text: impl Into<String>) -> Result<KernelOutput, KernelError> {
        self.submit(text)?;
        Ok(self.recv())
    }

    // ── Interrupts ────────────────────────────────────────────────────────

    pub fn interrupt(&self) {
        self.interrupt.push(true);
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            queue: Arc::clone(&self.interrupt),
        }
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(error = %err, "kernel worker did not stop cleanly");
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Worker
// ══════════════════════════════════════════════════════════════════════════

fn run_worker(
    mut interp: Interpreter,
    input: &MessageQueue<Command>,
    output: &MessageQueue<KernelOutput>,
    interrupt: &MessageQueue<bool>,
) -> Interpreter {
    loop {
        let text = match input.wait_and_pop() {
            Command::Shutdown => break,
            Command::Eval(text) => text,
        };
        tracing::debug!(command = %text, "kernel command received");

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            run_command(&mut interp, &text, interrupt)
        }));
        let record = result.unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!(command = %text, panic = %message, "evaluation panicked");
            KernelOutput::Error(format!("Error: interpreter kernel panicked: {message}"))
        });
        tracing::debug!(is_error = record.is_error(), "kernel command finished");
        output.push(record);
    }
    interp
}

fn run_command(
    interp: &mut Interpreter,
    text: &str,
    interrupt: &MessageQueue<bool>,
) -> KernelOutput {
    if !interp.parse(text) {
        return KernelOutput::Error(PARSE_FAILURE.to_string());
    }
    match interp.evaluate(interrupt, false) {
        Ok(value) => KernelOutput::Value(value),
        Err(err) => {
            if err.kind == ErrorKind::Interrupted {
                tracing::warn!("evaluation interrupted");
            }
            KernelOutput::Error(err.message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
