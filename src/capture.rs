//! Capture execution: one task per camera, sequential or fanned out.
//!
//! Each task moves Pending -> Launched -> one of Completed, Failed, or
//! TimedOut, and is never retried. Sequential mode fully finishes (and
//! shows) one camera's capture before the next one fires. Concurrent mode
//! launches every capture first, then awaits them in launch order with a
//! bounded wait per task; a task that does not finish inside the bound is
//! reported as timed out and its child process is abandoned, not killed.
//! A slow download may still complete on its own, it is just no longer
//! waited on. Awaiting in launch order rather than completion order is
//! deliberate: output stays in registry order even when a fast camera
//! finishes early.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::devices::Device;
use crate::tool::CameraTool;

/// Upper bound on one concurrent-mode await.
pub const CONCURRENT_WAIT: Duration = Duration::from_secs(10);

/// How a capture session drives its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// One camera at a time, each download finished and shown before the
    /// next camera fires.
    #[default]
    Sequential,
    /// Every camera fires first; downloads are awaited afterwards, in
    /// launch order, each with a bounded wait.
    Concurrent,
}

impl CaptureMode {
    pub fn toggled(self) -> Self {
        match self {
            CaptureMode::Sequential => CaptureMode::Concurrent,
            CaptureMode::Concurrent => CaptureMode::Sequential,
        }
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Sequential => f.write_str("sequential"),
            CaptureMode::Concurrent => f.write_str("concurrent"),
        }
    }
}

/// One planned capture for one camera. Tasks borrow their device from the
/// registry and only read it.
#[derive(Debug)]
pub struct CaptureTask<'a> {
    pub device: &'a Device,
    pub target: PathBuf,
}

/// Terminal state of one capture task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// The tool reported success; the image should be at the target path.
    Completed,
    /// The tool failed or could not be launched. No file was produced.
    Failed,
    /// No completion signal within the wait bound. The operation was
    /// abandoned without forced termination.
    TimedOut,
}

/// Per-task result, consumed by the reporting layer.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub camera: String,
    pub target: PathBuf,
    pub status: CaptureStatus,
}

/// Runs the capture tasks of one session and reports per-task outcomes.
pub struct CaptureExecutor<'t, T: ?Sized> {
    tool: &'t T,
    wait_limit: Duration,
}

impl<'t, T: CameraTool + ?Sized> CaptureExecutor<'t, T> {
    pub fn new(tool: &'t T) -> Self {
        Self {
            tool,
            wait_limit: CONCURRENT_WAIT,
        }
    }

    pub fn with_wait_limit(mut self, limit: Duration) -> Self {
        self.wait_limit = limit;
        self
    }

    /// Run every task in the session's mode. A failure or timeout on one
    /// camera never stops the remaining cameras from being processed.
    pub fn run(&self, tasks: &[CaptureTask<'_>], mode: CaptureMode) -> Vec<CaptureOutcome> {
        match mode {
            CaptureMode::Sequential => self.run_sequential(tasks),
            CaptureMode::Concurrent => self.run_concurrent(tasks),
        }
    }

    /// One blocking capture, outside any session. Used when photographing a
    /// camera to identify it during naming.
    pub fn capture_blocking(&self, device: &Device, target: &Path) -> CaptureStatus {
        match self.tool.start_capture(device.address(), target) {
            Ok(mut handle) => {
                if handle.wait() {
                    CaptureStatus::Completed
                } else {
                    CaptureStatus::Failed
                }
            }
            Err(e) => {
                println!("Could not start capture for {}: {}", device.name(), e);
                CaptureStatus::Failed
            }
        }
    }

    fn run_sequential(&self, tasks: &[CaptureTask<'_>]) -> Vec<CaptureOutcome> {
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            println!(
                "Capturing with {} -> {}",
                task.device.name(),
                task.target.display()
            );
            let status = self.capture_blocking(task.device, &task.target);
            if status == CaptureStatus::Failed {
                println!("Capture failed for {}", task.device.name());
            }
            // Shown before the next camera fires.
            self.present(&task.target);
            outcomes.push(CaptureOutcome {
                camera: task.device.name().to_string(),
                target: task.target.clone(),
                status,
            });
        }
        outcomes
    }

    fn run_concurrent(&self, tasks: &[CaptureTask<'_>]) -> Vec<CaptureOutcome> {
        // Fan out: every camera fires before any download is awaited.
        let mut launched = Vec::with_capacity(tasks.len());
        for task in tasks {
            println!(
                "Capturing with {} -> {}",
                task.device.name(),
                task.target.display()
            );
            let handle = match self.tool.start_capture(task.device.address(), &task.target) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    println!("Could not start capture for {}: {}", task.device.name(), e);
                    None
                }
            };
            launched.push(handle);
        }

        // Await in launch order, not completion order.
        let mut outcomes = Vec::with_capacity(tasks.len());
        for (task, handle) in tasks.iter().zip(launched) {
            let status = match handle {
                None => CaptureStatus::Failed,
                Some(mut handle) => match handle.wait_timeout(self.wait_limit) {
                    Some(true) => CaptureStatus::Completed,
                    Some(false) => CaptureStatus::Failed,
                    None => CaptureStatus::TimedOut,
                },
            };
            match status {
                CaptureStatus::Completed => self.present(&task.target),
                CaptureStatus::Failed => {
                    println!("Capture failed for {}", task.device.name());
                }
                CaptureStatus::TimedOut => {
                    log::warn!(
                        "capture for {} still running after {:?}",
                        task.device.name(),
                        self.wait_limit
                    );
                    println!(
                        "Gave up waiting for {} after {} seconds; the capture was left running.",
                        task.device.name(),
                        self.wait_limit.as_secs()
                    );
                }
            }
            outcomes.push(CaptureOutcome {
                camera: task.device.name().to_string(),
                target: task.target.clone(),
                status,
            });
        }
        outcomes
    }

    /// Best-effort: open the captured file with the default viewer, or say
    /// why not. Never escalates to a session-level failure.
    pub fn present(&self, path: &Path) {
        if path.exists() {
            if let Err(e) = self.tool.open_path(path) {
                log::warn!("viewer failed for {}: {}", path.display(), e);
            }
        } else {
            println!("Could not open \"{}\"", path.display());
        }
    }
}
