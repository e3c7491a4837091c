//! External imaging tool boundary.
//!
//! Everything the program asks of the outside world goes through the
//! [`CameraTool`] trait: enumerating connected cameras, launching one
//! capture-and-download operation, and opening a finished file with the
//! desktop's default handler. The real implementation shells out to
//! `gphoto2`; tests substitute a scripted double so capture ordering and
//! timeout behavior can be exercised without hardware.

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Errors from invoking an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The binary is not on PATH.
    #[error("{tool} not found. Make sure {tool} is installed.")]
    NotFound { tool: &'static str },

    /// The tool ran but exited with a failure status.
    #[error("{tool} exited with {status}")]
    Failed { tool: &'static str, status: std::process::ExitStatus },

    /// The tool could not be run at all.
    #[error("failed to run {tool}: {source}")]
    Io {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    fn from_spawn(tool: &'static str, source: std::io::Error) -> Self {
        if source.kind() == ErrorKind::NotFound {
            ToolError::NotFound { tool }
        } else {
            ToolError::Io { tool, source }
        }
    }
}

/// One launched capture-and-download operation.
pub trait CaptureHandle {
    /// Block until the operation finishes. `true` means the tool reported
    /// success and the image should exist at the target path.
    fn wait(&mut self) -> bool;

    /// Wait up to `limit` for the operation to finish. Returns `None` if it
    /// is still running when the limit expires; in that case the operation
    /// is left running and must not be waited on again.
    fn wait_timeout(&mut self, limit: Duration) -> Option<bool>;
}

/// Capability interface over the imaging tool and the desktop viewer.
pub trait CameraTool {
    /// Run the camera enumeration command and return its raw listing.
    fn detect(&self) -> Result<String, ToolError>;

    /// Launch a capture-and-download for the camera at `address`, writing
    /// the image to `target`. The returned handle is awaited by the caller.
    fn start_capture(&self, address: &str, target: &Path)
        -> Result<Box<dyn CaptureHandle>, ToolError>;

    /// Open `path` with the desktop's default handler. Fire-and-forget: the
    /// viewer is never waited on.
    fn open_path(&self, path: &Path) -> Result<(), ToolError>;
}

/// The real tool boundary: `gphoto2` for cameras, `xdg-open` (or a
/// configured command) for viewing.
pub struct GphotoTool {
    viewer: String,
}

fn default_viewer() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

impl GphotoTool {
    pub fn new(viewer: Option<String>) -> Self {
        Self {
            viewer: viewer.unwrap_or_else(|| default_viewer().to_string()),
        }
    }
}

impl Default for GphotoTool {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CameraTool for GphotoTool {
    fn detect(&self) -> Result<String, ToolError> {
        let output = Command::new("gphoto2")
            .arg("--auto-detect")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| ToolError::from_spawn("gphoto2", e))?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: "gphoto2",
                status: output.status,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn start_capture(
        &self,
        address: &str,
        target: &Path,
    ) -> Result<Box<dyn CaptureHandle>, ToolError> {
        log::debug!(
            "launching: gphoto2 --port {} --capture-image-and-download --force-overwrite --filename {}",
            address,
            target.display()
        );
        let child = Command::new("gphoto2")
            .args(["--port", address, "--capture-image-and-download", "--force-overwrite"])
            .arg("--filename")
            .arg(target)
            .spawn()
            .map_err(|e| ToolError::from_spawn("gphoto2", e))?;
        Ok(Box::new(GphotoCapture { child }))
    }

    fn open_path(&self, path: &Path) -> Result<(), ToolError> {
        Command::new(&self.viewer)
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ToolError::from_spawn("viewer", e))?;
        Ok(())
    }
}

/// A running `gphoto2` capture child process.
struct GphotoCapture {
    child: Child,
}

impl CaptureHandle for GphotoCapture {
    fn wait(&mut self) -> bool {
        match self.child.wait() {
            Ok(status) => status.success(),
            Err(e) => {
                log::warn!("wait on capture process failed: {}", e);
                false
            }
        }
    }

    fn wait_timeout(&mut self, limit: Duration) -> Option<bool> {
        let deadline = Instant::now() + limit;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Some(status.success()),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        // Not killed: a slow download may still finish and
                        // produce its file. The child is simply no longer
                        // waited on.
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    log::warn!("poll on capture process failed: {}", e);
                    return Some(false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_capture(script: &str) -> GphotoCapture {
        let child = Command::new("sh")
            .args(["-c", script])
            .spawn()
            .expect("sh should spawn");
        GphotoCapture { child }
    }

    #[test]
    fn test_wait_reports_success() {
        let mut handle = shell_capture("exit 0");
        assert!(handle.wait());
    }

    #[test]
    fn test_wait_reports_failure() {
        let mut handle = shell_capture("exit 1");
        assert!(!handle.wait());
    }

    #[test]
    fn test_wait_timeout_completes_within_limit() {
        let mut handle = shell_capture("exit 0");
        let result = handle.wait_timeout(Duration::from_secs(5));
        assert_eq!(result, Some(true));
    }

    #[test]
    fn test_wait_timeout_expires_for_slow_process() {
        let mut handle = shell_capture("sleep 10");
        let result = handle.wait_timeout(Duration::from_millis(120));
        assert_eq!(result, None);
        // Abandoned, not killed: the child should still be running.
        assert!(matches!(handle.child.try_wait(), Ok(None)));
        let _ = handle.child.kill();
        let _ = handle.child.wait();
    }

    #[test]
    fn test_default_viewer_is_platform_opener() {
        let viewer = default_viewer();
        assert!(viewer == "xdg-open" || viewer == "open");
    }
}
