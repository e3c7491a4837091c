//! Session state: the device registry plus capture settings.
//!
//! One `Session` replaces what would otherwise be process-wide globals:
//! the registry, the filename pattern, the capture mode, and the await
//! bound all live here and are only ever mutated between capture sessions,
//! never during one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::{CaptureExecutor, CaptureMode, CaptureOutcome, CaptureStatus, CaptureTask};
use crate::config::Config;
use crate::devices::{DeviceRegistry, DiscoveryError, RenameError};
use crate::naming::{existing_collisions, NamingTemplate};
use crate::tool::CameraTool;

/// Temporary filename used when photographing a camera to identify it.
pub const IDENTIFY_FILE: &str = "test.jpg";

/// Everything decided before a shot fires: one task per camera, plus the
/// planned paths that already exist on disk.
pub struct ShootPlan<'a> {
    pub tasks: Vec<CaptureTask<'a>>,
    pub collisions: Vec<PathBuf>,
}

pub struct Session<T> {
    tool: T,
    registry: DeviceRegistry,
    template: NamingTemplate,
    mode: CaptureMode,
    wait_limit: Duration,
}

impl<T: CameraTool> Session<T> {
    pub fn new(tool: T) -> Self {
        Self {
            tool,
            registry: DeviceRegistry::new(),
            template: NamingTemplate::default(),
            mode: CaptureMode::default(),
            wait_limit: crate::capture::CONCURRENT_WAIT,
        }
    }

    /// A session configured from the loaded config file.
    pub fn from_config(tool: T, config: &Config) -> Self {
        Self {
            tool,
            registry: DeviceRegistry::new(),
            template: NamingTemplate::new(&config.naming.template),
            mode: config.capture.mode,
            wait_limit: Duration::from_secs(config.capture.timeout_secs),
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn template(&self) -> &NamingTemplate {
        &self.template
    }

    pub fn set_template(&mut self, template: NamingTemplate) {
        self.template = template;
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
    }

    /// Flip sequential/concurrent and return the new mode.
    pub fn toggle_mode(&mut self) -> CaptureMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Refresh the registry from the enumeration tool.
    pub fn discover(&mut self) -> Result<usize, DiscoveryError> {
        self.registry.discover(&self.tool)
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), RenameError> {
        self.registry.rename(index, name)
    }

    /// Photograph the camera at `index` to the identification file, so the
    /// user can see which physical camera it is. Blocking; the caller
    /// presents the file and asks for the name afterwards.
    pub fn identify_capture(&self, index: usize) -> Option<CaptureStatus> {
        let device = self.registry.get(index)?;
        Some(self.executor().capture_blocking(device, Path::new(IDENTIFY_FILE)))
    }

    /// Show a captured file with the default viewer (best effort).
    pub fn present(&self, path: &Path) {
        self.executor().present(path);
    }

    /// Compute every target path for one shot name and check them against
    /// the filesystem. Nothing is launched; collisions are decided on
    /// before any camera fires.
    pub fn plan_shoot(&self, shot: &str) -> ShootPlan<'_> {
        let tasks: Vec<CaptureTask<'_>> = self
            .registry
            .devices()
            .iter()
            .map(|device| CaptureTask {
                device,
                target: self.template.target(shot, device.name()),
            })
            .collect();
        let collisions = existing_collisions(tasks.iter().map(|t| t.target.as_path()));
        ShootPlan { tasks, collisions }
    }

    /// Run a previously computed plan in the session's mode.
    pub fn run_plan(&self, plan: &ShootPlan<'_>) -> Vec<CaptureOutcome> {
        self.executor().run(&plan.tasks, self.mode)
    }

    /// Plan and run one capture session. `approve_overwrite` is consulted
    /// once, and only when planned paths already exist; answering `false`
    /// aborts with zero cameras triggered.
    pub fn shoot(
        &self,
        shot: &str,
        approve_overwrite: impl FnOnce(&[PathBuf]) -> bool,
    ) -> Option<Vec<CaptureOutcome>> {
        let plan = self.plan_shoot(shot);
        if !plan.collisions.is_empty() && !approve_overwrite(&plan.collisions) {
            return None;
        }
        Some(self.run_plan(&plan))
    }

    fn executor(&self) -> CaptureExecutor<'_, T> {
        CaptureExecutor::new(&self.tool).with_wait_limit(self.wait_limit)
    }
}
