//! A scripted stand-in for the real imaging tool.
//!
//! Records every call in order and resolves captures according to a
//! per-address script, so capture ordering and timeout behavior can be
//! asserted without hardware or real child processes. Successful captures
//! write their target file, like the real tool does.

// Each test binary compiles this module; not every binary uses every helper.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use multicam::tool::{CameraTool, CaptureHandle, ToolError};

/// What the fake should do for captures on a given address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Report success and create the target file.
    Succeed,
    /// Report failure and create nothing.
    Fail,
    /// Refuse to launch at all.
    RefuseLaunch,
    /// Never signal completion: every bounded wait expires.
    Hang,
}

/// Chronological record of what the tool was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Detect,
    Launch { address: String, target: PathBuf },
    Await { address: String },
    Open(PathBuf),
}

#[derive(Default)]
struct Inner {
    listing: Option<String>,
    scripts: HashMap<String, Script>,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
pub struct FakeCameraTool {
    inner: Rc<RefCell<Inner>>,
}

impl FakeCameraTool {
    /// A double whose detect call returns `listing`.
    pub fn with_listing(listing: &str) -> Self {
        let tool = Self::default();
        tool.set_listing(Some(listing));
        tool
    }

    /// `None` makes detect fail as if the tool were not installed.
    pub fn set_listing(&self, listing: Option<&str>) {
        self.inner.borrow_mut().listing = listing.map(str::to_string);
    }

    /// Script the outcome for captures on `address` (default: Succeed).
    pub fn script(&self, address: &str, script: Script) {
        self.inner
            .borrow_mut()
            .scripts
            .insert(address.to_string(), script);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    /// The recorded calls with detects filtered out.
    pub fn capture_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::Detect)
            .collect()
    }
}

impl CameraTool for FakeCameraTool {
    fn detect(&self) -> Result<String, ToolError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::Detect);
        match &inner.listing {
            Some(listing) => Ok(listing.clone()),
            None => Err(ToolError::NotFound { tool: "gphoto2" }),
        }
    }

    fn start_capture(
        &self,
        address: &str,
        target: &Path,
    ) -> Result<Box<dyn CaptureHandle>, ToolError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::Launch {
            address: address.to_string(),
            target: target.to_path_buf(),
        });
        let script = inner
            .scripts
            .get(address)
            .copied()
            .unwrap_or(Script::Succeed);
        if script == Script::RefuseLaunch {
            return Err(ToolError::NotFound { tool: "gphoto2" });
        }
        Ok(Box::new(FakeHandle {
            address: address.to_string(),
            target: target.to_path_buf(),
            script,
            inner: Rc::clone(&self.inner),
        }))
    }

    fn open_path(&self, path: &Path) -> Result<(), ToolError> {
        self.inner
            .borrow_mut()
            .calls
            .push(Call::Open(path.to_path_buf()));
        Ok(())
    }
}

struct FakeHandle {
    address: String,
    target: PathBuf,
    script: Script,
    inner: Rc<RefCell<Inner>>,
}

impl FakeHandle {
    fn record_await(&self) {
        self.inner.borrow_mut().calls.push(Call::Await {
            address: self.address.clone(),
        });
    }

    fn resolve(&self, success: bool) -> bool {
        if success {
            std::fs::write(&self.target, b"jpeg").expect("fake capture should write its file");
        }
        success
    }
}

impl CaptureHandle for FakeHandle {
    fn wait(&mut self) -> bool {
        self.record_await();
        match self.script {
            Script::Succeed => self.resolve(true),
            Script::Fail => self.resolve(false),
            Script::Hang => panic!("blocking wait on a hung capture script"),
            Script::RefuseLaunch => unreachable!("refused launches produce no handle"),
        }
    }

    fn wait_timeout(&mut self, _limit: Duration) -> Option<bool> {
        self.record_await();
        match self.script {
            Script::Succeed => Some(self.resolve(true)),
            Script::Fail => Some(self.resolve(false)),
            Script::Hang => None,
            Script::RefuseLaunch => unreachable!("refused launches produce no handle"),
        }
    }
}
