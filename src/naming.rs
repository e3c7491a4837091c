//! Output filename planning.
//!
//! A capture's destination is produced from a two-placeholder pattern:
//! `{0}` is the shot name typed by the user, `{1}` the camera's display
//! name. Collisions with files already on disk are detected up front, for
//! every planned path of a session, before any camera fires.

use std::path::{Path, PathBuf};

/// Pattern used by default when none is configured.
pub const DEFAULT_TEMPLATE: &str = "{0} - {1}.jpg";

/// Filename pattern for captured images.
///
/// Substitution is plain text replacement of `{0}` and `{1}`; there are no
/// escaping rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplate(String);

impl Default for NamingTemplate {
    fn default() -> Self {
        Self(DEFAULT_TEMPLATE.to_string())
    }
}

impl std::fmt::Display for NamingTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl NamingTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }

    /// Substitute the shot name and camera name into the pattern.
    pub fn render(&self, shot: &str, camera: &str) -> String {
        self.0.replace("{0}", shot).replace("{1}", camera)
    }

    /// The planned destination path for one camera's capture.
    pub fn target(&self, shot: &str, camera: &str) -> PathBuf {
        PathBuf::from(self.render(shot, camera))
    }
}

/// The subset of `planned` that already exists on disk.
pub fn existing_collisions<'a, I>(planned: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    planned
        .into_iter()
        .filter(|p| p.exists())
        .map(Path::to_path_buf)
        .collect()
}
