//! OS automation used to drive Mail and its signature files.
//!
//! Everything the updater needs from the host goes through the narrow
//! [`Automation`] trait. On macOS this shells out to `osascript` and
//! `chflags`; on other platforms a stub fails every call. Tests use
//! [`fake::FakeAutomation`], which performs real file copies on a temporary
//! tree and records each call.

use std::path::Path;

use crate::error::Result;

pub mod applescript;
pub mod fake;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(target_os = "macos"))]
mod stub;
// Re-export stub for tests on all platforms.
#[cfg(test)]
#[cfg(target_os = "macos")]
#[path = "stub.rs"]
mod stub;

/// Host capabilities needed to replace a signature.
pub trait Automation {
    /// Ask the application named `app` to quit.
    fn quit_app(&self, app: &str) -> Result<()>;

    /// Launch or bring the application named `app` to the front.
    fn activate_app(&self, app: &str) -> Result<()>;

    /// Names of the folders directly inside `dir`.
    fn list_subfolders(&self, dir: &Path) -> Result<Vec<String>>;

    /// Copy the file `from` into the folder `to_dir`, replacing any file of
    /// the same name.
    fn copy_file(&self, from: &Path, to_dir: &Path) -> Result<()>;

    /// Set (`true`) or clear (`false`) the user-immutable flag on `path`.
    fn set_immutable(&self, path: &Path, immutable: bool) -> Result<()>;
}

/// Create the platform-appropriate automation backend.
///
/// Returns the `osascript`/`chflags` implementation on macOS,
/// or a stub that rejects every call on all other platforms.
pub fn create_automation() -> Box<dyn Automation> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::OsaScriptAutomation::new())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(stub::StubAutomation)
    }
}
