//! Automation stub for platforms without Mail.

use std::path::Path;

use super::Automation;
use crate::error::{Result, SignatureError};

const UNSUPPORTED: &str = "Mail automation is only supported on macOS";

/// Stub automation that fails every call.
///
/// Used on platforms where `osascript` and `chflags` do not exist
/// (Linux, Windows, etc.).
pub struct StubAutomation;

impl Automation for StubAutomation {
    fn quit_app(&self, _app: &str) -> Result<()> {
        Err(SignatureError::AppControl(UNSUPPORTED.to_owned()))
    }

    fn activate_app(&self, _app: &str) -> Result<()> {
        Err(SignatureError::AppControl(UNSUPPORTED.to_owned()))
    }

    fn list_subfolders(&self, _dir: &Path) -> Result<Vec<String>> {
        Err(SignatureError::AppControl(UNSUPPORTED.to_owned()))
    }

    fn copy_file(&self, _from: &Path, _to_dir: &Path) -> Result<()> {
        Err(SignatureError::Copy(UNSUPPORTED.to_owned()))
    }

    fn set_immutable(&self, _path: &Path, _immutable: bool) -> Result<()> {
        Err(SignatureError::Flag(UNSUPPORTED.to_owned()))
    }
}
