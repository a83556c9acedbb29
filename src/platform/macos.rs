//! macOS automation via `osascript` and `chflags`.
//!
//! Calls block until the tool exits. There is no timeout: an AppleScript
//! that waits on a dialog stalls the run.

use std::path::Path;
use std::process::{Command, Stdio};

use super::{Automation, applescript};
use crate::error::{Result, SignatureError};

/// Automation backed by the macOS command-line tools.
pub struct OsaScriptAutomation;

impl OsaScriptAutomation {
    /// Create a new macOS automation backend.
    pub fn new() -> Self {
        Self
    }

    /// Run `program` with `args`, returning stdout on success.
    fn run_command(program: &str, args: &[&str]) -> std::result::Result<String, String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| format!("failed to spawn {program}: {e}"))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{program} exited with code {code}: {}",
                stderr.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_applescript(script: &str) -> std::result::Result<String, String> {
        tracing::trace!(script, "running osascript");
        Self::run_command("osascript", &["-e", script])
    }
}

impl Default for OsaScriptAutomation {
    fn default() -> Self {
        Self::new()
    }
}

impl Automation for OsaScriptAutomation {
    fn quit_app(&self, app: &str) -> Result<()> {
        Self::run_applescript(&applescript::quit_app(app))
            .map(|_| ())
            .map_err(|e| SignatureError::AppControl(format!("quit {app}: {e}")))
    }

    fn activate_app(&self, app: &str) -> Result<()> {
        Self::run_applescript(&applescript::activate_app(app))
            .map(|_| ())
            .map_err(|e| SignatureError::AppControl(format!("activate {app}: {e}")))
    }

    fn list_subfolders(&self, dir: &Path) -> Result<Vec<String>> {
        let output = Self::run_applescript(&applescript::list_folders(dir)).map_err(|e| {
            SignatureError::AppControl(format!("list folders of {}: {e}", dir.display()))
        })?;
        Ok(applescript::parse_name_list(&output))
    }

    fn copy_file(&self, from: &Path, to_dir: &Path) -> Result<()> {
        Self::run_applescript(&applescript::duplicate(from, to_dir))
            .map(|_| ())
            .map_err(|e| {
                SignatureError::Copy(format!(
                    "{} -> {}: {e}",
                    from.display(),
                    to_dir.display()
                ))
            })
    }

    fn set_immutable(&self, path: &Path, immutable: bool) -> Result<()> {
        let flag = if immutable { "uchg" } else { "nouchg" };
        let path_str = path.to_string_lossy();
        Self::run_command("chflags", &[flag, &path_str])
            .map(|_| ())
            .map_err(|e| SignatureError::Flag(format!("{flag} {}: {e}", path.display())))
    }
}
