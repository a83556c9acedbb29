//! In-process [`Automation`] used by tests.
//!
//! Copies are real `std::fs` copies so the patcher can be exercised on a
//! temporary tree. The immutable flag is tracked in memory and follows a file
//! when it is copied, the way Finder preserves `uchg`. Every call is recorded
//! for assertions, and individual operations can be made to fail.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::cell::RefCell;

use super::Automation;
use crate::error::{Result, SignatureError};

/// One recorded automation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationCall {
    /// `quit_app(app)`
    QuitApp(String),
    /// `activate_app(app)`
    ActivateApp(String),
    /// `list_subfolders(dir)`
    ListSubfolders(PathBuf),
    /// `copy_file(from, to_dir)`
    CopyFile {
        /// Source file.
        from: PathBuf,
        /// Destination folder.
        to_dir: PathBuf,
    },
    /// `set_immutable(path, immutable)`
    SetImmutable {
        /// Target file.
        path: PathBuf,
        /// Requested flag state.
        immutable: bool,
    },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<AutomationCall>,
    immutable: HashSet<PathBuf>,
}

/// Fake automation backend for tests.
#[derive(Default)]
pub struct FakeAutomation {
    folders: Option<Vec<String>>,
    fail_quit: bool,
    fail_activate: bool,
    fail_copy_of: Option<String>,
    fail_lock: bool,
    state: RefCell<FakeState>,
}

impl FakeAutomation {
    /// A fake that succeeds at everything and lists real folders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `folders` from `list_subfolders` instead of reading the disk.
    pub fn with_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folders = Some(folders.into_iter().map(Into::into).collect());
        self
    }

    /// Make `quit_app` fail.
    pub fn failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    /// Make `activate_app` fail.
    pub fn failing_activate(mut self) -> Self {
        self.fail_activate = true;
        self
    }

    /// Make `copy_file` fail whenever the source file is named `file_name`.
    pub fn failing_copy_of(mut self, file_name: impl Into<String>) -> Self {
        self.fail_copy_of = Some(file_name.into());
        self
    }

    /// Make `set_immutable(_, true)` fail.
    pub fn failing_lock(mut self) -> Self {
        self.fail_lock = true;
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<AutomationCall> {
        self.state.borrow().calls.clone()
    }

    /// Whether `path` currently carries the immutable flag.
    pub fn is_immutable(&self, path: &Path) -> bool {
        self.state.borrow().immutable.contains(path)
    }

    /// Mark `path` immutable without recording a call (test setup).
    pub fn lock_file(&self, path: impl Into<PathBuf>) {
        self.state.borrow_mut().immutable.insert(path.into());
    }

    fn record(&self, call: AutomationCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Automation for FakeAutomation {
    fn quit_app(&self, app: &str) -> Result<()> {
        self.record(AutomationCall::QuitApp(app.to_owned()));
        if self.fail_quit {
            return Err(SignatureError::AppControl(format!("{app} refused to quit")));
        }
        Ok(())
    }

    fn activate_app(&self, app: &str) -> Result<()> {
        self.record(AutomationCall::ActivateApp(app.to_owned()));
        if self.fail_activate {
            return Err(SignatureError::AppControl(format!("{app} failed to launch")));
        }
        Ok(())
    }

    fn list_subfolders(&self, dir: &Path) -> Result<Vec<String>> {
        self.record(AutomationCall::ListSubfolders(dir.to_owned()));
        if let Some(ref folders) = self.folders {
            return Ok(folders.clone());
        }
        let entries = std::fs::read_dir(dir).map_err(|e| {
            SignatureError::AppControl(format!("list folders of {}: {e}", dir.display()))
        })?;
        let mut names = Vec::new();
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn copy_file(&self, from: &Path, to_dir: &Path) -> Result<()> {
        self.record(AutomationCall::CopyFile {
            from: from.to_owned(),
            to_dir: to_dir.to_owned(),
        });

        let file_name = from
            .file_name()
            .ok_or_else(|| SignatureError::Copy(format!("{} has no file name", from.display())))?;
        if self
            .fail_copy_of
            .as_deref()
            .is_some_and(|name| file_name == name)
        {
            return Err(SignatureError::Copy(format!(
                "injected failure copying {}",
                from.display()
            )));
        }

        let dest = to_dir.join(file_name);
        std::fs::copy(from, &dest).map_err(|e| {
            SignatureError::Copy(format!("{} -> {}: {e}", from.display(), dest.display()))
        })?;

        let source_locked = self.is_immutable(from);
        let mut state = self.state.borrow_mut();
        if source_locked {
            state.immutable.insert(dest);
        } else {
            state.immutable.remove(&dest);
        }
        Ok(())
    }

    fn set_immutable(&self, path: &Path, immutable: bool) -> Result<()> {
        self.record(AutomationCall::SetImmutable {
            path: path.to_owned(),
            immutable,
        });
        if immutable && self.fail_lock {
            return Err(SignatureError::Flag(format!(
                "injected failure locking {}",
                path.display()
            )));
        }
        if !path.exists() {
            return Err(SignatureError::Flag(format!(
                "{}: no such file",
                path.display()
            )));
        }
        let mut state = self.state.borrow_mut();
        if immutable {
            state.immutable.insert(path.to_owned());
        } else {
            state.immutable.remove(path);
        }
        Ok(())
    }
}
