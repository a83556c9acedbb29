//! Driving a complete signature update.
//!
//! A run moves through these phases:
//!
//! ```text
//! Init → AppStopped → ManifestCopied → ManifestDecoded → Iterating(i) → AppRestarted → Done
//! ```
//!
//! Anything up to and including manifest decoding is fatal and aborts the
//! run. Once iteration starts, failures are collected instead: a signature
//! that fails to patch does not stop the others, and a failure to restart
//! Mail is reported alongside them. Nothing is rolled back. The working
//! directory is removed on every path.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use crate::config::UpdaterConfig;
use crate::error::{Result, SignatureError, UpdateErrors};
use crate::locator;
use crate::manifest::{self, SignatureManifestEntry};
use crate::patcher::SignaturePatcher;
use crate::platform::Automation;
use crate::selector::{NamedSignature, SignatureSelector};
use crate::workdir::WorkDir;

/// Where an update run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    /// Arguments validated, signature directory and workdir being prepared.
    Init,
    /// Mail has been asked to quit.
    AppStopped,
    /// Manifest copied into the working directory.
    ManifestCopied,
    /// Manifest decoded into entries.
    ManifestDecoded,
    /// Processing the manifest entry at this index.
    Iterating(usize),
    /// Mail has been asked to start again.
    AppRestarted,
    /// Run finished; collected errors (if any) are in the report.
    Done,
    /// A fatal error aborted the run.
    Failed,
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePhase::Init => write!(f, "init"),
            UpdatePhase::AppStopped => write!(f, "app stopped"),
            UpdatePhase::ManifestCopied => write!(f, "manifest copied"),
            UpdatePhase::ManifestDecoded => write!(f, "manifest decoded"),
            UpdatePhase::Iterating(i) => write!(f, "iterating #{i}"),
            UpdatePhase::AppRestarted => write!(f, "app restarted"),
            UpdatePhase::Done => write!(f, "done"),
            UpdatePhase::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a run that got past the fatal phases.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Entries whose backing file was replaced.
    pub patched: Vec<SignatureManifestEntry>,
    /// Entries the selector skipped.
    pub skipped: usize,
    /// Whether Mail was started again after patching.
    pub restarted: bool,
    /// Non-fatal failures, in the order they happened.
    pub errors: UpdateErrors,
}

impl UpdateReport {
    /// Whether no failure was collected.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn collected failures into an error, or return the patched entries.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Update`] when any failure was collected.
    pub fn into_result(self) -> Result<Vec<SignatureManifestEntry>> {
        if self.errors.is_empty() {
            Ok(self.patched)
        } else {
            Err(SignatureError::Update(self.errors))
        }
    }
}

/// Replaces Mail signatures using an [`Automation`] backend.
pub struct SignatureUpdater<'a> {
    automation: &'a dyn Automation,
    config: UpdaterConfig,
}

impl<'a> SignatureUpdater<'a> {
    /// Create an updater.
    pub fn new(automation: &'a dyn Automation, config: UpdaterConfig) -> Self {
        Self { automation, config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Quit Mail, replace every signature `selector` picks, restart Mail.
    ///
    /// # Errors
    ///
    /// Fatal failures are returned as `Err`: an unusable working directory
    /// path ([`SignatureError::InvalidArgument`]), no version folder
    /// ([`SignatureError::NotFound`]), workdir creation
    /// ([`SignatureError::Io`]), quitting Mail ([`SignatureError::AppControl`])
    /// and manifest copy/decode ([`SignatureError::Manifest`]). Per-signature
    /// failures and a failed restart are collected in the report instead.
    pub fn update(&self, selector: &mut dyn SignatureSelector) -> Result<UpdateReport> {
        let result = self.run(selector);
        match result {
            Ok(ref report) => tracing::info!(
                patched = report.patched.len(),
                skipped = report.skipped,
                failed = report.errors.len(),
                "signature update finished"
            ),
            Err(ref e) => {
                enter(UpdatePhase::Failed);
                tracing::error!(error = %e, "signature update aborted");
            }
        }
        result
    }

    /// Replace the signature called `name` with everything `content` yields.
    ///
    /// `content` is read completely before Mail is touched, so several
    /// signatures sharing the name all receive the same body.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::InvalidArgument`] for an empty name,
    /// [`SignatureError::Io`] if `content` cannot be read, the fatal errors of
    /// [`update`](Self::update), [`SignatureError::Update`] when failures were
    /// collected, and [`SignatureError::NotFound`] when no signature has that
    /// name.
    pub fn replace_named(
        &self,
        name: &str,
        content: &mut dyn Read,
    ) -> Result<Vec<SignatureManifestEntry>> {
        if name.trim().is_empty() {
            return Err(SignatureError::InvalidArgument(
                "signature name is empty".to_owned(),
            ));
        }
        let mut selector = NamedSignature::from_reader(name, content)
            .map_err(|e| SignatureError::io("read new signature", e))?;

        let patched = self.update(&mut selector)?.into_result()?;
        if !selector.found() {
            return Err(SignatureError::NotFound(format!(
                "no signature named {name:?}"
            )));
        }
        Ok(patched)
    }

    fn run(&self, selector: &mut dyn SignatureSelector) -> Result<UpdateReport> {
        enter(UpdatePhase::Init);
        self.validate()?;
        let signature_dir = self.signature_dir()?;
        let workdir = WorkDir::create(&self.config.workdir)?;

        self.automation.quit_app(&self.config.app_name)?;
        enter(UpdatePhase::AppStopped);

        let manifest_copy = manifest::copy_manifest(
            self.automation,
            &signature_dir,
            workdir.path(),
            &self.config.manifest_file,
        )
        .map_err(|e| {
            SignatureError::Manifest(format!("copy {}: {e}", self.config.manifest_file))
        })?;
        enter(UpdatePhase::ManifestCopied);

        let entries = manifest::read_manifest(&manifest_copy).map_err(|e| {
            SignatureError::Manifest(format!("decode {}: {e}", self.config.manifest_file))
        })?;
        enter(UpdatePhase::ManifestDecoded);

        let patcher = SignaturePatcher::new(self.automation, workdir.path(), &signature_dir)
            .with_header_lines(self.config.header_lines)
            .with_extension(self.config.signature_extension.clone());

        let mut report = UpdateReport::default();
        for (i, entry) in entries.into_iter().enumerate() {
            enter(UpdatePhase::Iterating(i));
            let Some(content) = selector.select(&entry.name) else {
                report.skipped += 1;
                continue;
            };
            tracing::info!(name = %entry.name, unique_id = %entry.unique_id, "replacing signature");
            match patcher.patch(&entry.unique_id, content) {
                Ok(()) => report.patched.push(entry),
                Err(e) => {
                    tracing::warn!(name = %entry.name, error = %e, "signature update failed");
                    report.errors.push(e);
                }
            }
        }

        match self.automation.activate_app(&self.config.app_name) {
            Ok(()) => {
                report.restarted = true;
                enter(UpdatePhase::AppRestarted);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not restart {}", self.config.app_name);
                report.errors.push(e);
            }
        }

        enter(UpdatePhase::Done);
        Ok(report)
    }

    /// List the signatures in the manifest without quitting Mail.
    ///
    /// # Errors
    ///
    /// Returns the locator errors, workdir creation errors, or
    /// [`SignatureError::Manifest`] if the manifest cannot be loaded.
    pub fn list_signatures(&self) -> Result<Vec<SignatureManifestEntry>> {
        self.validate()?;
        let signature_dir = self.signature_dir()?;
        let workdir = WorkDir::create(&self.config.workdir)?;
        manifest::load_manifest(
            self.automation,
            &signature_dir,
            workdir.path(),
            &self.config.manifest_file,
        )
        .map_err(|e| SignatureError::Manifest(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.config.workdir.as_os_str().is_empty() {
            return Err(SignatureError::InvalidArgument(
                "working directory path is empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn signature_dir(&self) -> Result<PathBuf> {
        let mail_root = self.config.resolve_mail_root()?;
        locator::find_signature_dir(self.automation, &mail_root)
    }
}

fn enter(phase: UpdatePhase) {
    tracing::debug!(%phase, "update phase");
}
