//! Configuration for the signature updater.

use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable overriding the Mail data root (`~/Library/Mail/`).
pub const MAIL_ROOT_ENV: &str = "SIGNATURE_UPDATER_MAIL_ROOT";

/// Runtime configuration.
///
/// Every field has a default, so an empty or partial TOML file is valid.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Application to quit before patching and reactivate afterwards.
    pub app_name: String,
    /// Staging directory. Created at start and removed when the run ends.
    pub workdir: PathBuf,
    /// Mail data root containing the `V<n>` folders (None = `$HOME/Library/Mail/`).
    pub mail_root: Option<PathBuf>,
    /// Number of leading lines of a backing file kept verbatim.
    pub header_lines: usize,
    /// File name of the signature manifest inside the signature directory.
    pub manifest_file: String,
    /// Extension of the per-signature backing files.
    pub signature_extension: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            app_name: "Mail".to_owned(),
            workdir: PathBuf::from("/tmp/signatures/"),
            mail_root: None,
            header_lines: 6,
            manifest_file: "AllSignatures.plist".to_owned(),
            signature_extension: "mailsignature".to_owned(),
        }
    }
}

impl UpdaterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::SignatureError::io(path.display(), e))?;
        toml::from_str(&content).map_err(|e| crate::error::SignatureError::Config(e.to_string()))
    }

    /// Load the config at `path` if given, else the default path if it exists,
    /// else built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded, or the
    /// default file exists but is invalid.
    pub fn load(path: Option<&std::path::Path>) -> crate::error::Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let default_path = Self::default_config_path();
        if default_path.is_file() {
            tracing::debug!(path = %default_path.display(), "loading default config");
            return Self::from_file(&default_path);
        }
        Ok(Self::default())
    }

    /// Replace the working directory when one is given (the CLI `-w` flag).
    #[must_use]
    pub fn with_workdir(mut self, workdir: Option<PathBuf>) -> Self {
        if let Some(workdir) = workdir {
            self.workdir = workdir;
        }
        self
    }

    /// Returns the default config file path: `~/.config/signature-updater/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("signature-updater")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("signature-updater")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/signature-updater/config.toml")
        }
    }

    /// Resolve the Mail data root.
    ///
    /// Order: explicit `mail_root`, then `SIGNATURE_UPDATER_MAIL_ROOT`, then
    /// `$HOME/Library/Mail/`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::NotFound`](crate::error::SignatureError::NotFound)
    /// when no home directory can be determined.
    pub fn resolve_mail_root(&self) -> crate::error::Result<PathBuf> {
        if let Some(ref root) = self.mail_root {
            return Ok(root.clone());
        }
        if let Some(root) = std::env::var_os(MAIL_ROOT_ENV) {
            return Ok(PathBuf::from(root));
        }
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .map(|home| home.join("Library").join("Mail"))
            .ok_or_else(|| {
                crate::error::SignatureError::NotFound("home directory is not set".to_owned())
            })
    }
}
