//! Locating Mail's versioned signature directory.
//!
//! Mail keeps its data under `~/Library/Mail/V<n>/`, where `n` grows with
//! major macOS releases and older folders are left behind after upgrades.
//! The active one is the highest version present.

use std::path::{Path, PathBuf};

use crate::error::{Result, SignatureError};
use crate::platform::Automation;

/// Parse a `V<digits>` folder name into its version number.
pub fn parse_version_folder(name: &str) -> Option<u32> {
    let digits = name.trim().strip_prefix('V')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse() {
        // Mail numbers its data folders from 1.
        Ok(0) => None,
        Ok(version) => Some(version),
        Err(e) => {
            tracing::debug!(folder = name, error = %e, "skipping version folder");
            None
        }
    }
}

/// Highest version among `folders`, if any matches `V<digits>`.
pub fn latest_version<S: AsRef<str>>(folders: &[S]) -> Option<u32> {
    folders
        .iter()
        .filter_map(|folder| parse_version_folder(folder.as_ref()))
        .max()
}

/// Signature directory inside `mail_root` for the given version.
pub fn signature_dir_for(mail_root: &Path, version: u32) -> PathBuf {
    mail_root
        .join(format!("V{version}"))
        .join("MailData")
        .join("Signatures")
}

/// Resolve the active signature directory under `mail_root`.
///
/// # Errors
///
/// Returns [`SignatureError::NotFound`] when no `V<digits>` folder exists,
/// or the automation error if the folder listing fails.
pub fn find_signature_dir(automation: &dyn Automation, mail_root: &Path) -> Result<PathBuf> {
    let folders = automation.list_subfolders(mail_root)?;
    let version = latest_version(&folders).ok_or_else(|| {
        SignatureError::NotFound(format!(
            "no mail version folder in {}",
            mail_root.display()
        ))
    })?;
    let dir = signature_dir_for(mail_root, version);
    tracing::debug!(version, dir = %dir.display(), "resolved signature directory");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::platform::fake::FakeAutomation;

    #[test]
    fn picks_highest_version() {
        assert_eq!(latest_version(&["V1", "V3", "Vx", "V2"]), Some(3));
    }

    #[test]
    fn multi_digit_versions_compare_numerically() {
        assert_eq!(latest_version(&["V9", "V10", "MailData"]), Some(10));
    }

    #[test]
    fn no_matches() {
        let empty: [&str; 0] = [];
        assert_eq!(latest_version(&empty), None);
        assert_eq!(latest_version(&["MailData", "V", "v3", "V3a", "Bundles"]), None);
    }

    #[test]
    fn parse_version_folder_trims_whitespace() {
        assert_eq!(parse_version_folder(" V7\n"), Some(7));
        assert_eq!(parse_version_folder("V+7"), None);
        assert_eq!(parse_version_folder("V99999999999"), None);
    }

    #[test]
    fn version_zero_is_not_a_version() {
        assert_eq!(parse_version_folder("V0"), None);
        assert_eq!(parse_version_folder("V00"), None);
        assert_eq!(latest_version(&["V0"]), None);
        assert_eq!(latest_version(&["V0", "V3"]), Some(3));
    }

    #[test]
    fn find_signature_dir_builds_path() {
        let fake = FakeAutomation::new().with_folders(["V1", "V3", "Vx", "V2"]);
        let dir = find_signature_dir(&fake, Path::new("/Users/me/Library/Mail")).unwrap();
        assert_eq!(
            dir,
            PathBuf::from("/Users/me/Library/Mail/V3/MailData/Signatures")
        );
    }

    #[test]
    fn find_signature_dir_not_found() {
        let fake = FakeAutomation::new().with_folders(Vec::<String>::new());
        let result = find_signature_dir(&fake, Path::new("/Users/me/Library/Mail"));
        assert!(matches!(result, Err(SignatureError::NotFound(_))));
    }
}
