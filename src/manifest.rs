//! Reading Mail's signature manifest (`AllSignatures.plist`).
//!
//! The manifest is an array of dictionaries, one per signature. Only the
//! display name and the unique identifier are decoded; the identifier names
//! the backing `<id>.mailsignature` file in the same directory.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SignatureError};
use crate::platform::Automation;

/// One signature listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignatureManifestEntry {
    /// Name shown in Mail's signature preferences.
    #[serde(rename = "SignatureName")]
    pub name: String,
    /// Identifier of the backing file.
    #[serde(rename = "SignatureUniqueId")]
    pub unique_id: String,
}

/// Decode manifest entries from an XML or binary property list.
///
/// # Errors
///
/// Returns [`SignatureError::Decode`] if the data is not a property list
/// array of signature records.
pub fn decode_manifest<R: Read + Seek>(reader: R) -> Result<Vec<SignatureManifestEntry>> {
    plist::from_reader(reader).map_err(|e| SignatureError::Decode(e.to_string()))
}

/// Decode the manifest stored at `path`.
///
/// # Errors
///
/// Returns [`SignatureError::Io`] if the file cannot be opened and
/// [`SignatureError::Decode`] if it cannot be parsed.
pub fn read_manifest(path: &Path) -> Result<Vec<SignatureManifestEntry>> {
    let file = std::fs::File::open(path).map_err(|e| SignatureError::io(path.display(), e))?;
    plist::from_reader(std::io::BufReader::new(file))
        .map_err(|e| SignatureError::Decode(format!("{}: {e}", path.display())))
}

/// Copy the manifest from `signature_dir` into `workdir`.
///
/// The live directory is not read directly: it is protected and Mail may
/// hold the file open. Returns the path of the copy.
///
/// # Errors
///
/// Returns [`SignatureError::Copy`] if the copy fails.
pub fn copy_manifest(
    automation: &dyn Automation,
    signature_dir: &Path,
    workdir: &Path,
    manifest_file: &str,
) -> Result<PathBuf> {
    automation.copy_file(&signature_dir.join(manifest_file), workdir)?;
    Ok(workdir.join(manifest_file))
}

/// Copy the manifest into `workdir` and decode it.
///
/// # Errors
///
/// Returns the errors of [`copy_manifest`] and [`read_manifest`].
pub fn load_manifest(
    automation: &dyn Automation,
    signature_dir: &Path,
    workdir: &Path,
    manifest_file: &str,
) -> Result<Vec<SignatureManifestEntry>> {
    let copy = copy_manifest(automation, signature_dir, workdir, manifest_file)?;
    let entries = read_manifest(&copy)?;
    tracing::debug!(count = entries.len(), "decoded signature manifest");
    Ok(entries)
}
