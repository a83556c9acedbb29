//! Replacing the body of a signature's backing file.
//!
//! A `.mailsignature` file starts with a few MIME header lines Mail needs
//! (`Content-Type`, `Message-Id`, `Mime-Version`, ...) followed by the HTML
//! body. The patcher keeps the leading lines verbatim and swaps everything
//! after them for the caller's content.
//!
//! The file lives in a protected folder and carries the user-immutable flag,
//! so the work happens on a copy in the working directory:
//!
//! 1. copy the backing file into the working directory
//! 2. clear the immutable flag on the copy
//! 3. keep the header lines, truncate, write header + new content
//! 4. set the immutable flag again
//! 5. copy the result back over the original
//!
//! Whatever happens after step 2, the flag on the working copy is cleared
//! once more on the way out so the working directory can be removed.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SignatureError};
use crate::platform::Automation;

/// Patches signature backing files through a working directory.
pub struct SignaturePatcher<'a> {
    automation: &'a dyn Automation,
    workdir: &'a Path,
    signature_dir: &'a Path,
    header_lines: usize,
    extension: String,
}

impl<'a> SignaturePatcher<'a> {
    /// Create a patcher with the defaults Mail uses: 6 header lines and the
    /// `mailsignature` extension.
    pub fn new(
        automation: &'a dyn Automation,
        workdir: &'a Path,
        signature_dir: &'a Path,
    ) -> Self {
        Self {
            automation,
            workdir,
            signature_dir,
            header_lines: 6,
            extension: "mailsignature".to_owned(),
        }
    }

    /// Number of leading lines kept verbatim.
    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = header_lines;
        self
    }

    /// Backing file extension, without the dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// File name of the backing file for `unique_id`.
    pub fn file_name(&self, unique_id: &str) -> String {
        format!("{unique_id}.{}", self.extension)
    }

    /// Replace the body of the signature `unique_id` with `content`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Patch`] naming `unique_id` and wrapping the
    /// step that failed. A failure to re-set the immutable flag is returned
    /// only after the patched file has been copied back.
    pub fn patch(&self, unique_id: &str, content: &mut dyn Read) -> Result<()> {
        self.patch_inner(unique_id, content)
            .map_err(|e| SignatureError::patch(unique_id, e))
    }

    fn patch_inner(&self, unique_id: &str, content: &mut dyn Read) -> Result<()> {
        let file_name = self.file_name(unique_id);
        let source = self.signature_dir.join(&file_name);
        let working = self.workdir.join(&file_name);

        self.automation.copy_file(&source, self.workdir)?;
        self.automation.set_immutable(&working, false)?;
        let _unlock = UnlockOnDrop {
            automation: self.automation,
            path: working.clone(),
        };

        rewrite_signature_file(&working, content, self.header_lines)?;

        let locked = self.automation.set_immutable(&working, true);
        if let Err(ref e) = locked {
            tracing::warn!(unique_id, error = %e, "could not re-lock signature, copying back anyway");
        }

        self.automation.copy_file(&working, self.signature_dir)?;
        tracing::info!(unique_id, "signature replaced");
        locked
    }
}

/// Clears the immutable flag on a working copy when dropped.
struct UnlockOnDrop<'a> {
    automation: &'a dyn Automation,
    path: PathBuf,
}

impl Drop for UnlockOnDrop<'_> {
    fn drop(&mut self) {
        // Best effort: the working directory removal reports anything left over.
        let _ = self.automation.set_immutable(&self.path, false);
    }
}

/// Read up to `lines` lines from `reader`, keeping line terminators.
///
/// If the last line read has no terminator, `\n` is appended so anything
/// written after the header starts on a new line.
pub fn read_header<R: BufRead>(reader: &mut R, lines: usize) -> std::io::Result<Vec<u8>> {
    let mut header = Vec::new();
    for _ in 0..lines {
        if reader.read_until(b'\n', &mut header)? == 0 {
            break;
        }
    }
    if !header.is_empty() && !header.ends_with(b"\n") {
        header.push(b'\n');
    }
    Ok(header)
}

/// Rewrite `path` in place as its first `header_lines` lines followed by `content`.
///
/// # Errors
///
/// Returns [`SignatureError::Io`] describing which part of the rewrite failed.
pub fn rewrite_signature_file(
    path: &Path,
    content: &mut dyn Read,
    header_lines: usize,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| SignatureError::io(format!("open {}", path.display()), e))?;

    let header = read_header(&mut BufReader::new(&file), header_lines)
        .map_err(|e| SignatureError::io(format!("read header of {}", path.display()), e))?;

    truncate(&mut file)
        .map_err(|e| SignatureError::io(format!("truncate {}", path.display()), e))?;
    file.write_all(&header)
        .map_err(|e| SignatureError::io(format!("write header to {}", path.display()), e))?;
    std::io::copy(content, &mut file)
        .map_err(|e| SignatureError::io(format!("write new signature to {}", path.display()), e))?;
    file.flush()?;
    Ok(())
}

fn truncate(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(())
}
