//! Replace an Apple Mail signature from the command line.
//!
//! Mail stores each signature as `<id>.mailsignature` under
//! `~/Library/Mail/V<n>/MailData/Signatures/`, indexed by
//! `AllSignatures.plist`. The files are protected and flagged immutable, so
//! replacing one takes a short dance:
//!
//! - **Locate**: find the highest `V<n>` folder ([`locator`])
//! - **Read**: copy out and decode the manifest ([`manifest`])
//! - **Patch**: copy the backing file out, keep its header, swap the body,
//!   re-lock it, copy it back ([`patcher`])
//! - **Orchestrate**: quit Mail, patch what the [`SignatureSelector`] picks,
//!   restart Mail, always removing the working directory ([`updater`])
//!
//! All contact with the host goes through [`platform::Automation`].

pub mod config;
pub mod error;
pub mod locator;
pub mod manifest;
pub mod patcher;
pub mod platform;
pub mod selector;
pub mod updater;
pub mod workdir;

pub use config::UpdaterConfig;
pub use error::{Result, SignatureError, UpdateErrors};
pub use manifest::SignatureManifestEntry;
pub use platform::{Automation, create_automation};
pub use selector::{NamedSignature, SignatureContents, SignatureSelector};
pub use updater::{SignatureUpdater, UpdatePhase, UpdateReport};
