//! End-to-end signature updates against a temporary Mail tree.
//!
//! These drive the public API with `FakeAutomation`, which copies real files
//! and tracks the immutable flag in memory.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::Serialize;
use signature_updater::platform::fake::{AutomationCall, FakeAutomation};
use signature_updater::{
    NamedSignature, SignatureContents, SignatureError, SignatureUpdater, UpdaterConfig,
};

const HEADER: &str = "Content-Transfer-Encoding: 7bit\n\
Content-Type: text/html;\n\
\tcharset=utf-8\n\
Message-Id: <11111111-2222-3333-4444-555555555555>\n\
Mime-Version: 1.0 (Mac OS X Mail 16.0)\n\
\n";

#[derive(Serialize)]
struct Record<'a> {
    #[serde(rename = "SignatureName")]
    name: &'a str,
    #[serde(rename = "SignatureUniqueId")]
    unique_id: &'a str,
}

/// Build `<root>/Mail/V<version>/MailData/Signatures` with a binary manifest
/// and one backing file per record.
fn mail_tree(root: &Path, version: u32, records: &[Record<'_>]) -> PathBuf {
    let signatures = root
        .join("Mail")
        .join(format!("V{version}"))
        .join("MailData")
        .join("Signatures");
    std::fs::create_dir_all(&signatures).expect("create signature dir");

    let manifest = std::fs::File::create(signatures.join("AllSignatures.plist"))
        .expect("create manifest");
    plist::to_writer_binary(manifest, &records).expect("write manifest");

    for record in records {
        std::fs::write(
            signatures.join(format!("{}.mailsignature", record.unique_id)),
            format!("{HEADER}<div>old {}</div>\n", record.name),
        )
        .expect("write backing file");
    }
    signatures
}

fn config(root: &Path) -> UpdaterConfig {
    UpdaterConfig {
        workdir: root.join("work"),
        mail_root: Some(root.join("Mail")),
        ..UpdaterConfig::default()
    }
}

#[test]
fn replaces_work_signature_with_header_kept() {
    let root = tempfile::tempdir().expect("tempdir");
    let signatures = mail_tree(
        root.path(),
        10,
        &[Record {
            name: "Work",
            unique_id: "abc",
        }],
    );
    let backing = signatures.join("abc.mailsignature");

    let fake = FakeAutomation::new();
    fake.lock_file(&backing);
    let updater = SignatureUpdater::new(&fake, config(root.path()));
    let mut selector = NamedSignature::new("Work", "Hello");

    let report = updater.update(&mut selector).expect("update");
    assert!(report.is_success());
    assert!(selector.found());

    assert_eq!(
        std::fs::read_to_string(&backing).expect("read backing file"),
        format!("{HEADER}Hello")
    );
    assert!(fake.is_immutable(&backing));
    assert!(!root.path().join("work").exists());
}

#[test]
fn newest_version_folder_is_used() {
    let root = tempfile::tempdir().expect("tempdir");
    let old = mail_tree(
        root.path(),
        9,
        &[Record {
            name: "Work",
            unique_id: "abc",
        }],
    );
    let current = mail_tree(
        root.path(),
        10,
        &[Record {
            name: "Work",
            unique_id: "abc",
        }],
    );

    let fake = FakeAutomation::new();
    let updater = SignatureUpdater::new(&fake, config(root.path()));
    updater
        .update(&mut SignatureContents::new().with("Work", "new"))
        .expect("update")
        .into_result()
        .expect("no collected errors");

    assert!(
        std::fs::read_to_string(current.join("abc.mailsignature"))
            .expect("read")
            .ends_with("new")
    );
    assert!(
        std::fs::read_to_string(old.join("abc.mailsignature"))
            .expect("read")
            .contains("old Work")
    );
}

#[test]
fn unknown_name_is_left_to_the_caller() {
    let root = tempfile::tempdir().expect("tempdir");
    mail_tree(
        root.path(),
        8,
        &[
            Record {
                name: "Work",
                unique_id: "abc",
            },
            Record {
                name: "Personal",
                unique_id: "def",
            },
        ],
    );

    let fake = FakeAutomation::new();
    let updater = SignatureUpdater::new(&fake, config(root.path()));
    let mut selector = NamedSignature::new("Holiday", "Hello");

    let report = updater.update(&mut selector).expect("update");
    assert!(report.is_success());
    assert!(report.patched.is_empty());
    assert!(!selector.found());
    // Mail is still restarted.
    assert_eq!(
        fake.calls().last(),
        Some(&AutomationCall::ActivateApp("Mail".to_owned()))
    );
}

#[test]
fn failures_are_collected_in_manifest_order() {
    let root = tempfile::tempdir().expect("tempdir");
    mail_tree(
        root.path(),
        8,
        &[
            Record {
                name: "Work",
                unique_id: "abc",
            },
            Record {
                name: "Personal",
                unique_id: "def",
            },
        ],
    );

    let fake = FakeAutomation::new().failing_lock().failing_activate();
    let updater = SignatureUpdater::new(&fake, config(root.path()));
    let mut selector = SignatureContents::new()
        .with("Work", "A")
        .with("Personal", "B");

    let report = updater.update(&mut selector).expect("update");
    let errors: Vec<&SignatureError> = report.errors.iter().collect();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], SignatureError::Patch { unique_id, .. } if unique_id == "abc"));
    assert!(matches!(errors[1], SignatureError::Patch { unique_id, .. } if unique_id == "def"));
    assert!(matches!(errors[2], SignatureError::AppControl(_)));

    let message = report.into_result().expect_err("aggregate error").to_string();
    assert!(message.starts_with("3 errors occurred"));
}

#[test]
fn quit_failure_stops_before_any_copy() {
    let root = tempfile::tempdir().expect("tempdir");
    let signatures = mail_tree(
        root.path(),
        10,
        &[Record {
            name: "Work",
            unique_id: "abc",
        }],
    );

    let fake = FakeAutomation::new().failing_quit();
    let updater = SignatureUpdater::new(&fake, config(root.path()));
    let result = updater.update(&mut NamedSignature::new("Work", "Hello"));

    assert!(matches!(result, Err(SignatureError::AppControl(_))));
    assert!(
        !fake
            .calls()
            .iter()
            .any(|call| matches!(call, AutomationCall::CopyFile { .. }))
    );
    assert!(
        std::fs::read_to_string(signatures.join("abc.mailsignature"))
            .expect("read")
            .contains("old Work")
    );
    assert!(!root.path().join("work").exists());
}

#[test]
fn replace_named_reads_body_once_for_duplicate_names() {
    let root = tempfile::tempdir().expect("tempdir");
    let signatures = mail_tree(
        root.path(),
        10,
        &[
            Record {
                name: "Work",
                unique_id: "abc",
            },
            Record {
                name: "Work",
                unique_id: "def",
            },
        ],
    );

    let fake = FakeAutomation::new();
    let updater = SignatureUpdater::new(&fake, config(root.path()));
    let patched = updater
        .replace_named("Work", &mut Cursor::new("<b>Hi</b>"))
        .expect("replace");

    assert_eq!(patched.len(), 2);
    for id in ["abc", "def"] {
        assert_eq!(
            std::fs::read_to_string(signatures.join(format!("{id}.mailsignature")))
                .expect("read"),
            format!("{HEADER}<b>Hi</b>")
        );
    }
}

#[test]
fn replace_named_missing_signature_is_not_found() {
    let root = tempfile::tempdir().expect("tempdir");
    mail_tree(
        root.path(),
        10,
        &[Record {
            name: "Work",
            unique_id: "abc",
        }],
    );

    let fake = FakeAutomation::new();
    let updater = SignatureUpdater::new(&fake, config(root.path()));
    let result = updater.replace_named("Holiday", &mut Cursor::new("x"));
    assert!(matches!(result, Err(SignatureError::NotFound(_))));
}
