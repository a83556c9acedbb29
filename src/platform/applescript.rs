//! AppleScript snippets sent to `osascript`, and parsing of their output.
//!
//! Values interpolated into a script are quoted with [`quote`] so a path or
//! app name containing `"` or `\` cannot break out of the string literal.

use std::path::Path;

/// Quote `value` as an AppleScript string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn posix_file(path: &Path) -> String {
    format!("POSIX file {}", quote(&path.to_string_lossy()))
}

/// `quit app "<app>"`
pub fn quit_app(app: &str) -> String {
    format!("quit app {}", quote(app))
}

/// `activate app "<app>"`
pub fn activate_app(app: &str) -> String {
    format!("activate app {}", quote(app))
}

/// Ask Finder for the names of the folders inside `dir`.
pub fn list_folders(dir: &Path) -> String {
    format!(
        "tell app \"Finder\" to get name of folders of folder {}",
        posix_file(dir)
    )
}

/// Ask Finder to duplicate `from` into the folder `to_dir`, replacing.
///
/// Finder is used instead of a plain copy because the Mail data folder is
/// protected and Finder holds the Full Disk Access grant.
pub fn duplicate(from: &Path, to_dir: &Path) -> String {
    format!(
        "tell application \"Finder\" to duplicate {} to {} replacing yes",
        posix_file(from),
        posix_file(to_dir)
    )
}

/// Split Finder's list output (`"V2, V3, MailData\n"`) into names.
pub fn parse_name_list(output: &str) -> Vec<String> {
    output
        .trim()
        .split(", ")
        .map(|name| name.trim_matches(|c: char| c == ' ' || c == '\n' || c == '\r'))
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_plain_value() {
        assert_eq!(quote("Mail"), "\"Mail\"");
    }

    #[test]
    fn quote_escapes_quotes_and_backslashes() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn app_scripts() {
        assert_eq!(quit_app("Mail"), "quit app \"Mail\"");
        assert_eq!(activate_app("Mail"), "activate app \"Mail\"");
    }

    #[test]
    fn duplicate_script_names_both_paths() {
        let script = duplicate(
            Path::new("/Users/me/Library/Mail/V10/MailData/Signatures/AllSignatures.plist"),
            Path::new("/tmp/signatures/"),
        );
        assert_eq!(
            script,
            "tell application \"Finder\" to duplicate POSIX file \
             \"/Users/me/Library/Mail/V10/MailData/Signatures/AllSignatures.plist\" \
             to POSIX file \"/tmp/signatures/\" replacing yes"
        );
    }

    #[test]
    fn hostile_path_stays_inside_literal() {
        let script = list_folders(Path::new("/tmp/x\" & do shell script \"rm"));
        assert!(script.contains(r#"/tmp/x\" & do shell script \"rm"#));
    }

    #[test]
    fn parse_name_list_splits_finder_output() {
        assert_eq!(
            parse_name_list("MailData, V2, V3\n"),
            vec!["MailData", "V2", "V3"]
        );
    }

    #[test]
    fn parse_name_list_single_and_empty() {
        assert_eq!(parse_name_list("V9\n"), vec!["V9"]);
        assert!(parse_name_list("").is_empty());
        assert!(parse_name_list("\n").is_empty());
    }
}
