//! Creating new script files from the panel.
//!
//! The host passes the target directory (normally the primary root's
//! `scripts/` folder) and the user-entered name; the name is sanitized to a
//! safe snake_case filename and a minimal Python template is written.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::error::Result;

/// Sanitize a script name for use as a Python filename.
///
/// - Converts to lowercase
/// - Replaces spaces and hyphens with underscores
/// - Removes special characters (keeps only alphanumeric and underscores)
/// - Collapses runs of underscores and trims them from the ends
fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == ' ' || c == '_' || c == '-' {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    let mut result = String::new();
    let mut last_was_underscore = false;
    for c in sanitized.chars() {
        if c == '_' {
            if !last_was_underscore && !result.is_empty() {
                result.push(c);
                last_was_underscore = true;
            }
        } else {
            result.push(c);
            last_was_underscore = false;
        }
    }
    if result.ends_with('_') {
        result.pop();
    }

    result
}

/// Convert a sanitized filename to a human-readable title.
fn name_to_title(name: &str) -> String {
    name.split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn generate_script_template(name: &str) -> String {
    let title = name_to_title(name);
    format!(
        r#""""{title}."""


def main():
    print("{title}")


main()
"#
    )
}

/// Create a new script file in `target_dir`.
///
/// The directory is created if needed; an existing file with the same name
/// is never overwritten.
#[instrument(name = "create_new_script", skip_all, fields(name = %name, dir = %target_dir.display()))]
pub fn create_new_script(target_dir: &Path, name: &str) -> Result<PathBuf> {
    let sanitized_name = sanitize_name(name);
    if sanitized_name.is_empty() {
        return Err(anyhow::anyhow!("script name cannot be empty after sanitization").into());
    }

    fs::create_dir_all(target_dir).with_context(|| {
        format!("failed to create scripts directory: {}", target_dir.display())
    })?;

    let script_path = target_dir.join(format!("{sanitized_name}.py"));
    if script_path.exists() {
        return Err(anyhow::anyhow!("script already exists: {}", script_path.display()).into());
    }

    let template = generate_script_template(&sanitized_name);
    fs::write(&script_path, &template)
        .with_context(|| format!("failed to write script file: {}", script_path.display()))?;

    info!(path = %script_path.display(), "created new script");
    Ok(script_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_name_basic() {
        assert_eq!(sanitize_name("hello"), "hello");
        assert_eq!(sanitize_name("Export Rig"), "export_rig");
        assert_eq!(sanitize_name("my-script-name"), "my_script_name");
    }

    #[test]
    fn test_sanitize_name_special_chars() {
        assert_eq!(sanitize_name("hello@world!"), "helloworld");
        assert_eq!(sanitize_name("foo & bar"), "foo_bar");
    }

    #[test]
    fn test_sanitize_name_collapses_and_trims() {
        assert_eq!(sanitize_name("a -- b __ c"), "a_b_c");
        assert_eq!(sanitize_name("  spaces  "), "spaces");
        assert_eq!(sanitize_name("_edges_"), "edges");
    }

    #[test]
    fn test_sanitize_name_empty() {
        assert_eq!(sanitize_name(""), "");
        assert_eq!(sanitize_name("   "), "");
        assert_eq!(sanitize_name("@#$%"), "");
    }

    #[test]
    fn test_name_to_title() {
        assert_eq!(name_to_title("export_rig"), "Export Rig");
        assert_eq!(name_to_title("a"), "A");
        assert_eq!(name_to_title(""), "");
    }

    #[test]
    fn test_create_new_script_writes_template() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("scripts");

        let path = create_new_script(&target, "Export Rig").unwrap();
        assert_eq!(path, target.join("export_rig.py"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"\"\"Export Rig.\"\"\""));
        assert!(content.contains("def main():"));
    }

    #[test]
    fn test_create_new_script_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("scripts");

        create_new_script(&target, "tool").unwrap();
        let err = create_new_script(&target, "tool").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_create_new_script_rejects_unusable_name() {
        let dir = tempdir().unwrap();
        let err = create_new_script(dir.path(), "@#$%").unwrap_err();
        assert!(err.to_string().contains("empty after sanitization"));
    }
}
