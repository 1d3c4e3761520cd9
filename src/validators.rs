//! Session path validation shared by the CLI and the open-session prompt

use std::path::{Path, PathBuf};

use crate::constants::SESSION_EXTENSION;

/// Validate a user-entered session path.
///
/// The path must end in `.json` and its parent directory must exist. The
/// error is the message shown to the user.
pub fn validate_session_path(value: &str) -> Result<PathBuf, String> {
    if value.is_empty() {
        return Err("File path is required".to_string());
    }
    if !value.ends_with(&format!(".{}", SESSION_EXTENSION)) {
        return Err(format!("File path must end with .{}", SESSION_EXTENSION));
    }

    let path = PathBuf::from(value);
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(format!("Directory {} does not exist", display(&parent)));
    }

    Ok(path)
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(validate_session_path(""), Err("File path is required".into()));
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            validate_session_path("requests.yaml"),
            Err("File path must end with .json".into())
        );
    }

    #[test]
    fn test_parent_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join("s.json");
        let err = validate_session_path(missing.to_str().unwrap()).unwrap_err();
        assert!(err.starts_with("Directory "));
        assert!(err.ends_with("does not exist"));
    }

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate_session_path("new.json"), Ok(PathBuf::from("new.json")));

        let dir = tempfile::tempdir().unwrap();
        let inside = dir.path().join("s.json");
        assert_eq!(validate_session_path(inside.to_str().unwrap()), Ok(inside));
    }
}
