//! Filesystem utilities for varsel.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Create a directory and all parent directories if they do not exist.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), UtilError> {
    std::fs::create_dir_all(path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Read a whole file into a string.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_to_string(path: &Path) -> Result<String, UtilError> {
    std::fs::read_to_string(path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Write `content` to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns an error if the parent directory or the file cannot be written.
pub fn write_file(path: &Path, content: &str) -> Result<(), UtilError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, content).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Collect all files whose extension is one of `extensions` under `dir`,
/// recursively, sorted by path.
///
/// # Errors
/// Returns an error if `dir` or one of its subdirectories cannot be read.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, UtilError> {
    let mut files = Vec::new();
    collect_files_recursive(dir, extensions, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files_recursive(
    dir: &Path,
    extensions: &[&str],
    out: &mut Vec<PathBuf>,
) -> Result<(), UtilError> {
    let entries = std::fs::read_dir(dir).map_err(|source| UtilError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| UtilError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();

        if path.is_dir() {
            collect_files_recursive(&path, extensions, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e))
        {
            out.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn collect_files_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("nested/deeper")).unwrap();
        fs::write(tmp.path().join("b.module"), "{}").unwrap();
        fs::write(tmp.path().join("a.pom"), "<project/>").unwrap();
        fs::write(tmp.path().join("nested/deeper/c.module"), "{}").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let files = collect_files(tmp.path(), &["module", "pom"]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(tmp.path())
                    .unwrap()
                    .display()
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["a.pom", "b.module", "nested/deeper/c.module"]);
    }

    #[test]
    fn collect_files_missing_dir_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = collect_files(&tmp.path().join("absent"), &["module"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("cannot access"), "error was: {err}");
    }

    #[test]
    fn write_file_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/c.txt");
        write_file(&path, "hello").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn read_missing_file_names_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.toml");
        let err = read_to_string(&path).unwrap_err().to_string();
        assert!(err.contains("nope.toml"), "error was: {err}");
    }
}
