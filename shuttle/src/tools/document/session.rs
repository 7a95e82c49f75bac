//! Shared document state for the drafting tools.

use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::tool_source::ToolSourceError;

/// The document being drafted plus the directory it is saved into.
///
/// Shared by `Arc` between the `update`/`save` tools and the drafter's system prompt. The
/// content sits behind a lock so parallel tool dispatch serializes access.
#[derive(Debug)]
pub struct DocumentSession {
    content: RwLock<String>,
    output_dir: PathBuf,
}

impl DocumentSession {
    /// Empty document saved under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            content: RwLock::new(String::new()),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Snapshot of the current content.
    pub fn content(&self) -> String {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the whole content.
    pub fn replace(&self, content: impl Into<String>) {
        let mut guard = self.content.write().unwrap_or_else(PoisonError::into_inner);
        *guard = content.into();
    }

    /// Writes the current content to `filename` under the output directory.
    ///
    /// `.txt` is appended when the name lacks it. Returns the final file name.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty name or one that escapes the output directory; `Io` when
    /// the directory cannot be created or the file cannot be written.
    pub async fn save_as(&self, filename: &str) -> Result<String, ToolSourceError> {
        let filename = normalize_filename(filename)?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = resolve_under(&self.output_dir, &filename)?;
        let content = self.content();
        tokio::fs::write(&path, content.as_bytes()).await?;
        debug!(path = %path.display(), bytes = content.len(), "document saved");
        Ok(filename)
    }
}

fn normalize_filename(filename: &str) -> Result<String, ToolSourceError> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(ToolSourceError::InvalidInput("filename is empty".to_string()));
    }
    if filename.ends_with(".txt") {
        Ok(filename.to_string())
    } else {
        Ok(format!("{}.txt", filename))
    }
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut buf = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(p) => buf = PathBuf::from(p.as_os_str()),
            Component::RootDir => buf.push(comp),
            Component::CurDir => {}
            Component::ParentDir => {
                buf.pop();
            }
            Component::Normal(s) => buf.push(s),
        }
    }
    buf
}

/// Joins `name` onto the canonical `dir` and rejects results outside it.
fn resolve_under(dir: &Path, name: &str) -> Result<PathBuf, ToolSourceError> {
    let base = dir.canonicalize()?;
    let full = normalize_path(&base.join(name));
    if full == base || !full.starts_with(&base) {
        return Err(ToolSourceError::InvalidInput(format!(
            "'{}' is outside the output directory",
            name
        )));
    }
    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_filename_appends_txt_once() {
        assert_eq!(normalize_filename("notes").unwrap(), "notes.txt");
        assert_eq!(normalize_filename("notes.txt").unwrap(), "notes.txt");
        assert_eq!(normalize_filename(" a.md ").unwrap(), "a.md.txt");
        assert!(normalize_filename("  ").is_err());
    }

    #[test]
    fn normalize_path_resolves_dot_dot() {
        assert_eq!(normalize_path(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("/a/./b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn resolve_under_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_under(dir.path(), "../x.txt").is_err());
        assert!(resolve_under(dir.path(), "/etc/x.txt").is_err());
        assert!(resolve_under(dir.path(), "sub/../x.txt").is_ok());
    }

    #[test]
    fn replace_overwrites_content() {
        let session = DocumentSession::new(".");
        session.replace("one");
        session.replace("two");
        assert_eq!(session.content(), "two");
    }
}
