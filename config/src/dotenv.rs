//! `.env` reader. Values are returned, never applied here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` in `dir`, or in the current directory when `dir` is `None`.
fn locate(dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Unquotes one value.
///
/// Double quotes honour `\"`, `\\` and `\n`; single quotes are literal; unquoted values end at
/// ` #` (inline comment).
fn parse_value(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }
        return out;
    }
    if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return inner.to_string();
    }
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// `KEY=VALUE` per line; blank lines, `#` comments and lines without `=` are skipped. An
/// optional leading `export ` is accepted. Later duplicates win.
pub(crate) fn parse(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), parse_value(value)))
        })
        .collect()
}

/// Reads `.env` from `dir` (or the current directory). A missing file is an empty map.
pub(crate) fn load(dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match locate(dir) {
        Some(path) => Ok(parse(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_noise() {
        let m = parse("\n# comment\nA=1\nnot a pair\n=orphan\n  B = two  \n");
        assert_eq!(m.len(), 2);
        assert_eq!(m["A"], "1");
        assert_eq!(m["B"], "two");
    }

    #[test]
    fn export_prefix_and_duplicates() {
        let m = parse("export MODEL=gpt-4o\nMODEL=gpt-4o-mini\n");
        assert_eq!(m["MODEL"], "gpt-4o-mini");
    }

    #[test]
    fn quoting_rules() {
        let m = parse(
            "D=\"say \\\"hi\\\"\\nbye\"\nS='a \\n b'\nU=plain # trailing\nH=a#b\nE=\nQ=\"\"\n",
        );
        assert_eq!(m["D"], "say \"hi\"\nbye");
        assert_eq!(m["S"], "a \\n b");
        assert_eq!(m["U"], "plain");
        assert_eq!(m["H"], "a#b");
        assert_eq!(m["E"], "");
        assert_eq!(m["Q"], "");
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn load_reads_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "OPENAI_API_KEY=sk-test\n").unwrap();
        let m = load(Some(dir.path())).unwrap();
        assert_eq!(m["OPENAI_API_KEY"], "sk-test");
    }
}
