use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EnvconfError, Result};
use crate::ui;

/// Variables parsed from a dotenv file, in the order they first appear.
///
/// A key defined twice keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    entries: Vec<(String, String)>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse dotenv-style `KEY=VALUE` content, ignoring lines that are not
    /// valid assignments.
    pub fn parse(contents: &str) -> std::result::Result<Self, dotenvy::Error> {
        Self::parse_with_skipped(contents).map(|(map, _)| map)
    }

    /// Like [`EnvMap::parse`], also returning the text of every skipped line.
    pub fn parse_with_skipped(
        contents: &str,
    ) -> std::result::Result<(Self, Vec<String>), dotenvy::Error> {
        let mut map = Self::new();
        let mut skipped = Vec::new();
        for item in dotenvy::from_read_iter(contents.as_bytes()) {
            match item {
                Ok((key, value)) => map.insert(key, value),
                Err(dotenvy::Error::LineParse(line, _)) => skipped.push(line),
                Err(err) => return Err(err),
            }
        }
        Ok((map, skipped))
    }

    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A dotenv file read from disk: raw text plus its parsed variables.
#[derive(Debug, Clone)]
pub struct EnvFile {
    pub path: PathBuf,
    pub contents: String,
    pub vars: EnvMap,
}

impl EnvFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| EnvconfError::FileReadFailure {
            path: path.to_path_buf(),
            source,
        })?;

        let (vars, skipped) =
            EnvMap::parse_with_skipped(&contents).map_err(|err| EnvconfError::InvalidEnvFile {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        for line in &skipped {
            ui::warn(format!(
                "Ignoring unparseable line in {}: {line}",
                ui::display_path(path)
            ));
        }
        debug!(path = %path.display(), vars = vars.len(), "parsed env file");

        Ok(Self {
            path: path.to_path_buf(),
            contents,
            vars,
        })
    }
}

/// Persist rendered content, creating or truncating the file.
pub fn write(path: &Path, contents: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = contents.len(), "writing env file");
    fs::write(path, contents).map_err(|source| EnvconfError::FileWriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_keeps_file_order() {
        let map = EnvMap::parse("ZED=1\nALPHA=\nMID=two\n").unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["ZED", "ALPHA", "MID"]);
        assert_eq!(map.get("ALPHA"), Some(""));
        assert_eq!(map.get("MID"), Some("two"));
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let map = EnvMap::parse("# database\n\nDB_HOST=localhost\n# DB_PORT=5432\n").unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("DB_HOST"));
        assert!(!map.contains_key("DB_PORT"));
    }

    #[test]
    fn test_parse_quoted_values() {
        let map = EnvMap::parse("GREETING=\"hello world\"\nSINGLE='x y'\n").unwrap();
        assert_eq!(map.get("GREETING"), Some("hello world"));
        assert_eq!(map.get("SINGLE"), Some("x y"));
    }

    #[test]
    fn test_duplicate_key_keeps_first_position_last_value() {
        let map = EnvMap::parse("A=1\nB=2\nA=3\n").unwrap();
        let pairs: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn test_parse_skips_unparseable_lines() {
        let (map, skipped) =
            EnvMap::parse_with_skipped("A=\nMY-KEY=1\nJUST_TEXT\n[section]\nB=1\n").unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(skipped.len(), 3);
        assert_eq!(skipped[0], "MY-KEY=1");
    }

    #[test]
    fn test_read_tolerates_odd_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env.example");
        fs::write(&path, "A=\nsome text here\nB=2\n").unwrap();

        let file = EnvFile::read(&path).unwrap();
        assert_eq!(file.vars.len(), 2);
        assert_eq!(file.vars.get("B"), Some("2"));
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let map = EnvMap::parse("A=1").unwrap();
        assert_eq!(map.get("A"), Some("1"));
    }

    #[test]
    fn test_read_reports_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = EnvFile::read(&temp.path().join(".env")).unwrap_err();
        assert!(matches!(err, EnvconfError::FileReadFailure { .. }));
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");

        write(&path, "A=1\n").unwrap();
        let file = EnvFile::read(&path).unwrap();
        assert_eq!(file.contents, "A=1\n");
        assert_eq!(file.vars.get("A"), Some("1"));
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let err = write(&temp.path().join("nope/.env"), "A=1\n").unwrap_err();
        assert!(matches!(err, EnvconfError::FileWriteFailure { .. }));
    }
}
