use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EnvconfError, Result};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "envconf.toml";

/// Contents written by `envconf init`.
pub const TEMPLATE_FILE: &str = r#"[[files]]
template = ""
output = ""
allow-empty = []
force-prompt-on-create = []
"#;

/// One `[[files]]` table: a template and the output file kept in sync with it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEntry {
    pub template: String,
    pub output: String,
    /// Variables that may stay empty and are never asked for on create.
    #[serde(default)]
    pub allow_empty: BTreeSet<String>,
    /// Variables asked for on create even when the template has a value.
    #[serde(default, rename = "force-prompt-on-create")]
    pub force_prompt: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    files: Vec<FileEntry>,
}

/// A loaded and validated `envconf.toml`.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    entries: Vec<FileEntry>,
}

impl Config {
    /// Read, decode and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(EnvconfError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| EnvconfError::FileReadFailure {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path, &contents)
    }

    /// Decode `contents` as if read from `path`.
    ///
    /// Syntax errors surface as [`EnvconfError::InvalidToml`], a well-formed
    /// document with the wrong shape as [`EnvconfError::InvalidSchema`].
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let table: toml::Table = contents.parse().map_err(|err: toml::de::Error| {
            EnvconfError::InvalidToml {
                path: path.to_path_buf(),
                message: err.message().to_string(),
            }
        })?;

        let file: ConfigFile = toml::Value::Table(table).try_into().map_err(
            |err: toml::de::Error| EnvconfError::InvalidSchema {
                path: path.to_path_buf(),
                message: err.message().to_string(),
            },
        )?;

        validate_unique(&file.files)?;
        debug!(path = %path.display(), entries = file.files.len(), "loaded config");

        Ok(Self {
            path: path.to_path_buf(),
            entries: file.files,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Directory template and output paths are relative to. `None` means
    /// the working directory.
    pub fn base_dir(&self) -> Option<&Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }

    pub fn template_path(&self, entry: &FileEntry) -> PathBuf {
        self.resolve(&entry.template)
    }

    pub fn output_path(&self, entry: &FileEntry) -> PathBuf {
        self.resolve(&entry.output)
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        match self.base_dir() {
            Some(dir) => dir.join(relative),
            None => PathBuf::from(relative),
        }
    }

    /// Fail on the first entry whose template file is absent.
    ///
    /// Runs over every entry before anything is prompted.
    pub fn check_templates(&self) -> Result<()> {
        for entry in &self.entries {
            let template = self.template_path(entry);
            if !template.is_file() {
                return Err(EnvconfError::TemplateMissing(template));
            }
            debug!(template = %template.display(), "template present");
        }
        Ok(())
    }
}

/// Reject configs that repeat a template or an output path.
pub fn validate_unique(entries: &[FileEntry]) -> Result<()> {
    check_distinct("template", entries.iter().map(|entry| entry.template.as_str()))?;
    check_distinct("output", entries.iter().map(|entry| entry.output.as_str()))
}

fn check_distinct<'a>(kind: &'static str, paths: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for path in paths {
        if !seen.insert(path) && !duplicates.iter().any(|dup| dup == path) {
            duplicates.push(path.to_string());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(EnvconfError::DuplicateEntry {
            kind,
            count: duplicates.len(),
            paths: duplicates,
        })
    }
}

/// Write [`TEMPLATE_FILE`] to `path`, refusing to replace an existing file.
pub fn write_template(path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => EnvconfError::ConfigExists(path.to_path_buf()),
            _ => EnvconfError::FileWriteFailure {
                path: path.to_path_buf(),
                source,
            },
        })?;

    file.write_all(TEMPLATE_FILE.as_bytes())
        .map_err(|source| EnvconfError::FileWriteFailure {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(template: &str, output: &str) -> FileEntry {
        FileEntry {
            template: template.to_string(),
            output: output.to_string(),
            allow_empty: BTreeSet::new(),
            force_prompt: BTreeSet::new(),
        }
    }

    #[test]
    fn test_parse_full_entry() {
        let config = Config::parse(
            Path::new("envconf.toml"),
            r#"
[[files]]
template = ".env.example"
output = ".env"
allow-empty = ["SENTRY_DSN"]
force-prompt-on-create = ["PORT"]
"#,
        )
        .unwrap();

        assert_eq!(config.entries().len(), 1);
        let entry = &config.entries()[0];
        assert_eq!(entry.template, ".env.example");
        assert_eq!(entry.output, ".env");
        assert!(entry.allow_empty.contains("SENTRY_DSN"));
        assert!(entry.force_prompt.contains("PORT"));
    }

    #[test]
    fn test_parse_optional_lists_default_empty() {
        let config = Config::parse(
            Path::new("envconf.toml"),
            "[[files]]\ntemplate = \"a\"\noutput = \"b\"\n",
        )
        .unwrap();

        let entry = &config.entries()[0];
        assert!(entry.allow_empty.is_empty());
        assert!(entry.force_prompt.is_empty());
    }

    #[test]
    fn test_init_template_is_valid_config() {
        let config = Config::parse(Path::new("envconf.toml"), TEMPLATE_FILE).unwrap();
        assert_eq!(config.entries(), &[entry("", "")]);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = Config::parse(Path::new("envconf.toml"), "[[files]\ntemplate =").unwrap_err();
        assert!(matches!(err, EnvconfError::InvalidToml { .. }));
    }

    #[test]
    fn test_parse_missing_output_is_schema_error() {
        let err = Config::parse(
            Path::new("envconf.toml"),
            "[[files]]\ntemplate = \".env.example\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, EnvconfError::InvalidSchema { .. }));
    }

    #[test]
    fn test_parse_mistyped_list_is_schema_error() {
        let err = Config::parse(
            Path::new("envconf.toml"),
            "[[files]]\ntemplate = \"a\"\noutput = \"b\"\nallow-empty = \"X\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, EnvconfError::InvalidSchema { .. }));
    }

    #[test]
    fn test_parse_missing_files_is_schema_error() {
        let err = Config::parse(Path::new("envconf.toml"), "name = \"x\"\n").unwrap_err();
        assert!(matches!(err, EnvconfError::InvalidSchema { .. }));
    }

    #[test]
    fn test_duplicate_template_rejected() {
        let err = validate_unique(&[entry("a", "x"), entry("a", "y")]).unwrap_err();
        match err {
            EnvconfError::DuplicateEntry { kind, count, paths } => {
                assert_eq!(kind, "template");
                assert_eq!(count, 1);
                assert_eq!(paths, vec!["a".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let err = validate_unique(&[entry("a", "x"), entry("b", "x"), entry("c", "x")])
            .unwrap_err();
        match err {
            EnvconfError::DuplicateEntry { kind, count, .. } => {
                assert_eq!(kind, "output");
                assert_eq!(count, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicates_rejected_without_touching_files() {
        // Neither template exists; duplicate detection must still win.
        let err = Config::parse(
            Path::new("/nonexistent/envconf.toml"),
            "[[files]]\ntemplate = \"t\"\noutput = \"o1\"\n\n[[files]]\ntemplate = \"t\"\noutput = \"o2\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, EnvconfError::DuplicateEntry { .. }));
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(&temp.path().join("envconf.toml")).unwrap_err();
        assert!(matches!(err, EnvconfError::ConfigNotFound(_)));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let config = Config::parse(
            Path::new("project/envconf.toml"),
            "[[files]]\ntemplate = \".env.example\"\noutput = \".env\"\n",
        )
        .unwrap();
        let entry = &config.entries()[0];
        assert_eq!(config.template_path(entry), Path::new("project/.env.example"));
        assert_eq!(config.output_path(entry), Path::new("project/.env"));
    }

    #[test]
    fn test_bare_file_name_resolves_to_current_dir() {
        let config = Config::parse(
            Path::new("envconf.toml"),
            "[[files]]\ntemplate = \".env.example\"\noutput = \".env\"\n",
        )
        .unwrap();
        assert_eq!(config.base_dir(), None);
        assert_eq!(
            config.template_path(&config.entries()[0]),
            Path::new(".env.example")
        );
    }

    #[test]
    fn test_check_templates_reports_first_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("present.env"), "A=\n").unwrap();
        let config_path = temp.path().join("envconf.toml");
        fs::write(
            &config_path,
            "[[files]]\ntemplate = \"present.env\"\noutput = \"a\"\n\n[[files]]\ntemplate = \"missing.env\"\noutput = \"b\"\n",
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        match config.check_templates().unwrap_err() {
            EnvconfError::TemplateMissing(path) => {
                assert_eq!(path, temp.path().join("missing.env"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_write_template_refuses_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envconf.toml");
        fs::write(&path, "keep me").unwrap();

        let err = write_template(&path).unwrap_err();
        assert!(matches!(err, EnvconfError::ConfigExists(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_write_template_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envconf.toml");

        write_template(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), TEMPLATE_FILE);
    }
}
