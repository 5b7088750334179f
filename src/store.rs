use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

pub const ARTIFACT_SUFFIXES: [&str; 2] = ["_battlecard.pdf", "_battlecard.txt"];

/// File layout shared by every stage. Each stage reads its input from and
/// writes its output to a fixed path under one root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFile {
    pub name: String,
    pub size_bytes: u64,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collected_data_path(&self) -> PathBuf {
        self.root.join("output").join("collected_data.json")
    }

    pub fn organized_details_path(&self) -> PathBuf {
        self.root.join("output").join("organized_details.json")
    }

    pub fn competitor_profiles_path(&self) -> PathBuf {
        self.root.join("competitor_profiles.json")
    }

    pub fn battlecards_path(&self) -> PathBuf {
        self.root.join("battlecards.json")
    }

    pub fn battlecards_dir(&self) -> PathBuf {
        self.root.join("battlecards")
    }

    pub fn pdf_path(&self, competitor: &str) -> PathBuf {
        self.card_path(&file_stem(competitor), "pdf")
    }

    pub fn txt_path(&self, competitor: &str) -> PathBuf {
        self.card_path(&file_stem(competitor), "txt")
    }

    /// Battlecard artifact for an already sanitized stem.
    pub fn card_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.battlecards_dir()
            .join(format!("{stem}_battlecard.{extension}"))
    }

    pub fn load_json<T: DeserializeOwned>(&self, path: &Path) -> AppResult<T> {
        let raw = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("{} has not been generated yet", display(path, &self.root)))
            } else {
                AppError::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_json<T: Serialize>(&self, path: &Path, value: &T) -> AppResult<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_bytes(path, json.as_bytes())?;
        tracing::info!(path = %self::display(path, &self.root), "Data saved");
        Ok(())
    }

    pub fn write_bytes(&self, path: &Path, bytes: &[u8]) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Removes every file in the battlecards directory. Returns how many
    /// files were deleted.
    pub fn clear_battlecards(&self) -> AppResult<usize> {
        let dir = self.battlecards_dir();
        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        tracing::info!(removed, "Cleared old battlecards");
        Ok(removed)
    }

    /// Generated artifacts, sorted by file name.
    pub fn list_artifacts(&self) -> AppResult<Vec<ArtifactFile>> {
        let dir = self.battlecards_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_artifact_name(&name) && entry.file_type()?.is_file() {
                files.push(ArtifactFile {
                    name,
                    size_bytes: entry.metadata()?.len(),
                });
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Resolves a download request to a file inside the battlecards
    /// directory. Only plain artifact names are accepted.
    pub fn artifact_path(&self, name: &str) -> AppResult<PathBuf> {
        if !is_artifact_name(name) || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(AppError::Validation(format!("invalid file name: {name}")));
        }
        let path = self.battlecards_dir().join(name);
        if !path.is_file() {
            return Err(AppError::NotFound(format!("{name} not found")));
        }
        Ok(path)
    }
}

pub fn is_artifact_name(name: &str) -> bool {
    ARTIFACT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Competitor names become file names; path separators and control
/// characters are replaced.
pub fn file_stem(competitor: &str) -> String {
    let stem: String = competitor
        .trim()
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
            {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "competitor".to_string()
    } else {
        stem.to_string()
    }
}

fn display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
