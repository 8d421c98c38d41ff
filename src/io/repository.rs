use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::model::project::Project;

/// Error type for repository operations.
/// A persistence failure is fatal to the whole batch: the engine performs one
/// mutation pass, then a single atomic persist, so partial writes are never
/// observable.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("could not encode project: {0}")]
    EncodeError(#[from] serde_json::Error),
}

/// Storage boundary for project graphs.
///
/// The engine mutates an in-memory project and expects the driver to fetch
/// once and persist once per batch, never per operation.
pub trait Repository {
    fn fetch_project(&self, name: &str) -> Result<Project, RepositoryError>;
    fn persist(&self, project: &Project) -> Result<(), RepositoryError>;
}

/// File-per-project JSON store under one directory
#[derive(Debug, Clone)]
pub struct JsonRepository {
    root: PathBuf,
}

impl JsonRepository {
    pub fn new(root: impl Into<PathBuf>) -> JsonRepository {
        JsonRepository { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_path(&self, name: &str) -> PathBuf {
        // keep file names tame without touching the stored project name
        let slug: String = name
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        self.root.join(format!("{}.json", slug))
    }

    /// Names of every stored project, in file-system order
    pub fn list_projects(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names = Vec::new();
        if !self.root.exists() {
            return Ok(names);
        }
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let project = self.load(&path)?;
                names.push(project.name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load every stored project, for cross-project metrics
    pub fn fetch_all(&self) -> Result<Vec<Project>, RepositoryError> {
        let mut projects = Vec::new();
        if !self.root.exists() {
            return Ok(projects);
        }
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                projects.push(self.load(&path)?);
            }
        }
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    fn load(&self, path: &Path) -> Result<Project, RepositoryError> {
        let text = fs::read_to_string(path).map_err(|e| RepositoryError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| RepositoryError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Repository for JsonRepository {
    fn fetch_project(&self, name: &str) -> Result<Project, RepositoryError> {
        let path = self.project_path(name);
        if !path.exists() {
            return Err(RepositoryError::NotFound(name.to_string()));
        }
        self.load(&path)
    }

    /// Write-to-temp then rename, so a crash mid-write never leaves a
    /// half-written project behind
    fn persist(&self, project: &Project) -> Result<(), RepositoryError> {
        fs::create_dir_all(&self.root)?;
        let path = self.project_path(&project.name);
        let text = serde_json::to_string_pretty(project)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(text.as_bytes())?;
        tmp.persist(&path).map_err(|e| RepositoryError::IoError(e.error))?;
        Ok(())
    }
}
