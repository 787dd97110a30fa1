use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProjectError, Result};

pub const MANIFEST_FILE: &str = "goml.toml";

/// Root manifest structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProjectSettings {
    pub project: ProjectSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// `[project]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProjectSection {
    pub name: String,
    /// Markup entry point, relative to the project root.
    pub main_document: String,
}

/// `[runtime]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuntimeSection {
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_fps() -> f64 {
    60.0
}

fn default_frames() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            frames: default_frames(),
            log_level: default_log_level(),
        }
    }
}

impl ProjectSettings {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: ProjectSettings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(self.runtime.fps.is_finite() && self.runtime.fps > 0.0) {
            return Err(ProjectError::Invalid(format!(
                "runtime.fps must be a positive number, got {}",
                self.runtime.fps
            )));
        }
        if self.project.main_document.trim().is_empty() {
            return Err(ProjectError::Invalid(
                "project.main_document must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// A project on disk: its root directory plus the parsed manifest.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    settings: ProjectSettings,
}

impl Project {
    /// Reads `<root>/goml.toml`.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE);
        let contents = std::fs::read_to_string(&manifest_path).map_err(|source| ProjectError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        let settings = ProjectSettings::from_toml_str(&contents)?;
        log::debug!("loaded manifest {}", manifest_path.display());
        Ok(Self { root, settings })
    }

    pub fn from_settings(root: impl Into<PathBuf>, settings: ProjectSettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.project.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn runtime(&self) -> &RuntimeSection {
        &self.settings.runtime
    }

    pub fn main_document_path(&self) -> PathBuf {
        self.root.join(&self.settings.project.main_document)
    }

    pub fn read_main_document(&self) -> Result<String> {
        let path = self.main_document_path();
        std::fs::read_to_string(&path).map_err(|source| ProjectError::Io { path, source })
    }
}
