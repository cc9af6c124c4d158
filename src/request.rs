//! Validated compilation inputs.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A `.proto` schema plus an optional nanopb options file.
///
/// Both paths are made absolute and checked to exist at construction, so a
/// request that gets as far as launching a tool always names real files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationRequest {
    schema_path: PathBuf,
    include_dir: PathBuf,
    base_name: String,
    options_file: Option<PathBuf>,
}

impl CompilationRequest {
    pub fn new(schema_path: impl AsRef<Path>) -> Result<Self> {
        let schema_path = existing_file(schema_path.as_ref()).ok_or_else(|| {
            Error::SchemaNotFound(schema_path.as_ref().to_path_buf())
        })?;
        // A file always has a parent once made absolute.
        let include_dir = schema_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let base_name = schema_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            schema_path,
            include_dir,
            base_name,
            options_file: None,
        })
    }

    /// Attach a generator options file.
    pub fn with_options_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = existing_file(path.as_ref())
            .ok_or_else(|| Error::OptionsNotFound(path.as_ref().to_path_buf()))?;
        self.options_file = Some(path);
        Ok(self)
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Directory passed to protoc as the import root.
    pub fn include_dir(&self) -> &Path {
        &self.include_dir
    }

    /// Schema file name without its extension, e.g. `sensor`.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn options_file(&self) -> Option<&Path> {
        self.options_file.as_deref()
    }
}

fn existing_file(path: &Path) -> Option<PathBuf> {
    let path = std::path::absolute(path).ok()?;
    path.is_file().then_some(path)
}
