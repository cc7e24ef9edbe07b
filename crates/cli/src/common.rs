//! Loading and writing shared across CLI commands

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use specgen_core::{CompileOptions, Document};
use tracing::{debug, info};

/// Options shared by the commands that compile documents.
#[derive(Args, Debug, Clone, Default)]
pub struct CompileFlags {
    /// Package name for the generated code
    #[arg(long = "package", value_name = "NAME")]
    pub package: Option<String>,
    /// Import path of a separate models package
    #[arg(long = "pkg-models", value_name = "IMPORT_PATH")]
    pub pkg_models: Option<String>,
    /// TOML file with compile options; flags take precedence
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CompileFlags {
    /// Resolve the effective compile options.
    pub fn options(&self) -> Result<CompileOptions, String> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|err| format!("Failed to read config {}: {err}", path.display()))?;
                toml::from_str::<CompileOptions>(&text)
                    .map_err(|err| format!("Failed to parse config {}: {err}", path.display()))?
            }
            None => CompileOptions::default(),
        };

        if let Some(package) = &self.package {
            options.package_name.clone_from(package);
        }
        if let Some(models) = &self.pkg_models {
            options.models_package = Some(models.clone());
        }
        Ok(options)
    }
}

/// Read one YAML or JSON document.
pub fn load_document(path: &Path) -> Result<Document, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    let doc: Document = serde_yaml::from_str(&text)
        .map_err(|err| format!("Failed to parse {}: {err}", path.display()))?;
    debug!(path = %path.display(), paths = doc.paths.len(), "Loaded document.");
    Ok(doc)
}

/// Read every document and merge them, first file as the base.
pub fn load_merged(paths: &[PathBuf]) -> Result<Document, String> {
    let docs = paths
        .iter()
        .map(|p| load_document(p.as_path()))
        .collect::<Result<Vec<_>, _>>()?;
    specgen_core::merge(docs).map_err(|err| format!("Failed to merge documents: {err}"))
}

/// Write `contents` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<(), String> {
    let Some(path) = path else {
        print!("{contents}");
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create directory {}: {err}", parent.display()))?;
    }
    fs::write(path, contents)
        .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Sibling path used instead of overwriting an existing file.
pub fn new_file_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".new");
    PathBuf::from(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("specgen.toml");
        fs::write(
            &config,
            "package_name = \"fromfile\"\nmodels_package = \"example.com/models\"\n",
        )
        .unwrap();

        let flags = CompileFlags {
            package: Some("fromflag".to_string()),
            pkg_models: None,
            config: Some(config),
        };
        let options = flags.options().unwrap();
        assert_eq!(options.package_name, "fromflag");
        assert_eq!(options.models_package.as_deref(), Some("example.com/models"));
    }

    #[test]
    fn test_default_options() {
        let options = CompileFlags::default().options().unwrap();
        assert_eq!(options, CompileOptions::default());
    }

    #[test]
    fn test_new_file_path() {
        assert_eq!(
            new_file_path(Path::new("out/server.go")),
            PathBuf::from("out/server.go.new")
        );
    }

    #[test]
    fn test_load_document_reports_path() {
        let err = load_document(Path::new("/nonexistent/spec.yaml")).unwrap_err();
        assert!(err.contains("/nonexistent/spec.yaml"));
    }
}
