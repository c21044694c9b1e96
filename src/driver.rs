//! The driver: input/output resolution, top-level action selection, and
//! final reporting.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::action::{ActionSet, DirectoryAction, Output};
use crate::blob::ByteBlob;
use crate::changes::{ChangeRecord, ContainerChanges};
use crate::config::TransformOptions;
use crate::{Error, Result};

/// Aggregated result of one transformation run.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    /// Cumulative per-entry counters across all nesting levels.
    pub changes: ContainerChanges,
    /// Whether the top-level output differs from the input.
    pub modified: bool,
}

impl Report {
    /// Returns true if any entry failed (fail-soft failures included).
    pub fn has_failures(&self) -> bool {
        self.changes.has_failures()
    }
}

/// Orchestrates one run: validates the configuration, picks the top-level
/// action for the input, executes it, and reports aggregated changes.
///
/// The transformer holds the run's immutable options and the registered
/// action set; both are constructed once and never mutated during a run.
pub struct Transformer {
    options: Arc<TransformOptions>,
    actions: ActionSet,
}

impl Transformer {
    /// Creates a transformer for the given options.
    pub fn new(options: TransformOptions) -> Self {
        let options = Arc::new(options);
        let actions = ActionSet::new(&options);
        Self { options, actions }
    }

    /// Returns the registered action set.
    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// Transforms a filesystem input (file, archive, or directory tree)
    /// into `output`.
    ///
    /// Configuration problems (missing input, existing output without
    /// overwrite permission, kind mismatch) are fatal and detected before
    /// any entry is processed. Per-entry failures inside containers are
    /// fail-soft and only show up in the report's counters.
    pub fn transform_path(&self, input: &Path, output: &Path) -> Result<Report> {
        if !input.exists() {
            return Err(Error::Config(format!(
                "input '{}' does not exist",
                input.display()
            )));
        }
        if output.exists() && !self.options.overwrite {
            return Err(Error::Config(format!(
                "output '{}' already exists (enable overwrite to replace it)",
                output.display()
            )));
        }

        if input.is_dir() {
            if output.exists() && !output.is_dir() {
                return Err(Error::Config(format!(
                    "input '{}' is a directory but output '{}' is a file",
                    input.display(),
                    output.display()
                )));
            }
            let mut changes = ContainerChanges::new();
            let directory = DirectoryAction::new(Arc::clone(&self.options));
            directory.transform(input, output, &self.actions, &mut changes)?;
            return Ok(Report {
                changes,
                modified: changes.requires_rewrite(),
            });
        }

        if output.is_dir() {
            return Err(Error::Config(format!(
                "input '{}' is a file but output '{}' is a directory",
                input.display(),
                output.display()
            )));
        }

        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Config(format!("input '{}' has no file name", input.display()))
            })?;
        let data = fs::read(input)?;

        let (transformed, report) = self.transform_bytes(&name, data)?;
        match &transformed {
            Some(blob) => {
                if blob.name() != name {
                    log::info!("output resource renamed: {} -> {}", name, blob.name());
                }
                fs::write(output, blob.data())?;
            }
            None => {
                // Unchanged: reproduce the input bytes at the output path.
                fs::copy(input, output)?;
            }
        }
        Ok(report)
    }

    /// Transforms a single named blob in memory.
    ///
    /// Returns the transformed blob, or `None` when the input is unchanged,
    /// plus the aggregated report. This is the engine surface for callers
    /// that resolve inputs and outputs themselves.
    pub fn transform_bytes(
        &self,
        name: &str,
        data: Vec<u8>,
    ) -> Result<(Option<ByteBlob>, Report)> {
        let mut changes = ContainerChanges::new();
        let blob = ByteBlob::new(name, data);
        let action = self.actions.select(name);

        let output = action.apply(&blob, &self.actions, &mut changes)?;

        let transformed = match output {
            Output::Unchanged => {
                // Containers already counted their entries; a plain file
                // gets its single record here.
                if !action.is_container() {
                    changes.apply(&ChangeRecord::unchanged(name, action.name()));
                }
                None
            }
            Output::Transformed(out_blob) => {
                if !action.is_container() {
                    let record = if out_blob.data() == blob.data() {
                        ChangeRecord::renamed(name, action.name())
                    } else {
                        ChangeRecord::modified(name, action.name())
                    };
                    changes.apply(&record);
                }
                Some(out_blob)
            }
        };

        let modified = transformed.is_some();
        Ok((transformed, Report { changes, modified }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::RenameRules;
    use std::fs;

    fn transformer(pairs: &[(&str, &str)]) -> Transformer {
        let rules = RenameRules::from_pairs(pairs.iter().copied()).unwrap();
        Transformer::new(TransformOptions::new(rules).overwrite(true))
    }

    #[test]
    fn missing_input_is_a_configuration_error() {
        let t = transformer(&[]);
        let result = t.transform_path(Path::new("/nonexistent/input"), Path::new("/tmp/out"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn existing_output_requires_overwrite() {
        let rules = RenameRules::new();
        let t = Transformer::new(TransformOptions::new(rules));
        let input = tempfile::NamedTempFile::new().unwrap();
        let output = tempfile::NamedTempFile::new().unwrap();
        let result = t.transform_path(input.path(), output.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn file_input_with_directory_output_is_rejected() {
        let t = transformer(&[("javax.servlet.*", "jakarta.servlet")]);
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("App.java");
        fs::write(&input, "import javax.servlet.Filter;\n").unwrap();
        let output = tempfile::tempdir().unwrap();

        // Rejected up front as a kind mismatch, even with overwrite enabled.
        let result = t.transform_path(&input, output.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn plain_file_transformation() {
        let t = transformer(&[("javax.servlet.*", "jakarta.servlet")]);
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("App.java");
        let output = dir.path().join("out/App.java");
        fs::create_dir_all(dir.path().join("out")).unwrap();
        fs::write(&input, "import javax.servlet.Filter;\n").unwrap();

        let report = t.transform_path(&input, &output).unwrap();
        assert!(report.modified);
        assert_eq!(report.changes.changed, 1);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "import jakarta.servlet.Filter;\n"
        );
    }

    #[test]
    fn unchanged_file_is_copied_verbatim() {
        let t = transformer(&[("com.absent", "com.other")]);
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        let output = dir.path().join("notes-out.txt");
        fs::write(&input, b"binary-ish \xF0\x9F\x8E\x89 content").unwrap();

        let report = t.transform_path(&input, &output).unwrap();
        assert!(!report.modified);
        assert_eq!(report.changes.unchanged, 1);
        assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
    }
}
