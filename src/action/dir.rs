//! The directory container action.
//!
//! Walks a filesystem tree, applies the per-entry pipeline (selection,
//! dispatch, fail-soft error handling, duplicate bookkeeping), and writes an
//! equivalent output tree. Nested archives encountered in the tree are
//! transformed in memory through the regular action dispatch.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use walkdir::WalkDir;

use crate::blob::ByteBlob;
use crate::changes::{ChangeRecord, ContainerChanges};
use crate::config::{TransformOptions, is_signature_path};
use crate::{Error, Result};

use super::{ActionSet, Output};

/// Action name used in logs and change records.
const ACTION_NAME: &str = "directory";

/// Transforms a directory tree into an equivalent output tree.
///
/// Unlike the blob-based actions, a directory is a filesystem handle, so
/// this type is driven directly by the driver rather than selected through
/// the blob action set.
pub struct DirectoryAction {
    options: Arc<TransformOptions>,
}

impl DirectoryAction {
    pub fn new(options: Arc<TransformOptions>) -> Self {
        Self { options }
    }

    /// Action name used in change records.
    pub fn name(&self) -> &'static str {
        ACTION_NAME
    }

    /// Transforms `input` into `output`, accumulating per-entry changes.
    ///
    /// Entries are visited in sorted traversal order for reproducible runs.
    /// Individual unreadable files are counted as failed and skipped; only
    /// output-side I/O errors abort the walk.
    pub fn transform(
        &self,
        input: &Path,
        output: &Path,
        actions: &ActionSet,
        changes: &mut ContainerChanges,
    ) -> Result<()> {
        log::debug!("[{ACTION_NAME}] entering '{}'", input.display());
        fs::create_dir_all(output)?;

        let mut written: HashSet<String> = HashSet::new();

        for walk_entry in WalkDir::new(input).follow_links(false).sort_by_file_name() {
            let walk_entry = match walk_entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("failed to walk directory entry: {e}");
                    changes.apply(&ChangeRecord::failed(e.to_string(), ACTION_NAME));
                    continue;
                }
            };
            if !walk_entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = walk_entry.path().strip_prefix(input) else {
                continue;
            };
            let name = relative.to_string_lossy().replace('\\', "/");

            self.transform_file(walk_entry.path(), &name, output, actions, changes, &mut written)?;
        }

        log::debug!("[{ACTION_NAME}] leaving '{}': {changes}", input.display());
        Ok(())
    }

    fn transform_file(
        &self,
        source: &Path,
        name: &str,
        output: &Path,
        actions: &ActionSet,
        changes: &mut ContainerChanges,
        written: &mut HashSet<String>,
    ) -> Result<()> {
        if is_signature_path(name) {
            if self.options.strip_signatures {
                changes.apply(&ChangeRecord::removed(name, ACTION_NAME));
                return Ok(());
            }
            return self.copy_through(source, name, output, changes, written, false);
        }

        if !self.options.selection.accepts(name) {
            return self.copy_through(source, name, output, changes, written, false);
        }

        let Some(sub_action) = actions.select_specific(name) else {
            return self.copy_through(source, name, output, changes, written, false);
        };

        let data = match fs::read(source) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("failed to read '{}': {e}", source.display());
                changes.apply(&ChangeRecord::failed(name, ACTION_NAME));
                return Ok(());
            }
        };

        let blob = ByteBlob::new(name, data);
        match sub_action.apply(&blob, actions, changes) {
            Ok(Output::Unchanged) => {
                self.write_output(output, name, blob.data(), changes, written)?;
                changes.apply(&ChangeRecord::unchanged(name, sub_action.name()));
                Ok(())
            }
            Ok(Output::Transformed(out_blob)) => {
                let record = if out_blob.data() == blob.data() {
                    ChangeRecord::renamed(name, sub_action.name())
                } else {
                    ChangeRecord::modified(name, sub_action.name())
                };
                self.write_output(output, out_blob.name(), out_blob.data(), changes, written)?;
                changes.apply(&record);
                Ok(())
            }
            Err(e) => {
                log::warn!("action '{}' failed on '{name}': {e}", sub_action.name());
                self.copy_through(source, name, output, changes, written, true)
            }
        }
    }

    /// Copies the source file through unchanged, counting it as unchanged
    /// or failed depending on why it was not transformed.
    fn copy_through(
        &self,
        source: &Path,
        name: &str,
        output: &Path,
        changes: &mut ContainerChanges,
        written: &mut HashSet<String>,
        failed: bool,
    ) -> Result<()> {
        match fs::read(source) {
            Ok(data) => {
                self.write_output(output, name, &data, changes, written)?;
                let record = if failed {
                    ChangeRecord::failed(name, ACTION_NAME)
                } else {
                    ChangeRecord::unchanged(name, ACTION_NAME)
                };
                changes.apply(&record);
                Ok(())
            }
            Err(e) => {
                log::warn!("failed to read '{}': {e}", source.display());
                changes.apply(&ChangeRecord::failed(name, ACTION_NAME));
                Ok(())
            }
        }
    }

    /// Writes one output file, tracking duplicate destination names.
    /// A later write to an already-written name supersedes the earlier file
    /// (last writer wins), as with archive duplicates.
    fn write_output(
        &self,
        output: &Path,
        name: &str,
        data: &[u8],
        changes: &mut ContainerChanges,
        written: &mut HashSet<String>,
    ) -> Result<()> {
        if name.split('/').any(|seg| seg == ".." || seg.is_empty()) {
            return Err(Error::InvalidName(name.to_string()));
        }

        let destination = output.join(name);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&destination, data)?;

        if !written.insert(name.to_string()) {
            changes.record_duplicate(name);
        }
        Ok(())
    }
}
