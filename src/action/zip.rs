//! The zip-family container action (zip/jar/war/ear).
//!
//! Walks an archive's entries in physical order, dispatches each to the
//! most specific accepting action, and writes an equivalent output archive.
//! Fidelity rules:
//!
//! - entries nothing touched are spliced through raw: same compression
//!   method, same bytes, no recompression;
//! - only entries whose content actually changed are recompressed, keeping
//!   their original method;
//! - duplicate entry names are counted and resolved last-writer-wins;
//! - per-entry failures are logged, counted, and the original bytes passed
//!   through (fail-soft) — one bad entry never aborts its siblings.
//!
//! A nested archive is processed recursively; its changes merge additively
//! into this container's totals. An archive that cannot be opened at all
//! propagates as an error, which an enclosing container converts into a
//! per-entry failure one level up.

use std::io::Cursor;
use std::sync::Arc;

use crate::blob::ByteBlob;
use crate::changes::{ChangeRecord, ContainerChanges};
use crate::config::{TransformOptions, is_signature_path};
use crate::zip::{ZipEntry, ZipReader, ZipWriter};
use crate::Result;

use super::{Action, ActionSet, Output};

const ZIP_EXTENSIONS: [&str; 4] = [".zip", ".jar", ".war", ".ear"];

/// Transforms zip-family archives entry by entry.
pub struct ZipAction {
    options: Arc<TransformOptions>,
}

impl ZipAction {
    pub fn new(options: Arc<TransformOptions>) -> Self {
        Self { options }
    }

    fn transform_archive(
        &self,
        blob: &ByteBlob,
        actions: &ActionSet,
        changes: &mut ContainerChanges,
    ) -> Result<(Vec<u8>, bool)> {
        let mut reader = ZipReader::new(Cursor::new(blob.data()), self.options.name_encoding)?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()), self.options.name_encoding);

        let entries: Vec<ZipEntry> = reader.entries().to_vec();
        for entry in &entries {
            self.transform_entry(entry, &mut reader, &mut writer, actions, changes)?;
        }

        let out = writer.finish()?.into_inner();
        Ok((out, changes.requires_rewrite()))
    }

    /// Processes one entry; only I/O errors on the *output* side escape,
    /// everything on the input side is fail-soft.
    fn transform_entry(
        &self,
        entry: &ZipEntry,
        reader: &mut ZipReader<Cursor<&[u8]>>,
        writer: &mut ZipWriter<Cursor<Vec<u8>>>,
        actions: &ActionSet,
        changes: &mut ContainerChanges,
    ) -> Result<()> {
        let name = entry.name.as_str();

        // Signature files: dropped under strip mode, byte-identical
        // otherwise. Content rules never apply to them.
        if is_signature_path(name) {
            if self.options.strip_signatures {
                changes.apply(&ChangeRecord::removed(name, self.name()));
                return Ok(());
            }
            return self.copy_raw(entry, reader, writer, changes, ChangeKindHint::Unchanged);
        }

        // Selection and dispatch are by name only; directory placeholders
        // and unselected entries are spliced through.
        let selected = !entry.is_directory() && self.options.selection.accepts(name);
        let sub_action = if selected {
            actions.select_specific(name)
        } else {
            None
        };
        let Some(sub_action) = sub_action else {
            return self.copy_raw(entry, reader, writer, changes, ChangeKindHint::Unchanged);
        };

        let data = match reader.read_data(entry) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("failed to read '{name}': {e}");
                return self.copy_raw(entry, reader, writer, changes, ChangeKindHint::Failed);
            }
        };

        let entry_blob = ByteBlob::new(name, data);
        match sub_action.apply(&entry_blob, actions, changes) {
            Ok(Output::Unchanged) => {
                self.copy_raw(entry, reader, writer, changes, ChangeKindHint::Unchanged)
            }
            Ok(Output::Transformed(out_blob)) => {
                let record = if out_blob.data() == entry_blob.data() {
                    ChangeRecord::renamed(name, sub_action.name())
                } else {
                    ChangeRecord::modified(name, sub_action.name())
                };
                let duplicate =
                    writer.add_transformed(entry, out_blob.name(), out_blob.data())?;
                changes.apply(&record);
                if duplicate {
                    changes.record_duplicate(out_blob.name());
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("action '{}' failed on '{name}': {e}", sub_action.name());
                self.copy_raw(entry, reader, writer, changes, ChangeKindHint::Failed)
            }
        }
    }

    /// Splices an entry through unchanged, recording the given outcome.
    fn copy_raw(
        &self,
        entry: &ZipEntry,
        reader: &mut ZipReader<Cursor<&[u8]>>,
        writer: &mut ZipWriter<Cursor<Vec<u8>>>,
        changes: &mut ContainerChanges,
        hint: ChangeKindHint,
    ) -> Result<()> {
        match reader.read_raw(entry) {
            Ok((local_extra, raw)) => {
                let duplicate = writer.add_raw(entry, &local_extra, &raw)?;
                let record = match hint {
                    ChangeKindHint::Unchanged => {
                        ChangeRecord::unchanged(entry.name.as_str(), self.name())
                    }
                    ChangeKindHint::Failed => {
                        ChangeRecord::failed(entry.name.as_str(), self.name())
                    }
                };
                changes.apply(&record);
                if duplicate {
                    changes.record_duplicate(&entry.name);
                }
                Ok(())
            }
            Err(e) => {
                // Cannot even copy the stored bytes; count the failure and
                // move on to the siblings.
                log::warn!("failed to splice '{}': {e}", entry.name);
                changes.apply(&ChangeRecord::failed(entry.name.as_str(), self.name()));
                Ok(())
            }
        }
    }
}

/// Outcome to record for an entry that is spliced through raw.
enum ChangeKindHint {
    Unchanged,
    Failed,
}

impl Action for ZipAction {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn accepts(&self, entry_name: &str) -> bool {
        ZIP_EXTENSIONS.iter().any(|ext| entry_name.ends_with(ext))
    }

    fn is_container(&self) -> bool {
        true
    }

    fn apply(
        &self,
        blob: &ByteBlob,
        actions: &ActionSet,
        changes: &mut ContainerChanges,
    ) -> Result<Output> {
        log::debug!("[zip] entering container '{}'", blob.name());
        let mut local = ContainerChanges::new();
        let (out, rewritten) = self.transform_archive(blob, actions, &mut local)?;
        log::debug!("[zip] leaving container '{}': {local}", blob.name());

        changes.merge(&local);
        if rewritten {
            Ok(Output::Transformed(ByteBlob::new(blob.name(), out)))
        } else {
            Ok(Output::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::RenameRules;
    use crate::zip::{METHOD_DEFLATED, METHOD_STORED, NameEncoding};

    fn action_set(pairs: &[(&str, &str)]) -> (Arc<TransformOptions>, ActionSet) {
        let rules = RenameRules::from_pairs(pairs.iter().copied()).unwrap();
        let options = Arc::new(TransformOptions::new(rules));
        let actions = ActionSet::new(&options);
        (options, actions)
    }

    fn sample_archive() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()), NameEncoding::Utf8);
        writer
            .add_new(
                "src/App.java",
                b"import javax.servlet.Filter;\n",
                METHOD_DEFLATED,
            )
            .unwrap();
        writer
            .add_new("data.bin", &[0u8, 1, 2, 3, 255], METHOD_STORED)
            .unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn accepts_zip_family_extensions() {
        let (options, _) = action_set(&[]);
        let action = ZipAction::new(options);
        for name in ["a.zip", "b.jar", "c.war", "d.ear"] {
            assert!(action.accepts(name));
        }
        assert!(!action.accepts("archive.tar"));
    }

    #[test]
    fn rewrites_matching_entries_and_splices_the_rest() {
        let (options, actions) = action_set(&[("javax.servlet.*", "jakarta.servlet")]);
        let action = ZipAction::new(options);
        let blob = ByteBlob::new("app.jar", sample_archive());
        let mut changes = ContainerChanges::new();

        let Output::Transformed(out) = action.apply(&blob, &actions, &mut changes).unwrap() else {
            panic!("expected a rewritten archive");
        };
        assert_eq!(changes.changed, 1);
        assert_eq!(changes.unchanged, 1);
        assert!(changes.content_changed);

        let mut reader =
            ZipReader::new(Cursor::new(out.data()), NameEncoding::Utf8).unwrap();
        let java = reader.entries()[0].clone();
        assert_eq!(java.method, METHOD_DEFLATED);
        assert_eq!(
            reader.read_data(&java).unwrap(),
            b"import jakarta.servlet.Filter;\n"
        );
        let bin = reader.entries()[1].clone();
        assert_eq!(bin.method, METHOD_STORED);
        assert_eq!(reader.read_data(&bin).unwrap(), &[0u8, 1, 2, 3, 255]);
    }

    #[test]
    fn no_matches_means_unchanged() {
        let (options, actions) = action_set(&[("com.absent.*", "com.elsewhere")]);
        let action = ZipAction::new(options);
        let blob = ByteBlob::new("app.jar", sample_archive());
        let mut changes = ContainerChanges::new();

        assert_eq!(
            action.apply(&blob, &actions, &mut changes).unwrap(),
            Output::Unchanged
        );
        assert_eq!(changes.unchanged, 2);
        assert_eq!(changes.changed, 0);
    }

    #[test]
    fn unopenable_archive_is_an_error() {
        let (options, actions) = action_set(&[]);
        let action = ZipAction::new(options);
        let blob = ByteBlob::new("broken.jar", b"garbage".to_vec());
        let mut changes = ContainerChanges::new();
        assert!(action.apply(&blob, &actions, &mut changes).is_err());
    }
}
