//! The polymorphic action family: per-entry transformation strategies and
//! their selector.
//!
//! Every named byte blob flowing through the engine is handed to exactly one
//! action. Actions are a closed set of variants behind one capability trait;
//! selection is a pure function over the registered set plus the entry name,
//! evaluated in a fixed specificity order (most specific container/content
//! type first). An entry no action recognizes falls through to the copy
//! action, so a container walk never stalls on an unknown entry type.

mod copy;
mod dir;
mod manifest;
mod service;
mod text;
mod zip;

pub use copy::CopyAction;
pub use dir::DirectoryAction;
pub use manifest::ManifestAction;
pub use service::ServiceConfigAction;
pub use text::JavaSourceAction;
pub use zip::ZipAction;

use std::sync::Arc;

use crate::blob::ByteBlob;
use crate::changes::ContainerChanges;
use crate::config::TransformOptions;
use crate::Result;

/// The result of applying an action to an accepted blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// No true matches anywhere: the caller copies the input through
    /// byte-identical (for archive entries, without recompression).
    Unchanged,
    /// A new blob to write in place of the input. The name may differ from
    /// the input's (resource rename); identical bytes under a new name are
    /// a resource-name-only change.
    Transformed(ByteBlob),
}

/// A per-entry transformation strategy.
///
/// `accepts` must be side-effect-free and cheap; it is called many times
/// during selection. `apply` performs the content transformation; container
/// actions additionally merge the changes of their nested entries into the
/// supplied accumulator. An `Err` return means the entry produced no output
/// and the caller counts it as failed (fail-soft: the original bytes are
/// passed through).
pub trait Action: Send + Sync {
    /// Short action name used in logs and change records.
    fn name(&self) -> &'static str;

    /// Whether this action applies to an entry with the given name.
    fn accepts(&self, entry_name: &str) -> bool;

    /// Whether this action processes containers (and therefore merges
    /// nested changes into the accumulator).
    fn is_container(&self) -> bool {
        false
    }

    /// Transforms an accepted blob.
    fn apply(
        &self,
        blob: &ByteBlob,
        actions: &ActionSet,
        changes: &mut ContainerChanges,
    ) -> Result<Output>;
}

/// The registered set of action prototypes, in specificity order.
///
/// Constructed once per run from the transform options and read-only
/// afterwards. Directory containers sit above this set: they are selected by
/// input kind at the driver level, since a directory is a filesystem handle
/// rather than a byte blob.
pub struct ActionSet {
    actions: Vec<Box<dyn Action>>,
    fallback: CopyAction,
}

impl ActionSet {
    /// Builds the action set for one run.
    pub fn new(options: &Arc<TransformOptions>) -> Self {
        // Specificity order: archive container, then well-known content
        // types, then source files. The copy fallback is always last.
        let actions: Vec<Box<dyn Action>> = vec![
            Box::new(ZipAction::new(Arc::clone(options))),
            Box::new(ManifestAction::new(Arc::clone(options))),
            Box::new(ServiceConfigAction::new(Arc::clone(options))),
            Box::new(JavaSourceAction::new(Arc::clone(options))),
        ];
        Self {
            actions,
            fallback: CopyAction,
        }
    }

    /// Returns the most specific action that accepts the entry name, or
    /// `None` when only the default copy action applies.
    ///
    /// Container walks use this to fast-path unrecognized entries: a `None`
    /// means the raw bytes can be spliced through without decoding.
    pub fn select_specific(&self, entry_name: &str) -> Option<&dyn Action> {
        self.actions
            .iter()
            .find(|a| a.accepts(entry_name))
            .map(|a| a.as_ref())
    }

    /// Returns the action for an entry name, falling back to the copy
    /// action. Exactly one action is always selected.
    pub fn select(&self, entry_name: &str) -> &dyn Action {
        self.select_specific(entry_name).unwrap_or(&self.fallback)
    }
}
