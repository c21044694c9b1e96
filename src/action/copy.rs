//! The default copy-only action.

use crate::blob::ByteBlob;
use crate::changes::ContainerChanges;
use crate::Result;

use super::{Action, ActionSet, Output};

/// Passes entries through byte-identical.
///
/// This is the fallback for every entry no other action accepts, which
/// gives the selector its total-selection guarantee.
pub struct CopyAction;

impl Action for CopyAction {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn accepts(&self, _entry_name: &str) -> bool {
        true
    }

    fn apply(
        &self,
        _blob: &ByteBlob,
        _actions: &ActionSet,
        _changes: &mut ContainerChanges,
    ) -> Result<Output> {
        Ok(Output::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformOptions;
    use crate::rename::RenameRules;
    use std::sync::Arc;

    #[test]
    fn copies_everything_unchanged() {
        let options = Arc::new(TransformOptions::new(RenameRules::new()));
        let actions = ActionSet::new(&options);
        let mut changes = ContainerChanges::new();
        let blob = ByteBlob::new("anything", vec![0, 159, 146, 150]);

        let action = CopyAction;
        assert!(action.accepts("anything"));
        assert_eq!(
            action.apply(&blob, &actions, &mut changes).unwrap(),
            Output::Unchanged
        );
        assert_eq!(changes, ContainerChanges::new());
    }
}
