//! Line-oriented rewriting of Java source files.

use std::sync::Arc;

use crate::blob::ByteBlob;
use crate::changes::ContainerChanges;
use crate::config::TransformOptions;
use crate::{Error, Result};

use super::{Action, ActionSet, Output};

/// Rewrites package references inside `.java` and `.jsp` source text.
///
/// Content is treated as UTF-8 text and rewritten line by line; original
/// line terminators are preserved so an archive diff only shows the lines
/// that actually changed. Non-UTF-8 content is a per-entry failure, handled
/// fail-soft by the enclosing container.
pub struct JavaSourceAction {
    options: Arc<TransformOptions>,
}

impl JavaSourceAction {
    pub fn new(options: Arc<TransformOptions>) -> Self {
        Self { options }
    }
}

impl Action for JavaSourceAction {
    fn name(&self) -> &'static str {
        "java"
    }

    fn accepts(&self, entry_name: &str) -> bool {
        entry_name.ends_with(".java") || entry_name.ends_with(".jsp")
    }

    fn apply(
        &self,
        blob: &ByteBlob,
        _actions: &ActionSet,
        _changes: &mut ContainerChanges,
    ) -> Result<Output> {
        let text = std::str::from_utf8(blob.data()).map_err(|_| Error::MalformedText {
            name: blob.name().to_string(),
        })?;

        let mut out = String::with_capacity(text.len());
        let mut changed = false;

        // split_inclusive keeps each line's terminator attached; the
        // terminator characters are not identifier characters, so they act
        // as a natural right boundary for the rename engine.
        for line in text.split_inclusive('\n') {
            match self.options.rules.replace_all(line) {
                Some(rewritten) => {
                    out.push_str(&rewritten);
                    changed = true;
                }
                None => out.push_str(line),
            }
        }

        if changed {
            Ok(Output::Transformed(ByteBlob::new(
                blob.name(),
                out.into_bytes(),
            )))
        } else {
            Ok(Output::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::RenameRules;

    fn action(pairs: &[(&str, &str)]) -> (JavaSourceAction, ActionSet) {
        let rules = RenameRules::from_pairs(pairs.iter().copied()).unwrap();
        let options = Arc::new(TransformOptions::new(rules));
        (
            JavaSourceAction::new(Arc::clone(&options)),
            ActionSet::new(&options),
        )
    }

    #[test]
    fn accepts_java_and_jsp_sources_only() {
        let (action, _) = action(&[]);
        assert!(action.accepts("com/foo/Bar.java"));
        assert!(action.accepts("WEB-INF/index.jsp"));
        assert!(!action.accepts("Bar.class"));
        assert!(!action.accepts("notes.txt"));
    }

    #[test]
    fn rewrites_imports_and_preserves_untouched_lines() {
        let (action, actions) = action(&[("javax.servlet.*", "jakarta.servlet")]);
        let source = "package com.example;\r\n\
                      import javax.servlet.http.HttpServlet;\r\n\
                      public class App extends HttpServlet {}\n";
        let blob = ByteBlob::new("App.java", source.as_bytes().to_vec());
        let mut changes = ContainerChanges::new();

        let Output::Transformed(out) = action.apply(&blob, &actions, &mut changes).unwrap() else {
            panic!("expected a transformed blob");
        };
        let out = String::from_utf8(out.into_data()).unwrap();
        assert_eq!(
            out,
            "package com.example;\r\n\
             import jakarta.servlet.http.HttpServlet;\r\n\
             public class App extends HttpServlet {}\n"
        );
    }

    #[test]
    fn untouched_source_reports_unchanged() {
        let (action, actions) = action(&[("javax.servlet.*", "jakarta.servlet")]);
        let blob = ByteBlob::new("App.java", b"public class App {}\n".to_vec());
        let mut changes = ContainerChanges::new();
        assert_eq!(
            action.apply(&blob, &actions, &mut changes).unwrap(),
            Output::Unchanged
        );
    }

    #[test]
    fn invalid_utf8_is_a_failure() {
        let (action, actions) = action(&[("a.b", "c.d")]);
        let blob = ByteBlob::new("Bad.java", vec![0xFF, 0xFE, 0x00]);
        let mut changes = ContainerChanges::new();
        assert!(matches!(
            action.apply(&blob, &actions, &mut changes),
            Err(Error::MalformedText { .. })
        ));
    }
}
