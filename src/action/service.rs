//! Service-loader configuration rewriting.
//!
//! `META-INF/services/<interface>` files are doubly affected by a package
//! migration: the file *name* is the qualified name of the service
//! interface, and each content line names a provider implementation class.
//! Both are renamed here. Comments (`#`) and whitespace are preserved.

use std::sync::Arc;

use crate::blob::ByteBlob;
use crate::changes::ContainerChanges;
use crate::config::TransformOptions;
use crate::{Error, Result};

use super::{Action, ActionSet, Output};

const SERVICES_PREFIX: &str = "META-INF/services/";

/// Rewrites service-loader configuration files, renaming the file itself
/// when the interface package is mapped.
pub struct ServiceConfigAction {
    options: Arc<TransformOptions>,
}

impl ServiceConfigAction {
    pub fn new(options: Arc<TransformOptions>) -> Self {
        Self { options }
    }

    /// Rewrites one content line, leaving comments and spacing intact.
    fn rewrite_line(&self, line: &str) -> Option<String> {
        let terminator_len = if line.ends_with('\n') {
            if line.ends_with("\r\n") { 2 } else { 1 }
        } else {
            0
        };
        let (body, terminator) = line.split_at(line.len() - terminator_len);

        // The provider class name runs from the first non-blank character
        // to the next whitespace or comment marker.
        let start = body.find(|c: char| !c.is_whitespace())?;
        if body[start..].starts_with('#') {
            return None;
        }
        let end = body[start..]
            .find(|c: char| c.is_whitespace() || c == '#')
            .map_or(body.len(), |i| start + i);

        let class_name = &body[start..end];
        let renamed = self.options.rules.replace_qualified_class(class_name)?;
        Some(format!(
            "{}{}{}{}",
            &body[..start],
            renamed,
            &body[end..],
            terminator
        ))
    }
}

impl Action for ServiceConfigAction {
    fn name(&self) -> &'static str {
        "service-config"
    }

    fn accepts(&self, entry_name: &str) -> bool {
        match entry_name.strip_prefix(SERVICES_PREFIX) {
            Some(rest) => !rest.is_empty() && !rest.contains('/'),
            None => false,
        }
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
        let mut content_changed = false;
        for line in text.split_inclusive('\n') {
            match self.rewrite_line(line) {
                Some(rewritten) => {
                    out.push_str(&rewritten);
                    content_changed = true;
                }
                None => out.push_str(line),
            }
        }

        // The interface name after the services prefix may itself move.
        let output_name = blob
            .name()
            .strip_prefix(SERVICES_PREFIX)
            .and_then(|interface| self.options.rules.replace_qualified_class(interface))
            .map(|renamed| format!("{SERVICES_PREFIX}{renamed}"));

        match (content_changed, output_name) {
            (true, Some(name)) => Ok(Output::Transformed(ByteBlob::new(name, out.into_bytes()))),
            (true, None) => Ok(Output::Transformed(ByteBlob::new(
                blob.name(),
                out.into_bytes(),
            ))),
            // Name-only rename: same bytes under a new name.
            (false, Some(name)) => Ok(Output::Transformed(blob.renamed(name))),
            (false, None) => Ok(Output::Unchanged),
        }
    }
}
