//! Manifest rewriting with 72-byte line folding.
//!
//! Jar manifests fold long attribute values across physical lines: a
//! physical line starting with a single space continues the previous logical
//! line, and physical lines are capped at 72 bytes. Package references can
//! be split mid-name by that folding, so the rewrite must unfold to logical
//! lines, apply the rename engine, and refold on output.

use std::sync::Arc;

use crate::blob::ByteBlob;
use crate::changes::ContainerChanges;
use crate::config::TransformOptions;
use crate::{Error, Result};

use super::{Action, ActionSet, Output};

/// Maximum physical line length, in bytes, including the continuation
/// space but excluding the terminator.
const MAX_LINE_BYTES: usize = 72;

/// Rewrites package references inside jar manifests.
pub struct ManifestAction {
    options: Arc<TransformOptions>,
}

impl ManifestAction {
    pub fn new(options: Arc<TransformOptions>) -> Self {
        Self { options }
    }
}

impl Action for ManifestAction {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn accepts(&self, entry_name: &str) -> bool {
        // MANIFEST.MF plus feature/subsystem manifests, which use the same
        // folded attribute syntax.
        entry_name.ends_with(".MF")
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

        let line_ending = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = text.ends_with('\n');
        let logical = unfold(text);

        let mut changed = false;
        let rewritten: Vec<String> = logical
            .iter()
            .map(|line| match self.options.rules.replace_all(line) {
                Some(new_line) => {
                    changed = true;
                    new_line
                }
                None => line.clone(),
            })
            .collect();

        if !changed {
            return Ok(Output::Unchanged);
        }

        let folded = fold(&rewritten, line_ending, trailing_newline);
        Ok(Output::Transformed(ByteBlob::new(
            blob.name(),
            folded.into_bytes(),
        )))
    }
}

/// Joins folded physical lines back into logical lines.
fn unfold(text: &str) -> Vec<String> {
    let mut logical: Vec<String> = Vec::new();

    for raw_line in text.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        match line.strip_prefix(' ') {
            Some(continuation) if !logical.is_empty() => {
                // Continuation of the previous logical line.
                if let Some(prev) = logical.last_mut() {
                    prev.push_str(continuation);
                }
            }
            _ => logical.push(line.to_string()),
        }
    }

    // split('\n') yields one trailing empty segment for text ending in a
    // newline; drop it so the terminator policy is handled separately.
    if text.ends_with('\n') {
        logical.pop();
    }
    logical
}

/// Refolds logical lines at the 72-byte limit.
fn fold(logical: &[String], line_ending: &str, trailing_newline: bool) -> String {
    let mut out = String::new();

    for (index, line) in logical.iter().enumerate() {
        let (head, mut tail) = split_at_byte_limit(line, MAX_LINE_BYTES);
        out.push_str(head);
        while !tail.is_empty() {
            out.push_str(line_ending);
            out.push(' ');
            let (head, rest) = split_at_byte_limit(tail, MAX_LINE_BYTES - 1);
            out.push_str(head);
            tail = rest;
        }
        if index + 1 < logical.len() || trailing_newline {
            out.push_str(line_ending);
        }
    }
    out
}

/// Splits at the largest char boundary not exceeding `max` bytes.
fn split_at_byte_limit(s: &str, max: usize) -> (&str, &str) {
    if s.len() <= max {
        return (s, "");
    }
    let mut index = max;
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    s.split_at(index)
}
