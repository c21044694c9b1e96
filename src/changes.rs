//! Per-entry change records and recursive change aggregation.
//!
//! Every container action keeps a [`ContainerChanges`] accumulator for the
//! entries it processes. When a container embeds another container (a jar
//! inside a war, an archive inside a directory tree), the child's counters
//! are merged additively into the parent's, so the top level always sees
//! cumulative totals while each nesting level reports independently.

use std::fmt;

/// The outcome of processing a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The entry was copied through byte-identical.
    Unchanged,
    /// The entry was rewritten (content and/or name).
    Modified,
    /// The entry was added to the output without a source counterpart.
    Added,
    /// The entry was dropped from the output (stripped signature files).
    Removed,
    /// The entry failed to process; its original bytes were passed through.
    Failed,
}

/// A single per-entry bookkeeping record: which action processed which
/// entry, and with what outcome.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    /// The entry name the record is keyed by.
    pub name: String,
    /// The name of the action that produced the outcome.
    pub action: &'static str,
    /// The outcome.
    pub kind: ChangeKind,
    /// Whether the entry's *content* changed. False for resource-name-only
    /// changes (a renamed entry with identical bytes).
    pub content_change: bool,
}

impl ChangeRecord {
    /// Record for an entry copied through unchanged.
    pub fn unchanged(name: impl Into<String>, action: &'static str) -> Self {
        Self {
            name: name.into(),
            action,
            kind: ChangeKind::Unchanged,
            content_change: false,
        }
    }

    /// Record for an entry whose content was rewritten.
    pub fn modified(name: impl Into<String>, action: &'static str) -> Self {
        Self {
            name: name.into(),
            action,
            kind: ChangeKind::Modified,
            content_change: true,
        }
    }

    /// Record for an entry renamed without a content change.
    pub fn renamed(name: impl Into<String>, action: &'static str) -> Self {
        Self {
            name: name.into(),
            action,
            kind: ChangeKind::Modified,
            content_change: false,
        }
    }

    /// Record for an entry dropped from the output.
    pub fn removed(name: impl Into<String>, action: &'static str) -> Self {
        Self {
            name: name.into(),
            action,
            kind: ChangeKind::Removed,
            content_change: true,
        }
    }

    /// Record for an entry that failed to process.
    pub fn failed(name: impl Into<String>, action: &'static str) -> Self {
        Self {
            name: name.into(),
            action,
            kind: ChangeKind::Failed,
            content_change: false,
        }
    }
}

/// Aggregate counters for one container (and, after merging, for everything
/// nested below it).
///
/// Counters are monotonically incremented while entries are processed and
/// never decremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerChanges {
    /// Entries added to the output without a source counterpart.
    pub added: u64,
    /// Entries rewritten (content or name).
    pub changed: u64,
    /// Entries copied through byte-identical.
    pub unchanged: u64,
    /// Redundant writes to an already-written output name (last-wins).
    pub duplicated: u64,
    /// Entries that failed and were passed through unchanged.
    pub failed: u64,
    /// Entries dropped from the output (stripped signature files).
    pub removed: u64,
    /// Whether any non-resource-name change occurred anywhere below this
    /// container.
    pub content_changed: bool,
}

impl ContainerChanges {
    /// Creates a zeroed accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a per-entry record: logs it and bumps the matching counter.
    pub fn apply(&mut self, record: &ChangeRecord) {
        log::debug!(
            "[{}] {}: {:?}{}",
            record.action,
            record.name,
            record.kind,
            if record.content_change { "" } else { " (no content change)" }
        );

        match record.kind {
            ChangeKind::Unchanged => self.unchanged += 1,
            ChangeKind::Modified => self.changed += 1,
            ChangeKind::Added => self.added += 1,
            ChangeKind::Removed => self.removed += 1,
            ChangeKind::Failed => self.failed += 1,
        }
        self.content_changed |= record.content_change;
    }

    /// Counts a redundant write to an already-written output name.
    ///
    /// Duplicates are counted in addition to the entry's own record, and the
    /// later write supersedes the earlier one.
    pub fn record_duplicate(&mut self, name: &str) {
        log::debug!("duplicate entry name: {name} (last writer wins)");
        self.duplicated += 1;
    }

    /// Merges a nested container's counters into this one, additively.
    pub fn merge(&mut self, child: &ContainerChanges) {
        self.added += child.added;
        self.changed += child.changed;
        self.unchanged += child.unchanged;
        self.duplicated += child.duplicated;
        self.failed += child.failed;
        self.removed += child.removed;
        self.content_changed |= child.content_changed;
    }

    /// Total number of entry outcomes recorded (duplicates excluded).
    pub fn total(&self) -> u64 {
        self.added + self.changed + self.unchanged + self.failed + self.removed
    }

    /// Returns true if any entry failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns true if the output container must differ from its input:
    /// something was rewritten, added, removed, or collapsed by duplicate
    /// handling.
    pub fn requires_rewrite(&self) -> bool {
        self.changed > 0 || self.added > 0 || self.removed > 0 || self.duplicated > 0
    }
}

impl fmt::Display for ContainerChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} changed, {} unchanged, {} added, {} removed, {} duplicated, {} failed",
            self.changed, self.unchanged, self.added, self.removed, self.duplicated, self.failed
        )
    }
}
