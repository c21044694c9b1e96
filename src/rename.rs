//! The rename engine: boundary-safe rewriting of qualified names in text.
//!
//! Rules map a source qualified name to a replacement, e.g.
//! `javax.servlet -> jakarta.servlet`. A trailing `.*` on the source marks a
//! wildcard rule that also matches sub-packages. Matching is purely lexical
//! but enforces identifier boundaries so that `com.foo` never matches inside
//! `com.foobar` or `xcom.foo`.

use crate::{Error, Result};

/// A single rename mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    /// The literal key to search for (wildcard suffix already stripped).
    key: String,
    /// The replacement text spliced in on a true match.
    replacement: String,
    /// Whether the key was declared with a `.*` suffix and therefore also
    /// matches sub-packages.
    match_subpackages: bool,
}

impl RenameRule {
    /// Returns the literal search key (without any wildcard suffix).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the replacement text.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Returns true if this rule matches sub-packages.
    pub fn matches_subpackages(&self) -> bool {
        self.match_subpackages
    }
}

/// Returns true if `c` can continue a qualified identifier.
///
/// Letters, digits, `_` and `.` all extend an identifier for boundary
/// purposes; any other character (whitespace, quotes, `/`, `;`, ...) ends it.
fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// An ordered set of rename rules applied in declaration order.
///
/// Ordering matters: a later rule sees the output of earlier rules, and a
/// replacement value is never re-scanned for further matches of the rule
/// that produced it. Rule sets must be curated to avoid rewrite cycles.
#[derive(Debug, Clone, Default)]
pub struct RenameRules {
    rules: Vec<RenameRule>,
}

impl RenameRules {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule set from `(source, target)` pairs in order.
    pub fn from_pairs<I, S, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut rules = Self::new();
        for (source, target) in pairs {
            rules.add(source.as_ref(), target.as_ref())?;
        }
        Ok(rules)
    }

    /// Adds a rule mapping `source` to `target`.
    ///
    /// A trailing `.*` on `source` declares a wildcard rule that also
    /// matches sub-packages of the stem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] for an empty source or target, or when
    /// `source` duplicates an already-declared source literal.
    pub fn add(&mut self, source: &str, target: &str) -> Result<()> {
        let (key, match_subpackages) = match source.strip_suffix(".*") {
            Some(stem) => (stem, true),
            None => (source, false),
        };

        if key.is_empty() {
            return Err(Error::InvalidRule(format!("empty source in '{source}'")));
        }
        if target.is_empty() {
            return Err(Error::InvalidRule(format!("empty target for '{source}'")));
        }
        if self
            .rules
            .iter()
            .any(|r| r.key == key && r.match_subpackages == match_subpackages)
        {
            return Err(Error::InvalidRule(format!("duplicate source '{source}'")));
        }

        self.rules.push(RenameRule {
            key: key.to_string(),
            replacement: target.to_string(),
            match_subpackages,
        });
        Ok(())
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[RenameRule] {
        &self.rules
    }

    /// Returns true if no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the number of configured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Rewrites every true match of every rule inside `text`.
    ///
    /// Returns `None` when zero true matches occurred across all rules, so
    /// callers can skip rewriting cost downstream. This is distinct from
    /// "changed to identical text", which cannot occur because a match is
    /// only replaced when the rule fires.
    ///
    /// The scan is cursor-based over one owned buffer: after a substitution
    /// the cursor resumes at the end of the inserted replacement, so a
    /// replacement is never re-scanned by the rule that produced it.
    /// Overlapping rule sets can therefore miss matches inside already
    /// rewritten spans; rule files are expected to be disjoint.
    pub fn replace_all(&self, text: &str) -> Option<String> {
        let mut buf = text.to_string();
        let mut changed = false;

        for rule in &self.rules {
            let key = rule.key.as_str();
            let key_len = key.len();
            let mut cursor = 0;

            while cursor + key_len <= buf.len() {
                let Some(found) = buf[cursor..].find(key) else {
                    break;
                };
                let start = cursor + found;
                let end = start + key_len;

                if !Self::is_true_match(&buf, start, end, rule.match_subpackages) {
                    cursor = end;
                    continue;
                }

                buf.replace_range(start..end, &rule.replacement);
                cursor = start + rule.replacement.len();
                changed = true;
            }
        }

        changed.then_some(buf)
    }

    /// Checks the identifier-boundary conditions for a candidate occurrence
    /// of a key spanning `start..end` in `text`.
    fn is_true_match(text: &str, start: usize, end: usize, match_subpackages: bool) -> bool {
        if let Some(prev) = text[..start].chars().next_back() {
            if is_identifier_part(prev) {
                return false;
            }
        }

        match text[end..].chars().next() {
            None => true,
            Some(next) => {
                if match_subpackages {
                    // Sub-package matching: a '.' continues into a
                    // sub-package, anything else must end the identifier.
                    next == '.' || !is_identifier_part(next)
                } else {
                    // Exact matching: the key must be a whole identifier, so
                    // even a '.' disqualifies the occurrence.
                    !is_identifier_part(next)
                }
            }
        }
    }

    /// Renames a whole dotted package name, or returns `None` if no rule
    /// applies.
    ///
    /// Exact rules must equal the package; wildcard rules match the stem
    /// itself or any sub-package of it, preserving the sub-package tail.
    pub fn replace_package(&self, package: &str) -> Option<String> {
        for rule in &self.rules {
            if package == rule.key {
                return Some(rule.replacement.clone());
            }
            if rule.match_subpackages {
                if let Some(tail) = package.strip_prefix(rule.key.as_str()) {
                    if tail.starts_with('.') {
                        return Some(format!("{}{}", rule.replacement, tail));
                    }
                }
            }
        }
        None
    }

    /// Renames the package portion of a qualified class name
    /// (`com.foo.Bar` -> `org.baz.Bar`), or returns `None` if the name has
    /// no package or no rule applies.
    pub fn replace_qualified_class(&self, name: &str) -> Option<String> {
        let dot = name.rfind('.')?;
        let (package, class) = name.split_at(dot);
        if package.is_empty() {
            return None;
        }
        // `class` keeps its leading '.'.
        let renamed = self.replace_package(package)?;
        Some(format!("{renamed}{class}"))
    }
}
