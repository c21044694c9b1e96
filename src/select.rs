//! Entry selection using include/exclude glob patterns.

use glob::{MatchOptions, Pattern};

use crate::{Error, Result};

/// Match options used for all selection patterns: case-sensitive,
/// `*` may cross directory separators.
fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

/// Decides, from an entry path alone, whether an entry is subject to
/// transformation.
///
/// Rejected entries are still copied through to the output container
/// unchanged; selection only controls whether content rules are applied.
///
/// Exclusion wins: if a path matches any exclude pattern it is rejected
/// regardless of the include patterns. With no include patterns configured,
/// every path not excluded is accepted.
///
/// Paths are normalized to `/` separators before matching.
#[derive(Debug, Clone, Default)]
pub struct SelectionRule {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl SelectionRule {
    /// Creates a selection rule from include and exclude pattern strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if any pattern fails to compile.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns
                .iter()
                .map(|p| {
                    Pattern::new(p).map_err(|e| Error::InvalidPattern(format!("{p}: {e}")))
                })
                .collect()
        };

        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Creates a selection rule that accepts every path.
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Checks whether the given entry path is selected for transformation.
    pub fn accepts(&self, path: &str) -> bool {
        let normalized;
        let path = if path.contains('\\') {
            normalized = path.replace('\\', "/");
            normalized.as_str()
        } else {
            path
        };

        let options = match_options();

        if self.exclude.iter().any(|p| p.matches_with(path, options)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches_with(path, options))
    }
}
