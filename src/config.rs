//! Run configuration: the ruleset and policy flags consumed by the engine.

use crate::rename::RenameRules;
use crate::select::SelectionRule;
use crate::zip::NameEncoding;

/// Immutable configuration for one transformation run.
///
/// Constructed once before a run and never mutated during it; the engine
/// receives it by shared reference. There is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// The rename mapping applied by text-rewriting actions.
    pub rules: RenameRules,
    /// Which entries are subject to transformation at all.
    pub selection: SelectionRule,
    /// Drop signature files (`META-INF/*.SF` and friends) from output
    /// containers instead of copying them through.
    ///
    /// Rewriting any entry of a signed archive invalidates its signature,
    /// so the safe migration policy is to remove the signature artifacts
    /// rather than ship an archive whose signature no longer verifies.
    pub strip_signatures: bool,
    /// Encoding of archive entry names without the UTF-8 flag set.
    pub name_encoding: NameEncoding,
    /// Allow replacing an existing output path.
    pub overwrite: bool,
}

impl TransformOptions {
    /// Creates options with the given rename rules and default policies:
    /// select everything, keep signature files, UTF-8 entry names, no
    /// overwrite.
    pub fn new(rules: RenameRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Replaces the selection rule.
    pub fn with_selection(mut self, selection: SelectionRule) -> Self {
        self.selection = selection;
        self
    }

    /// Enables or disables signature-file stripping.
    pub fn strip_signatures(mut self, strip: bool) -> Self {
        self.strip_signatures = strip;
        self
    }

    /// Sets the entry-name encoding for legacy archives.
    pub fn name_encoding(mut self, encoding: NameEncoding) -> Self {
        self.name_encoding = encoding;
        self
    }

    /// Allows replacing an existing output path.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Checks whether an entry path names a digital-signature file.
///
/// Signature files live directly under `META-INF/`: `*.SF` signature
/// manifests, `*.DSA`/`*.RSA`/`*.EC` signature blocks, and `SIG-*` files.
/// The JAR specification mandates upper-case names, so matching is
/// case-sensitive.
pub(crate) fn is_signature_path(path: &str) -> bool {
    let Some(name) = path.strip_prefix("META-INF/") else {
        return false;
    };
    if name.contains('/') {
        return false;
    }
    name.ends_with(".SF")
        || name.ends_with(".DSA")
        || name.ends_with(".RSA")
        || name.ends_with(".EC")
        || name.starts_with("SIG-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_paths() {
        assert!(is_signature_path("META-INF/APP.SF"));
        assert!(is_signature_path("META-INF/APP.DSA"));
        assert!(is_signature_path("META-INF/APP.RSA"));
        assert!(is_signature_path("META-INF/APP.EC"));
        assert!(is_signature_path("META-INF/SIG-EXTRA"));

        assert!(!is_signature_path("META-INF/MANIFEST.MF"));
        assert!(!is_signature_path("META-INF/sub/APP.SF"));
        assert!(!is_signature_path("other/APP.SF"));
        // Lower case is not a signature file per the JAR spec.
        assert!(!is_signature_path("META-INF/app.sf"));
    }

    #[test]
    fn builder_surface() {
        let options = TransformOptions::new(RenameRules::new())
            .strip_signatures(true)
            .overwrite(true);
        assert!(options.strip_signatures);
        assert!(options.overwrite);
        assert!(options.selection.accepts("anything"));
    }
}
