//! Loading rename rules from properties-style files.
//!
//! One rule per line, `source=target`. Blank lines and `#`/`!` comment
//! lines are ignored. A `.*` suffix on the source opts into subpackage
//! matching, exactly as with `--rule` on the command line.

use std::fs;
use std::path::Path;

use repkg::{Error, RenameRules, Result};

/// Parses `source=target` into a rule pair.
pub fn parse_rule_arg(arg: &str) -> Result<(String, String)> {
    let Some((source, target)) = arg.split_once('=') else {
        return Err(Error::InvalidRule(format!(
            "expected 'source=target', got '{arg}'"
        )));
    };
    let source = source.trim();
    let target = target.trim();
    if source.is_empty() || target.is_empty() {
        return Err(Error::InvalidRule(format!(
            "empty source or target in '{arg}'"
        )));
    }
    Ok((source.to_string(), target.to_string()))
}

/// Reads rule pairs from a properties file and appends them to `rules`.
pub fn load_rules_file(path: &Path, rules: &mut RenameRules) -> Result<()> {
    let text = fs::read_to_string(path)?;
    for (line_number, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (source, target) = parse_rule_arg(line).map_err(|e| {
            Error::Config(format!(
                "{}:{}: {e}",
                path.display(),
                line_number + 1
            ))
        })?;
        rules.add(&source, &target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_rule_arguments() {
        assert_eq!(
            parse_rule_arg("javax.servlet.*=jakarta.servlet").unwrap(),
            (
                "javax.servlet.*".to_string(),
                "jakarta.servlet".to_string()
            )
        );
        assert!(parse_rule_arg("no-separator").is_err());
        assert!(parse_rule_arg("=target").is_err());
        assert!(parse_rule_arg("source=").is_err());
    }

    #[test]
    fn loads_a_properties_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# servlet migration").unwrap();
        writeln!(file, "! legacy comment style").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "javax.servlet.*=jakarta.servlet").unwrap();
        writeln!(file, "javax.json = jakarta.json").unwrap();

        let mut rules = RenameRules::new();
        load_rules_file(file.path(), &mut rules).unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn reports_the_offending_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "javax.servlet.*=jakarta.servlet").unwrap();
        writeln!(file, "broken line").unwrap();

        let mut rules = RenameRules::new();
        let err = load_rules_file(file.path(), &mut rules).unwrap_err();
        assert!(err.to_string().contains(":2:"));
    }
}
