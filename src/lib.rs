//! A package-renaming engine for Java artifacts.
//!
//! `repkg` rewrites qualified package references — `javax.servlet` to
//! `jakarta.servlet` and the like — across the places they hide in a built
//! artifact: source files, jar manifests, service-loader configuration, and
//! whole zip/jar/war/ear archives, nested to any depth. Directory trees are
//! handled too, so an exploded application migrates the same way as its
//! packed form.
//!
//! Renames are real identifier matches, not substring replacement:
//! `com.foo` never touches `xcom.foo` or `com.foobar`, and a `.*` suffix on
//! a rule key opts into matching subpackages.
//!
//! Archives are rewritten with minimal disturbance. Entries no rule touches
//! are spliced through with their original compression intact, changed
//! entries keep their original compression method, and a broken entry is
//! counted and copied through rather than aborting its siblings.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use repkg::{RenameRules, TransformOptions, Transformer};
//!
//! fn main() -> repkg::Result<()> {
//!     let rules = RenameRules::from_pairs([
//!         ("javax.servlet.*", "jakarta.servlet"),
//!         ("javax.json.*", "jakarta.json"),
//!     ])?;
//!     let transformer = Transformer::new(TransformOptions::new(rules));
//!     let report = transformer.transform_path(
//!         "app.war".as_ref(),
//!         "app-migrated.war".as_ref(),
//!     )?;
//!     println!("{}", report.changes);
//!     Ok(())
//! }
//! ```

pub mod action;
mod blob;
mod changes;
mod config;
mod driver;
mod error;
mod rename;
mod select;
pub mod zip;

pub use blob::ByteBlob;
pub use changes::{ChangeKind, ChangeRecord, ContainerChanges};
pub use config::TransformOptions;
pub use driver::{Report, Transformer};
pub use error::{Error, Result};
pub use rename::{RenameRule, RenameRules};
pub use select::SelectionRule;
pub use zip::NameEncoding;
