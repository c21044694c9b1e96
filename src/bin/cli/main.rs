//! CLI tool for package-renaming transformations.

mod exit_codes;
mod rules_file;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use repkg::{
    Error, NameEncoding, RenameRules, SelectionRule, TransformOptions, Transformer,
};

use exit_codes::ExitCode;

/// Package-renaming tool for Java artifacts
#[derive(Parser)]
#[command(name = "repkg")]
#[command(author, version, about = "Rewrites package identifiers in artifacts", long_about = None)]
pub struct Cli {
    /// Input file, archive, or directory
    input: PathBuf,

    /// Output path (same kind as the input)
    output: PathBuf,

    /// Rename rule, 'source=target' (repeatable; '.*' suffix matches subpackages)
    #[arg(short = 'r', long = "rule")]
    rules: Vec<String>,

    /// Properties file with one 'source=target' rule per line
    #[arg(long = "rules")]
    rules_file: Option<PathBuf>,

    /// Entry patterns to transform (glob patterns supported)
    #[arg(short = 'i', long)]
    include: Vec<String>,

    /// Entry patterns to exclude from transformation
    #[arg(short = 'e', long)]
    exclude: Vec<String>,

    /// Drop signature files (META-INF/*.SF and friends) from archives
    #[arg(long)]
    strip_signatures: bool,

    /// Overwrite an existing output path
    #[arg(long)]
    overwrite: bool,

    /// Entry-name encoding for archives without the UTF-8 flag
    #[arg(long, value_enum, default_value = "utf8")]
    encoding: Encoding,

    /// Suppress the change summary
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Exit non-zero when any entry fails
    #[arg(long)]
    strict: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    Utf8,
    Cp437,
}

impl From<Encoding> for NameEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Utf8 => NameEncoding::Utf8,
            Encoding::Cp437 => NameEncoding::Cp437,
        }
    }
}

fn build_options(cli: &Cli) -> Result<TransformOptions, Error> {
    let mut rules = RenameRules::new();
    if let Some(path) = &cli.rules_file {
        rules_file::load_rules_file(path, &mut rules)?;
    }
    for arg in &cli.rules {
        let (source, target) = rules_file::parse_rule_arg(arg)?;
        rules.add(&source, &target)?;
    }
    if rules.is_empty() {
        return Err(Error::Config(
            "no rename rules given (use --rule or --rules)".to_string(),
        ));
    }

    let selection = SelectionRule::new(&cli.include, &cli.exclude)?;

    Ok(TransformOptions::new(rules)
        .with_selection(selection)
        .strip_signatures(cli.strip_signatures)
        .name_encoding(cli.encoding.into())
        .overwrite(cli.overwrite))
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let options = build_options(cli)?;
    let transformer = Transformer::new(options);
    let report = transformer.transform_path(&cli.input, &cli.output)?;

    if !cli.quiet {
        println!("{}", report.changes);
        if !report.modified {
            println!("output is identical to input");
        }
    }

    if report.has_failures() {
        eprintln!("warning: {} entries failed", report.changes.failed);
        if cli.strict {
            return Ok(ExitCode::Warning);
        }
    }
    Ok(ExitCode::Success)
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::error_to_exit_code(&e)
        }
    };

    std::process::exit(exit_code.code());
}
