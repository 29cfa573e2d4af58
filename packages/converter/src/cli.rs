//! Command-line interface for the converter.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{convert_batch_with, BatchContext, BatchOutcome, SourceDocument};
use crate::catalog::Catalog;
use crate::config::{validate_date, ParserConfig};
use crate::error::{ConverterError, Result};
use crate::types::DocumentType;
use crate::xml::validate_xml;

/// LeyChile Converter - Convert Chilean legal text into structured XML.
#[derive(Parser)]
#[command(name = "leychile-converter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert text files into XML.
    Convert {
        /// Text files to convert; each file stem is the document id
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Catalog YAML file with metadata of known documents
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Document type (ley, ncg, instructivo, resolucion, circular)
        #[arg(long, default_value = "resolucion")]
        tipo: String,

        /// Source URL recorded in the output
        #[arg(long)]
        url: Option<String>,

        /// Publication date in YYYY-MM-DD format
        #[arg(long)]
        fecha_publicacion: Option<String>,
    },

    /// Validate an XML file against the document schema.
    Validate {
        /// XML file to validate
        xml: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            files,
            output,
            catalog,
            tipo,
            url,
            fecha_publicacion,
        } => convert_command(
            &files,
            output.as_deref(),
            catalog.as_deref(),
            &tipo,
            url.as_deref(),
            fecha_publicacion.as_deref(),
        ),
        Commands::Validate { xml } => validate_command(&xml),
    }
}

/// Execute the convert command.
fn convert_command(
    files: &[PathBuf],
    output: Option<&Path>,
    catalog_path: Option<&Path>,
    tipo: &str,
    url: Option<&str>,
    publication_date: Option<&str>,
) -> Result<()> {
    // Validate inputs before reading any file
    let publication_date = publication_date.map(validate_date).transpose()?;

    let output_dir = output.unwrap_or(Path::new("."));
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(ConverterError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Output path is not a directory: {}", output_dir.display()),
        )));
    }

    let catalog = match catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::default(),
    };
    let doc_type = DocumentType::from_tag(tipo);
    let config = ParserConfig::default();

    let mut sources = Vec::with_capacity(files.len());
    let mut unreadable = 0;
    for path in files {
        match SourceDocument::from_file(path, doc_type) {
            Ok(source) => {
                if !catalog.is_empty() && catalog.get(&source.id).is_none() {
                    tracing::warn!(id = %source.id, "Document not found in catalog");
                }
                let source = match url {
                    Some(url) => source.with_source_url(url),
                    None => source,
                };
                sources.push(match publication_date {
                    Some(date) => source.with_publication_date(date),
                    None => source,
                });
            }
            Err(e) => {
                println!("  {} {}: {e}", style("✗").red().bold(), path.display());
                unreadable += 1;
            }
        }
    }

    println!(
        "{} {} document(s) as {}",
        style("Converting").bold(),
        style(sources.len()).cyan(),
        style(doc_type.as_str()).green()
    );
    println!();

    let pb = ProgressBar::new(sources.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let ctx = BatchContext {
        catalog: &catalog,
        config: &config,
        output_dir: Some(output_dir),
    };
    let outcomes = convert_batch_with(&sources, &ctx, |outcome| {
        pb.set_message(outcome.id.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let failed = unreadable + report_outcomes(&outcomes);
    let total = files.len();

    println!();
    if failed > 0 {
        return Err(ConverterError::BatchFailed { failed, total });
    }
    println!(
        "{} {} document(s) written to {}",
        style("Done:").green().bold(),
        total,
        output_dir.display()
    );
    Ok(())
}

/// Print one line per outcome and return the number of failures.
fn report_outcomes(outcomes: &[BatchOutcome]) -> usize {
    let mut failed = 0;
    for outcome in outcomes {
        match &outcome.result {
            Ok(conversion) => {
                let stats = crate::xml::Statistics::collect(&conversion.document.parts);
                let path = conversion
                    .output
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "  {} {} → {} ({} articles)",
                    style("✓").green().bold(),
                    style(&outcome.id).cyan(),
                    path,
                    stats.articles
                );
                if !conversion.document.warnings.is_empty() {
                    println!(
                        "    Warnings: {}",
                        style(conversion.document.warnings.len()).yellow().bold()
                    );
                }
                if !conversion.diagnostics.is_empty() {
                    println!(
                        "    Schema violations: {}",
                        style(conversion.diagnostics.len()).yellow().bold()
                    );
                }
            }
            Err(e) => {
                println!("  {} {}: {e}", style("✗").red().bold(), outcome.id);
                failed += 1;
            }
        }
    }
    failed
}

/// Execute the validate command.
fn validate_command(path: &Path) -> Result<()> {
    let xml = fs::read_to_string(path)?;
    let diagnostics = validate_xml(&xml)?;

    if diagnostics.is_empty() {
        println!("{} {}", style("Valid:").green().bold(), path.display());
        return Ok(());
    }

    for diagnostic in &diagnostics {
        println!("  {} {diagnostic}", style("✗").red());
    }
    Err(ConverterError::SchemaViolations {
        path: path.display().to_string(),
        count: diagnostics.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::parse_from(["leychile-converter", "convert", "a.txt", "b.txt"]);

        let Commands::Convert {
            files,
            output,
            catalog,
            tipo,
            url,
            ..
        } = cli.command
        else {
            panic!("expected convert command");
        };
        assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(output.is_none());
        assert!(catalog.is_none());
        assert_eq!(tipo, "resolucion");
        assert!(url.is_none());
    }

    #[test]
    fn test_cli_parse_convert_with_options() {
        let cli = Cli::parse_from([
            "leychile-converter",
            "convert",
            "2024_INST_5.txt",
            "-o",
            "out",
            "--catalog",
            "catalogo.yaml",
            "--tipo",
            "instructivo",
        ]);

        let Commands::Convert {
            output,
            catalog,
            tipo,
            ..
        } = cli.command
        else {
            panic!("expected convert command");
        };
        assert_eq!(output, Some(PathBuf::from("out")));
        assert_eq!(catalog, Some(PathBuf::from("catalogo.yaml")));
        assert_eq!(tipo, "instructivo");
    }

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["leychile-converter", "validate", "Ley_21.000.xml"]);
        assert!(matches!(cli.command, Commands::Validate { xml } if xml == Path::new("Ley_21.000.xml")));
    }

    #[test]
    fn test_cli_convert_requires_files() {
        assert!(Cli::try_parse_from(["leychile-converter", "convert"]).is_err());
    }
}
