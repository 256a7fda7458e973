//! PBO archive parser CLI
//!
//! A command-line interface for inspecting PBO-style mod archives and
//! extracting the script files they contain.
//!
//! ## Commands
//!
//! - `info` - Display the entry table and metadata properties
//! - `extract` - Extract matching script files (JSON or pretty output)
//! - `validate` - Validate archive structure (exit codes for scripting)
//! - `batch` - Process multiple archives from a directory

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pbo_parser::{extract, Archive, EntryDiagnostic, ExtractOptions, ExtractedFile, PackingMethod};

/// Default cap on archive size: 256 MiB.
const DEFAULT_MAX_SIZE: u64 = 256 * 1024 * 1024;

/// PBO mod archive parser and script extractor
#[derive(Parser)]
#[command(name = "pbo-parser")]
#[command(about = "PBO mod archive parser and script extractor", long_about = None)]
#[command(version)]
struct Cli {
    /// Maximum archive size in bytes; larger files are refused before
    /// parsing to bound memory and worst-case time
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display archive information
    Info {
        /// Path to the archive file
        file: PathBuf,
    },
    /// Extract script files from an archive
    Extract {
        /// Path to the archive file
        file: PathBuf,
        /// Directory to write extracted files into
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format: json, pretty
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
        /// Extension to include (repeatable, default: c and cpp)
        #[arg(long = "ext")]
        extensions: Vec<String>,
    },
    /// Validate archive structure
    Validate {
        /// Path to the archive file
        file: PathBuf,
        /// Verbose error reporting
        #[arg(short, long)]
        verbose: bool,
    },
    /// Process multiple archive files
    Batch {
        /// Directory containing .pbo files
        directory: PathBuf,
        /// Output directory for JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Continue on errors
        #[arg(long)]
        continue_on_error: bool,
    },
}

/// Output format options
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

// ============================================================================
// Serializable Output Structures
// ============================================================================

#[derive(Serialize)]
struct ExtractOutput {
    archive: ArchiveInfo,
    files: Vec<ExtractedFile>,
    diagnostics: Vec<EntryDiagnostic>,
}

#[derive(Serialize)]
struct ArchiveInfo {
    file_size: usize,
    entry_count: usize,
    data_offset: usize,
    properties: Vec<(String, String)>,
}

#[derive(Serialize)]
struct BatchSummary {
    total_files: usize,
    successful: usize,
    failed: usize,
    total_extracted: usize,
    total_diagnostics: usize,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    let max_size = cli.max_size;

    match cli.command {
        Commands::Info { file } => cmd_info(&file, max_size),
        Commands::Extract {
            file,
            output,
            format,
            extensions,
        } => cmd_extract(&file, output.as_deref(), &format, extensions, max_size),
        Commands::Validate { file, verbose } => cmd_validate(&file, verbose, max_size),
        Commands::Batch {
            directory,
            output,
            continue_on_error,
        } => cmd_batch(&directory, output.as_deref(), continue_on_error, max_size),
    }
}

/// Reads an archive into memory, enforcing the size cap first.
fn read_archive(file: &Path, max_size: u64) -> Result<Vec<u8>, String> {
    let metadata = std::fs::metadata(file).map_err(|e| format!("cannot stat file: {e}"))?;
    if metadata.len() > max_size {
        return Err(format!(
            "archive is {} bytes, exceeding the {max_size} byte limit",
            metadata.len()
        ));
    }
    std::fs::read(file).map_err(|e| format!("cannot read file: {e}"))
}

fn options_from(extensions: Vec<String>) -> ExtractOptions {
    if extensions.is_empty() {
        ExtractOptions::default()
    } else {
        ExtractOptions { extensions }
    }
}

// ============================================================================
// Info Command Implementation
// ============================================================================

fn cmd_info(file: &Path, max_size: u64) -> ExitCode {
    let data = match read_archive(file, max_size) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let archive = match Archive::parse(&data) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error parsing archive: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Archive Information ===\n");
    println!("File:");
    println!("  Size: {} bytes", data.len());
    println!("  Entries: {}", archive.entries.len());
    println!("  Data region offset: 0x{:X}", archive.data_offset);
    println!(
        "  Declared data size: {} bytes",
        archive.declared_data_size()
    );

    if !archive.properties.is_empty() {
        println!("\nProperties:");
        for prop in &archive.properties {
            println!("  {} = {}", prop.name, prop.value);
        }
    }

    println!("\nEntries:");
    for entry in &archive.entries {
        println!(
            "  {:<40} {:>10} bytes  [{}]",
            entry.file_name,
            entry.data_size,
            PackingMethod::from_u32(entry.packing_method)
        );
    }

    ExitCode::SUCCESS
}

// ============================================================================
// Extract Command Implementation
// ============================================================================

fn cmd_extract(
    file: &Path,
    output_dir: Option<&Path>,
    format: &OutputFormat,
    extensions: Vec<String>,
    max_size: u64,
) -> ExitCode {
    let data = match read_archive(file, max_size) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let archive = match Archive::parse(&data) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error parsing archive: {e}");
            return ExitCode::FAILURE;
        }
    };

    let extraction = extract(&data, &archive, &options_from(extensions));

    if let Some(dir) = output_dir {
        if let Err(e) = write_extracted_files(dir, &extraction.files) {
            eprintln!("Error writing output: {e}");
            return ExitCode::FAILURE;
        }
        eprintln!("Wrote {} files to {}", extraction.files.len(), dir.display());
    }

    let output = ExtractOutput {
        archive: ArchiveInfo {
            file_size: data.len(),
            entry_count: archive.entries.len(),
            data_offset: archive.data_offset,
            properties: archive
                .properties
                .iter()
                .map(|p| (p.name.clone(), p.value.clone()))
                .collect(),
        },
        files: extraction.files,
        diagnostics: extraction.diagnostics,
    };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Pretty => print_pretty(&output),
    }

    ExitCode::SUCCESS
}

/// Writes extracted files under the output directory, flattening the
/// archive path to its basename to avoid path traversal from hostile
/// entry names.
fn write_extracted_files(dir: &Path, files: &[ExtractedFile]) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    for file in files {
        let target = dir.join(&file.name);
        std::fs::write(&target, &file.content).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn print_json(output: &ExtractOutput) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing to JSON: {e}"),
    }
}

fn print_pretty(output: &ExtractOutput) {
    println!("=== Archive ===");
    println!("File Size: {} bytes", output.archive.file_size);
    println!("Entries: {}", output.archive.entry_count);
    if !output.archive.properties.is_empty() {
        println!("Properties:");
        for (name, value) in &output.archive.properties {
            println!("  {name} = {value}");
        }
    }
    println!();

    println!("=== Extracted Files ({}) ===", output.files.len());
    for file in &output.files {
        println!("  {} ({} bytes)", file.path, file.size);
    }

    if !output.diagnostics.is_empty() {
        println!("\n=== Diagnostics ({}) ===", output.diagnostics.len());
        for diag in &output.diagnostics {
            println!("  {}: {}", diag.file_name, diag.message);
        }
    }
}

// ============================================================================
// Validate Command Implementation
// ============================================================================

struct ValidationResult {
    table_valid: bool,
    entries_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn is_valid(&self) -> bool {
        self.table_valid && self.entries_valid
    }
}

fn cmd_validate(file: &Path, verbose: bool, max_size: u64) -> ExitCode {
    let result = validate_archive(file, max_size);

    if verbose {
        print_validation_details(&result, file);
    } else {
        let status = if result.is_valid() { "VALID" } else { "INVALID" };
        println!("{}: {status}", file.display());
    }

    if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn validate_archive(file: &Path, max_size: u64) -> ValidationResult {
    let mut result = ValidationResult {
        table_valid: false,
        entries_valid: false,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let data = match read_archive(file, max_size) {
        Ok(d) => d,
        Err(e) => {
            result.errors.push(e);
            return result;
        }
    };

    let archive = match Archive::parse(&data) {
        Ok(a) => {
            result.table_valid = true;
            a
        }
        Err(e) => {
            result.errors.push(format!("Table parsing failed: {e}"));
            return result;
        }
    };

    // The data region should cover every declared block.
    let declared_end = archive.data_offset.saturating_add(archive.declared_data_size());
    if declared_end > data.len() {
        result.warnings.push(format!(
            "data region truncated: entries declare {declared_end} bytes, file has {}",
            data.len()
        ));
    }

    let extraction = extract(&data, &archive, &ExtractOptions::default());
    result.entries_valid = extraction.diagnostics.is_empty();
    for diag in &extraction.diagnostics {
        result
            .warnings
            .push(format!("{}: {}", diag.file_name, diag.message));
    }

    result
}

fn print_validation_details(result: &ValidationResult, file: &Path) {
    println!("Validating: {}\n", file.display());

    println!("Checks:");
    println!("  Entry table:       {}", status_icon(result.table_valid));
    println!("  Entry decoding:    {}", status_icon(result.entries_valid));

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in &result.errors {
            println!("  - {error}");
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }

    println!(
        "\nResult: {}",
        if result.is_valid() { "VALID" } else { "INVALID" }
    );
}

fn status_icon(valid: bool) -> &'static str {
    if valid {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

// ============================================================================
// Batch Command Implementation
// ============================================================================

fn cmd_batch(
    directory: &Path,
    output_dir: Option<&Path>,
    continue_on_error: bool,
    max_size: u64,
) -> ExitCode {
    let archives = find_archives(directory);

    if archives.is_empty() {
        eprintln!("No .pbo files found in {}", directory.display());
        return ExitCode::FAILURE;
    }

    eprintln!("Found {} archive files", archives.len());

    if let Some(dir) = output_dir {
        if !dir.exists() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("Failed to create output directory: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut summary = BatchSummary {
        total_files: archives.len(),
        successful: 0,
        failed: 0,
        total_extracted: 0,
        total_diagnostics: 0,
    };

    for path in &archives {
        eprint!(
            "Processing {}... ",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match process_archive(path, output_dir, max_size) {
            Ok((extracted, diagnostics)) => {
                eprintln!("OK ({extracted} files, {diagnostics} warnings)");
                summary.successful += 1;
                summary.total_extracted += extracted;
                summary.total_diagnostics += diagnostics;
            }
            Err(e) => {
                eprintln!("ERROR: {e}");
                summary.failed += 1;
                if !continue_on_error {
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    eprintln!(
        "\nProcessed: {} success, {} errors, {} files extracted",
        summary.successful, summary.failed, summary.total_extracted
    );

    if let Some(dir) = output_dir {
        let summary_file = dir.join("summary.json");
        if let Ok(json) = serde_json::to_string_pretty(&summary) {
            if std::fs::write(&summary_file, json).is_ok() {
                eprintln!("Summary written to: {}", summary_file.display());
            }
        }
    }

    if summary.failed > 0 && !continue_on_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn find_archives(directory: &Path) -> Vec<PathBuf> {
    let mut archives = Vec::new();

    if let Ok(entries) = std::fs::read_dir(directory) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("pbo"))
            {
                archives.push(path);
            }
        }
    }

    archives.sort();
    archives
}

fn process_archive(
    path: &Path,
    output_dir: Option<&Path>,
    max_size: u64,
) -> Result<(usize, usize), String> {
    let data = read_archive(path, max_size)?;
    let archive = Archive::parse(&data).map_err(|e| e.to_string())?;
    let extraction = extract(&data, &archive, &ExtractOptions::default());

    if let Some(dir) = output_dir {
        let output = ExtractOutput {
            archive: ArchiveInfo {
                file_size: data.len(),
                entry_count: archive.entries.len(),
                data_offset: archive.data_offset,
                properties: archive
                    .properties
                    .iter()
                    .map(|p| (p.name.clone(), p.value.clone()))
                    .collect(),
            },
            files: extraction.files.clone(),
            diagnostics: extraction.diagnostics.clone(),
        };

        let output_file = dir
            .join(path.file_stem().unwrap_or_default())
            .with_extension("json");
        let content = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
        std::fs::write(&output_file, content).map_err(|e| e.to_string())?;
    }

    Ok((extraction.files.len(), extraction.diagnostics.len()))
}
