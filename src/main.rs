//! Main entry point for the flatarc CLI application.
//!
//! This binary lists and extracts files from Build engine GRP and
//! Descent II MVL archives.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use flatarc::archive::NameOrdering;
use flatarc::{Archive, Cli, Entry, LocalStorage};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and opens the archive,
/// either with the requested format or by probing its signature.
fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let archive = match cli.format {
        Some(format) => Archive::open(&cli.file, format),
        None => Archive::open_detect(&cli.file),
    }
    .with_context(|| format!("cannot open archive {}", cli.file))?;

    debug!(
        "{} archive with {} entries",
        archive.format().info().description,
        archive.len()
    );

    process_archive(&archive, &cli)
}

/// Process an archive based on CLI options.
///
/// This function handles both listing and extraction modes:
/// - List mode (`-l` or `-v`): Display archive contents
/// - Extract mode: Extract every entry, or those named on the command line
///
/// # Arguments
///
/// * `archive` - The loaded archive
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if extraction fails.
fn process_archive(archive: &Archive<LocalStorage>, cli: &Cli) -> Result<()> {
    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        list_files(archive, cli.verbose);
        return Ok(());
    }

    let selected = select_entries(archive, &cli.files)?;

    // Extract each selected entry; in pipe mode label them when there are several
    let multiple_files = cli.pipe && selected.len() > 1;
    for entry in selected {
        extract_file(archive, entry, cli, multiple_files)?;
    }

    Ok(())
}

/// Resolve the requested names (or all entries) to archive entries.
///
/// Plain names go through the archive's own lookup, so they follow its case
/// rules; patterns with `*` or `?` are matched against every entry.
///
/// # Arguments
///
/// * `archive` - The loaded archive
/// * `requested` - Names and patterns from the command line; empty selects all
///
/// # Returns
///
/// The selected entries in request order, each at most once.
fn select_entries<'a>(archive: &'a Archive<LocalStorage>, requested: &[String]) -> Result<Vec<&'a Entry>> {
    // No names given: every entry, including ones name lookup cannot reach
    if requested.is_empty() {
        return Ok(archive.entries().iter().collect());
    }

    let fold = archive.format().descriptor().ordering == NameOrdering::CaseInsensitive;
    let mut selected: Vec<&Entry> = Vec::new();
    for name in requested {
        if has_glob_chars(name) {
            selected.extend(
                archive
                    .entries()
                    .iter()
                    .filter(|e| glob_match(name, &e.name, fold)),
            );
        } else {
            match archive.entry(name) {
                Ok(entry) => selected.push(entry),
                Err(e) if e.is_not_found() => bail!("{}: not found in {}", name, archive.path().display()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    // Same entry requested twice: extract once.
    let mut seen = HashSet::new();
    selected.retain(|e| seen.insert(std::ptr::from_ref(*e)));
    Ok(selected)
}

/// Print archive contents.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Size and payload offset per entry, plus totals
///
/// # Arguments
///
/// * `archive` - The loaded archive
/// * `verbose` - If true, display the detailed table
fn list_files(archive: &Archive<LocalStorage>, verbose: bool) {
    if verbose {
        println!("{:>10}  {:>10}  Name", "Length", "Offset");
        println!("{}", "-".repeat(40));
    }

    let mut total = 0u64;
    for entry in archive.entries() {
        if verbose {
            println!("{:>10}  {:>10}  {}", entry.size, entry.start_offset, entry.name);
            total += entry.size as u64;
        } else {
            println!("{}", entry.name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(40));
        println!(
            "{:>10}  {:>10}  {} files ({})",
            total,
            "",
            archive.len(),
            format_size(total)
        );
    }
}

/// Extract a single entry from the archive.
///
/// Handles various extraction options:
/// - Pipe mode (`-p`): Write to stdout instead of file
/// - Custom output directory (`-d`): Extract to specified directory
/// - Never overwrite (`-n`): Skip files that already exist
///
/// # Arguments
///
/// * `archive` - The loaded archive
/// * `entry` - The entry to extract, taken from the archive itself
/// * `cli` - Parsed command-line arguments
/// * `show_filename` - If true, print filename marker before content (for pipe mode with multiple files)
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if extraction fails.
fn extract_file(
    archive: &Archive<LocalStorage>,
    entry: &Entry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    // Open the entry itself rather than its name, so filtered and
    // duplicated names still read their own bytes
    let mut reader = archive.open_entry(entry)?;

    // Pipe mode: write file contents directly to stdout
    if cli.pipe {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if show_filename {
            writeln!(out, "--- {} ---", entry.name)?;
        }
        io::copy(&mut reader, &mut out)?;
        reader.close()?;
        return Ok(());
    }

    // Determine the output path based on CLI options
    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(&entry.name),
        None => PathBuf::from(&entry.name),
    };

    // -n flag: never overwrite, skip with a note (unless quiet)
    if output_path.exists() && cli.never_overwrite {
        if !cli.is_quiet() {
            eprintln!("Skipping: {} (file exists)", entry.name);
        }
        return Ok(());
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    let mut file = fs::File::create(&output_path)
        .with_context(|| format!("cannot create {}", output_path.display()))?;
    io::copy(&mut reader, &mut file)?;
    reader.close()?;

    Ok(())
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
///
/// # Arguments
///
/// * `pattern` - The glob pattern to match against
/// * `text` - The entry name to check
/// * `fold` - If true, ASCII letters match regardless of case
///
/// # Returns
///
/// Returns `true` if the text matches the pattern, `false` otherwise.
fn glob_match(pattern: &str, text: &str, fold: bool) -> bool {
    let normalize = |s: &str| -> Vec<char> {
        if fold {
            s.chars().map(|c| c.to_ascii_lowercase()).collect()
        } else {
            s.chars().collect()
        }
    };
    let pattern_chars = normalize(pattern);
    let text_chars = normalize(text);

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            // Star matches zero characters, or one and stays for more
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
