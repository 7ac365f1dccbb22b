use anyhow::Context;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use vfs2_rs::{carry_forward_hashes, extract_to, import_tree, ArchiveReader, ArchiveWriter};

#[derive(Parser)]
#[command(name = "vfs2", about = "Pack and unpack VFS2 archives", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show log output on stderr
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Unpack an archive into a directory
    #[command(visible_alias = "e")]
    Extract { archive: PathBuf, folder: PathBuf },

    /// Pack a directory into an archive
    #[command(visible_alias = "c")]
    Compress { archive: PathBuf, folder: PathBuf },

    /// Pack a directory, carrying name hashes forward from the previous
    /// archive (`<name>_old.<ext>`)
    #[command(visible_alias = "f")]
    Freshen { archive: PathBuf, folder: PathBuf },
}

fn init_tracing(verbose: bool) {
    // Logs stay off unless asked for; RUST_LOG is honoured under --verbose.
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Extract { archive, folder } => {
            let mut reader = ArchiveReader::open(&archive)
                .with_context(|| format!("failed to read {}", archive.display()))?;
            extract_to(&mut reader, &folder)?;
            println!("successfully extracted to {}", folder.display());
        }
        Command::Compress { archive, folder } => {
            let mut tree = import_tree(&folder)
                .with_context(|| format!("failed to import {}", folder.display()))?;
            ArchiveWriter::create(&archive)?.write_tree(&mut tree, &folder)?;
            println!("successfully compressed to {}", archive.display());
        }
        Command::Freshen { archive, folder } => {
            let mut tree = import_tree(&folder)
                .with_context(|| format!("failed to import {}", folder.display()))?;

            let old_path = old_archive_path(&archive);
            let previous = ArchiveReader::open(&old_path)
                .with_context(|| format!("failed to read {}", old_path.display()))?
                .into_tree();
            let changed = carry_forward_hashes(&mut tree, &previous);

            ArchiveWriter::create(&archive)?.write_tree(&mut tree, &folder)?;
            println!(
                "successfully compressed to {} ({changed} hashes carried forward)",
                archive.display()
            );
        }
    }

    Ok(())
}

/// `data.vfs` -> `data_old.vfs`
fn old_archive_path(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default();

    let mut name = format!("{stem}_old");
    if let Some(ext) = archive.extension().and_then(OsStr::to_str) {
        name.push('.');
        name.push_str(ext);
    }

    archive.with_file_name(name)
}
