#![forbid(unsafe_code)]

mod ui;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use tcfpak::tcf::{self, ExtractOptions, PackOptions, StatusCode, TcfResult};

#[derive(Debug, Parser)]
#[command(name = "tcfpak", version, about = "Tbag Content File packer (TCF v1)")]
struct Cli {
    /// Debug logging (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive wizard (terminal).
    Ui,

    /// Pack a directory into a .tcf archive.
    Pack {
        /// Input directory.
        input: PathBuf,
        /// Output archive; missing parent directories are created.
        output: PathBuf,
        /// Skip paths containing this substring (repeatable).
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Extract a .tcf archive into a directory.
    Unpack {
        archive: PathBuf,
        output: PathBuf,
        /// Only extract entries that contain this substring (repeatable).
        #[arg(long)]
        filter: Vec<String>,
        /// Fail on unsafe entry paths instead of skipping them.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// List entries in an archive.
    List {
        archive: PathBuf,
        /// Print offsets and sizes too.
        #[arg(short, long, default_value_t = false)]
        long: bool,
    },

    /// Hex dump the leading bytes of one entry, stored and decoded.
    View {
        archive: PathBuf,
        #[arg(default_value_t = 0)]
        index: usize,
        #[arg(default_value_t = 100)]
        bytes: usize,
    },

    /// Check header CRC, index and entry bounds.
    Verify { archive: PathBuf },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let res = match cli.cmd {
        Command::Ui => ui::run(),
        Command::Pack {
            input,
            output,
            exclude,
        } => pack(&input, &output, exclude),
        Command::Unpack {
            archive,
            output,
            filter,
            strict,
        } => unpack(&archive, &output, filter, strict),
        Command::List { archive, long } => list(&archive, long),
        Command::View {
            archive,
            index,
            bytes,
        } => view(&archive, index, bytes),
        Command::Verify { archive } => verify(&archive),
    };

    if let Err(e) = res {
        let status = StatusCode::from(&e);
        println!("{status}");
        eprintln!("error: {e}");
        std::process::exit(status.exit_code());
    }
}

pub(crate) fn pack(input: &Path, output: &Path, excludes: Vec<String>) -> TcfResult<()> {
    tcf::ensure_parent_directories(output)?;
    let s = tcf::pack_with(input, output, &PackOptions { excludes }, &tcf::Cipher::TCF)?;
    println!(
        "Successfully packed the TCF! {} files, {} payload bytes, {} bytes total",
        s.entries, s.payload_bytes, s.archive_bytes
    );
    Ok(())
}

pub(crate) fn unpack(
    archive: &Path,
    output: &Path,
    filter: Vec<String>,
    strict: bool,
) -> TcfResult<()> {
    let opts = ExtractOptions { filter, strict };
    let r = tcf::extract_with(archive, output, &opts, &tcf::Cipher::TCF)?;
    println!(
        "Extracted {} files ({} bytes)",
        r.extracted.len(),
        r.bytes_written
    );
    for p in &r.skipped_unsafe {
        println!("  skipped unsafe path: {p}");
    }
    if r.filtered > 0 {
        println!("  {} entries filtered out", r.filtered);
    }
    Ok(())
}

fn list(archive: &Path, long: bool) -> TcfResult<()> {
    for e in tcf::entries(archive)? {
        if long {
            println!("{}  off={} size={}", e.path, e.offset, e.size);
        } else {
            println!("{}", e.path);
        }
    }
    Ok(())
}

fn view(archive: &Path, index: usize, bytes: usize) -> TcfResult<()> {
    let v = tcf::view(archive, index, bytes)?;
    println!("{} ({} bytes)", v.path, v.size);
    println!("stored: {}", tcf::hex(&v.stored));
    println!("plain : {}", tcf::hex(&v.plain));
    Ok(())
}

fn verify(archive: &Path) -> TcfResult<()> {
    let r = tcf::verify(archive)?;
    println!(
        "ok: {} entries, {} payload bytes{}",
        r.entries,
        r.payload_bytes,
        if r.footer_present { "" } else { " (no footer)" }
    );
    Ok(())
}
