#![forbid(unsafe_code)]

use inquire::{Confirm, InquireError, Select, Text};
use std::path::{Path, PathBuf};

use tcfpak::tcf::{TcfError, TcfResult};

const PACK: &str = "Pack a directory";
const UNPACK: &str = "Unpack an archive";

fn prompt_err(e: InquireError) -> TcfError {
    TcfError::Io(std::io::Error::other(e))
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

fn ensure_tcf_ext(p: &Path) -> PathBuf {
    if p.extension().and_then(|e| e.to_str()).unwrap_or("") == "tcf" {
        return p.to_path_buf();
    }
    let mut s = p.to_string_lossy().to_string();
    if !s.ends_with('.') {
        s.push('.');
    }
    s.push_str("tcf");
    PathBuf::from(s)
}

pub fn run() -> TcfResult<()> {
    println!("Tbag Content File Packer\n");

    let op = Select::new("What do you want to do?", vec![PACK, UNPACK])
        .prompt()
        .map_err(prompt_err)?;

    if op == PACK {
        run_pack()
    } else {
        run_unpack()
    }
}

fn run_pack() -> TcfResult<()> {
    let input = Text::new("Input directory")
        .with_default("./assets")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;

    let output_raw = Text::new("Output .tcf file")
        .with_default("./assets.tcf")
        .prompt()
        .map_err(prompt_err)?;
    let output = ensure_tcf_ext(Path::new(output_raw.trim()));

    let excludes_raw = Text::new("Excludes (comma-separated substrings, optional)")
        .with_default("")
        .prompt()
        .map_err(prompt_err)?;
    let excludes = split_csv(&excludes_raw);

    println!("\nPack summary:");
    println!("  input   : {}", input.display());
    println!("  output  : {}", output.display());
    println!("  excludes: {}", if excludes.is_empty() { "<none>" } else { "(set)" });

    if !confirm()? {
        return Ok(());
    }
    crate::pack(&input, &output, excludes)
}

fn run_unpack() -> TcfResult<()> {
    let archive = Text::new("Archive (.tcf)")
        .with_default("./assets.tcf")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;

    let output = Text::new("Output directory")
        .with_default("./assets_extracted")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;

    let filter_raw = Text::new("Only entries containing (comma-separated, optional)")
        .with_default("")
        .prompt()
        .map_err(prompt_err)?;
    let filter = split_csv(&filter_raw);

    let strict = Confirm::new("Fail on unsafe entry paths instead of skipping them?")
        .with_default(false)
        .prompt()
        .map_err(prompt_err)?;

    println!("\nUnpack summary:");
    println!("  archive: {}", archive.display());
    println!("  output : {}", output.display());
    println!("  filter : {}", if filter.is_empty() { "<none>" } else { "(set)" });
    println!("  strict : {strict}");

    if !confirm()? {
        return Ok(());
    }
    crate::unpack(&archive, &output, filter, strict)
}

fn confirm() -> TcfResult<bool> {
    Confirm::new("Proceed?")
        .with_default(true)
        .prompt()
        .map_err(prompt_err)
}
