//! Recursive directory walk and per-file processing, mirroring the original
//! tool's `process_directory`/`ProcessStats` pair.

use crate::loader::load_and_redump;
use anyhow::Context;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use xluac_walker::normalize_and_decrypt;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
}

impl RunSummary {
    pub fn record(&mut self, ok: bool) {
        self.total += 1;
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

fn is_supported(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    name.ends_with(".luac") || name.ends_with(".lua.bytes")
}

fn with_luac_extension(path: &Path) -> PathBuf {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("out");
    let stem = name
        .strip_suffix(".lua.bytes")
        .or_else(|| name.strip_suffix(".luac"))
        .unwrap_or(name);
    path.with_file_name(format!("{stem}.luac"))
}

/// Processes a single file: reads it, normalises and decrypts it, hands the
/// result to the external loader, and writes the canonical dump to `output`.
/// On any failure, the original bytes are copied into `scratch_dir` instead.
pub fn process_file(input: &Path, output: &Path, scratch_dir: &Path) -> bool {
    info!("processing {}", input.display());

    let result = (|| -> anyhow::Result<()> {
        let original = fs::read(input)
            .with_context(|| format!("reading {}", input.display()))?;
        let mut buf = original.clone();

        normalize_and_decrypt(&mut buf).context("decrypting chunk")?;

        let chunk_name = input.to_string_lossy();
        let dumped = load_and_redump(&buf, &chunk_name).context("loading normalised chunk")?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(output, &dumped).with_context(|| format!("writing {}", output.display()))?;

        Ok(())
    })();

    match result {
        Ok(()) => true,
        Err(e) => {
            error!("failed to process {}: {e:#}", input.display());
            save_to_scratch(input, scratch_dir);
            false
        }
    }
}

fn save_to_scratch(input: &Path, scratch_dir: &Path) {
    let Some(name) = input.file_name() else {
        return;
    };
    if let Err(e) = fs::create_dir_all(scratch_dir) {
        warn!("could not create scratch dir {}: {e}", scratch_dir.display());
        return;
    }
    let dest = scratch_dir.join(name);
    if let Err(e) = fs::copy(input, &dest) {
        warn!("could not save failed file to {}: {e}", dest.display());
    } else {
        warn!("saved failed input to {}", dest.display());
    }
}

/// Recursively mirrors `input` under `output`, processing every supported
/// file it finds. Matches the original `process_directory` shape: manual
/// recursion via directory reads, no extra crate.
pub fn process_directory(input: &Path, output: &Path, scratch_dir: &Path, summary: &mut RunSummary) {
    let entries = match fs::read_dir(input) {
        Ok(e) => e,
        Err(e) => {
            error!("could not read directory {}: {e}", input.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let rel_name = entry.file_name();

        if path.is_dir() {
            process_directory(&path, &output.join(&rel_name), scratch_dir, summary);
        } else if is_supported(&path) {
            let dest = with_luac_extension(&output.join(&rel_name));
            let ok = process_file(&path, &dest, scratch_dir);
            summary.record(ok);
        }
    }
}
