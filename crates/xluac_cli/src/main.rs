use clap::Parser;
use log::*;

pub mod batch;
pub mod cli;
pub mod loader;

use batch::RunSummary;
use cli::Command;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn main() -> std::process::ExitCode {
    pretty_env_logger::formatted_builder()
        .format_indent(None)
        .format_timestamp(None)
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = cli::Args::parse();

    info!("xluac {VERSION}");

    let Command::Decrypt {
        input,
        output,
        scratch_dir,
    } = args.command;

    let mut summary = RunSummary::default();

    if input.is_dir() {
        info!("batch processing {}", input.display());
        batch::process_directory(&input, &output, &scratch_dir, &mut summary);
    } else {
        let ok = batch::process_file(&input, &output, &scratch_dir);
        summary.record(ok);
    }

    info!(
        "done: {} total, {} succeeded, {} failed",
        summary.total, summary.succeeded, summary.failed
    );
    if summary.failed > 0 {
        warn!(
            "{} file(s) failed, originals saved under {}",
            summary.failed,
            scratch_dir.display()
        );
    }

    std::process::ExitCode::from(summary.exit_code() as u8)
}
