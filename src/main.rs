use std::fs;

use structopt::StructOpt;

use tsload::cliopt::CliOpt;
use tsload::error::Result;
use tsload::ingest::ParseMode;
use tsload::program;

fn main() -> Result<()> {
    match CliOpt::from_args() {
        CliOpt::Init { path, retention } => program::init(path, retention),
        CliOpt::Load {
            path,
            datafile,
            strict,
        } => {
            let content = fs::read_to_string(&datafile)
                .map_err(|e| (format!("failed to read {}", datafile.display()), e))?;

            let mode = if strict {
                ParseMode::Strict
            } else {
                ParseMode::Lenient
            };

            let stats = program::load(path, &content, mode)?;
            eprintln!(
                "loaded {} samples ({} series, {} dropped)",
                stats.appended, stats.series, stats.dropped
            );
            Ok(())
        }
    }
}
