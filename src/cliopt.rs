use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "tsload", about = "Bulk-load exposition metrics into a time-series database")]
pub enum CliOpt {
    /// Initialize the database.
    ///
    /// Anything already stored at the path is destroyed first.
    Init {
        /// Path to the database
        path: PathBuf,

        /// Days of retention
        #[structopt(long = "retention", default_value = "15")]
        retention: u64,
    },

    /// Load data to the database.
    Load {
        /// Path to the database
        path: PathBuf,

        /// Data filename
        datafile: PathBuf,

        /// Treat a malformed datafile line as a fatal error instead of
        /// silently stopping at it
        #[structopt(long = "strict")]
        strict: bool,
    },
}
