mod cache;
mod driver;

pub use cache::SeriesRefCache;
pub use driver::{ingest, IngestStats, ParseMode};
