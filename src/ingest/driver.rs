use super::cache::SeriesRefCache;
use crate::error::Result;
use crate::model;
use crate::parser::{Entry, TextParser};
use crate::storage::Appender;

/// What to do when the datafile stops parsing mid-stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParseMode {
    /// A malformed line terminates the sequence like end of input; samples
    /// ingested before it are still committed.
    Lenient,
    /// A malformed line fails the whole load; nothing is committed.
    Strict,
}

#[derive(Debug, Default, PartialEq)]
pub struct IngestStats {
    /// Samples handed to the storage engine.
    pub appended: u64,
    /// Samples rejected by the storage engine and skipped.
    pub dropped: u64,
    /// Distinct series resolved over the run.
    pub series: u64,
}

/// Drives one ingestion run: parse, cache lookup, append, final commit.
///
/// Per-record append failures are printed to stderr and do not stop the
/// loop; a commit failure does fail the run.
pub fn ingest<A: Appender>(app: &mut A, input: &str, mode: ParseMode) -> Result<IngestStats> {
    // Captured once: every sample without an explicit timestamp gets this
    // same value, no matter how long the run takes.
    let default_time = model::now();

    let mut cache = SeriesRefCache::new();
    let mut stats = IngestStats::default();

    for entry in TextParser::new(input) {
        let sample = match entry {
            Ok(Entry::Series(s)) => s,
            Ok(_) => continue,
            Err(err) => match mode {
                ParseMode::Lenient => break,
                ParseMode::Strict => return Err(("datafile parse failure", err).into()),
            },
        };

        let t = sample.timestamp().unwrap_or(default_time);

        match cache.lookup(sample.identity()) {
            Some(r) => match app.append_ref(r, t, sample.value()) {
                Ok(()) => stats.appended += 1,
                Err(err) => {
                    eprintln!("failed to append {}: {}", sample.identity(), err);
                    stats.dropped += 1;
                }
            },
            None => {
                let labels = match sample.metric() {
                    Ok(labels) => labels,
                    Err(err) => {
                        eprintln!("failed to resolve {}: {}", sample.identity(), err);
                        stats.dropped += 1;
                        continue;
                    }
                };

                match app.append(&labels, t, sample.value()) {
                    Ok(r) => {
                        cache.insert(sample.identity(), r);
                        stats.appended += 1;
                    }
                    Err(err) => {
                        eprintln!("failed to append {}: {}", sample.identity(), err);
                        stats.dropped += 1;
                    }
                }
            }
        }
    }

    stats.series = cache.len() as u64;

    app.commit()?;
    Ok(stats)
}
