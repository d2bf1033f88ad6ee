use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Appender, Options, SeriesRef};
use crate::error::Result;
use crate::model::{metric_name, Labels, SampleValue, Timestamp};

const META_FILE: &str = "meta.json";
const INDEX_FILE: &str = "index.json";
const SEGMENT_PREFIX: &str = "segment-";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    version: u32,
    retention: i64,
    block_ranges: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Index {
    next_ref: SeriesRef,
    series: Vec<SeriesEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeriesEntry {
    reference: SeriesRef,
    labels: BTreeMap<String, String>,
}

// Serialized as a [ref, timestamp, value] array.
#[derive(Debug, Serialize, Deserialize)]
struct Row(SeriesRef, Timestamp, SampleValue);

/// A minimal block store behind the `Appender` seam.
///
/// Layout under the storage directory: `meta.json` with the policy the
/// instance was created with, `index.json` mapping label sets to series
/// references, and one `segment-NNNNNNNN.json` file per committed
/// transaction. Nothing is written between commits.
pub struct Db {
    dir: PathBuf,
    opts: Options,
    index: Vec<SeriesEntry>,
    series: HashMap<String, SeriesRef>,
    next_ref: SeriesRef,
    next_segment: u64,
}

impl Db {
    /// Opens the storage at `dir`, creating a fresh instance with `opts` if
    /// none exists there yet. For an existing instance the stored policy
    /// wins and `opts` is ignored.
    pub fn open<P: AsRef<Path>>(dir: P, opts: Options) -> Result<Db> {
        let dir = dir.as_ref().to_path_buf();
        let meta_path = dir.join(META_FILE);
        if !meta_path.exists() {
            return Db::create(dir, opts);
        }

        let meta: Meta = read_json(&meta_path)?;
        if meta.version != FORMAT_VERSION {
            return Err(format!("unsupported storage format version {}", meta.version).into());
        }

        let index_path = dir.join(INDEX_FILE);
        let index = if index_path.exists() {
            read_json::<Index>(&index_path)?
        } else {
            Index {
                next_ref: 1,
                series: vec![],
            }
        };

        let series = index
            .series
            .iter()
            .map(|e| (canonical_btree(&e.labels), e.reference))
            .collect();

        Ok(Db {
            next_segment: next_segment_number(&dir)?,
            opts: Options {
                retention: meta.retention,
                block_ranges: meta.block_ranges,
            },
            series,
            next_ref: index.next_ref,
            index: index.series,
            dir,
        })
    }

    fn create(dir: PathBuf, opts: Options) -> Result<Db> {
        fs::create_dir_all(&dir)
            .map_err(|e| (format!("failed to create storage at {}", dir.display()), e))?;
        write_json(
            &dir.join(META_FILE),
            &Meta {
                version: FORMAT_VERSION,
                retention: opts.retention,
                block_ranges: opts.block_ranges.clone(),
            },
        )?;

        Ok(Db {
            dir,
            opts,
            index: vec![],
            series: HashMap::new(),
            next_ref: 1,
            next_segment: 0,
        })
    }

    /// Starts a new write transaction. The appender borrows the storage
    /// exclusively, so there is exactly one transaction at a time.
    pub fn appender(&mut self) -> DbAppender {
        DbAppender {
            db: self,
            new_series: vec![],
            uncommitted: HashMap::new(),
            rows: vec![],
            committed: false,
        }
    }

    pub fn close(self) -> Result<()> {
        // All durable state was written at commit time.
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

pub struct DbAppender<'a> {
    db: &'a mut Db,
    new_series: Vec<SeriesEntry>,
    uncommitted: HashMap<String, SeriesRef>,
    rows: Vec<Row>,
    committed: bool,
}

impl<'a> Appender for DbAppender<'a> {
    fn append(&mut self, labels: &Labels, t: Timestamp, v: SampleValue) -> Result<SeriesRef> {
        if metric_name(labels).is_none() {
            return Err("series has no __name__ label".into());
        }

        let key = canonical(labels);
        let reference = match self
            .db
            .series
            .get(&key)
            .or_else(|| self.uncommitted.get(&key))
        {
            Some(&r) => r,
            None => {
                let r = self.db.next_ref;
                self.db.next_ref += 1;
                self.uncommitted.insert(key, r);
                self.new_series.push(SeriesEntry {
                    reference: r,
                    labels: labels.iter().map(|(n, v)| (n.clone(), v.clone())).collect(),
                });
                r
            }
        };

        self.rows.push(Row(reference, t, v));
        Ok(reference)
    }

    fn append_ref(&mut self, r: SeriesRef, t: Timestamp, v: SampleValue) -> Result<()> {
        if r == 0 || r >= self.db.next_ref {
            return Err(format!("unknown series reference {}", r).into());
        }
        self.rows.push(Row(r, t, v));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Err("transaction already committed".into());
        }

        for entry in self.new_series.drain(..) {
            self.db.series.insert(canonical_btree(&entry.labels), entry.reference);
            self.db.index.push(entry);
        }
        write_json(
            &self.db.dir.join(INDEX_FILE),
            &Index {
                next_ref: self.db.next_ref,
                series: self.db.index.clone(),
            },
        )?;

        if !self.rows.is_empty() {
            let name = format!("{}{:08}.json", SEGMENT_PREFIX, self.db.next_segment);
            write_json(&self.db.dir.join(name), &self.rows)?;
            self.db.next_segment += 1;
            self.rows.clear();
        }

        self.committed = true;
        Ok(())
    }
}

// Sorted label pairs with control-character separators, so distinct label
// sets stay distinct.
fn canonical(labels: &Labels) -> String {
    let mut pairs: Vec<_> = labels.iter().collect();
    pairs.sort();

    let mut out = String::new();
    for (name, value) in pairs {
        out.push_str(name);
        out.push('\u{1}');
        out.push_str(value);
        out.push('\u{2}');
    }
    out
}

fn canonical_btree(labels: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (name, value) in labels {
        out.push_str(name);
        out.push('\u{1}');
        out.push_str(value);
        out.push('\u{2}');
    }
    out
}

fn next_segment_number(dir: &Path) -> Result<u64> {
    let entries = fs::read_dir(dir)
        .map_err(|e| (format!("failed to list storage at {}", dir.display()), e))?;

    let mut next = 0;
    for entry in entries {
        let entry = entry.map_err(|e| ("failed to list storage", e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(seq) = name
            .strip_prefix(SEGMENT_PREFIX)
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|seq| seq.parse::<u64>().ok())
        {
            next = next.max(seq + 1);
        }
    }
    Ok(next)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| (format!("failed to read {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| (format!("failed to decode {}", path.display()), e).into())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string(value)
        .map_err(|e| (format!("failed to encode {}", path.display()), e))?;

    // Temp file plus rename keeps a crashed commit from leaving a torn file.
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content).map_err(|e| (format!("failed to write {}", tmp.display()), e))?;
    fs::rename(&tmp, path)
        .map_err(|e| (format!("failed to rename {}", tmp.display()), e))?;
    Ok(())
}
