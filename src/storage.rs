use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppErr, Result},
    record::TempRecord,
};

const DAY_MARK_LEN: usize = 10;

#[derive(Serialize, Deserialize)]
struct RecordFile {
    records: Vec<TempRecord>,
}

/// File based record storage: one `<base>/<yyyy>/<yyyy-MM-dd>.json` file per day.
#[derive(Debug, Clone)]
pub struct RecordStorage {
    base: PathBuf,
}

impl RecordStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The file holding the records of `rec_time`'s day.
    pub fn record_path(&self, rec_time: NaiveDateTime) -> PathBuf {
        self.base
            .join(rec_time.format("%Y").to_string())
            .join(format!("{}.json", rec_time.format("%Y-%m-%d")))
    }

    /// Loads the stored records, optionally bounded by an inclusive time range.
    ///
    /// # Arguments
    /// * `from` - The earliest timestamp to keep.
    /// * `to` - The latest timestamp to keep.
    ///
    /// # Returns
    /// The records without duplicated timestamps, empty if the base directory doesn't exist.
    pub fn load_records(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Vec<TempRecord>> {
        if !self.base.is_dir() {
            debug!("no record storage at {}", self.base.display());
            return Ok(Vec::new());
        }

        let paths = self.find_record_files(from, to)?;
        let records = paths
            .iter()
            .filter_map(|path| match self.read_records(path) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!("skipping a record file, {e}");
                    None
                }
            })
            .flatten();

        Ok(cleanse(records, from, to))
    }

    /// Stores `records` in their day files, merged with what the files already hold.
    ///
    /// A timestamp that is already stored keeps its stored record.
    ///
    /// # Returns
    /// An error if a day file to merge into can't be read or parsed. Nothing is written then,
    /// so the unreadable file is left as it was.
    pub fn save_records(&self, records: &[TempRecord]) -> Result<()> {
        let mut by_path: BTreeMap<PathBuf, Vec<TempRecord>> = BTreeMap::new();
        for record in records {
            by_path
                .entry(self.record_path(record.rec_time))
                .or_default()
                .push(record.clone());
        }

        for (path, day) in by_path.iter_mut() {
            if path.is_file() {
                day.extend(self.read_records(path)?);
            }
        }

        for (path, day) in by_path {
            self.write_records(&path, cleanse(day, None, None))?;
        }

        Ok(())
    }

    fn find_record_files(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Vec<PathBuf>> {
        let from = from.map(|t| t.format("%Y-%m-%d").to_string());
        let to = to.map(|t| t.format("%Y-%m-%d").to_string());

        let mut paths = Vec::new();
        collect_json_files(&self.base, &mut paths)?;

        paths.retain(|path| {
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                return false;
            };
            let mark: String = name.chars().take(DAY_MARK_LEN).collect();

            from.as_ref().is_none_or(|from| mark.as_str() >= from.as_str())
                && to.as_ref().is_none_or(|to| mark.as_str() <= to.as_str())
        });
        paths.sort();

        Ok(paths)
    }

    fn read_records(&self, path: &Path) -> Result<Vec<TempRecord>> {
        let bytes = fs::read(path).map_err(|e| AppErr::io(path, e))?;

        let file: RecordFile = serde_json::from_slice(&bytes).map_err(|source| AppErr::Json {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(file.records)
    }

    fn write_records(&self, path: &Path, records: Vec<TempRecord>) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| AppErr::io(dir, e))?;
        }

        let bytes = serde_json::to_vec(&RecordFile { records }).map_err(|source| AppErr::Json {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, bytes).map_err(|e| AppErr::io(path, e))?;
        debug!("wrote {}", path.display());

        Ok(())
    }
}

fn collect_json_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| AppErr::io(dir, e))?;

    for entry in entries {
        let path = entry.map_err(|e| AppErr::io(dir, e))?.path();

        if path.is_dir() {
            collect_json_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }

    Ok(())
}

/// Keeps the records within `[from, to]` and drops repeated timestamps.
///
/// # Returns
/// One record per timestamp, the last occurrence winning, in order of first appearance.
pub fn cleanse<I>(
    records: I,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
) -> Vec<TempRecord>
where
    I: IntoIterator<Item = TempRecord>,
{
    let mut slots: HashMap<NaiveDateTime, usize> = HashMap::new();
    let mut kept: Vec<TempRecord> = Vec::new();

    let in_range = |record: &TempRecord| {
        from.is_none_or(|from| record.rec_time >= from) && to.is_none_or(|to| record.rec_time <= to)
    };

    for record in records.into_iter().filter(in_range) {
        match slots.get(&record.rec_time) {
            Some(&slot) => kept[slot] = record,
            None => {
                slots.insert(record.rec_time, kept.len());
                kept.push(record);
            }
        }
    }

    kept
}
