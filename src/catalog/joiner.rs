use std::collections::HashMap;

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::debug;

use crate::catalog::locator::ImageLocator;
use crate::catalog::model::{unknown_pack_title, EmoticonRecord, Pack, PackId};
use crate::ingest::delimited::RawRow;

/// Packs in dataset order, plus an id index for joining.
pub struct PackTable {
    pub packs: Vec<Pack>,
    by_id: HashMap<i64, usize>,
}

impl PackTable {
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let packs: Vec<Pack> = rows
            .iter()
            .map(|row| Pack {
                id: PackId::from_field(row.get("id").map(String::as_str)),
                title: field(row, "title").to_string(),
            })
            .collect();

        let mut by_id = HashMap::new();
        for (index, pack) in packs.iter().enumerate() {
            if let Some(id) = pack.id.value() {
                // Later rows win.
                by_id.insert(id, index);
            }
        }

        Self { packs, by_id }
    }

    pub fn get(&self, id: PackId) -> Option<&Pack> {
        id.value()
            .and_then(|id| self.by_id.get(&id))
            .map(|&index| &self.packs[index])
    }
}

fn field<'r>(row: &'r RawRow, name: &str) -> &'r str {
    row.get(name).map(String::as_str).unwrap_or_default()
}

/// Splits a comma-joined keyword field, dropping empty pieces.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins one emoticon row to its pack. Never fails; missing fields become empty.
pub fn join_row(packs: &PackTable, row: &RawRow, locator: &ImageLocator<'_>) -> EmoticonRecord {
    let pack_id = PackId::from_field(row.get("emoticon_pack_id").map(String::as_str));
    let pack_title = match packs.get(pack_id) {
        Some(pack) => pack.title.clone(),
        None => {
            debug!("Unresolved pack id {}", pack_id);
            unknown_pack_title(pack_id)
        }
    };

    let title = field(row, "title").to_string();
    let location = locator.resolve(Some(pack_title.as_str()), Some(title.as_str()));

    EmoticonRecord {
        pack_id,
        pack_title,
        title,
        description: field(row, "description").to_string(),
        keywords: split_keywords(field(row, "keyword")),
        img_src: location.url,
        img_verified: location.verification.is_verified(),
    }
}

/// Joins every row in parallel on the current rayon pool. Output order follows `rows`.
pub fn join(
    packs: &PackTable,
    rows: &[RawRow],
    locator: &ImageLocator<'_>,
    progress: &ProgressBar,
) -> Vec<EmoticonRecord> {
    rows.par_iter()
        .map(|row| {
            let record = join_row(packs, row, locator);
            progress.inc(1);
            record
        })
        .collect()
}
