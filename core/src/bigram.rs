//! Durable, shard-per-(text, unit-type, feature-kind) bigram index
//! backed by `redb`, supporting point lookups by `(min-index, max-index)`.

use std::collections::HashMap;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::feature::{FeatureIndex, FeatureKind};
use crate::text::TextId;
use crate::unit::{Unit, UnitId, UnitType};

const TABLE: TableDefinition<u64, Vec<u8>> = TableDefinition::new("bigrams");

/// Flush a shard's in-memory write buffer to disk once it holds this
/// many rows.
const FLUSH_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BigramHit {
    pub unit_id: UnitId,
    pub pos1: u32,
    pub pos2: u32,
}

fn pack_key(min_idx: u32, max_idx: u32) -> u64 {
    ((min_idx as u64) << 32) | (max_idx as u64)
}

fn shard_name(text_id: TextId, unit_type: UnitType, kind: FeatureKind) -> String {
    format!("text-{}-{unit_type}-{kind}.redb", text_id.get())
}

fn raw_index(index: FeatureIndex) -> u32 {
    use string_interner::Symbol;
    index.to_usize() as u32
}

/// A bigram index over every `(text, unit-type, feature-kind)` shard,
/// rooted at a configured base directory.
pub struct BigramStore {
    base_dir: Utf8PathBuf,
}

impl BigramStore {
    pub fn new(base_dir: Utf8PathBuf) -> Self {
        Self { base_dir }
    }

    fn shard_path(&self, text_id: TextId, unit_type: UnitType, kind: FeatureKind) -> PathBuf {
        self.base_dir.join(shard_name(text_id, unit_type, kind)).into()
    }

    /// Builds the shard for `(text_id, unit_type, kind)` from every unit
    /// of that (text, unit-type), batching writes every
    /// [`FLUSH_THRESHOLD`] rows and building the index on commit.
    pub fn ingest(&self, text_id: TextId, unit_type: UnitType, kind: FeatureKind, units: &[Unit]) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| CoreError::Internal(e.to_string()))?;
        let path = self.shard_path(text_id, unit_type, kind);
        let db = Database::create(path)?;

        let mut buffer: HashMap<u64, BigramHit> = HashMap::new();
        let mut pending = 0usize;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE)?;
            for unit in units {
                for (key, hit) in canonical_pairs(unit, kind) {
                    buffer.entry(key).or_insert(hit);
                    pending += 1;
                    if pending >= FLUSH_THRESHOLD {
                        flush(&mut table, &mut buffer)?;
                        pending = 0;
                    }
                }
            }
            flush(&mut table, &mut buffer)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Looks up every requested `(index_a, index_b)` pair (unordered)
    /// against the `(text, unit-type, kind)` shard, scoring each hit
    /// from the supplied inverse-frequency table.
    pub fn lookup(
        &self,
        text_id: TextId,
        unit_type: UnitType,
        kind: FeatureKind,
        pairs: &[(FeatureIndex, FeatureIndex)],
        inv_freq: &HashMap<FeatureIndex, f64>,
    ) -> Result<HashMap<(FeatureIndex, FeatureIndex), Vec<(UnitId, f64)>>, CoreError> {
        let path = self.shard_path(text_id, unit_type, kind);
        let mut results = HashMap::new();
        if !path.exists() {
            return Ok(results);
        }
        let db = Database::open(path)?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(TABLE)?;

        for &(a, b) in pairs {
            let (lo, hi) = order(raw_index(a), raw_index(b));
            let key = pack_key(lo, hi);
            let Some(value) = table.get(key)? else {
                continue;
            };
            let hits: Vec<BigramHit> = bincode::deserialize(&value.value()).map_err(CoreError::from)?;
            let freq_a = inv_freq.get(&a).copied().unwrap_or(1.0);
            let freq_b = inv_freq.get(&b).copied().unwrap_or(1.0);
            let scored = hits
                .into_iter()
                .map(|hit| {
                    let dist = (hit.pos1 as i64 - hit.pos2 as i64).unsigned_abs() as f64;
                    let dist = dist.max(1.0);
                    let score = (freq_a + freq_b).ln() - dist.ln();
                    (hit.unit_id, score)
                })
                .collect();
            results.insert((a, b), scored);
        }
        Ok(results)
    }

    /// Removes every shard belonging to `text_id`, across all unit
    /// types and feature kinds; part of the text deletion cascade.
    pub fn delete_text(&self, text_id: TextId) -> Result<(), CoreError> {
        for unit_type in [UnitType::Line, UnitType::Phrase] {
            for kind in [
                FeatureKind::Form,
                FeatureKind::Lemmata,
                FeatureKind::Sound,
                FeatureKind::Semantic,
                FeatureKind::SemanticLemmata,
            ] {
                let path = self.shard_path(text_id, unit_type, kind);
                if path.exists() {
                    std::fs::remove_file(path).map_err(|e| CoreError::Internal(e.to_string()))?;
                }
            }
        }
        Ok(())
    }
}

fn order(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Enumerates the canonical (first-seen) position pair for every
/// unordered 2-combination of feature instances present in `unit`.
fn canonical_pairs(unit: &Unit, kind: FeatureKind) -> Vec<(u64, BigramHit)> {
    let positions = unit.positions_features(kind);
    let mut seen: HashMap<u64, BigramHit> = HashMap::new();
    for i in 0..positions.len() {
        let (pos1, features1) = positions[i];
        for (pos2, features2) in &positions[i + 1..] {
            for &f1 in features1 {
                for &f2 in *features2 {
                    let (lo, hi) = order(raw_index(f1), raw_index(f2));
                    let key = pack_key(lo, hi);
                    seen.entry(key).or_insert(BigramHit {
                        unit_id: unit.id,
                        pos1,
                        pos2: *pos2,
                    });
                }
            }
        }
    }
    seen.into_iter().collect()
}

fn flush(table: &mut redb::Table<u64, Vec<u8>>, buffer: &mut HashMap<u64, BigramHit>) -> Result<(), CoreError> {
    for (key, hit) in buffer.drain() {
        let mut hits: Vec<BigramHit> = match table.get(key)? {
            Some(existing) => bincode::deserialize(&existing.value())?,
            None => Vec::new(),
        };
        hits.push(hit);
        let encoded = bincode::serialize(&hits)?;
        table.insert(key, encoded)?;
    }
    Ok(())
}
