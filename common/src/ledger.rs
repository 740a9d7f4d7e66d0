//! Whole-ledger state as replicated between peers.
//!
//! The ledger is the ordered map of every product record, keyed by product
//! id, holding the codec's bytes together with a per-key revision. Peers
//! exchange per-key digests and ship only the records that differ. On merge
//! the higher revision wins and equal revisions fall back to the larger record
//! digest, so two peers that swap deltas end up holding the same state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec;
use crate::error::{Result, StoreError};
use crate::invocation::Invocation;
use crate::product::Product;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub records: BTreeMap<String, LedgerEntry>,
}

/// One stored record and the number of writes it has seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub revision: u64,
    pub record: Vec<u8>,
}

impl LedgerEntry {
    pub fn new(revision: u64, record: Vec<u8>) -> Self {
        Self { revision, record }
    }

    /// Whether this entry should replace `other` held under the same key.
    pub fn supersedes(&self, other: &LedgerEntry) -> bool {
        (self.revision, digest(&self.record)) > (other.revision, digest(&other.record))
    }

    fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.revision.to_be_bytes());
        hasher.update(&self.record);
        hex::encode(hasher.finalize())
    }
}

/// Per-key sha256 digest of the revision and record a peer already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub digests: BTreeMap<String, String>,
}

/// A change submitted to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerUpdate {
    /// Run one contract transaction against the current records.
    Invoke(Invocation),
    /// Records shipped from another peer.
    Sync(LedgerState),
}

impl KeyValueStore for LedgerState {
    fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
        Ok(self.records.get(key).map(|entry| entry.record.clone()))
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> std::result::Result<(), StoreError> {
        let revision = self.records.get(key).map_or(0, |entry| entry.revision) + 1;
        self.records
            .insert(key.to_string(), LedgerEntry::new(revision, value));
        Ok(())
    }

    fn keys(&self) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self.records.keys().cloned().collect())
    }
}

impl LedgerState {
    /// Check that every record decodes as the product named by its key.
    pub fn validate(&self) -> Result<()> {
        for (key, entry) in &self.records {
            codec::decode(key, &entry.record)?;
        }
        Ok(())
    }

    /// Decode all records in key order.
    pub fn products(&self) -> Result<Vec<Product>> {
        self.records
            .iter()
            .map(|(key, entry)| codec::decode(key, &entry.record))
            .collect()
    }

    /// Take the records from `other` that supersede ours.
    pub fn merge(&mut self, other: LedgerState) {
        for (key, entry) in other.records {
            match self.records.get(&key) {
                Some(existing) if !entry.supersedes(existing) => {}
                _ => {
                    self.records.insert(key, entry);
                }
            }
        }
    }

    /// Apply an update.
    ///
    /// A failed transaction leaves the ledger untouched, as does a sync
    /// carrying any undecodable record.
    pub fn apply_update(&mut self, update: LedgerUpdate) -> Result<()> {
        match update {
            LedgerUpdate::Invoke(invocation) => {
                invocation.apply(self)?;
            }
            LedgerUpdate::Sync(incoming) => {
                incoming.validate()?;
                self.merge(incoming);
            }
        }
        Ok(())
    }

    pub fn summarize(&self) -> LedgerSummary {
        LedgerSummary {
            digests: self
                .records
                .iter()
                .map(|(key, entry)| (key.clone(), entry.digest()))
                .collect(),
        }
    }

    /// Records the summary's owner is missing or holds a different version of.
    pub fn delta(&self, summary: &LedgerSummary) -> LedgerState {
        let records = self
            .records
            .iter()
            .filter(|(key, entry)| {
                summary
                    .digests
                    .get(*key)
                    .is_none_or(|d| *d != entry.digest())
            })
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        LedgerState { records }
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
