//! Drives a bulk-load from an external ordered `(block_number, address,
//! state_blob)` cursor into a [`Tree`], assigning each address a stable
//! dense index the first time it is seen.

use std::collections::HashMap;

use ark_bls12_381::Fr;
use sha2::{Digest, Sha256};
use tracing::info;

use vector_commit::transcript::hash_to_field;
use vector_commit::CommitKey;

use crate::error::Result;
use crate::tree::Tree;

/// A read-only ordered cursor over the external state store. Implementors
/// yield `(block_number, address, state_blob)` in first-seen order; an
/// in-memory `Vec`-backed implementation is provided below for tests.
pub trait StateSource {
    fn next(&mut self) -> Option<(u64, [u8; 20], Vec<u8>)>;
}

/// A `Vec`-backed [`StateSource`] for tests and small offline loads.
pub struct VecStateSource {
    records: std::vec::IntoIter<(u64, [u8; 20], Vec<u8>)>,
}

impl VecStateSource {
    pub fn new(records: Vec<(u64, [u8; 20], Vec<u8>)>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl StateSource for VecStateSource {
    fn next(&mut self) -> Option<(u64, [u8; 20], Vec<u8>)> {
        self.records.next()
    }
}

/// Assigns dense `u32` indices to addresses as they are first seen, and
/// drives `Tree::update` for each ingested record.
#[derive(Default)]
pub struct Ingestor {
    indices: HashMap<[u8; 20], u32>,
    next_index: u32,
    log_every: usize,
}

impl Ingestor {
    pub fn new(log_every: usize) -> Self {
        Self {
            indices: HashMap::new(),
            next_index: 0,
            log_every,
        }
    }

    pub fn index_of(&self, address: &[u8; 20]) -> Option<u32> {
        self.indices.get(address).copied()
    }

    pub fn assigned_count(&self) -> u32 {
        self.next_index
    }

    /// Looks up or allocates a dense index for `address`, hashes
    /// `state_blob` to a field element, and writes it to `tree`. Returns the
    /// index used.
    pub fn ingest_one(
        &mut self,
        tree: &mut Tree,
        ck: &CommitKey,
        address: [u8; 20],
        state_blob: &[u8],
    ) -> Result<u32> {
        let index = match self.indices.get(&address) {
            Some(&index) => index,
            None => {
                let assigned = self.next_index;
                self.indices.insert(address, assigned);
                self.next_index += 1;
                assigned
            }
        };

        let value = hash_state(state_blob);
        tree.update(index as u64, value, ck)?;
        Ok(index)
    }

    /// Drains `source` entirely, logging progress every `log_every` records
    /// (0 disables logging).
    pub fn ingest_all(
        &mut self,
        tree: &mut Tree,
        ck: &CommitKey,
        source: &mut impl StateSource,
    ) -> Result<u64> {
        let mut count = 0u64;
        while let Some((_block, address, state_blob)) = source.next() {
            self.ingest_one(tree, ck, address, &state_blob)?;
            count += 1;
            if self.log_every > 0 && count % self.log_every as u64 == 0 {
                info!(records = count, "ingestion progress");
            }
        }
        info!(records = count, "ingestion complete");
        Ok(count)
    }
}

fn hash_state(state_blob: &[u8]) -> Fr {
    let digest: [u8; 32] = Sha256::digest(state_blob).into();
    hash_to_field(&[&digest])
}
