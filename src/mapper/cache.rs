//! Caching of alignment mappers.
//!
//! Building an [`alignment::Mapper`] hits the data provider; repeated
//! projections for the same transcript should not.  The cache keys
//! mappers by `(tx_ac, alt_ac, alt_aln_method)` and hands out shared
//! `Arc`s.  Because mappers are pure values built from provider records,
//! a cached mapper and a freshly built one are interchangeable; caching
//! can never change a mapping result, only skip provider round trips.
//!
//! Concurrent lookups of the same key build at most one mapper: the
//! underlying cache parks waiters on a placeholder until the first
//! builder finishes.  Build errors are not cached, so a transient
//! provider failure is retried on the next lookup.

use std::sync::Arc;

use lazy_static::lazy_static;
use quick_cache::sync::Cache;

use crate::data::interface::Provider;
use crate::mapper::alignment;
use crate::mapper::error::Error;

/// Default capacity of a cache, in alignments.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Cache key identifying one transcript-to-reference alignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub tx_ac: String,
    pub alt_ac: String,
    pub alt_aln_method: String,
}

impl Key {
    pub fn new(tx_ac: &str, alt_ac: &str, alt_aln_method: &str) -> Self {
        Self {
            tx_ac: tx_ac.to_string(),
            alt_ac: alt_ac.to_string(),
            alt_aln_method: alt_aln_method.to_string(),
        }
    }
}

/// Cache of alignment mappers, safe for concurrent use.
pub struct AlignmentCache {
    cache: Cache<Key, Arc<alignment::Mapper>>,
}

impl AlignmentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Return the cached mapper for `key`, building it through `provider`
    /// on a miss.
    ///
    /// At most one build per key runs at a time; concurrent callers for
    /// the same key wait and receive the same `Arc`.
    pub fn get_or_build(
        &self,
        provider: &dyn Provider,
        key: &Key,
    ) -> Result<Arc<alignment::Mapper>, Error> {
        self.cache.get_or_insert_with(key, || {
            alignment::Mapper::new(provider, &key.tx_ac, &key.alt_ac, &key.alt_aln_method)
                .map(Arc::new)
        })
    }

    /// Return the cached mapper for `key` without building.
    pub fn get(&self, key: &Key) -> Option<Arc<alignment::Mapper>> {
        self.cache.get(key)
    }

    /// Drop the entry for `key`, e.g., after the underlying data changed.
    pub fn invalidate(&self, key: &Key) {
        self.cache.remove(key);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for AlignmentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

lazy_static! {
    static ref GLOBAL: Arc<AlignmentCache> = Arc::new(AlignmentCache::default());
}

/// The process-wide cache shared by mappers configured with
/// `shared_cache`.
pub fn global() -> Arc<AlignmentCache> {
    GLOBAL.clone()
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use indexmap::IndexMap;

    use super::{AlignmentCache, Key};
    use crate::data::error::Error as DataError;
    use crate::data::interface::{
        Provider, TxExonsRecord, TxIdentityInfo, TxInfoRecord, TxMappingOptionsRecord,
    };

    /// Provider that counts exon queries and can be switched to fail.
    struct CountingProvider {
        exon_queries: AtomicUsize,
        failing: std::sync::atomic::AtomicBool,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                exon_queries: AtomicUsize::new(0),
                failing: std::sync::atomic::AtomicBool::new(false),
            }
        }
    }

    impl Provider for CountingProvider {
        fn data_version(&self) -> &str {
            "counting-1"
        }

        fn get_tx_exons(
            &self,
            tx_ac: &str,
            alt_ac: &str,
            alt_aln_method: &str,
        ) -> Result<Vec<TxExonsRecord>, DataError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DataError::DataUnavailable("flaky".to_string()));
            }
            self.exon_queries.fetch_add(1, Ordering::SeqCst);
            Ok(vec![TxExonsRecord {
                tx_ac: tx_ac.to_string(),
                alt_ac: alt_ac.to_string(),
                alt_aln_method: alt_aln_method.to_string(),
                alt_strand: 1,
                ord: 0,
                tx_start_i: 0,
                tx_end_i: 100,
                alt_start_i: 1000,
                alt_end_i: 1100,
                cigar: "100=".to_string(),
            }])
        }

        fn get_tx_info(
            &self,
            tx_ac: &str,
            alt_ac: &str,
            alt_aln_method: &str,
        ) -> Result<TxInfoRecord, DataError> {
            Ok(TxInfoRecord {
                hgnc: "EX1".to_string(),
                cds_start_i: Some(10),
                cds_end_i: Some(90),
                tx_ac: tx_ac.to_string(),
                alt_ac: alt_ac.to_string(),
                alt_aln_method: alt_aln_method.to_string(),
            })
        }

        fn get_tx_identity_info(&self, tx_ac: &str) -> Result<TxIdentityInfo, DataError> {
            Err(DataError::NoTranscriptFound(tx_ac.to_string()))
        }

        fn get_seq_part(
            &self,
            ac: &str,
            _begin: Option<usize>,
            _end: Option<usize>,
        ) -> Result<String, DataError> {
            Err(DataError::NoSequenceRecord(ac.to_string()))
        }

        fn get_pro_ac_for_tx_ac(&self, _tx_ac: &str) -> Result<Option<String>, DataError> {
            Ok(None)
        }

        fn get_tx_mapping_options(
            &self,
            _tx_ac: &str,
        ) -> Result<Vec<TxMappingOptionsRecord>, DataError> {
            Ok(Vec::new())
        }

        fn get_assembly_map(
            &self,
            assembly: &str,
        ) -> Result<IndexMap<String, String>, DataError> {
            Err(DataError::NoAssembly(assembly.to_string()))
        }
    }

    #[test]
    fn builds_once_per_key() -> Result<(), anyhow::Error> {
        let provider = CountingProvider::new();
        let cache = AlignmentCache::new(16);
        let key = Key::new("NM_000001.1", "NC_000001.10", "splign");

        let first = cache.get_or_build(&provider, &key)?;
        let second = cache.get_or_build(&provider, &key)?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.exon_queries.load(Ordering::SeqCst), 1);

        // A different key builds again.
        let other = Key::new("NM_000001.1", "NC_000001.10", "blat");
        cache.get_or_build(&provider, &other)?;
        assert_eq!(provider.exon_queries.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);

        Ok(())
    }

    #[test]
    fn invalidate_rebuilds() -> Result<(), anyhow::Error> {
        let provider = CountingProvider::new();
        let cache = AlignmentCache::new(16);
        let key = Key::new("NM_000001.1", "NC_000001.10", "splign");

        cache.get_or_build(&provider, &key)?;
        cache.invalidate(&key);
        assert!(cache.get(&key).is_none());
        cache.get_or_build(&provider, &key)?;
        assert_eq!(provider.exon_queries.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[test]
    fn errors_are_not_cached() -> Result<(), anyhow::Error> {
        let provider = CountingProvider::new();
        let cache = AlignmentCache::new(16);
        let key = Key::new("NM_000001.1", "NC_000001.10", "splign");

        provider.failing.store(true, Ordering::SeqCst);
        assert!(cache.get_or_build(&provider, &key).is_err());
        assert!(cache.get(&key).is_none());

        // The provider recovers; the next lookup succeeds.
        provider.failing.store(false, Ordering::SeqCst);
        assert!(cache.get_or_build(&provider, &key).is_ok());

        Ok(())
    }

    #[test]
    fn concurrent_lookups_share_one_build() -> Result<(), anyhow::Error> {
        let provider = Arc::new(CountingProvider::new());
        let cache = Arc::new(AlignmentCache::new(16));
        let key = Key::new("NM_000001.1", "NC_000001.10", "splign");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                let cache = cache.clone();
                let key = key.clone();
                std::thread::spawn(move || cache.get_or_build(provider.as_ref(), &key))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().expect("thread panicked").is_ok());
        }

        assert_eq!(provider.exon_queries.load(Ordering::SeqCst), 1);
        Ok(())
    }
}

// <LICENSE>
// Copyright 2024 txmap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// </LICENSE>
