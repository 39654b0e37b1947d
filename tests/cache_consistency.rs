//! Projection results must not depend on how the alignment mapper was
//! obtained: retained mapper, fresh mapper, shared or isolated cache,
//! sequential or concurrent construction.

use std::str::FromStr;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use txmap::data::json::Provider as JsonProvider;
use txmap::mapper::cache::{AlignmentCache, Key};
use txmap::mapper::variant::{Config, Mapper};
use txmap::parser::HgvsVariant;

const VAR_G: &str = "NC_000011.9:g.118898437G>T";
const VAR_C: &str = "NM_001164277.1:c.526+1C>A";

fn provider() -> Arc<JsonProvider> {
    JsonProvider::with_path("tests/data/transcripts.json").expect("fixture must parse")
}

fn project(mapper: &Mapper) -> String {
    let var_g = HgvsVariant::from_str(VAR_G).expect("input must parse");
    let var_c = mapper
        .g_to_c(&var_g, "NM_001164277.1", "splign")
        .expect("variant must project");
    format!("{var_c}")
}

/// Four projections through one retained mapper and four through freshly
/// constructed mappers must agree, character for character.
fn assert_eight_mappings_agree(config: &Config) {
    let provider = provider();
    let retained = Mapper::new(config, provider.clone());

    let mut results = Vec::new();
    for _ in 0..4 {
        results.push(project(&retained));
    }
    for _ in 0..4 {
        let fresh = Mapper::new(config, provider.clone());
        results.push(project(&fresh));
    }

    assert_eq!(results, vec![VAR_C.to_string(); 8]);
}

#[test]
fn retained_and_fresh_mappers_agree_shared_cache() {
    assert_eight_mappings_agree(&Config {
        shared_cache: true,
        ..Default::default()
    });
}

#[test]
fn retained_and_fresh_mappers_agree_isolated_caches() {
    assert_eight_mappings_agree(&Config {
        shared_cache: false,
        ..Default::default()
    });
}

#[test]
fn cache_hit_and_rebuild_are_interchangeable() {
    let provider = provider();
    let cache = Arc::new(AlignmentCache::default());
    let config = Config {
        shared_cache: false,
        ..Default::default()
    };
    let mapper = Mapper::with_cache(&config, provider, cache.clone());
    let key = Key::new("NM_001164277.1", "NC_000011.9", "splign");

    assert!(cache.get(&key).is_none());
    let first = project(&mapper);
    let built = cache.get(&key).expect("projection populates the cache");

    // The second projection hits the cached mapper.
    let second = project(&mapper);
    assert!(Arc::ptr_eq(
        &built,
        &cache.get(&key).expect("entry is retained")
    ));
    assert_eq!(first, VAR_C);
    assert_eq!(second, VAR_C);

    // Invalidation forces a rebuild; the result does not change.
    cache.invalidate(&key);
    assert!(cache.get(&key).is_none());
    assert_eq!(project(&mapper), VAR_C);
}

#[test]
fn concurrent_construction_is_deterministic() {
    let provider = provider();
    let cache = Arc::new(AlignmentCache::default());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            let cache = cache.clone();
            std::thread::spawn(move || {
                let config = Config {
                    shared_cache: false,
                    ..Default::default()
                };
                let mapper = Mapper::with_cache(&config, provider, cache);
                project(&mapper)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread panicked"), VAR_C);
    }
    assert_eq!(cache.len(), 1);
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
