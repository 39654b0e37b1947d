//! Variant mapping against a configured assembly.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::data::interface::Provider;
use crate::mapper::cache::AlignmentCache;
use crate::mapper::error::Error;
use crate::mapper::variant::{Config as VariantMapperConfig, Mapper as VariantMapper};
use crate::parser::HgvsVariant;

/// Configuration for `Mapper`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Config {
    /// Name of the assembly whose accessions t-to-g projections resolve
    /// against, e.g., `"GRCh37"`.
    pub assembly: String,
    /// Alignment method, e.g., `"splign"`.
    pub alt_aln_method: String,
    pub replace_reference: bool,
    pub strict_bounds: bool,
    /// Use the process-wide alignment cache instead of an owned one.
    pub shared_cache: bool,
    /// Capacity of the owned alignment cache; ignored with `shared_cache`.
    pub capacity: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assembly: "GRCh38".to_string(),
            alt_aln_method: "splign".to_string(),
            replace_reference: true,
            strict_bounds: true,
            shared_cache: true,
            capacity: None,
        }
    }
}

/// Simplified projection interface for a single assembly and alignment
/// method.
///
/// `Mapper` wraps `variant::Mapper` and resolves the genomic accession
/// for transcript-to-genome projections from the assembly's accession
/// map, so callers name only the transcript.
pub struct Mapper {
    config: Config,
    provider: Arc<dyn Provider>,
    inner: VariantMapper,
    /// Accessions of the contigs in the assembly.
    asm_accessions: HashSet<String>,
    /// Map from contig name to accession, in assembly order.
    asm_map: IndexMap<String, String>,
}

impl Mapper {
    /// Construct a new assembly mapper from config and provider.
    pub fn new(config: Config, provider: Arc<dyn Provider>) -> Result<Self, Error> {
        let inner_config = VariantMapperConfig {
            replace_reference: config.replace_reference,
            strict_bounds: config.strict_bounds,
            shared_cache: config.shared_cache,
        };
        let inner = match (config.shared_cache, config.capacity) {
            (false, Some(capacity)) => VariantMapper::with_cache(
                &inner_config,
                provider.clone(),
                Arc::new(AlignmentCache::new(capacity)),
            ),
            _ => VariantMapper::new(&inner_config, provider.clone()),
        };

        let asm_map = provider.get_assembly_map(&config.assembly)?;
        let asm_accessions = asm_map.values().cloned().collect::<HashSet<_>>();

        Ok(Self {
            config,
            provider,
            inner,
            asm_accessions,
            asm_map,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The contig name to accession map of the configured assembly.
    pub fn assembly_map(&self) -> &IndexMap<String, String> {
        &self.asm_map
    }

    /// Convert from genome (g.) variant to transcript variant (n.).
    pub fn g_to_n(&self, var_g: &HgvsVariant, tx_ac: &str) -> Result<HgvsVariant, Error> {
        self.inner.g_to_n(var_g, tx_ac, &self.config.alt_aln_method)
    }

    /// Convert from genome (g.) variant to CDS variant (c.).
    pub fn g_to_c(&self, var_g: &HgvsVariant, tx_ac: &str) -> Result<HgvsVariant, Error> {
        self.inner.g_to_c(var_g, tx_ac, &self.config.alt_aln_method)
    }

    /// Convert from genome (g.) variant to transcript variant (c. or n.).
    pub fn g_to_t(&self, var_g: &HgvsVariant, tx_ac: &str) -> Result<HgvsVariant, Error> {
        self.inner.g_to_t(var_g, tx_ac, &self.config.alt_aln_method)
    }

    /// Convert from transcript variant (n.) to genome variant (g.) on the
    /// assembly's contig.
    pub fn n_to_g(&self, var_n: &HgvsVariant) -> Result<HgvsVariant, Error> {
        let alt_ac = self.alt_ac_for_tx_ac(var_n.accession().as_str())?;
        self.inner
            .n_to_g(var_n, &alt_ac, &self.config.alt_aln_method)
    }

    /// Convert from CDS variant (c.) to genome variant (g.) on the
    /// assembly's contig.
    pub fn c_to_g(&self, var_c: &HgvsVariant) -> Result<HgvsVariant, Error> {
        let alt_ac = self.alt_ac_for_tx_ac(var_c.accession().as_str())?;
        self.inner
            .c_to_g(var_c, &alt_ac, &self.config.alt_aln_method)
    }

    /// Convert from transcript (c. or n.) to genome (g.) variant on the
    /// assembly's contig.
    pub fn t_to_g(&self, var_t: &HgvsVariant) -> Result<HgvsVariant, Error> {
        let alt_ac = self.alt_ac_for_tx_ac(var_t.accession().as_str())?;
        self.inner
            .t_to_g(var_t, &alt_ac, &self.config.alt_aln_method)
    }

    /// Convert from CDS variant (c.) to transcript variant (n.).
    pub fn c_to_n(&self, var_c: &HgvsVariant) -> Result<HgvsVariant, Error> {
        self.inner.c_to_n(var_c)
    }

    /// Convert from transcript variant (n.) to CDS variant (c.).
    pub fn n_to_c(&self, var_n: &HgvsVariant) -> Result<HgvsVariant, Error> {
        self.inner.n_to_c(var_n)
    }

    /// Convert from CDS variant (c.) to protein variant (p.).
    pub fn c_to_p(&self, var_c: &HgvsVariant) -> Result<HgvsVariant, Error> {
        self.inner.c_to_p(var_c, None)
    }

    /// Convert from protein variant (p.) to a representative CDS variant
    /// (c.) on `tx_ac`.
    pub fn p_to_c(&self, var_p: &HgvsVariant, tx_ac: &str) -> Result<HgvsVariant, Error> {
        self.inner.p_to_c(var_p, tx_ac)
    }

    /// Check or replace the declared reference bases, per configuration.
    pub fn replace_reference(&self, var: HgvsVariant) -> Result<HgvsVariant, Error> {
        self.inner.replace_reference(var)
    }

    /// Return the contig accession the transcript aligns to within the
    /// configured assembly and alignment method.
    fn alt_ac_for_tx_ac(&self, tx_ac: &str) -> Result<String, Error> {
        let mut alt_acs = Vec::new();
        for record in self.provider.get_tx_mapping_options(tx_ac)? {
            if record.alt_aln_method == self.config.alt_aln_method
                && self.asm_accessions.contains(&record.alt_ac)
            {
                alt_acs.push(record.alt_ac);
            }
        }

        match alt_acs.len() {
            0 => Err(Error::NoAlignments(
                tx_ac.to_string(),
                self.config.assembly.clone(),
                self.config.alt_aln_method.clone(),
            )),
            1 => Ok(alt_acs.swap_remove(0)),
            _ => Err(Error::MultipleAlignments(
                tx_ac.to_string(),
                self.config.assembly.clone(),
                self.config.alt_aln_method.clone(),
                alt_acs.join(", "),
            )),
        }
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
