//! Projecting variants between g., n., c., and p. coordinates.
//!
//! `Mapper` parses nothing and stores nothing variant-specific; it wires
//! the interval-level `alignment::Mapper` (obtained through the alignment
//! cache), the data provider, and the protein prediction code together.
//! Every projection returns a new `HgvsVariant`.

use std::sync::Arc;

use log::debug;

use super::alignment::{self, ALN_METHOD_TRANSCRIPT};
use super::altseq::{infer_cds_change, predict_protein_change, RefTranscriptData};
use super::cache::{self, AlignmentCache, Key};
use super::error::Error;
use crate::data::interface::Provider;
use crate::parser::{
    Accession, CdsInterval, CdsLocEdit, CdsPos, GenomeInterval, GenomeLocEdit, HgvsVariant, Mu,
    NaEdit, TxInterval, TxLocEdit, TxPos,
};
use crate::sequences::{normalize_dna, revcomp};
use crate::validator::Validateable;

/// Configuration for `Mapper`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Config {
    /// Replace the declared reference bases of a variant with the bases
    /// fetched from the provider.  When disabled, disagreement between the
    /// two is an error instead.
    pub replace_reference: bool,
    /// Reject positions outside the aligned region.
    pub strict_bounds: bool,
    /// Use the process-wide alignment cache instead of an owned one.
    pub shared_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            replace_reference: true,
            strict_bounds: true,
            shared_cache: true,
        }
    }
}

/// Projects variants between coordinate systems using `alignment::Mapper`.
///
/// Alignment mappers are obtained through an [`AlignmentCache`]; whether
/// a projection hits the cache or triggers a fresh build is not
/// observable in the result.
pub struct Mapper {
    config: Config,
    provider: Arc<dyn Provider>,
    cache: Arc<AlignmentCache>,
}

impl Mapper {
    pub fn new(config: &Config, provider: Arc<dyn Provider>) -> Mapper {
        let cache = if config.shared_cache {
            cache::global()
        } else {
            Arc::new(AlignmentCache::default())
        };
        Self::with_cache(config, provider, cache)
    }

    /// Construct with an explicitly provided cache.
    pub fn with_cache(
        config: &Config,
        provider: Arc<dyn Provider>,
        cache: Arc<AlignmentCache>,
    ) -> Mapper {
        Mapper {
            config: config.clone(),
            provider,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return a copy of the internal provider.
    pub fn provider(&self) -> Arc<dyn Provider> {
        self.provider.clone()
    }

    /// Return a copy of the internal alignment cache handle.
    pub fn cache(&self) -> Arc<AlignmentCache> {
        self.cache.clone()
    }

    /// Obtain the `alignment::Mapper` for the given alignment, going
    /// through the cache.
    fn alignment_mapper(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<Arc<alignment::Mapper>, Error> {
        self.cache
            .get_or_build(self.provider.as_ref(), &Key::new(tx_ac, alt_ac, alt_aln_method))
    }

    /// Convert from genome (g.) variant to transcript variant (c. or n.),
    /// depending on whether the transcript is coding.
    ///
    /// # Args
    ///
    /// * `var_g` -- `HgvsVariant::GenomeVariant` to project
    /// * `tx_ac` -- accession of transcript to project to
    /// * `alt_aln_method` -- alignment method, e.g., `"splign"`
    pub fn g_to_t(
        &self,
        var_g: &HgvsVariant,
        tx_ac: &str,
        alt_aln_method: &str,
    ) -> Result<HgvsVariant, Error> {
        var_g.validate()?;
        let mapper = self.alignment_mapper(tx_ac, var_g.accession().as_str(), alt_aln_method)?;
        if mapper.is_coding_transcript() {
            self.g_to_c(var_g, tx_ac, alt_aln_method)
        } else {
            self.g_to_n(var_g, tx_ac, alt_aln_method)
        }
    }

    /// Convert from transcript (c. or n.) to genome (g.) variant.
    pub fn t_to_g(
        &self,
        var_t: &HgvsVariant,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<HgvsVariant, Error> {
        match var_t {
            HgvsVariant::TxVariant { .. } => self.n_to_g(var_t, alt_ac, alt_aln_method),
            HgvsVariant::CdsVariant { .. } => self.c_to_g(var_t, alt_ac, alt_aln_method),
            _ => Err(Error::ExpectedTxVariant(format!("{var_t}"))),
        }
    }

    /// Convert from genome (g.) variant to transcript variant (n.).
    ///
    /// # Args
    ///
    /// * `var_g` -- `HgvsVariant::GenomeVariant` to project
    /// * `tx_ac` -- accession of transcript to project to
    /// * `alt_aln_method` -- alignment method, e.g., `"splign"`
    pub fn g_to_n(
        &self,
        var_g: &HgvsVariant,
        tx_ac: &str,
        alt_aln_method: &str,
    ) -> Result<HgvsVariant, Error> {
        var_g.validate()?;
        let var_g = self.replace_reference(var_g.clone())?;
        if let HgvsVariant::GenomeVariant {
            accession,
            gene_symbol,
            loc_edit,
        } = &var_g
        {
            let mapper = self.alignment_mapper(tx_ac, accession.as_str(), alt_aln_method)?;

            let pos_n = mapper.g_to_n(loc_edit.loc.inner(), self.config.strict_bounds)?;
            let certain = loc_edit.loc.is_certain() && pos_n.is_certain();
            let pos_n = pos_n.into_inner();
            let edit_n = convert_edit_check_strand(mapper.strand, &loc_edit.edit);

            // An insertion interval names the two flanking bases; shrink
            // wider intervals to the inserted span and spell it as delins.
            let (pos_n, edit_n) = if let NaEdit::Ins { alternative } = edit_n.inner() {
                if pos_n.start.offset.is_none()
                    && pos_n.end.offset.is_none()
                    && pos_n.end.base - pos_n.start.base > 1
                {
                    (
                        TxInterval {
                            start: TxPos {
                                base: pos_n.start.base + 1,
                                ..pos_n.start
                            },
                            end: TxPos {
                                base: pos_n.end.base - 1,
                                ..pos_n.end
                            },
                        },
                        Mu::from(
                            NaEdit::RefAlt {
                                reference: String::new(),
                                alternative: alternative.clone(),
                            },
                            edit_n.is_certain(),
                        ),
                    )
                } else {
                    (pos_n, edit_n)
                }
            } else {
                (pos_n, edit_n)
            };

            let var_n = HgvsVariant::TxVariant {
                accession: Accession::new(tx_ac),
                gene_symbol: gene_symbol.clone(),
                loc_edit: TxLocEdit {
                    loc: Mu::from(pos_n, certain),
                    edit: edit_n,
                },
            };

            self.replace_reference(var_n)
        } else {
            Err(Error::ExpectedGenomeVariant(format!("{var_g}")))
        }
    }

    /// Convert from transcript variant (n.) to genome variant (g.).
    ///
    /// # Args
    ///
    /// * `var_n` -- `HgvsVariant::TxVariant` to project
    /// * `alt_ac` -- accession of the reference sequence to project onto
    /// * `alt_aln_method` -- alignment method, e.g., `"splign"`
    pub fn n_to_g(
        &self,
        var_n: &HgvsVariant,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<HgvsVariant, Error> {
        var_n.validate()?;
        let var_n = self.replace_reference(var_n.clone())?;
        if let HgvsVariant::TxVariant {
            accession,
            gene_symbol: _,
            loc_edit,
        } = &var_n
        {
            let mapper = self.alignment_mapper(accession.as_str(), alt_ac, alt_aln_method)?;

            let pos_g = mapper.n_to_g(loc_edit.loc.inner(), self.config.strict_bounds)?;
            let certain = loc_edit.loc.is_certain() && pos_g.is_certain();
            let pos_g = pos_g.into_inner();
            let edit_g = convert_edit_check_strand(mapper.strand, &loc_edit.edit);

            let (pos_g, edit_g) = match (edit_g.inner(), pos_g.start, pos_g.end) {
                (NaEdit::Ins { alternative }, Some(start), Some(end)) if end - start > 1 => (
                    GenomeInterval {
                        start: Some(start + 1),
                        end: Some(end - 1),
                    },
                    Mu::from(
                        NaEdit::RefAlt {
                            reference: String::new(),
                            alternative: alternative.clone(),
                        },
                        edit_g.is_certain(),
                    ),
                ),
                _ => (pos_g, edit_g),
            };

            // No gene symbol on g. variants.
            let var_g = HgvsVariant::GenomeVariant {
                accession: Accession::new(alt_ac),
                gene_symbol: None,
                loc_edit: GenomeLocEdit {
                    loc: Mu::from(pos_g, certain),
                    edit: edit_g,
                },
            };

            self.replace_reference(var_g)
        } else {
            Err(Error::ExpectedTxVariant(format!("{var_n}")))
        }
    }

    /// Convert from genome (g.) variant to CDS variant (c.).
    ///
    /// # Args
    ///
    /// * `var_g` -- `HgvsVariant::GenomeVariant` to project
    /// * `tx_ac` -- accession of transcript to project to
    /// * `alt_aln_method` -- alignment method, e.g., `"splign"`
    pub fn g_to_c(
        &self,
        var_g: &HgvsVariant,
        tx_ac: &str,
        alt_aln_method: &str,
    ) -> Result<HgvsVariant, Error> {
        var_g.validate()?;
        let var_g = self.replace_reference(var_g.clone())?;
        if let HgvsVariant::GenomeVariant {
            accession,
            gene_symbol,
            loc_edit,
        } = &var_g
        {
            let mapper = self.alignment_mapper(tx_ac, accession.as_str(), alt_aln_method)?;

            let pos_c = mapper.g_to_c(loc_edit.loc.inner(), self.config.strict_bounds)?;
            let certain = loc_edit.loc.is_certain() && pos_c.is_certain();
            let pos_c = pos_c.into_inner();
            let edit_c = convert_edit_check_strand(mapper.strand, &loc_edit.edit);

            let (pos_c, edit_c) = if let NaEdit::Ins { alternative } = edit_c.inner() {
                if pos_c.start.offset.is_none()
                    && pos_c.end.offset.is_none()
                    && pos_c.start.cds_from == pos_c.end.cds_from
                    && pos_c.end.base - pos_c.start.base > 1
                {
                    (
                        CdsInterval {
                            start: CdsPos {
                                base: pos_c.start.base + 1,
                                ..pos_c.start
                            },
                            end: CdsPos {
                                base: pos_c.end.base - 1,
                                ..pos_c.end
                            },
                        },
                        Mu::from(
                            NaEdit::RefAlt {
                                reference: String::new(),
                                alternative: alternative.clone(),
                            },
                            edit_c.is_certain(),
                        ),
                    )
                } else {
                    (pos_c, edit_c)
                }
            } else {
                (pos_c, edit_c)
            };

            let var_c = HgvsVariant::CdsVariant {
                accession: Accession::new(tx_ac),
                gene_symbol: gene_symbol.clone(),
                loc_edit: CdsLocEdit {
                    loc: Mu::from(pos_c, certain),
                    edit: edit_c,
                },
            };

            self.replace_reference(var_c)
        } else {
            Err(Error::ExpectedGenomeVariant(format!("{var_g}")))
        }
    }

    /// Convert from CDS variant (c.) to genome variant (g.).
    ///
    /// # Args
    ///
    /// * `var_c` -- `HgvsVariant::CdsVariant` to project
    /// * `alt_ac` -- accession of the reference sequence to project onto
    /// * `alt_aln_method` -- alignment method, e.g., `"splign"`
    pub fn c_to_g(
        &self,
        var_c: &HgvsVariant,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<HgvsVariant, Error> {
        var_c.validate()?;
        let var_c = self.replace_reference(var_c.clone())?;
        if let HgvsVariant::CdsVariant {
            accession,
            gene_symbol: _,
            loc_edit,
        } = &var_c
        {
            let mapper = self.alignment_mapper(accession.as_str(), alt_ac, alt_aln_method)?;

            let pos_g = mapper.c_to_g(loc_edit.loc.inner(), self.config.strict_bounds)?;
            let certain = loc_edit.loc.is_certain() && pos_g.is_certain();
            let pos_g = pos_g.into_inner();
            let edit_g = convert_edit_check_strand(mapper.strand, &loc_edit.edit);

            let (pos_g, edit_g) = match (edit_g.inner(), pos_g.start, pos_g.end) {
                (NaEdit::Ins { alternative }, Some(start), Some(end)) if end - start > 1 => (
                    GenomeInterval {
                        start: Some(start + 1),
                        end: Some(end - 1),
                    },
                    Mu::from(
                        NaEdit::RefAlt {
                            reference: String::new(),
                            alternative: alternative.clone(),
                        },
                        edit_g.is_certain(),
                    ),
                ),
                _ => (pos_g, edit_g),
            };

            let var_g = HgvsVariant::GenomeVariant {
                accession: Accession::new(alt_ac),
                gene_symbol: None,
                loc_edit: GenomeLocEdit {
                    loc: Mu::from(pos_g, certain),
                    edit: edit_g,
                },
            };

            self.replace_reference(var_g)
        } else {
            Err(Error::ExpectedCdsVariant(format!("{var_c}")))
        }
    }

    /// Convert from CDS variant (c.) to transcript variant (n.) on the
    /// same transcript.
    pub fn c_to_n(&self, var_c: &HgvsVariant) -> Result<HgvsVariant, Error> {
        var_c.validate()?;
        let var_c = self.replace_reference(var_c.clone())?;
        if let HgvsVariant::CdsVariant {
            accession,
            gene_symbol,
            loc_edit,
        } = &var_c
        {
            let mapper = self.alignment_mapper(
                accession.as_str(),
                accession.as_str(),
                ALN_METHOD_TRANSCRIPT,
            )?;
            let pos_n = mapper.c_to_n(loc_edit.loc.inner(), self.config.strict_bounds)?;

            Ok(HgvsVariant::TxVariant {
                accession: accession.clone(),
                gene_symbol: gene_symbol.clone(),
                loc_edit: TxLocEdit {
                    loc: Mu::from(pos_n, loc_edit.loc.is_certain()),
                    edit: loc_edit.edit.clone(),
                },
            })
        } else {
            Err(Error::ExpectedCdsVariant(format!("{var_c}")))
        }
    }

    /// Convert from transcript variant (n.) to CDS variant (c.) on the
    /// same transcript.  Fails for non-coding transcripts.
    pub fn n_to_c(&self, var_n: &HgvsVariant) -> Result<HgvsVariant, Error> {
        var_n.validate()?;
        let var_n = self.replace_reference(var_n.clone())?;
        if let HgvsVariant::TxVariant {
            accession,
            gene_symbol,
            loc_edit,
        } = &var_n
        {
            let mapper = self.alignment_mapper(
                accession.as_str(),
                accession.as_str(),
                ALN_METHOD_TRANSCRIPT,
            )?;
            let pos_c = mapper.n_to_c(loc_edit.loc.inner(), self.config.strict_bounds)?;

            Ok(HgvsVariant::CdsVariant {
                accession: accession.clone(),
                gene_symbol: gene_symbol.clone(),
                loc_edit: CdsLocEdit {
                    loc: Mu::from(pos_c, loc_edit.loc.is_certain()),
                    edit: loc_edit.edit.clone(),
                },
            })
        } else {
            Err(Error::ExpectedTxVariant(format!("{var_n}")))
        }
    }

    /// Convert from CDS variant (c.) to protein variant (p.).
    ///
    /// # Args
    ///
    /// * `var_c` -- `HgvsVariant::CdsVariant` to project
    /// * `prot_ac` -- protein accession overriding the provider's
    pub fn c_to_p(
        &self,
        var_c: &HgvsVariant,
        prot_ac: Option<&str>,
    ) -> Result<HgvsVariant, Error> {
        var_c.validate()?;
        let var_c = self.replace_reference(var_c.clone())?;
        if let HgvsVariant::CdsVariant {
            accession,
            gene_symbol,
            loc_edit,
        } = &var_c
        {
            let data = RefTranscriptData::new(self.provider.as_ref(), accession.as_str())?;
            let loc_edit_p = predict_protein_change(&data, loc_edit)?;

            Ok(HgvsVariant::ProtVariant {
                accession: Accession::new(prot_ac.unwrap_or(&data.protein_ac)),
                gene_symbol: gene_symbol.clone(),
                loc_edit: loc_edit_p,
            })
        } else {
            Err(Error::ExpectedCdsVariant(format!("{var_c}")))
        }
    }

    /// Convert from protein variant (p.) to a representative CDS variant
    /// (c.) on `tx_ac`.
    ///
    /// The choice of codons is ambiguous; ties resolve to the
    /// lexicographically smallest codon, preferring single-base changes.
    /// Frameshifts and the special protein forms cannot be projected.
    pub fn p_to_c(&self, var_p: &HgvsVariant, tx_ac: &str) -> Result<HgvsVariant, Error> {
        var_p.validate()?;
        if let HgvsVariant::ProtVariant {
            gene_symbol,
            loc_edit,
            ..
        } = var_p
        {
            let data = RefTranscriptData::new(self.provider.as_ref(), tx_ac)?;
            let loc_edit_c = infer_cds_change(&data, loc_edit)?;

            let var_c = HgvsVariant::CdsVariant {
                accession: Accession::new(tx_ac),
                gene_symbol: gene_symbol.clone(),
                loc_edit: loc_edit_c,
            };
            // Fill in the reference bases the inference leaves empty.
            self.replace_reference(var_c)
        } else {
            Err(Error::ExpectedProtVariant(format!("{var_p}")))
        }
    }

    /// Check the variant's declared reference bases against the provider
    /// sequence.
    ///
    /// On disagreement, the fetched bases replace the declared ones when
    /// `replace_reference` is configured; otherwise the mismatch is an
    /// error.  Protein variants, insertions, intronic variants, and
    /// positions outside the stored sequence are returned unchanged.
    pub fn replace_reference(&self, var: HgvsVariant) -> Result<HgvsVariant, Error> {
        if let Some(NaEdit::Ins { .. }) = var.na_edit() {
            // Insertions have no reference bases.
            return Ok(var);
        }
        if var.spans_intron() {
            debug!("skipping reference check for intronic variant {}", var);
            return Ok(var);
        }

        let (begin, end, ac) = match &var {
            HgvsVariant::ProtVariant { .. } => return Ok(var),
            HgvsVariant::CdsVariant {
                accession,
                loc_edit,
                ..
            } => {
                let mapper = self.alignment_mapper(
                    accession.as_str(),
                    accession.as_str(),
                    ALN_METHOD_TRANSCRIPT,
                )?;
                let pos_n = mapper.c_to_n(loc_edit.loc.inner(), false)?;
                (
                    i64::from(pos_n.start.base) - 1,
                    i64::from(pos_n.end.base),
                    accession,
                )
            }
            HgvsVariant::TxVariant {
                accession,
                loc_edit,
                ..
            } => {
                let loc = loc_edit.loc.inner();
                (
                    i64::from(loc.start.base) - 1,
                    i64::from(loc.end.base),
                    accession,
                )
            }
            HgvsVariant::GenomeVariant {
                accession,
                loc_edit,
                ..
            } => match (loc_edit.loc.inner().start, loc_edit.loc.inner().end) {
                (Some(start), Some(end)) => {
                    (i64::from(start) - 1, i64::from(end), accession)
                }
                _ => return Ok(var),
            },
        };

        if begin < 0 || end < begin {
            // Out-of-bounds variant; nothing to compare against.
            return Ok(var);
        }
        let accession = ac.value.clone();
        let seq = match self.provider.get_seq_part(
            &accession,
            Some(begin as usize),
            Some(end as usize),
        ) {
            Ok(seq) => seq,
            Err(crate::data::error::Error::SequenceOutOfRange(_, _, _)) => {
                // Outside the stored sequence; the bounds checks of the
                // projection itself report this.
                debug!("position outside stored sequence for {}", var);
                return Ok(var);
            }
            Err(e) => return Err(e.into()),
        };
        if seq.len() != (end - begin) as usize {
            debug!("sequence ends before {}; leaving reference as-is", var);
            return Ok(var);
        }
        let actual = normalize_dna(&seq);

        let declared = var
            .na_edit()
            .and_then(NaEdit::reference)
            .map(str::to_string);
        match declared {
            Some(declared) if normalize_dna(&declared) != actual => {
                if self.config.replace_reference {
                    debug!(
                        "replacing declared reference {} with {} in {}",
                        declared, actual, var
                    );
                    Ok(var.with_reference(actual))
                } else {
                    Err(Error::ReferenceMismatch {
                        accession,
                        declared,
                        actual,
                    })
                }
            }
            Some(_) => Ok(var),
            None if self.config.replace_reference => Ok(var.with_reference(actual)),
            None => Ok(var),
        }
    }
}

/// Reverse-complement an edit when projecting across strands.
fn convert_edit_check_strand(strand: i16, edit: &Mu<NaEdit>) -> Mu<NaEdit> {
    let result = if strand == 1 {
        edit.inner().clone()
    } else {
        match edit.inner() {
            NaEdit::RefAlt {
                reference,
                alternative,
            } => NaEdit::RefAlt {
                reference: revcomp(reference),
                alternative: revcomp(alternative),
            },
            NaEdit::DelRef { reference } => NaEdit::DelRef {
                reference: revcomp(reference),
            },
            NaEdit::Ins { alternative } => NaEdit::Ins {
                alternative: revcomp(alternative),
            },
            NaEdit::Dup { reference } => NaEdit::Dup {
                reference: revcomp(reference),
            },
            NaEdit::InvRef { reference } => NaEdit::InvRef {
                reference: revcomp(reference),
            },
            NaEdit::Ident { reference } => NaEdit::Ident {
                reference: revcomp(reference),
            },
            NaEdit::DelNum { count } => NaEdit::DelNum { count: *count },
            NaEdit::InvNum { count } => NaEdit::InvNum { count: *count },
        }
    };
    Mu::from(result, edit.is_certain())
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
