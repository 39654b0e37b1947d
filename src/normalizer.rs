//! Variant normalization (5' and 3' shuffling).
//!
//! Insertions and deletions in repetitive sequence have many equivalent
//! descriptions; `Normalizer` shuffles them to the configured end of the
//! repeat and rewrites the edit canonically (e.g., an insertion that
//! duplicates its neighbor becomes a `dup`).  CDS variants are shuffled
//! on transcript coordinates and projected back.

use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use crate::data::interface::Provider;
use crate::mapper::variant;
use crate::parser::{
    GenomeInterval, GenomeLocEdit, HgvsVariant, Mu, NaEdit, TxInterval, TxLocEdit, TxPos,
};
use crate::sequences::{revcomp, trim_common_prefixes, trim_common_suffixes};
use crate::validator::Validateable;

/// Error type for variant normalization.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("integer conversion failed")]
    IntegerConversion(#[from] std::num::TryFromIntError),
    #[error("validation error")]
    ValidationFailed(#[from] crate::validator::Error),
    #[error("problem accessing data")]
    DataError(#[from] crate::data::error::Error),
    #[error("projection failed")]
    MappingFailed(#[from] crate::mapper::Error),
    #[error("cannot normalize protein-level variant: {0}")]
    ProteinVariant(String),
    #[error("cannot normalize intronic variant: {0}")]
    IntronicVariant(String),
    #[error("cannot normalize edit given by length only: {0}")]
    UnsupportedEdit(String),
    #[error("cannot normalize variant of this type: {0}")]
    UnsupportedVariantType(String),
    #[error("coordinates are out of bounds in: {0}")]
    CoordinatesOutOfBounds(String),
    #[error("no genomic alignment of {0} using {1}")]
    NoGenomicAlignment(String, String),
    #[error("cannot find exon covering start of: {0}")]
    ExonNotFoundForStart(String),
    #[error("cannot find exon covering end of: {0}")]
    ExonNotFoundForEnd(String),
    #[error("normalization unsupported when spanning exon-intron boundary: {0}")]
    ExonIntronBoundary(String),
    #[error("normalization unsupported when spanning UTR-exon boundary: {0}")]
    UtrExonBoundary(String),
    #[error("variant span is outside of sequence bounds: {0}")]
    VariantSpanOutsideSequenceBounds(String),
}

/// Direction of shuffling with respect to the sequence.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    ThreeToFive,
    FiveToThree,
}

/// Configuration for the normalizer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Alignment method used to resolve exon structure, e.g., `"splign"`.
    pub alt_aln_method: String,
    /// Allow shuffling across exon-intron and UTR-exon boundaries.
    pub cross_boundaries: bool,
    pub shuffle_direction: Direction,
    /// Replace the declared reference bases before shuffling.
    pub replace_reference: bool,
    /// Size of the sequence window fetched per shuffling step.
    pub window_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alt_aln_method: "splign".to_string(),
            cross_boundaries: false,
            shuffle_direction: Direction::FiveToThree,
            replace_reference: true,
            window_size: 20,
        }
    }
}

/// Shuffles variants to a canonical position within their repeat context.
pub struct Normalizer<'a> {
    pub mapper: &'a variant::Mapper,
    pub provider: Arc<dyn Provider>,
    pub config: Config,
}

/// Helper type used in `Normalizer::check_and_guard()`.
struct CheckAndGuardResult {
    var: HgvsVariant,
    as_is: bool,
    cds_to_tx: bool,
}

impl<'a> Normalizer<'a> {
    pub fn new(mapper: &'a variant::Mapper, config: Config) -> Self {
        Self {
            provider: mapper.provider(),
            mapper,
            config,
        }
    }

    pub fn normalize(&self, var: &HgvsVariant) -> Result<HgvsVariant, Error> {
        let is_genome = matches!(var, HgvsVariant::GenomeVariant { .. });

        let CheckAndGuardResult {
            var,
            as_is,
            cds_to_tx,
        } = self.check_and_guard(var, is_genome)?;
        if as_is {
            return Ok(var);
        }

        let boundary = self.get_boundary(&var)?;
        let (start, end, reference, alternative) =
            self.normalize_alleles(&var, boundary.clone())?;

        self.build_result(var, start, end, reference, alternative, boundary, cds_to_tx)
    }

    /// Run the pre-normalization checks: whether normalizing the variant is
    /// an error, whether it is returned as-is, and whether it was projected
    /// from CDS to transcript coordinates and must be projected back.
    fn check_and_guard(
        &self,
        orig_var: &HgvsVariant,
        is_genome: bool,
    ) -> Result<CheckAndGuardResult, Error> {
        let var = orig_var.clone();
        var.validate()?;

        if let HgvsVariant::ProtVariant { .. } = var {
            return Err(Error::ProteinVariant(format!("{var}")));
        }

        // Uncertain edits or positions cannot be shuffled reliably.
        if var.mu_na_edit().map(|e| !e.is_certain()).unwrap_or(true) || !var.loc_is_certain() {
            return Ok(CheckAndGuardResult {
                var,
                as_is: true,
                cds_to_tx: false,
            });
        }

        let var = if self.config.replace_reference {
            self.mapper.replace_reference(var)?
        } else {
            var
        };

        // Identity variants are already normal.
        if let Some(na_edit) = var.na_edit() {
            let is_ident = match na_edit {
                NaEdit::Ident { .. } => true,
                NaEdit::RefAlt {
                    reference,
                    alternative,
                } => reference == alternative,
                _ => false,
            };
            if is_ident {
                return Ok(CheckAndGuardResult {
                    var,
                    as_is: true,
                    cds_to_tx: false,
                });
            }
        }

        // CDS variants are shuffled on transcript coordinates.
        let (var, cds_to_tx) = if let HgvsVariant::CdsVariant { .. } = var {
            (self.mapper.c_to_n(&var)?, true)
        } else {
            (var, false)
        };

        if var.spans_intron() {
            return Err(Error::IntronicVariant(format!("{var}")));
        }

        let loc_range = var
            .loc_range()
            .ok_or_else(|| Error::CoordinatesOutOfBounds(format!("{var}")))?;
        if loc_range.start < 0 {
            return Err(Error::CoordinatesOutOfBounds(format!("{var}")));
        }
        // Contigs are often stored as partial slices, so length validation
        // is limited to transcript sequences.
        if !is_genome {
            let end = loc_range.end as usize;
            let covered = match self.provider.get_seq_part(
                var.accession().as_str(),
                Some(end - 1),
                Some(end),
            ) {
                Ok(seq) => !seq.is_empty(),
                Err(crate::data::error::Error::SequenceOutOfRange(_, _, _)) => false,
                Err(e) => return Err(e.into()),
            };
            if !covered {
                return Err(Error::CoordinatesOutOfBounds(format!("{var}")));
            }
        }

        Ok(CheckAndGuardResult {
            var,
            as_is: false,
            cds_to_tx,
        })
    }

    /// Obtain the interbase range the shuffling must stay within.
    ///
    /// Unless boundary crossing is configured, transcript variants are
    /// confined to their exon, further partitioned at the CDS bounds.
    fn get_boundary(&self, var: &HgvsVariant) -> Result<Range<i32>, Error> {
        if self.config.cross_boundaries || !matches!(var, HgvsVariant::TxVariant { .. }) {
            return Ok(0..i32::MAX);
        }

        let tx_ac = var.accession().as_str();
        let alt_ac = self
            .provider
            .get_tx_mapping_options(tx_ac)?
            .into_iter()
            .find(|r| r.alt_aln_method == self.config.alt_aln_method)
            .map(|r| r.alt_ac)
            .ok_or_else(|| {
                Error::NoGenomicAlignment(tx_ac.to_string(), self.config.alt_aln_method.clone())
            })?;

        let tx_info = self
            .provider
            .get_tx_info(tx_ac, &alt_ac, &self.config.alt_aln_method)?;
        let exons = self
            .provider
            .get_tx_exons(tx_ac, &alt_ac, &self.config.alt_aln_method)?;

        let mut exon_starts = exons.iter().map(|r| r.tx_start_i).collect::<Vec<_>>();
        exon_starts.sort();
        let mut exon_ends = exons.iter().map(|r| r.tx_end_i).collect::<Vec<_>>();
        exon_ends.sort();
        // Sentinel region covering the poly(A) tail beyond the last exon.
        let last_end = *exon_ends.last().ok_or_else(|| {
            crate::data::error::Error::NoAlignmentFound(
                tx_ac.to_string(),
                alt_ac.clone(),
                self.config.alt_aln_method.clone(),
            )
        })?;
        exon_starts.push(last_end);
        exon_ends.push(i32::MAX);

        let loc_range = var
            .loc_range()
            .ok_or_else(|| Error::CoordinatesOutOfBounds(format!("{var}")))?;
        let i = (0..exon_starts.len())
            .find(|&idx| loc_range.start >= exon_starts[idx] && loc_range.start < exon_ends[idx])
            .ok_or_else(|| Error::ExonNotFoundForStart(format!("{var}")))?;
        let j = (0..exon_starts.len())
            .find(|&idx| loc_range.end > exon_starts[idx] && loc_range.end - 1 < exon_ends[idx])
            .ok_or_else(|| Error::ExonNotFoundForEnd(format!("{var}")))?;
        if i != j {
            return Err(Error::ExonIntronBoundary(format!("{var}")));
        }

        let mut left = exon_starts[i];
        let mut right = exon_ends[i];

        if let Some(cds_start) = tx_info.cds_start_i {
            if loc_range.end - 1 < cds_start {
                right = right.min(cds_start);
            } else if loc_range.start >= cds_start {
                left = left.max(cds_start);
            } else {
                return Err(Error::UtrExonBoundary(format!("{var}")));
            }
        }
        if let Some(cds_end) = tx_info.cds_end_i {
            if loc_range.start >= cds_end {
                left = left.max(cds_end);
            } else if loc_range.end - 1 < cds_end {
                right = right.min(cds_end);
            } else {
                return Err(Error::UtrExonBoundary(format!("{var}")));
            }
        }

        Ok(left..right)
    }

    /// Shuffle the alleles into the configured direction.
    ///
    /// The returned start/end are 1-based.
    fn normalize_alleles(
        &self,
        var: &HgvsVariant,
        boundary: Range<i32>,
    ) -> Result<(i32, i32, String, String), Error> {
        let (reference, alternative) = self.get_ref_alt(var, &boundary)?;
        let win_size = i32::try_from(self.config.window_size)?;
        let loc_range = var
            .loc_range()
            .ok_or_else(|| Error::CoordinatesOutOfBounds(format!("{var}")))?;

        if self.config.shuffle_direction == Direction::FiveToThree {
            self.normalize_alleles_5_to_3(reference, alternative, win_size, var, loc_range, boundary)
        } else {
            self.normalize_alleles_3_to_5(reference, alternative, win_size, var, loc_range, boundary)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn normalize_alleles_5_to_3(
        &self,
        mut reference: String,
        mut alternative: String,
        win_size: i32,
        var: &HgvsVariant,
        loc_range: Range<i32>,
        boundary: Range<i32>,
    ) -> Result<(i32, i32, String, String), Error> {
        let (mut base, mut start, mut stop) = match var.na_edit() {
            Some(NaEdit::Ins { .. }) => (loc_range.start + 1, 1, 1),
            Some(NaEdit::Dup { .. }) => (loc_range.end, 1, 1),
            _ => (loc_range.start + 1, 0, loc_range.end - loc_range.start),
        };

        loop {
            let ref_seq = self.fetch_bounded_seq(
                var,
                base - 1,
                base + stop - 1 + win_size,
                win_size,
                &boundary,
            )?;
            if ref_seq.is_empty() {
                break;
            }
            let orig_start = start;
            (start, stop, reference, alternative) = normalize_alleles_right(
                &ref_seq,
                usize::try_from(start)?,
                usize::try_from(stop)?,
                reference,
                alternative,
                ref_seq.len(),
                usize::try_from(win_size)?,
            )?;
            if stop < i32::try_from(ref_seq.len())? || start == orig_start {
                break;
            }
            // Stopped at the end of the window; extend to the right.
            base += start - orig_start;
            stop -= start - orig_start;
            start = orig_start;
        }

        Ok((base + start, base + stop, reference, alternative))
    }

    #[allow(clippy::too_many_arguments)]
    fn normalize_alleles_3_to_5(
        &self,
        mut reference: String,
        mut alternative: String,
        win_size: i32,
        var: &HgvsVariant,
        loc_range: Range<i32>,
        boundary: Range<i32>,
    ) -> Result<(i32, i32, String, String), Error> {
        let mut base = (loc_range.start + 1 - win_size).max(1);
        let (mut start, mut stop) = match var.na_edit() {
            Some(NaEdit::Ins { .. }) => (loc_range.end - base, loc_range.end - base),
            Some(NaEdit::Dup { .. }) => (loc_range.end - base + 1, loc_range.end - base + 1),
            _ => (loc_range.start + 1 - base, loc_range.end - base + 1),
        };

        loop {
            if base < boundary.start + 1 {
                start -= boundary.start + 1 - base;
                stop -= boundary.start + 1 - base;
                base = boundary.start + 1;
            }
            let ref_seq =
                self.fetch_bounded_seq(var, base - 1, base + stop - 1, start, &boundary)?;
            if ref_seq.is_empty() {
                break;
            }
            let orig_stop = stop;
            (start, stop, reference, alternative) = normalize_alleles_left(
                &ref_seq,
                usize::try_from(start)?,
                usize::try_from(stop)?,
                reference,
                alternative,
                0,
                usize::try_from(win_size)?,
            )?;
            if start > 0 || stop == orig_stop {
                break;
            }
            // Stopped at the start of the window; extend to the left.
            base -= orig_stop - stop;
            start += orig_stop - stop;
            stop = orig_stop;
        }

        Ok((base + start, base + stop, reference, alternative))
    }

    /// Build the normalized variant from the shuffled alleles.
    ///
    /// The parameter start/end are 1-based.
    #[allow(clippy::too_many_arguments)]
    fn build_result(
        &self,
        var: HgvsVariant,
        start: i32,
        end: i32,
        reference: String,
        alternative: String,
        boundary: Range<i32>,
        cds_to_tx: bool,
    ) -> Result<HgvsVariant, Error> {
        let ref_len = i32::try_from(reference.len())?;
        let alt_len = i32::try_from(alternative.len())?;

        let (ref_start, ref_end, edit) = match alt_len.cmp(&ref_len) {
            Ordering::Equal => {
                build_result_len_eq(start, end, ref_len, alt_len, &reference, &alternative)
            }
            Ordering::Less => build_result_len_less(start, end, alt_len, &reference, &alternative),
            Ordering::Greater => self.build_result_len_gt(
                ref_len,
                &var,
                start,
                alt_len,
                end,
                &boundary,
                &alternative,
                &reference,
            )?,
        };

        // A shuffle that reaches position 0 re-anchors on the first base.
        let (ref_start, ref_end, edit, alternative) = if ref_start == 0 {
            let reference = self.fetch_bounded_seq(&var, 0, 1, 0, &boundary)?;
            let alternative = format!("{alternative}{reference}");
            (
                1,
                1,
                NaEdit::RefAlt {
                    reference,
                    alternative: alternative.clone(),
                },
                alternative,
            )
        } else {
            (ref_start, ref_end, edit, alternative)
        };

        // Same at the far end of the sequence.
        let tgt_len = self.get_tgt_len(&var)?;
        let (ref_start, ref_end, edit) = if ref_end == tgt_len.saturating_add(1) {
            let reference = self.fetch_bounded_seq(&var, tgt_len - 1, tgt_len, 0, &boundary)?;
            let alternative = format!("{reference}{alternative}");
            (
                tgt_len,
                tgt_len,
                NaEdit::RefAlt {
                    reference,
                    alternative,
                },
            )
        } else {
            (ref_start, ref_end, edit)
        };

        self.build_result_construct(var, ref_start, ref_end, edit, cds_to_tx)
    }

    fn build_result_construct(
        &self,
        var: HgvsVariant,
        ref_start: i32,
        ref_end: i32,
        edit: NaEdit,
        cds_to_tx: bool,
    ) -> Result<HgvsVariant, Error> {
        match var {
            HgvsVariant::GenomeVariant {
                accession,
                gene_symbol,
                ..
            } => Ok(HgvsVariant::GenomeVariant {
                accession,
                gene_symbol,
                loc_edit: GenomeLocEdit {
                    loc: Mu::Certain(GenomeInterval {
                        start: Some(ref_start),
                        end: Some(ref_end),
                    }),
                    edit: Mu::Certain(edit),
                },
            }),
            HgvsVariant::TxVariant {
                accession,
                gene_symbol,
                ..
            } => {
                let var_n = HgvsVariant::TxVariant {
                    accession,
                    gene_symbol,
                    loc_edit: TxLocEdit {
                        loc: Mu::Certain(TxInterval {
                            start: TxPos {
                                base: ref_start,
                                offset: None,
                            },
                            end: TxPos {
                                base: ref_end,
                                offset: None,
                            },
                        }),
                        edit: Mu::Certain(edit),
                    },
                };
                if cds_to_tx {
                    Ok(self.mapper.n_to_c(&var_n)?)
                } else {
                    Ok(var_n)
                }
            }
            other => Err(Error::UnsupportedVariantType(format!("{other}"))),
        }
    }

    /// Build the result for the ins/dup/delins case.
    #[allow(clippy::too_many_arguments)]
    fn build_result_len_gt(
        &self,
        ref_len: i32,
        var: &HgvsVariant,
        start: i32,
        alt_len: i32,
        end: i32,
        boundary: &Range<i32>,
        alternative: &str,
        reference: &str,
    ) -> Result<(i32, i32, NaEdit), Error> {
        Ok(if ref_len == 0 {
            // Compare against the adjacent sequence to detect duplication.
            let adj_seq = if self.config.shuffle_direction == Direction::FiveToThree {
                self.fetch_bounded_seq(var, start - alt_len - 1, end - 1, 0, boundary)?
            } else {
                self.fetch_bounded_seq(var, start - 1, start + alt_len - 1, 0, boundary)?
            };

            if alternative != adj_seq {
                // ins
                (
                    start - 1,
                    end,
                    NaEdit::Ins {
                        alternative: alternative.to_owned(),
                    },
                )
            } else if self.config.shuffle_direction == Direction::FiveToThree {
                // dup
                (
                    start - alt_len,
                    end - 1,
                    NaEdit::Dup {
                        reference: alternative.to_owned(),
                    },
                )
            } else {
                (
                    start,
                    start + alt_len - 1,
                    NaEdit::Dup {
                        reference: alternative.to_owned(),
                    },
                )
            }
        } else {
            // delins
            (
                start,
                end - 1,
                NaEdit::RefAlt {
                    reference: reference.to_owned(),
                    alternative: alternative.to_owned(),
                },
            )
        })
    }

    /// Fetch reference sequence, clamped to the boundary.
    ///
    /// Start and end are interbase; positions outside the stored sequence
    /// yield an empty string, which terminates the shuffling loops.
    fn fetch_bounded_seq(
        &self,
        var: &HgvsVariant,
        start: i32,
        end: i32,
        window_size: i32,
        boundary: &Range<i32>,
    ) -> Result<String, Error> {
        let var_len = end - start - window_size;

        let start = start.max(boundary.start);
        let end = end.min(boundary.end);
        if start >= end {
            return Ok(String::new());
        }

        let seq = match self.provider.get_seq_part(
            var.accession().as_str(),
            Some(usize::try_from(start)?),
            Some(usize::try_from(end)?),
        ) {
            Ok(seq) => seq,
            Err(crate::data::error::Error::SequenceOutOfRange(_, _, _)) => {
                return Ok(String::new())
            }
            Err(e) => return Err(e.into()),
        };
        let seq_len = i32::try_from(seq.len())?;

        if seq_len < end - start && seq_len < var_len {
            Err(Error::VariantSpanOutsideSequenceBounds(format!("{var}")))
        } else {
            Ok(seq)
        }
    }

    fn get_tgt_len(&self, var: &HgvsVariant) -> Result<i32, Error> {
        if matches!(var, HgvsVariant::GenomeVariant { .. }) {
            Ok(i32::MAX)
        } else {
            let info = self.provider.get_tx_identity_info(var.accession().as_str())?;
            Ok(info.lengths.iter().sum())
        }
    }

    /// Resolve the reference and alternative allele of the variant.
    fn get_ref_alt(
        &self,
        var: &HgvsVariant,
        boundary: &Range<i32>,
    ) -> Result<(String, String), Error> {
        let loc_range = var
            .loc_range()
            .ok_or_else(|| Error::CoordinatesOutOfBounds(format!("{var}")))?;

        Ok(match var.na_edit() {
            Some(NaEdit::Ins { alternative }) => (String::new(), alternative.clone()),
            Some(NaEdit::Dup { .. }) => {
                let seq =
                    self.fetch_bounded_seq(var, loc_range.start, loc_range.end, 0, boundary)?;
                (String::new(), seq)
            }
            Some(NaEdit::DelRef { .. }) => {
                let seq =
                    self.fetch_bounded_seq(var, loc_range.start, loc_range.end, 0, boundary)?;
                (seq, String::new())
            }
            Some(NaEdit::RefAlt { alternative, .. }) => {
                let seq =
                    self.fetch_bounded_seq(var, loc_range.start, loc_range.end, 0, boundary)?;
                (seq, alternative.clone())
            }
            Some(NaEdit::InvRef { .. }) => {
                let seq =
                    self.fetch_bounded_seq(var, loc_range.start, loc_range.end, 0, boundary)?;
                let alternative = revcomp(&seq);
                (seq, alternative)
            }
            _ => return Err(Error::UnsupportedEdit(format!("{var}"))),
        })
    }
}

/// Build the result for the substitution/inversion/delins case.
fn build_result_len_eq(
    start: i32,
    end: i32,
    ref_len: i32,
    alt_len: i32,
    reference: &str,
    alternative: &str,
) -> (i32, i32, NaEdit) {
    if ref_len > 1 && reference == revcomp(alternative) {
        (
            start,
            end - 1,
            NaEdit::InvRef {
                reference: reference.to_owned(),
            },
        )
    } else if ref_len == 0 && alt_len == 0 {
        // Shuffled away entirely; an identity at the final position.
        (
            end - 1,
            end - 1,
            NaEdit::RefAlt {
                reference: reference.to_owned(),
                alternative: alternative.to_owned(),
            },
        )
    } else {
        (
            start,
            end - 1,
            NaEdit::RefAlt {
                reference: reference.to_owned(),
                alternative: alternative.to_owned(),
            },
        )
    }
}

/// Build the result for the del/delins case.
fn build_result_len_less(
    start: i32,
    end: i32,
    alt_len: i32,
    reference: &str,
    alternative: &str,
) -> (i32, i32, NaEdit) {
    (
        start,
        end - 1,
        if alt_len == 0 {
            NaEdit::DelRef {
                reference: reference.to_owned(),
            }
        } else {
            NaEdit::RefAlt {
                reference: reference.to_owned(),
                alternative: alternative.to_owned(),
            }
        },
    )
}

/// Shuffle a pair of alleles towards the start of `ref_seq`.
fn normalize_alleles_left(
    ref_seq: &str,
    start: usize,
    stop: usize,
    reference: String,
    alternative: String,
    bound: usize,
    ref_step: usize,
) -> Result<(i32, i32, String, String), Error> {
    let (trimmed, reference, alternative) = trim_common_suffixes(&reference, &alternative);
    let mut stop = stop - trimmed;

    let (trimmed, mut reference, mut alternative) = trim_common_prefixes(&reference, &alternative);
    let mut start = start + trimmed;

    // While one allele is empty, prepend reference sequence and trim the
    // common suffix to slide the variant to the left.
    while (reference.is_empty() || alternative.is_empty()) && start > bound {
        let step = ref_step.min(start - bound);

        let chunk = ref_seq[(start - step)..(start - bound)].to_uppercase();
        let new_reference = format!("{chunk}{reference}");
        let new_alternative = format!("{chunk}{alternative}");

        let (trimmed, new_reference, new_alternative) =
            trim_common_suffixes(&new_reference, &new_alternative);

        if trimmed == 0 {
            break;
        }

        start -= trimmed;
        stop -= trimmed;

        if trimmed == step {
            reference = new_reference;
            alternative = new_alternative;
        } else {
            let keep = step - trimmed;
            reference = new_reference[keep..].to_string();
            alternative = new_alternative[keep..].to_string();
            break;
        }
    }

    Ok((
        i32::try_from(start)?,
        i32::try_from(stop)?,
        reference,
        alternative,
    ))
}

/// Shuffle a pair of alleles towards the end of `ref_seq`.
fn normalize_alleles_right(
    ref_seq: &str,
    start: usize,
    stop: usize,
    reference: String,
    alternative: String,
    bound: usize,
    ref_step: usize,
) -> Result<(i32, i32, String, String), Error> {
    let (trimmed, reference, alternative) = trim_common_prefixes(&reference, &alternative);
    let mut start = start + trimmed;

    let (trimmed, mut reference, mut alternative) = trim_common_suffixes(&reference, &alternative);
    let mut stop = stop - trimmed;

    // While one allele is empty, append reference sequence and trim the
    // common prefix to slide the variant to the right.
    while (reference.is_empty() || alternative.is_empty()) && stop < bound {
        let step = ref_step.min(bound - stop);

        let chunk = ref_seq[stop..(stop + step)].to_uppercase();
        let new_reference = format!("{reference}{chunk}");
        let new_alternative = format!("{alternative}{chunk}");

        let (trimmed, new_reference, new_alternative) =
            trim_common_prefixes(&new_reference, &new_alternative);

        if trimmed == 0 {
            break;
        }

        start += trimmed;
        stop += trimmed;

        if trimmed == step {
            reference = new_reference;
            alternative = new_alternative;
        } else {
            let keep = step - trimmed;
            reference = new_reference[..new_reference.len() - keep].to_string();
            alternative = new_alternative[..new_alternative.len() - keep].to_string();
            break;
        }
    }

    Ok((
        i32::try_from(start)?,
        i32::try_from(stop)?,
        reference,
        alternative,
    ))
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::{Config, Direction, Error, Normalizer};
    use crate::data::json::Provider as JsonProvider;
    use crate::mapper::variant;
    use crate::parser::HgvsVariant;

    /// A contig with a homopolymer run and a small coding transcript with
    /// repeats in the UTRs and the CDS.
    fn example_provider() -> Arc<JsonProvider> {
        // 4 nt 5' UTR, codons ATG GAT GAT TAA, 6 nt 3' UTR.
        let tx_seq = "AAAAATGGATGATTAATTTTTT";

        let doc = serde_json::json!({
            "version": "test-1",
            "assemblies": {},
            "sequences": {
                "NC_000055.1": { "seq": "AACCTTTTGG" },
                "NC_000056.1": { "seq": tx_seq },
                "NM_000010.1": { "seq": tx_seq }
            },
            "transcripts": {
                "NM_000010.1": {
                    "hgnc": "EXN",
                    "cds_start_i": 4,
                    "cds_end_i": 16,
                    "protein": "NP_000010.1",
                    "alignments": [
                        {
                            "alt_ac": "NC_000056.1",
                            "alt_aln_method": "splign",
                            "alt_strand": 1,
                            "exons": [
                                {
                                    "ord": 0,
                                    "tx_start_i": 0,
                                    "tx_end_i": 22,
                                    "alt_start_i": 0,
                                    "alt_end_i": 22,
                                    "cigar": "22="
                                }
                            ]
                        }
                    ]
                }
            }
        });
        JsonProvider::with_json(&doc.to_string()).expect("example document must parse")
    }

    fn example_mapper() -> variant::Mapper {
        let config = variant::Config {
            shared_cache: false,
            ..Default::default()
        };
        variant::Mapper::new(&config, example_provider())
    }

    fn normalizer(mapper: &variant::Mapper, direction: Direction, cross: bool) -> Normalizer<'_> {
        Normalizer::new(
            mapper,
            Config {
                shuffle_direction: direction,
                cross_boundaries: cross,
                ..Default::default()
            },
        )
    }

    #[test]
    fn deletion_shuffles_through_homopolymer() -> Result<(), anyhow::Error> {
        let mapper = example_mapper();
        let three_prime = normalizer(&mapper, Direction::FiveToThree, false);
        let five_prime = normalizer(&mapper, Direction::ThreeToFive, false);

        // The run of T spans positions 5 to 8.
        let var = HgvsVariant::from_str("NC_000055.1:g.5del")?;
        assert_eq!(
            format!("{}", three_prime.normalize(&var)?),
            "NC_000055.1:g.8delT"
        );

        let var = HgvsVariant::from_str("NC_000055.1:g.8del")?;
        assert_eq!(
            format!("{}", five_prime.normalize(&var)?),
            "NC_000055.1:g.5delT"
        );

        Ok(())
    }

    #[test]
    fn insertion_becomes_dup() -> Result<(), anyhow::Error> {
        let mapper = example_mapper();
        let three_prime = normalizer(&mapper, Direction::FiveToThree, false);

        let var = HgvsVariant::from_str("NC_000055.1:g.4_5insT")?;
        assert_eq!(
            format!("{}", three_prime.normalize(&var)?),
            "NC_000055.1:g.8dupT"
        );

        Ok(())
    }

    #[test]
    fn utr_boundary_caps_shuffling() -> Result<(), anyhow::Error> {
        let mapper = example_mapper();
        let confined = normalizer(&mapper, Direction::FiveToThree, false);
        let crossing = normalizer(&mapper, Direction::FiveToThree, true);

        // The A run continues into the start codon; without boundary
        // crossing the shuffle stops at the end of the 5' UTR.
        let var = HgvsVariant::from_str("NM_000010.1:n.2del")?;
        assert_eq!(
            format!("{}", confined.normalize(&var)?),
            "NM_000010.1:n.4delA"
        );
        assert_eq!(
            format!("{}", crossing.normalize(&var)?),
            "NM_000010.1:n.5delA"
        );

        Ok(())
    }

    #[test]
    fn cds_deletion_shuffles_on_transcript_level() -> Result<(), anyhow::Error> {
        let mapper = example_mapper();
        let three_prime = normalizer(&mapper, Direction::FiveToThree, false);

        let var = HgvsVariant::from_str("NM_000010.1:c.4_6del")?;
        assert_eq!(
            format!("{}", three_prime.normalize(&var)?),
            "NM_000010.1:c.7_9delGAT"
        );

        Ok(())
    }

    #[test]
    fn identity_returned_as_is() -> Result<(), anyhow::Error> {
        let mapper = example_mapper();
        let three_prime = normalizer(&mapper, Direction::FiveToThree, false);

        let var = HgvsVariant::from_str("NM_000010.1:c.4=")?;
        assert_eq!(
            format!("{}", three_prime.normalize(&var)?),
            "NM_000010.1:c.4G="
        );

        Ok(())
    }

    #[test]
    fn unsupported_variants_rejected() -> Result<(), anyhow::Error> {
        let mapper = example_mapper();
        let three_prime = normalizer(&mapper, Direction::FiveToThree, false);

        let var = HgvsVariant::from_str("NP_000001.1:p.Asp2Val")?;
        assert!(matches!(
            three_prime.normalize(&var),
            Err(Error::ProteinVariant(_))
        ));

        let var = HgvsVariant::from_str("NM_000010.1:n.5+3del")?;
        assert!(matches!(
            three_prime.normalize(&var),
            Err(Error::IntronicVariant(_))
        ));

        // Spanning the 5' UTR and the start codon.
        let var = HgvsVariant::from_str("NM_000010.1:c.-1_1del")?;
        assert!(matches!(
            three_prime.normalize(&var),
            Err(Error::UtrExonBoundary(_))
        ));

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
