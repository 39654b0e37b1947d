//! Mapping positions between pairs of aligned sequences.
//!
//! `Mapper` is at the heart of projecting between genomic (g.),
//! transcript (n.), and CDS (c.) coordinates.

// Implementation note re: "no-zero correction": the nomenclature has no
// position 0.  Counting is -3, -2, -1, 1, 2, 3.  Coordinate calculations
// must take this discontinuity in c. positions into account.  The strategy
// used in this code is to use internal zero-based c0 and n0 coordinates,
// which include 0, for all calculations and to translate these to c. and
// n. positions at the boundaries.
//
//                imag.                                                 imag.
//              upstream     5' UTR           CDS          3' UTR      downstr
//                                     |>
//            - - - - - - ———————————— ||||||||||||||||| ——————————— - - - - - -
//                           a     b     C     D     E     f     g     h     i
//    c.        -4    -3    -2    -1  !  1     2     3  ! *1    *2    *3    *4
//    c0        -4    -3    -2    -1     0     1     2     3     4     5     6
//    n0        -2    -1     0     1     2     3     4     5     6     7     8
//    n.        -2    -1  !  1     2     3     4     5     6     7     8     9
//    g.   ... 123   124   125   126   127   128   129   130   131   132   133 ...

use crate::{
    data::interface::{Provider, TxExonsRecord, TxIdentityInfo, TxInfoRecord},
    parser::{CdsFrom, CdsInterval, CdsPos, GenomeInterval, Mu, TxInterval, TxPos},
};

use super::cigar::{
    CigarElement, CigarMapper, CigarMapperResult, CigarOp, CigarString, IntervalEnd,
};
use super::error::Error;

/// Alignment method for mapping a transcript onto itself, covering the
/// c. to n. identity cases.
pub const ALN_METHOD_TRANSCRIPT: &str = "transcript";

/// Convert zero-based coordinate to 1-based, missing zero.
fn zbc_to_hgvs(i: i32) -> i32 {
    if i >= 0 {
        i + 1
    } else {
        i
    }
}

/// Convert 1-based coordinate, missing zero, to zero-based.
fn hgvs_to_zbc(i: i32) -> i32 {
    if i >= 1 {
        i - 1
    } else {
        i
    }
}

/// Build a single CIGAR string representing the alignment of a transcript
/// to a reference sequence, with introns as `N` gaps.
///
/// The input exons must be in genomic coordinate order; the resulting
/// CIGAR reads along the genome, so per-exon CIGARs of reverse strand
/// alignments are flipped.
pub fn build_tx_cigar(exons: &[TxExonsRecord], strand: i16) -> Result<CigarString, Error> {
    if exons.is_empty() {
        return Err(Error::EmptyExons);
    }

    let exon_cigars: Result<Vec<CigarString>, Error> = exons
        .iter()
        .map(|record| {
            let mut cigar = CigarString::parse(&record.cigar)?;
            if strand == -1 {
                cigar.reverse();
            }
            Ok(cigar)
        })
        .collect();
    let exon_cigars = exon_cigars?;

    let mut result = exon_cigars[0].clone();
    for i in 1..exon_cigars.len() {
        result.push(CigarElement {
            count: exons[i].alt_start_i - exons[i - 1].alt_end_i,
            op: CigarOp::Skip,
        });
        result.extend_from_slice(&exon_cigars[i]);
    }
    Ok(result)
}

/// Wrap a value into `Option`, mapping the default value to `None`.
pub fn none_if_default<T>(value: T) -> Option<T>
where
    T: Default + PartialEq,
{
    if value == T::default() {
        None
    } else {
        Some(value)
    }
}

/// Maps location objects between genomic (g.), non-coding (n.) and CDS
/// (c.) coordinates of one transcript-to-reference alignment.
///
/// A `Mapper` is a pure value derived from the provider records it was
/// built from; it holds no reference to the provider and never performs
/// I/O after construction.  This is what makes instances shareable and
/// cacheable: two mappers built from equal records behave identically.
#[derive(Debug)]
pub struct Mapper {
    /// The transcript accession.
    pub tx_ac: String,
    /// The reference sequence accession.
    pub alt_ac: String,
    /// The alignment method.
    pub alt_aln_method: String,
    /// Strand of the alignment, `1` or `-1`.
    pub strand: i16,
    /// Genomic offset of the leftmost aligned base.
    pub gc_offset: i32,
    /// Start of the CDS on the transcript, if coding.
    pub cds_start_i: Option<i32>,
    /// End of the CDS on the transcript, if coding.
    pub cds_end_i: Option<i32>,
    /// Length of the transcript sequence.
    pub tgt_len: i32,
    cigar_mapper: CigarMapper,
}

impl Mapper {
    /// Fetch the records for the given alignment from `provider` and build
    /// a mapper from them.
    ///
    /// The special method [`ALN_METHOD_TRANSCRIPT`] builds an identity
    /// mapper for c. to n. conversion without genomic alignment data.
    pub fn new(
        provider: &dyn Provider,
        tx_ac: &str,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<Mapper, Error> {
        if alt_aln_method == ALN_METHOD_TRANSCRIPT {
            Self::identity(&provider.get_tx_identity_info(tx_ac)?)
        } else {
            let tx_info = provider.get_tx_info(tx_ac, alt_ac, alt_aln_method)?;
            let tx_exons = provider.get_tx_exons(tx_ac, alt_ac, alt_aln_method)?;
            Self::build(&tx_info, &tx_exons)
        }
    }

    /// Build a mapper from already-fetched records.  Pure; the result is
    /// fully determined by the arguments.
    pub fn build(tx_info: &TxInfoRecord, tx_exons: &[TxExonsRecord]) -> Result<Mapper, Error> {
        if tx_exons.is_empty() {
            return Err(Error::NoExons(
                tx_info.tx_ac.clone(),
                tx_info.alt_ac.clone(),
                tx_info.alt_aln_method.clone(),
            ));
        }

        // The CIGAR construction assumes exons are adjacent on the
        // transcript (biocommons/hgvs#386).
        let mut by_ord = tx_exons.to_vec();
        by_ord.sort_by_key(|exon| exon.ord);
        for pair in by_ord.windows(2) {
            if pair[0].tx_end_i != pair[1].tx_start_i {
                return Err(Error::NonAdjacentExons(
                    format!("{}/{}", pair[0].ord, pair[0].tx_end_i),
                    format!("{}/{}", pair[1].ord, pair[1].tx_start_i),
                ));
            }
        }

        let strand = tx_exons[0].alt_strand;
        if strand != 1 && strand != -1 {
            return Err(Error::InvalidStrand(
                tx_info.tx_ac.clone(),
                tx_info.alt_ac.clone(),
                strand,
            ));
        }
        let gc_offset = tx_exons[0].alt_start_i;

        if tx_info.cds_start_i.is_none() != tx_info.cds_end_i.is_none() {
            return Err(Error::IncompleteCds(tx_info.tx_ac.clone()));
        }

        let cigar = build_tx_cigar(tx_exons, strand)?;
        let cigar_mapper = CigarMapper::new(&cigar);
        let tgt_len = cigar_mapper.tgt_len;

        Ok(Mapper {
            tx_ac: tx_info.tx_ac.clone(),
            alt_ac: tx_info.alt_ac.clone(),
            alt_aln_method: tx_info.alt_aln_method.clone(),
            strand,
            gc_offset,
            cds_start_i: tx_info.cds_start_i,
            cds_end_i: tx_info.cds_end_i,
            tgt_len,
            cigar_mapper,
        })
    }

    /// Build an identity mapper covering the c. to n. conversion of one
    /// transcript, without genomic alignment.
    pub fn identity(info: &TxIdentityInfo) -> Result<Mapper, Error> {
        // Non-coding transcripts carry -1 sentinels for the CDS bounds.
        let (cds_start_i, cds_end_i) = if info.cds_start_i < 0 || info.cds_end_i < 0 {
            (None, None)
        } else {
            (Some(info.cds_start_i), Some(info.cds_end_i))
        };
        Ok(Mapper {
            tx_ac: info.tx_ac.clone(),
            alt_ac: info.tx_ac.clone(),
            alt_aln_method: ALN_METHOD_TRANSCRIPT.to_string(),
            strand: 1,
            gc_offset: 0,
            cds_start_i,
            cds_end_i,
            tgt_len: info.lengths.iter().sum(),
            cigar_mapper: CigarMapper::new(&CigarString::default()),
        })
    }

    /// Convert a genomic (g.) interval to a transcript (n.) interval.
    ///
    /// The result is uncertain when an endpoint falls into an alignment
    /// gap.
    pub fn g_to_n(
        &self,
        g_interval: &GenomeInterval,
        strict_bounds: bool,
    ) -> Result<Mu<TxInterval>, Error> {
        let (begin, end) = match g_interval {
            GenomeInterval {
                start: Some(begin),
                end: Some(end),
            } => (*begin, *end),
            _ => return Err(Error::MissingPositions),
        };

        let grs = begin - 1 - self.gc_offset;
        let gre = end - 1 - self.gc_offset;

        // Forward-strand transcript positions first; flip below if needed.
        let frs = self
            .cigar_mapper
            .map_ref_to_tgt(grs, IntervalEnd::Start, strict_bounds)?;
        let fre = self
            .cigar_mapper
            .map_ref_to_tgt(gre, IntervalEnd::End, strict_bounds)?;

        let (frs, fre) = if self.strand == -1 {
            (
                CigarMapperResult {
                    pos: self.tgt_len - 1 - fre.pos,
                    offset: -fre.offset,
                    cigar_op: fre.cigar_op,
                },
                CigarMapperResult {
                    pos: self.tgt_len - 1 - frs.pos,
                    offset: -frs.offset,
                    cigar_op: frs.cigar_op,
                },
            )
        } else {
            (frs, fre)
        };

        let n_interval = TxInterval {
            start: TxPos {
                base: zbc_to_hgvs(frs.pos),
                offset: none_if_default(frs.offset),
            },
            end: TxPos {
                base: zbc_to_hgvs(fre.pos),
                offset: none_if_default(fre.offset),
            },
        };
        let certain = !matches!(frs.cigar_op, CigarOp::Del | CigarOp::Ins)
            && !matches!(fre.cigar_op, CigarOp::Del | CigarOp::Ins);
        Ok(Mu::from(n_interval, certain))
    }

    /// Convert a transcript (n.) interval to a genomic (g.) interval.
    pub fn n_to_g(
        &self,
        n_interval: &TxInterval,
        strict_bounds: bool,
    ) -> Result<Mu<GenomeInterval>, Error> {
        let frs = hgvs_to_zbc(n_interval.start.base);
        let start_offset = n_interval.start.offset.unwrap_or(0);
        let fre = hgvs_to_zbc(n_interval.end.base);
        let end_offset = n_interval.end.offset.unwrap_or(0);

        let (fre, frs, start_offset, end_offset) = if self.strand == -1 {
            (
                self.tgt_len - 1 - frs,
                self.tgt_len - 1 - fre,
                -end_offset,
                -start_offset,
            )
        } else {
            (fre, frs, start_offset, end_offset)
        };

        let grs = self
            .cigar_mapper
            .map_tgt_to_ref(frs, IntervalEnd::Start, strict_bounds)?;
        let gre = self
            .cigar_mapper
            .map_tgt_to_ref(fre, IntervalEnd::End, strict_bounds)?;
        let (gs, ge) = (
            grs.pos + self.gc_offset + 1 + start_offset,
            gre.pos + self.gc_offset + 1 + end_offset,
        );

        let certain = !matches!(grs.cigar_op, CigarOp::Del | CigarOp::Ins)
            && !matches!(gre.cigar_op, CigarOp::Del | CigarOp::Ins);
        Ok(Mu::from(
            GenomeInterval {
                start: Some(gs),
                end: Some(ge),
            },
            certain,
        ))
    }

    fn pos_n_to_c(&self, pos: &TxPos, cds_start_i: i32, cds_end_i: i32) -> CdsPos {
        if pos.base <= cds_start_i {
            CdsPos {
                base: pos.base - cds_start_i - i32::from(pos.base > 0),
                offset: pos.offset,
                cds_from: CdsFrom::Start,
            }
        } else if pos.base <= cds_end_i {
            CdsPos {
                base: pos.base - cds_start_i,
                offset: pos.offset,
                cds_from: CdsFrom::Start,
            }
        } else {
            CdsPos {
                base: pos.base - cds_end_i,
                offset: pos.offset,
                cds_from: CdsFrom::End,
            }
        }
    }

    /// Convert a transcript (n.) interval to a CDS (c.) interval.
    pub fn n_to_c(
        &self,
        n_interval: &TxInterval,
        strict_bounds: bool,
    ) -> Result<CdsInterval, Error> {
        let (cds_start_i, cds_end_i) = self.cds_bounds()?;

        if strict_bounds && (n_interval.start.base <= 0 || n_interval.end.base > self.tgt_len)
        {
            return Err(Error::OutOfBounds(n_interval.start.base, self.tgt_len));
        }

        Ok(CdsInterval {
            start: self.pos_n_to_c(&n_interval.start, cds_start_i, cds_end_i),
            end: self.pos_n_to_c(&n_interval.end, cds_start_i, cds_end_i),
        })
    }

    fn pos_c_to_n(
        &self,
        pos: &CdsPos,
        cds_start_i: i32,
        cds_end_i: i32,
        strict_bounds: bool,
    ) -> Result<TxPos, Error> {
        let n = match pos.cds_from {
            CdsFrom::Start => {
                let n = pos.base + cds_start_i;
                // correct for lack of c.0
                if pos.base < 0 {
                    n + 1
                } else {
                    n
                }
            }
            CdsFrom::End => pos.base + cds_end_i,
        };

        // correct for lack of n.0
        let n = if n <= 0 { n - 1 } else { n };

        if strict_bounds && (n <= 0 || n > self.tgt_len) {
            Err(Error::OutOfBounds(n, self.tgt_len))
        } else {
            Ok(TxPos {
                base: n,
                offset: pos.offset,
            })
        }
    }

    /// Convert a CDS (c.) interval to a transcript (n.) interval.
    pub fn c_to_n(
        &self,
        c_interval: &CdsInterval,
        strict_bounds: bool,
    ) -> Result<TxInterval, Error> {
        let (cds_start_i, cds_end_i) = self.cds_bounds()?;
        Ok(TxInterval {
            start: self.pos_c_to_n(&c_interval.start, cds_start_i, cds_end_i, strict_bounds)?,
            end: self.pos_c_to_n(&c_interval.end, cds_start_i, cds_end_i, strict_bounds)?,
        })
    }

    /// Convert a genomic (g.) interval to a CDS (c.) interval.
    pub fn g_to_c(
        &self,
        g_interval: &GenomeInterval,
        strict_bounds: bool,
    ) -> Result<Mu<CdsInterval>, Error> {
        let n_interval = self.g_to_n(g_interval, strict_bounds)?;
        Ok(match &n_interval {
            Mu::Certain(n_interval) => Mu::Certain(self.n_to_c(n_interval, strict_bounds)?),
            Mu::Uncertain(n_interval) => Mu::Uncertain(self.n_to_c(n_interval, strict_bounds)?),
        })
    }

    /// Convert a CDS (c.) interval to a genomic (g.) interval.
    pub fn c_to_g(
        &self,
        c_interval: &CdsInterval,
        strict_bounds: bool,
    ) -> Result<Mu<GenomeInterval>, Error> {
        let n_interval = self.c_to_n(c_interval, strict_bounds)?;
        self.n_to_g(&n_interval, strict_bounds)
    }

    fn cds_bounds(&self) -> Result<(i32, i32), Error> {
        match (self.cds_start_i, self.cds_end_i) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(Error::NoCds(self.tx_ac.clone())),
        }
    }

    /// Whether the transcript is coding.
    pub fn is_coding_transcript(&self) -> bool {
        self.cds_start_i.is_some()
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
