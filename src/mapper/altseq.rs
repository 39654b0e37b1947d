//! Protein-level consequence prediction.
//!
//! Given a CDS variant and the transcript sequence, build the altered
//! transcript, translate both reading frames, and classify the difference
//! as a protein edit.  The reverse direction infers a plausible CDS
//! change for a protein edit; it is inherently ambiguous and uses the
//! lexicographically smallest codon as the canonical choice.

use crate::data::interface::Provider;
use crate::mapper::error::Error;
use crate::parser::{
    CdsFrom, CdsInterval, CdsLocEdit, CdsPos, Mu, NaEdit, ProtInterval, ProtLocEdit, ProtPos,
    ProteinEdit, UncertainLengthChange,
};
use crate::sequences::{
    codons_for_aa, normalize_dna, revcomp, translate_cds, trim_common_prefixes,
    trim_common_suffixes,
};

/// Reference sequences needed for protein-level work on one transcript.
#[derive(Debug, Clone)]
pub struct RefTranscriptData {
    /// Transcript accession.
    pub tx_ac: String,
    /// Protein accession.
    pub protein_ac: String,
    /// Full transcript sequence, normalized to upper-case DNA.
    pub tx_seq: String,
    /// Start of the CDS on the transcript, interbase.
    pub cds_start_i: usize,
    /// End of the CDS on the transcript, interbase.
    pub cds_end_i: usize,
    /// Translated CDS, with `*` for the terminal stop.
    pub aa_seq: String,
}

impl RefTranscriptData {
    /// Fetch sequences for `tx_ac` from the provider.
    pub fn new(provider: &dyn Provider, tx_ac: &str) -> Result<Self, Error> {
        let identity = provider.get_tx_identity_info(tx_ac)?;
        if identity.cds_start_i < 0 || identity.cds_end_i < 0 {
            return Err(Error::NoCds(tx_ac.to_string()));
        }
        let (cds_start_i, cds_end_i) =
            (identity.cds_start_i as usize, identity.cds_end_i as usize);

        let protein_ac = provider
            .get_pro_ac_for_tx_ac(tx_ac)?
            .ok_or_else(|| Error::NoProteinAccession(tx_ac.to_string()))?;
        let tx_seq = normalize_dna(&provider.get_seq(tx_ac)?);

        if cds_end_i > tx_seq.len() || (cds_end_i - cds_start_i) % 3 != 0 {
            return Err(Error::CdsLengthInvalid(
                tx_ac.to_string(),
                cds_end_i.saturating_sub(cds_start_i),
            ));
        }
        let aa_seq = translate_cds(&tx_seq[cds_start_i..cds_end_i])?;

        Ok(Self {
            tx_ac: tx_ac.to_string(),
            protein_ac,
            tx_seq,
            cds_start_i,
            cds_end_i,
            aa_seq,
        })
    }

    /// The reference codon for the 0-based protein position.
    fn codon(&self, idx: usize) -> Result<&str, Error> {
        let begin = self.cds_start_i + 3 * idx;
        if begin + 3 > self.cds_end_i {
            return Err(Error::CannotProjectProtein(format!(
                "codon {} is outside the CDS of {}",
                idx + 1,
                self.tx_ac
            )));
        }
        Ok(&self.tx_seq[begin..begin + 3])
    }

    /// Translate the 0-based transcript index of a CDS position.
    fn tx_index(&self, pos: &CdsPos) -> Result<usize, Error> {
        let idx = match pos.cds_from {
            CdsFrom::Start => {
                if pos.base > 0 {
                    self.cds_start_i as i64 + pos.base as i64 - 1
                } else {
                    self.cds_start_i as i64 + pos.base as i64
                }
            }
            CdsFrom::End => self.cds_end_i as i64 + pos.base as i64 - 1,
        };
        if idx < 0 || idx as usize >= self.tx_seq.len() {
            return Err(Error::OutOfBounds(idx as i32, self.tx_seq.len() as i32));
        }
        Ok(idx as usize)
    }
}

/// Apply a nucleic acid edit spanning `[start, end)` of `seq`.
fn apply_edit(seq: &str, start: usize, end: usize, edit: &NaEdit) -> String {
    match edit {
        NaEdit::RefAlt { alternative, .. } => {
            format!("{}{}{}", &seq[..start], alternative, &seq[end..])
        }
        NaEdit::DelRef { .. } | NaEdit::DelNum { .. } => {
            format!("{}{}", &seq[..start], &seq[end..])
        }
        NaEdit::Ins { alternative } => {
            // The location is the two flanking bases.
            format!("{}{}{}", &seq[..start + 1], alternative, &seq[start + 1..])
        }
        NaEdit::Dup { .. } => {
            format!("{}{}{}", &seq[..end], &seq[start..end], &seq[end..])
        }
        NaEdit::InvRef { .. } | NaEdit::InvNum { .. } => {
            format!("{}{}{}", &seq[..start], revcomp(&seq[start..end]), &seq[end..])
        }
        NaEdit::Ident { .. } => seq.to_string(),
    }
}

/// Truncate an amino acid sequence after its first stop.
fn clip_at_stop(seq: &str) -> &str {
    match seq.find('*') {
        Some(idx) => &seq[..=idx],
        None => seq,
    }
}

fn prot_pos(aa_seq: &str, idx: usize) -> ProtPos {
    ProtPos {
        aa: aa_seq
            .get(idx..idx + 1)
            .unwrap_or("?")
            .to_string(),
        number: idx as i32 + 1,
    }
}

fn ordinary(loc: ProtInterval, edit: ProteinEdit) -> ProtLocEdit {
    // Predicted consequences are uncertain by convention.
    ProtLocEdit::Ordinary {
        loc: Mu::Uncertain(loc),
        edit: Mu::Uncertain(edit),
    }
}

/// Predict the protein-level change of a CDS variant.
pub fn predict_protein_change(
    data: &RefTranscriptData,
    loc_edit: &CdsLocEdit,
) -> Result<ProtLocEdit, Error> {
    let loc = loc_edit.loc.inner();
    let edit = loc_edit.edit.inner();

    // Intronic positions have no defined effect on the protein.
    if loc.start.offset.unwrap_or(0) != 0 || loc.end.offset.unwrap_or(0) != 0 {
        return Ok(ProtLocEdit::Unknown);
    }

    let start = data.tx_index(&loc.start)?;
    let end = data.tx_index(&loc.end)? + 1;

    // Insertions act at a point between the flanking bases.
    let (eff_start, eff_end) = if matches!(edit, NaEdit::Ins { .. }) {
        (start + 1, start + 1)
    } else {
        (start, end)
    };

    if eff_end <= data.cds_start_i || eff_start >= data.cds_end_i {
        return Ok(ProtLocEdit::NoChange);
    }
    if matches!(edit, NaEdit::Ident { .. }) {
        return Ok(ProtLocEdit::NoChange);
    }
    if eff_start < data.cds_start_i + 3 {
        return Ok(ProtLocEdit::InitiationUncertain);
    }

    let alt_seq = apply_edit(&data.tx_seq, start, end, edit);
    let alt_tail = &alt_seq[data.cds_start_i..];
    let alt_frame_len = alt_tail.len() - alt_tail.len() % 3;
    let alt_aa = translate_cds(&alt_tail[..alt_frame_len])?;

    let ref_aa = clip_at_stop(&data.aa_seq);
    let alt_aa = clip_at_stop(&alt_aa);

    if ref_aa == alt_aa {
        // Synonymous; report the codon holding the first changed base.
        let codon_idx = (eff_start - data.cds_start_i) / 3;
        let pos = prot_pos(ref_aa, codon_idx.min(ref_aa.len().saturating_sub(1)));
        return Ok(ordinary(
            ProtInterval {
                start: pos.clone(),
                end: pos,
            },
            ProteinEdit::Ident,
        ));
    }

    let frameshift = (alt_seq.len() as i64 - data.tx_seq.len() as i64) % 3 != 0;
    if frameshift {
        let ref_bytes = ref_aa.as_bytes();
        let alt_bytes = alt_aa.as_bytes();
        let mut idx = 0;
        while idx < ref_bytes.len() && idx < alt_bytes.len() && ref_bytes[idx] == alt_bytes[idx]
        {
            idx += 1;
        }
        if idx == 0 {
            return Ok(ProtLocEdit::InitiationUncertain);
        }
        let pos = prot_pos(ref_aa, idx);
        let alternative = alt_aa.get(idx..idx + 1).map(|s| s.to_string());
        if alternative.as_deref() == Some("*") {
            // The new frame stops immediately; that is a plain nonsense
            // substitution.
            return Ok(ordinary(
                ProtInterval {
                    start: pos.clone(),
                    end: pos,
                },
                ProteinEdit::Subst {
                    alternative: "*".to_string(),
                },
            ));
        }
        let length = match alt_aa[idx..].find('*') {
            Some(stop_offset) => UncertainLengthChange::Known(stop_offset as i32 + 1),
            None => UncertainLengthChange::Unknown,
        };
        return Ok(ordinary(
            ProtInterval {
                start: pos.clone(),
                end: pos,
            },
            ProteinEdit::Fs {
                alternative,
                terminal: Some("*".to_string()),
                length,
            },
        ));
    }

    // In-frame change; reduce to the minimal differing span.
    let (prefix, ref_rest, alt_rest) = trim_common_prefixes(ref_aa, alt_aa);
    let (_suffix, ref_mid, alt_mid) = trim_common_suffixes(&ref_rest, &alt_rest);

    if prefix == 0 && !ref_mid.is_empty() {
        return Ok(ProtLocEdit::InitiationUncertain);
    }

    Ok(if ref_mid.len() == 1 && alt_mid.len() == 1 {
        let pos = prot_pos(ref_aa, prefix);
        ordinary(
            ProtInterval {
                start: pos.clone(),
                end: pos,
            },
            ProteinEdit::Subst {
                alternative: alt_mid,
            },
        )
    } else if alt_mid.is_empty() {
        ordinary(
            ProtInterval {
                start: prot_pos(ref_aa, prefix),
                end: prot_pos(ref_aa, prefix + ref_mid.len() - 1),
            },
            ProteinEdit::Del,
        )
    } else if ref_mid.is_empty() {
        if prefix >= ref_aa.len() {
            return Ok(ProtLocEdit::Unknown);
        }
        ordinary(
            ProtInterval {
                start: prot_pos(ref_aa, prefix - 1),
                end: prot_pos(ref_aa, prefix),
            },
            ProteinEdit::Ins {
                alternative: alt_mid,
            },
        )
    } else {
        ordinary(
            ProtInterval {
                start: prot_pos(ref_aa, prefix),
                end: prot_pos(ref_aa, prefix + ref_mid.len() - 1),
            },
            ProteinEdit::DelIns {
                alternative: alt_mid,
            },
        )
    })
}

/// Pick a codon for `aa` that is closest to `reference`: first try a
/// single-base change, then fall back to the smallest codon.
fn candidate_codon(reference: &str, aa: char) -> Result<&'static str, Error> {
    let candidates = codons_for_aa(aa)?;
    for candidate in &candidates {
        let diff = candidate
            .bytes()
            .zip(reference.bytes())
            .filter(|(a, b)| a != b)
            .count();
        if diff == 1 {
            return Ok(candidate);
        }
    }
    candidates
        .into_iter()
        .find(|candidate| *candidate != reference)
        .ok_or_else(|| {
            Error::CannotProjectProtein(format!("no alternative codon encodes {aa}"))
        })
}

fn aa_char(pos_aa: &str) -> Result<char, Error> {
    pos_aa.chars().next().ok_or_else(|| {
        Error::CannotProjectProtein("empty amino acid in protein position".to_string())
    })
}

/// First-codon nucleotide rendition of a 1-letter amino acid sequence.
fn codons_for_seq(seq: &str) -> Result<String, Error> {
    let mut result = String::with_capacity(seq.len() * 3);
    for aa in seq.chars() {
        result.push_str(
            codons_for_aa(aa)?
                .first()
                .ok_or_else(|| {
                    Error::CannotProjectProtein(format!("no codon encodes {aa}"))
                })?,
        );
    }
    Ok(result)
}

fn cds_pos(base: i32) -> CdsPos {
    CdsPos {
        base,
        offset: None,
        cds_from: CdsFrom::Start,
    }
}

fn cds_loc_edit(start: i32, end: i32, edit: NaEdit) -> CdsLocEdit {
    CdsLocEdit {
        loc: Mu::Certain(CdsInterval {
            start: cds_pos(start),
            end: cds_pos(end),
        }),
        edit: Mu::Certain(edit),
    }
}

/// Infer a CDS change that would produce the given protein edit.
///
/// The result is one representative of many possible changes; frameshift
/// and special forms cannot be projected.
pub fn infer_cds_change(
    data: &RefTranscriptData,
    loc_edit: &ProtLocEdit,
) -> Result<CdsLocEdit, Error> {
    let (loc, edit) = match loc_edit {
        ProtLocEdit::Ordinary { loc, edit } => (loc.inner(), edit.inner()),
        other => {
            return Err(Error::CannotProjectProtein(format!(
                "special form {other} has no unique coding change"
            )))
        }
    };

    let start_idx = loc.start.number - 1;
    let end_idx = loc.end.number - 1;
    if start_idx < 0 || end_idx < start_idx {
        return Err(Error::CannotProjectProtein(format!("invalid location {loc}")));
    }

    match edit {
        ProteinEdit::Subst { alternative } => {
            let reference = data.codon(start_idx as usize)?;
            let candidate = candidate_codon(reference, aa_char(alternative)?)?;
            let diffs: Vec<usize> = (0..3)
                .filter(|&k| candidate.as_bytes()[k] != reference.as_bytes()[k])
                .collect();
            if diffs.len() == 1 {
                let k = diffs[0];
                Ok(cds_loc_edit(
                    3 * start_idx + k as i32 + 1,
                    3 * start_idx + k as i32 + 1,
                    NaEdit::RefAlt {
                        reference: reference[k..k + 1].to_string(),
                        alternative: candidate[k..k + 1].to_string(),
                    },
                ))
            } else {
                Ok(cds_loc_edit(
                    3 * start_idx + 1,
                    3 * start_idx + 3,
                    NaEdit::RefAlt {
                        reference: reference.to_string(),
                        alternative: candidate.to_string(),
                    },
                ))
            }
        }
        ProteinEdit::Ident => {
            let reference = data.codon(start_idx as usize)?;
            let candidate = candidate_codon(reference, aa_char(&loc.start.aa)?)?;
            let diffs: Vec<usize> = (0..3)
                .filter(|&k| candidate.as_bytes()[k] != reference.as_bytes()[k])
                .collect();
            let k = *diffs.first().ok_or_else(|| {
                Error::CannotProjectProtein(format!(
                    "codon for {} is already canonical",
                    loc.start
                ))
            })?;
            if diffs.len() == 1 {
                Ok(cds_loc_edit(
                    3 * start_idx + k as i32 + 1,
                    3 * start_idx + k as i32 + 1,
                    NaEdit::RefAlt {
                        reference: reference[k..k + 1].to_string(),
                        alternative: candidate[k..k + 1].to_string(),
                    },
                ))
            } else {
                Ok(cds_loc_edit(
                    3 * start_idx + 1,
                    3 * start_idx + 3,
                    NaEdit::RefAlt {
                        reference: reference.to_string(),
                        alternative: candidate.to_string(),
                    },
                ))
            }
        }
        ProteinEdit::Del => Ok(cds_loc_edit(
            3 * start_idx + 1,
            3 * end_idx + 3,
            NaEdit::DelRef {
                reference: String::new(),
            },
        )),
        ProteinEdit::Dup => Ok(cds_loc_edit(
            3 * start_idx + 1,
            3 * end_idx + 3,
            NaEdit::Dup {
                reference: String::new(),
            },
        )),
        ProteinEdit::Ins { alternative } => Ok(cds_loc_edit(
            3 * loc.start.number,
            3 * loc.start.number + 1,
            NaEdit::Ins {
                alternative: codons_for_seq(alternative)?,
            },
        )),
        ProteinEdit::DelIns { alternative } => Ok(cds_loc_edit(
            3 * start_idx + 1,
            3 * end_idx + 3,
            NaEdit::RefAlt {
                reference: String::new(),
                alternative: codons_for_seq(alternative)?,
            },
        )),
        ProteinEdit::Fs { .. } => Err(Error::CannotProjectProtein(
            "frameshifts have no unique coding change".to_string(),
        )),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    /// 5' UTR of 5, six codons (MLKDA*), 3' UTR of 5.
    fn example() -> RefTranscriptData {
        let tx_seq = format!("ACGTT{}TTTTT", "ATGCTGAAAGATGCCTAA");
        RefTranscriptData {
            tx_ac: "NM_000001.1".to_string(),
            protein_ac: "NP_000001.1".to_string(),
            aa_seq: translate_cds(&tx_seq[5..23]).unwrap(),
            tx_seq,
            cds_start_i: 5,
            cds_end_i: 23,
        }
    }

    fn predict(expression: &str) -> ProtLocEdit {
        let data = example();
        let loc_edit = match format!("NM_000001.1:c.{expression}")
            .parse::<crate::parser::HgvsVariant>()
            .unwrap()
        {
            crate::parser::HgvsVariant::CdsVariant { loc_edit, .. } => loc_edit,
            _ => unreachable!(),
        };
        predict_protein_change(&data, &loc_edit).unwrap()
    }

    #[test]
    fn reference_data() {
        assert_eq!(example().aa_seq, "MLKDA*");
    }

    #[test]
    fn missense() {
        assert_eq!(format!("{}", predict("5T>C")), "(Leu2Pro)");
    }

    #[test]
    fn synonymous() {
        assert_eq!(format!("{}", predict("6G>A")), "(Leu2=)");
    }

    #[test]
    fn nonsense() {
        assert_eq!(format!("{}", predict("7A>T")), "(Lys3Ter)");
    }

    #[test]
    fn frameshift_del() {
        assert_eq!(format!("{}", predict("8del")), "(Asp4MetfsTer?)");
    }

    #[test]
    fn inframe_del() {
        assert_eq!(format!("{}", predict("4_6del")), "(Leu2del)");
    }

    #[test]
    fn utr_and_intron() {
        assert_eq!(predict("*2T>A"), ProtLocEdit::NoChange);
        assert_eq!(predict("-2A>G"), ProtLocEdit::NoChange);
        assert_eq!(predict("5+1G>A"), ProtLocEdit::Unknown);
    }

    #[test]
    fn start_loss() {
        assert_eq!(predict("2T>C"), ProtLocEdit::InitiationUncertain);
    }

    #[test]
    fn infer_substitution() {
        let data = example();
        let loc_edit = match "NP_000001.1:p.Leu2Pro"
            .parse::<crate::parser::HgvsVariant>()
            .unwrap()
        {
            crate::parser::HgvsVariant::ProtVariant { loc_edit, .. } => loc_edit,
            _ => unreachable!(),
        };
        let cds = infer_cds_change(&data, &loc_edit).unwrap();
        assert_eq!(format!("{cds}"), "5T>C");
    }

    #[test]
    fn infer_nonsense_and_del() {
        let data = example();

        let loc_edit = match "NP_000001.1:p.Lys3Ter"
            .parse::<crate::parser::HgvsVariant>()
            .unwrap()
        {
            crate::parser::HgvsVariant::ProtVariant { loc_edit, .. } => loc_edit,
            _ => unreachable!(),
        };
        assert_eq!(
            format!("{}", infer_cds_change(&data, &loc_edit).unwrap()),
            "7A>T"
        );

        let loc_edit = match "NP_000001.1:p.Leu2del"
            .parse::<crate::parser::HgvsVariant>()
            .unwrap()
        {
            crate::parser::HgvsVariant::ProtVariant { loc_edit, .. } => loc_edit,
            _ => unreachable!(),
        };
        assert_eq!(
            format!("{}", infer_cds_change(&data, &loc_edit).unwrap()),
            "4_6del"
        );
    }

    #[test]
    fn infer_frameshift_fails() {
        let data = example();
        let loc_edit = match "NP_000001.1:p.Asp4MetfsTer12"
            .parse::<crate::parser::HgvsVariant>()
            .unwrap()
        {
            crate::parser::HgvsVariant::ProtVariant { loc_edit, .. } => loc_edit,
            _ => unreachable!(),
        };
        assert!(infer_cds_change(&data, &loc_edit).is_err());
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
