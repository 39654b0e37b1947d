//! Implementation of parser building blocks.

/// Code for parsing nucleic acid sequences.
pub mod na {
    use nom::bytes::complete::{take_while, take_while1};
    use nom::IResult;

    pub static NA: &str = "ACGTN";

    pub fn is_na_char(c: char) -> bool {
        NA.contains(c)
    }

    /// Zero or more nucleic acid characters.
    pub fn na0(input: &str) -> IResult<&str, &str> {
        take_while(is_na_char)(input)
    }

    /// One or more nucleic acid characters.
    pub fn na1(input: &str) -> IResult<&str, &str> {
        take_while1(is_na_char)(input)
    }
}

/// Code for parsing amino acid residues.
pub mod protein {
    use nom::{
        bytes::complete::take,
        multi::many1,
        IResult,
    };

    pub static AAT1: &str = "ACDEFGHIKLMNPQRSTUVWXY*";

    pub fn aat1(input: &str) -> IResult<&str, &str> {
        let (rest, c) = take(1usize)(input)?;
        if !AAT1.contains(c) {
            Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Fail,
            )))
        } else {
            Ok((rest, c))
        }
    }

    pub fn aat11(input: &str) -> IResult<&str, Vec<&str>> {
        many1(aat1)(input)
    }

    pub const AAT3: &[&str] = &[
        "Ala", "Cys", "Asp", "Glu", "Phe", "Gly", "His", "Ile", "Lys", "Leu", "Met", "Asn", "Pro",
        "Gln", "Arg", "Ser", "Thr", "Val", "Trp", "Tyr", "Xaa", "Sec", "Ter",
    ];

    pub fn aat3(input: &str) -> IResult<&str, &str> {
        let (rest, triplet) = take(3usize)(input)?;
        if !AAT3.contains(&triplet) {
            Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Fail,
            )))
        } else {
            Ok((rest, triplet))
        }
    }

    pub fn aat31(input: &str) -> IResult<&str, Vec<&str>> {
        many1(aat3)(input)
    }

    /// Parse one amino acid in either convention, normalized to 1-letter.
    pub fn aa(input: &str) -> IResult<&str, String> {
        use nom::branch::alt;
        use nom::combinator::map;

        alt((
            map(aat3, |aa3| {
                crate::sequences::aa3_to_aa1(aa3).expect("checked against AAT3 above")
            }),
            map(aat1, str::to_string),
        ))(input)
    }

    /// Parse an amino acid sequence in either convention, normalized to
    /// 1-letter.
    pub fn aa_seq(input: &str) -> IResult<&str, String> {
        use nom::branch::alt;
        use nom::combinator::map;

        alt((
            map(aat31, |aas| {
                aas.iter()
                    .map(|aa3| crate::sequences::aa3_to_aa1(aa3).expect("checked against AAT3"))
                    .collect::<String>()
            }),
            map(aat11, |aas| aas.join("")),
        ))(input)
    }
}

/// Code for parsing nucleic acid edits.
pub mod na_edit {
    use nom::branch::alt;
    use nom::bytes::complete::tag;
    use nom::character::complete::{char, digit1};
    use nom::combinator::map_res;
    use nom::sequence::{preceded, separated_pair, tuple};
    use nom::IResult;

    use super::na::{na0, na1};
    use crate::parser::ds::NaEdit;

    pub fn ident(input: &str) -> IResult<&str, NaEdit> {
        let (rest, (reference, _)) = tuple((na0, char('=')))(input)?;
        Ok((
            rest,
            NaEdit::Ident {
                reference: reference.to_string(),
            },
        ))
    }

    pub fn subst(input: &str) -> IResult<&str, NaEdit> {
        let (rest, (reference, alternative)) =
            separated_pair(super::na_char, char('>'), super::na_char)(input)?;
        Ok((
            rest,
            NaEdit::RefAlt {
                reference: reference.to_string(),
                alternative: alternative.to_string(),
            },
        ))
    }

    pub fn delins(input: &str) -> IResult<&str, NaEdit> {
        let (rest, (_, reference, _, alternative)) =
            tuple((tag("del"), na0, tag("ins"), na1))(input)?;
        Ok((
            rest,
            NaEdit::RefAlt {
                reference: reference.to_string(),
                alternative: alternative.to_string(),
            },
        ))
    }

    pub fn del_num(input: &str) -> IResult<&str, NaEdit> {
        let (rest, count) = preceded(tag("del"), map_res(digit1, str::parse))(input)?;
        Ok((rest, NaEdit::DelNum { count }))
    }

    pub fn del_ref(input: &str) -> IResult<&str, NaEdit> {
        let (rest, reference) = preceded(tag("del"), na0)(input)?;
        Ok((
            rest,
            NaEdit::DelRef {
                reference: reference.to_string(),
            },
        ))
    }

    pub fn ins(input: &str) -> IResult<&str, NaEdit> {
        let (rest, alternative) = preceded(tag("ins"), na1)(input)?;
        Ok((
            rest,
            NaEdit::Ins {
                alternative: alternative.to_string(),
            },
        ))
    }

    pub fn dup(input: &str) -> IResult<&str, NaEdit> {
        let (rest, reference) = preceded(tag("dup"), na0)(input)?;
        Ok((
            rest,
            NaEdit::Dup {
                reference: reference.to_string(),
            },
        ))
    }

    pub fn inv_num(input: &str) -> IResult<&str, NaEdit> {
        let (rest, count) = preceded(tag("inv"), map_res(digit1, str::parse))(input)?;
        Ok((rest, NaEdit::InvNum { count }))
    }

    pub fn inv_ref(input: &str) -> IResult<&str, NaEdit> {
        let (rest, reference) = preceded(tag("inv"), na0)(input)?;
        Ok((
            rest,
            NaEdit::InvRef {
                reference: reference.to_string(),
            },
        ))
    }

    /// Parse any nucleic acid edit; longest-prefix forms first.
    pub fn na_edit(input: &str) -> IResult<&str, NaEdit> {
        alt((
            delins, del_num, del_ref, ins, dup, inv_num, inv_ref, subst, ident,
        ))(input)
    }
}

/// Parse a single nucleic acid character.
pub fn na_char(input: &str) -> nom::IResult<&str, char> {
    nom::character::complete::one_of(na::NA)(input)
}

/// Code for parsing protein edits.
pub mod protein_edit {
    use nom::branch::alt;
    use nom::bytes::complete::tag;
    use nom::character::complete::digit1;
    use nom::combinator::opt;
    use nom::sequence::pair;
    use nom::IResult;

    use super::protein::{aa, aa_seq};
    use crate::parser::ds::{ProteinEdit, UncertainLengthChange};

    pub fn fs(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, alternative) = opt(aa)(input)?;
        let (rest, (_, terminal)) =
            pair(tag("fs"), opt(alt((tag("Ter"), tag("X"), tag("*")))))(rest)?;

        if terminal.is_none() {
            return Ok((
                rest,
                ProteinEdit::Fs {
                    alternative,
                    terminal: None,
                    length: UncertainLengthChange::None,
                },
            ));
        }

        let (rest, count) = opt(digit1)(rest)?;
        if let Some(count) = count {
            Ok((
                rest,
                ProteinEdit::Fs {
                    alternative,
                    terminal: Some("*".to_string()),
                    length: UncertainLengthChange::Known(
                        count.parse().expect("digit1 yields valid integer"),
                    ),
                },
            ))
        } else {
            let (rest, qm) = opt(tag("?"))(rest)?;
            Ok((
                rest,
                ProteinEdit::Fs {
                    alternative,
                    terminal: Some("*".to_string()),
                    length: if qm.is_some() {
                        UncertainLengthChange::Unknown
                    } else {
                        UncertainLengthChange::None
                    },
                },
            ))
        }
    }

    pub fn ident(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, _) = tag("=")(input)?;
        Ok((rest, ProteinEdit::Ident))
    }

    pub fn subst_qm(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, _) = tag("?")(input)?;
        Ok((
            rest,
            ProteinEdit::Subst {
                alternative: "?".to_string(),
            },
        ))
    }

    pub fn subst_aa(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, alternative) = aa(input)?;
        Ok((rest, ProteinEdit::Subst { alternative }))
    }

    pub fn delins(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, (_, alternative)) = pair(tag("delins"), aa_seq)(input)?;
        Ok((rest, ProteinEdit::DelIns { alternative }))
    }

    pub fn del(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, _) = tag("del")(input)?;
        Ok((rest, ProteinEdit::Del))
    }

    pub fn ins(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, (_, alternative)) = pair(tag("ins"), aa_seq)(input)?;
        Ok((rest, ProteinEdit::Ins { alternative }))
    }

    pub fn dup(input: &str) -> IResult<&str, ProteinEdit> {
        let (rest, _) = tag("dup")(input)?;
        Ok((rest, ProteinEdit::Dup))
    }

    /// Parse any protein edit; longest-prefix forms first.
    pub fn protein_edit(input: &str) -> IResult<&str, ProteinEdit> {
        alt((fs, delins, del, ins, dup, ident, subst_qm, subst_aa))(input)
    }
}

/// Code for parsing locations in the various coordinate systems.
pub mod loc {
    use nom::branch::alt;
    use nom::character::complete::{char, digit1};
    use nom::combinator::{map, map_res, opt};
    use nom::sequence::{pair, preceded, tuple};
    use nom::IResult;

    use super::protein::aa;
    use crate::parser::ds::{
        CdsFrom, CdsInterval, CdsPos, GenomeInterval, ProtInterval, ProtPos, TxInterval, TxPos,
    };

    fn num(input: &str) -> IResult<&str, i32> {
        map_res(digit1, str::parse)(input)
    }

    /// Signed base position; HGVS has no position 0.
    fn signed_num(input: &str) -> IResult<&str, i32> {
        let (rest, (sign, value)) = pair(opt(char('-')), num)(input)?;
        Ok((rest, if sign.is_some() { -value } else { value }))
    }

    /// Intron offset, e.g., `+1` or `-12`.
    fn offset(input: &str) -> IResult<&str, i32> {
        let (rest, (sign, value)) = pair(alt((char('+'), char('-'))), num)(input)?;
        Ok((rest, if sign == '-' { -value } else { value }))
    }

    pub fn genome_pos(input: &str) -> IResult<&str, Option<i32>> {
        alt((map(char('?'), |_| None), map(num, Some)))(input)
    }

    pub fn genome_interval(input: &str) -> IResult<&str, GenomeInterval> {
        let (rest, (start, end)) = pair(genome_pos, opt(preceded(char('_'), genome_pos)))(input)?;
        Ok((
            rest,
            GenomeInterval {
                start,
                end: end.unwrap_or(start),
            },
        ))
    }

    pub fn tx_pos(input: &str) -> IResult<&str, TxPos> {
        let (rest, (base, offset)) = pair(signed_num, opt(offset))(input)?;
        Ok((rest, TxPos { base, offset }))
    }

    pub fn tx_interval(input: &str) -> IResult<&str, TxInterval> {
        let (rest, (start, end)) = pair(tx_pos, opt(preceded(char('_'), tx_pos)))(input)?;
        let end = end.unwrap_or_else(|| start.clone());
        Ok((rest, TxInterval { start, end }))
    }

    pub fn cds_pos(input: &str) -> IResult<&str, CdsPos> {
        let (rest, star) = opt(char('*'))(input)?;
        let (rest, base) = if star.is_some() {
            num(rest)?
        } else {
            signed_num(rest)?
        };
        let (rest, offset) = opt(offset)(rest)?;
        Ok((
            rest,
            CdsPos {
                base,
                offset,
                cds_from: if star.is_some() {
                    CdsFrom::End
                } else {
                    CdsFrom::Start
                },
            },
        ))
    }

    pub fn cds_interval(input: &str) -> IResult<&str, CdsInterval> {
        let (rest, (start, end)) = pair(cds_pos, opt(preceded(char('_'), cds_pos)))(input)?;
        let end = end.unwrap_or_else(|| start.clone());
        Ok((rest, CdsInterval { start, end }))
    }

    pub fn prot_pos(input: &str) -> IResult<&str, ProtPos> {
        let (rest, (aa, number)) = tuple((aa, num))(input)?;
        Ok((rest, ProtPos { aa, number }))
    }

    pub fn prot_interval(input: &str) -> IResult<&str, ProtInterval> {
        let (rest, (start, end)) = pair(prot_pos, opt(preceded(char('_'), prot_pos)))(input)?;
        let end = end.unwrap_or_else(|| start.clone());
        Ok((rest, ProtInterval { start, end }))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::ds::*;

    #[test]
    fn na_edit_forms() {
        assert_eq!(
            na_edit::na_edit("C>A"),
            Ok((
                "",
                NaEdit::RefAlt {
                    reference: "C".to_string(),
                    alternative: "A".to_string()
                }
            ))
        );
        assert_eq!(
            na_edit::na_edit("del"),
            Ok((
                "",
                NaEdit::DelRef {
                    reference: "".to_string()
                }
            ))
        );
        assert_eq!(na_edit::na_edit("del3"), Ok(("", NaEdit::DelNum { count: 3 })));
        assert_eq!(
            na_edit::na_edit("delACGinsTT"),
            Ok((
                "",
                NaEdit::RefAlt {
                    reference: "ACG".to_string(),
                    alternative: "TT".to_string()
                }
            ))
        );
        assert_eq!(
            na_edit::na_edit("insT"),
            Ok((
                "",
                NaEdit::Ins {
                    alternative: "T".to_string()
                }
            ))
        );
        assert_eq!(
            na_edit::na_edit("dup"),
            Ok((
                "",
                NaEdit::Dup {
                    reference: "".to_string()
                }
            ))
        );
        assert_eq!(na_edit::na_edit("inv4"), Ok(("", NaEdit::InvNum { count: 4 })));
        assert_eq!(
            na_edit::na_edit("="),
            Ok((
                "",
                NaEdit::Ident {
                    reference: "".to_string()
                }
            ))
        );
    }

    #[test]
    fn protein_edit_forms() {
        assert_eq!(
            protein_edit::protein_edit("Arg"),
            Ok((
                "",
                ProteinEdit::Subst {
                    alternative: "R".to_string()
                }
            ))
        );
        assert_eq!(
            protein_edit::protein_edit("fsTer10"),
            Ok((
                "",
                ProteinEdit::Fs {
                    alternative: None,
                    terminal: Some("*".to_string()),
                    length: UncertainLengthChange::Known(10)
                }
            ))
        );
        assert_eq!(
            protein_edit::protein_edit("ArgfsTer?"),
            Ok((
                "",
                ProteinEdit::Fs {
                    alternative: Some("R".to_string()),
                    terminal: Some("*".to_string()),
                    length: UncertainLengthChange::Unknown
                }
            ))
        );
        assert_eq!(
            protein_edit::protein_edit("delinsLeuTer"),
            Ok((
                "",
                ProteinEdit::DelIns {
                    alternative: "L*".to_string()
                }
            ))
        );
    }

    #[test]
    fn loc_forms() {
        assert_eq!(
            loc::genome_interval("123_456"),
            Ok((
                "",
                GenomeInterval {
                    start: Some(123),
                    end: Some(456)
                }
            ))
        );
        assert_eq!(
            loc::genome_interval("?_456"),
            Ok((
                "",
                GenomeInterval {
                    start: None,
                    end: Some(456)
                }
            ))
        );
        assert_eq!(
            loc::tx_interval("34+1"),
            Ok((
                "",
                TxInterval {
                    start: TxPos {
                        base: 34,
                        offset: Some(1)
                    },
                    end: TxPos {
                        base: 34,
                        offset: Some(1)
                    },
                }
            ))
        );
        assert_eq!(
            loc::cds_interval("-21+1_-20-1"),
            Ok((
                "",
                CdsInterval {
                    start: CdsPos {
                        base: -21,
                        offset: Some(1),
                        cds_from: CdsFrom::Start
                    },
                    end: CdsPos {
                        base: -20,
                        offset: Some(-1),
                        cds_from: CdsFrom::Start
                    },
                }
            ))
        );
        assert_eq!(
            loc::cds_interval("*68"),
            Ok((
                "",
                CdsInterval {
                    start: CdsPos {
                        base: 68,
                        offset: None,
                        cds_from: CdsFrom::End
                    },
                    end: CdsPos {
                        base: 68,
                        offset: None,
                        cds_from: CdsFrom::End
                    },
                }
            ))
        );
        assert_eq!(
            loc::prot_interval("Leu25"),
            Ok((
                "",
                ProtInterval {
                    start: ProtPos {
                        aa: "L".to_string(),
                        number: 25
                    },
                    end: ProtPos {
                        aa: "L".to_string(),
                        number: 25
                    },
                }
            ))
        );
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
