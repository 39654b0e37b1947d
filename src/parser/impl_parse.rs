//! Implementation of parsing into the data structures.

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alphanumeric1, char, one_of},
    combinator::{all_consuming, map, opt},
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::parser::ds::*;
use crate::parser::error::Error;
use crate::parser::parse_funcs::*;
use crate::validator::Validateable;

/// Wrap a parser such that a parenthesized match yields `Mu::Uncertain`.
fn mu<'a, T>(
    parser: fn(&'a str) -> IResult<&'a str, T>,
) -> impl FnMut(&'a str) -> IResult<&'a str, Mu<T>> {
    move |input| {
        if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('(')(input) {
            let (rest, value) = parser(rest)?;
            let (rest, _) = char(')')(rest)?;
            Ok((rest, Mu::Uncertain(value)))
        } else {
            let (rest, value) = parser(input)?;
            Ok((rest, Mu::Certain(value)))
        }
    }
}

impl Accession {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let parser_accession = tuple((
            alphanumeric1,
            opt(pair(char('_'), alphanumeric1)),
            opt(pair(char('.'), alphanumeric1)),
        ));

        let mut parser = map(parser_accession, |(a, b, c)| {
            let mut value = String::from(a);
            if let Some((sep, b)) = b {
                value.push(sep);
                value.push_str(b);
            }
            if let Some((sep, c)) = c {
                value.push(sep);
                value.push_str(c);
            }
            Self { value }
        });

        parser(input)
    }
}

impl GeneSymbol {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        map(alphanumeric1, |symbol: &str| Self {
            value: symbol.to_string(),
        })(input)
    }
}

impl GenomeLocEdit {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (rest, loc) = mu(loc::genome_interval)(input)?;
        let (rest, edit) = mu(na_edit::na_edit)(rest)?;
        Ok((rest, Self { loc, edit }))
    }
}

impl TxLocEdit {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (rest, loc) = mu(loc::tx_interval)(input)?;
        let (rest, edit) = mu(na_edit::na_edit)(rest)?;
        Ok((rest, Self { loc, edit }))
    }
}

impl CdsLocEdit {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (rest, loc) = mu(loc::cds_interval)(input)?;
        let (rest, edit) = mu(na_edit::na_edit)(rest)?;
        Ok((rest, Self { loc, edit }))
    }
}

impl ProtLocEdit {
    fn parse_ordinary(input: &str) -> IResult<&str, Self> {
        let (rest, loc) = loc::prot_interval(input)?;
        let (rest, edit) = protein_edit::protein_edit(rest)?;
        Ok((
            rest,
            ProtLocEdit::Ordinary {
                loc: Mu::Certain(loc),
                edit: Mu::Certain(edit),
            },
        ))
    }

    fn parse_ordinary_uncertain(input: &str) -> IResult<&str, Self> {
        let (rest, (loc, edit)) = delimited(
            char('('),
            pair(loc::prot_interval, protein_edit::protein_edit),
            char(')'),
        )(input)?;
        Ok((
            rest,
            ProtLocEdit::Ordinary {
                loc: Mu::Uncertain(loc),
                edit: Mu::Uncertain(edit),
            },
        ))
    }

    pub fn parse(input: &str) -> IResult<&str, Self> {
        alt((
            map(tag("Met1?"), |_| ProtLocEdit::InitiationUncertain),
            map(tag("(=)"), |_| ProtLocEdit::NoChangeUncertain),
            map(tag("="), |_| ProtLocEdit::NoChange),
            map(tag("0?"), |_| ProtLocEdit::NoProteinUncertain),
            map(tag("0"), |_| ProtLocEdit::NoProtein),
            Self::parse_ordinary_uncertain,
            Self::parse_ordinary,
            map(tag("?"), |_| ProtLocEdit::Unknown),
        ))(input)
    }
}

impl HgvsVariant {
    /// Parse a variant expression; does not perform structural validation.
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (rest, accession) = Accession::parse(input)?;
        let (rest, gene_symbol) =
            opt(delimited(char('('), GeneSymbol::parse, char(')')))(rest)?;
        let (rest, _) = char(':')(rest)?;
        let (rest, system) = one_of("gncp")(rest)?;
        let (rest, _) = char('.')(rest)?;

        match system {
            'g' => {
                let (rest, loc_edit) = GenomeLocEdit::parse(rest)?;
                Ok((
                    rest,
                    HgvsVariant::GenomeVariant {
                        accession,
                        gene_symbol,
                        loc_edit,
                    },
                ))
            }
            'n' => {
                let (rest, loc_edit) = TxLocEdit::parse(rest)?;
                Ok((
                    rest,
                    HgvsVariant::TxVariant {
                        accession,
                        gene_symbol,
                        loc_edit,
                    },
                ))
            }
            'c' => {
                let (rest, loc_edit) = CdsLocEdit::parse(rest)?;
                Ok((
                    rest,
                    HgvsVariant::CdsVariant {
                        accession,
                        gene_symbol,
                        loc_edit,
                    },
                ))
            }
            'p' => {
                let (rest, loc_edit) = ProtLocEdit::parse(rest)?;
                Ok((
                    rest,
                    HgvsVariant::ProtVariant {
                        accession,
                        gene_symbol,
                        loc_edit,
                    },
                ))
            }
            _ => Err(nom::Err::Error(nom::error::Error::new(
                rest,
                nom::error::ErrorKind::OneOf,
            ))),
        }
    }
}

/// Extract the unparsed remainder from a nom error for offset reporting.
fn nom_rest<'a>(input: &'a str, err: &nom::Err<nom::error::Error<&'a str>>) -> &'a str {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
        nom::Err::Incomplete(_) => input,
    }
}

impl FromStr for HgvsVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, variant) = all_consuming(Self::parse)(s)
            .map_err(|e| Error::syntax(s, nom_rest(s, &e), "variant expression"))?;
        variant.validate()?;
        Ok(variant)
    }
}

impl FromStr for GenomeInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(loc::genome_interval)(s)
            .map(|(_, interval)| interval)
            .map_err(|e| Error::syntax(s, nom_rest(s, &e), "genome interval"))
    }
}

impl FromStr for TxInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(loc::tx_interval)(s)
            .map(|(_, interval)| interval)
            .map_err(|e| Error::syntax(s, nom_rest(s, &e), "transcript interval"))
    }
}

impl FromStr for CdsInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(loc::cds_interval)(s)
            .map(|(_, interval)| interval)
            .map_err(|e| Error::syntax(s, nom_rest(s, &e), "CDS interval"))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use crate::parser::ds::*;

    #[test]
    fn parse_genome_substitution() -> Result<(), anyhow::Error> {
        let variant = HgvsVariant::from_str("NC_000011.9:g.118898437G>T")?;
        assert_eq!(
            variant,
            HgvsVariant::GenomeVariant {
                accession: Accession::new("NC_000011.9"),
                gene_symbol: None,
                loc_edit: GenomeLocEdit {
                    loc: Mu::Certain(GenomeInterval {
                        start: Some(118898437),
                        end: Some(118898437),
                    }),
                    edit: Mu::Certain(NaEdit::RefAlt {
                        reference: "G".to_string(),
                        alternative: "T".to_string(),
                    }),
                },
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cds_deletion() -> Result<(), anyhow::Error> {
        let variant = HgvsVariant::from_str("NM_000302.3:c.1594_1596del")?;
        assert_eq!(
            variant,
            HgvsVariant::CdsVariant {
                accession: Accession::new("NM_000302.3"),
                gene_symbol: None,
                loc_edit: CdsLocEdit {
                    loc: Mu::Certain(CdsInterval {
                        start: CdsPos {
                            base: 1594,
                            offset: None,
                            cds_from: CdsFrom::Start,
                        },
                        end: CdsPos {
                            base: 1596,
                            offset: None,
                            cds_from: CdsFrom::Start,
                        },
                    }),
                    edit: Mu::Certain(NaEdit::DelRef {
                        reference: "".to_string()
                    }),
                },
            }
        );
        Ok(())
    }

    #[test]
    fn parse_with_gene_symbol() -> Result<(), anyhow::Error> {
        let variant = HgvsVariant::from_str("NM_000051.3(ATM):c.3245_3247delinsTGAT")?;
        assert_eq!(
            variant.gene_symbol(),
            Some(&GeneSymbol {
                value: "ATM".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn parse_intron_offsets() -> Result<(), anyhow::Error> {
        let variant = HgvsVariant::from_str("NM_001164277.1:c.526+1C>A")?;
        if let HgvsVariant::CdsVariant { loc_edit, .. } = &variant {
            assert_eq!(
                loc_edit.loc.inner().start,
                CdsPos {
                    base: 526,
                    offset: Some(1),
                    cds_from: CdsFrom::Start
                }
            );
        } else {
            panic!("expected CdsVariant");
        }
        Ok(())
    }

    #[test]
    fn parse_uncertain_positions() -> Result<(), anyhow::Error> {
        let variant = HgvsVariant::from_str("NC_000001.10:g.(123_456)del")?;
        if let HgvsVariant::GenomeVariant { loc_edit, .. } = &variant {
            assert!(!loc_edit.loc.is_certain());
        } else {
            panic!("expected GenomeVariant");
        }
        Ok(())
    }

    #[test]
    fn parse_protein_forms() -> Result<(), anyhow::Error> {
        assert!(matches!(
            HgvsVariant::from_str("NP_000293.2:p.=")?,
            HgvsVariant::ProtVariant {
                loc_edit: ProtLocEdit::NoChange,
                ..
            }
        ));
        assert!(matches!(
            HgvsVariant::from_str("NP_000293.2:p.Met1?")?,
            HgvsVariant::ProtVariant {
                loc_edit: ProtLocEdit::InitiationUncertain,
                ..
            }
        ));
        assert!(matches!(
            HgvsVariant::from_str("NP_000293.2:p.?")?,
            HgvsVariant::ProtVariant {
                loc_edit: ProtLocEdit::Unknown,
                ..
            }
        ));

        let variant = HgvsVariant::from_str("NP_000293.2:p.(Leu25Arg)")?;
        if let HgvsVariant::ProtVariant {
            loc_edit: ProtLocEdit::Ordinary { loc, edit },
            ..
        } = &variant
        {
            assert!(!loc.is_certain());
            assert_eq!(
                edit.inner(),
                &ProteinEdit::Subst {
                    alternative: "R".to_string()
                }
            );
        } else {
            panic!("expected ordinary protein variant");
        }
        Ok(())
    }

    #[test]
    fn syntax_error_reports_offset() {
        let err = HgvsVariant::from_str("NC_000011.9:g.11889X437G>T").unwrap_err();
        match err {
            crate::parser::Error::Syntax { offset, .. } => {
                assert_eq!(offset, 19);
            }
            _ => panic!("expected syntax error"),
        }
    }

    #[test]
    fn malformed_interval_rejected() {
        assert!(HgvsVariant::from_str("NC_000011.9:g.200_100del").is_err());
    }

    #[test]
    fn interval_from_str() -> Result<(), anyhow::Error> {
        assert_eq!(
            GenomeInterval::from_str("152573138")?,
            GenomeInterval {
                start: Some(152573138),
                end: Some(152573138)
            }
        );
        assert_eq!(
            TxInterval::from_str("34+1_35-1")?,
            TxInterval {
                start: TxPos {
                    base: 34,
                    offset: Some(1)
                },
                end: TxPos {
                    base: 35,
                    offset: Some(-1)
                },
            }
        );
        assert_eq!(
            CdsInterval::from_str("332_*2")?,
            CdsInterval {
                start: CdsPos {
                    base: 332,
                    offset: None,
                    cds_from: CdsFrom::Start
                },
                end: CdsPos {
                    base: 2,
                    offset: None,
                    cds_from: CdsFrom::End
                },
            }
        );
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
