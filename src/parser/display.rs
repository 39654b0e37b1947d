//! Implementation of the `Display` trait for the variant model.
//!
//! Formatting is the inverse of parsing; `format(parse(t)) == t` for
//! canonically written expressions.

use std::fmt::Display;

use crate::parser::ds::*;
use crate::sequences::aa_to_aa3;

impl<T> Display for Mu<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mu::Certain(value) => write!(f, "{value}"),
            Mu::Uncertain(value) => write!(f, "({value})"),
        }
    }
}

impl Display for Accession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Display for GeneSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Display for NaEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NaEdit::RefAlt {
                reference,
                alternative,
            } => match (reference.len(), alternative.len()) {
                (0, 0) => write!(f, "="),
                (1, 1) => write!(f, "{reference}>{alternative}"),
                (_, _) => write!(f, "del{reference}ins{alternative}"),
            },
            NaEdit::DelRef { reference } => write!(f, "del{reference}"),
            NaEdit::DelNum { count } => write!(f, "del{count}"),
            NaEdit::Ins { alternative } => write!(f, "ins{alternative}"),
            NaEdit::Dup { reference } => write!(f, "dup{reference}"),
            NaEdit::InvRef { reference } => write!(f, "inv{reference}"),
            NaEdit::InvNum { count } => write!(f, "inv{count}"),
            NaEdit::Ident { reference } => write!(f, "{reference}="),
        }
    }
}

impl Display for UncertainLengthChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UncertainLengthChange::None => write!(f, ""),
            UncertainLengthChange::Unknown => write!(f, "?"),
            UncertainLengthChange::Known(count) => write!(f, "{count}"),
        }
    }
}

impl Display for ProteinEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProteinEdit::Fs {
                alternative,
                terminal,
                length,
            } => {
                if let Some(alternative) = alternative {
                    write!(
                        f,
                        "{}",
                        aa_to_aa3(alternative).expect("invalid amino acid in model")
                    )?;
                }
                write!(f, "fs")?;
                if let Some(terminal) = terminal {
                    write!(
                        f,
                        "{}{length}",
                        aa_to_aa3(terminal).expect("invalid amino acid in model")
                    )?;
                }
                Ok(())
            }
            ProteinEdit::Subst { alternative } => write!(
                f,
                "{}",
                aa_to_aa3(alternative).expect("invalid amino acid in model")
            ),
            ProteinEdit::DelIns { alternative } => write!(
                f,
                "delins{}",
                aa_to_aa3(alternative).expect("invalid amino acid in model")
            ),
            ProteinEdit::Ins { alternative } => write!(
                f,
                "ins{}",
                aa_to_aa3(alternative).expect("invalid amino acid in model")
            ),
            ProteinEdit::Del => write!(f, "del"),
            ProteinEdit::Dup => write!(f, "dup"),
            ProteinEdit::Ident => write!(f, "="),
        }
    }
}

impl Display for GenomeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let write_pos = |f: &mut std::fmt::Formatter<'_>, pos: &Option<i32>| match pos {
            Some(pos) => write!(f, "{pos}"),
            None => write!(f, "?"),
        };
        write_pos(f, &self.start)?;
        if self.start != self.end {
            write!(f, "_")?;
            write_pos(f, &self.end)?;
        }
        Ok(())
    }
}

impl Display for TxPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(offset) = self.offset {
            if offset > 0 {
                write!(f, "+")?;
            }
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

impl Display for TxInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)?;
        if self.start != self.end {
            write!(f, "_{}", self.end)?;
        }
        Ok(())
    }
}

impl Display for CdsPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cds_from == CdsFrom::End {
            write!(f, "*")?;
        }
        write!(f, "{}", self.base)?;
        if let Some(offset) = self.offset {
            if offset > 0 {
                write!(f, "+")?;
            }
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

impl Display for CdsInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)?;
        if self.start != self.end {
            write!(f, "_{}", self.end)?;
        }
        Ok(())
    }
}

impl Display for ProtPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            aa_to_aa3(&self.aa).expect("invalid amino acid in model"),
            self.number
        )
    }
}

impl Display for ProtInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)?;
        if self.start != self.end {
            write!(f, "_{}", self.end)?;
        }
        Ok(())
    }
}

impl Display for GenomeLocEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.loc, self.edit)
    }
}

impl Display for TxLocEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.loc, self.edit)
    }
}

impl Display for CdsLocEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.loc, self.edit)
    }
}

impl Display for ProtLocEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtLocEdit::Ordinary { loc, edit } => match (loc, edit) {
                // Fully predicted variants are written with one set of
                // parentheses around the whole location/edit pair.
                (Mu::Uncertain(loc), Mu::Uncertain(edit)) => write!(f, "({loc}{edit})"),
                _ => write!(f, "{loc}{edit}"),
            },
            ProtLocEdit::NoChange => write!(f, "="),
            ProtLocEdit::NoChangeUncertain => write!(f, "(=)"),
            ProtLocEdit::NoProtein => write!(f, "0"),
            ProtLocEdit::NoProteinUncertain => write!(f, "0?"),
            ProtLocEdit::Unknown => write!(f, "?"),
            ProtLocEdit::InitiationUncertain => write!(f, "Met1?"),
        }
    }
}

impl Display for HgvsVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let write_prefix = |f: &mut std::fmt::Formatter<'_>,
                            accession: &Accession,
                            gene_symbol: &Option<GeneSymbol>|
         -> std::fmt::Result {
            write!(f, "{accession}")?;
            if let Some(gene_symbol) = gene_symbol {
                write!(f, "({gene_symbol})")?;
            }
            Ok(())
        };
        match self {
            HgvsVariant::GenomeVariant {
                accession,
                gene_symbol,
                loc_edit,
            } => {
                write_prefix(f, accession, gene_symbol)?;
                write!(f, ":g.{loc_edit}")
            }
            HgvsVariant::TxVariant {
                accession,
                gene_symbol,
                loc_edit,
            } => {
                write_prefix(f, accession, gene_symbol)?;
                write!(f, ":n.{loc_edit}")
            }
            HgvsVariant::CdsVariant {
                accession,
                gene_symbol,
                loc_edit,
            } => {
                write_prefix(f, accession, gene_symbol)?;
                write!(f, ":c.{loc_edit}")
            }
            HgvsVariant::ProtVariant {
                accession,
                gene_symbol,
                loc_edit,
            } => {
                write_prefix(f, accession, gene_symbol)?;
                write!(f, ":p.{loc_edit}")
            }
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
