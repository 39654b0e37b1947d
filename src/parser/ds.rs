//! Data structures for representing variant descriptions.

use std::ops::Range;

/// Expression of "maybe uncertain".
///
/// Uncertain values are formatted in parentheses, e.g., `(123_456)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mu<T> {
    /// Certain variant of `T`.
    Certain(T),
    /// Uncertain variant of `T`.
    Uncertain(T),
}

impl<T> Mu<T> {
    /// Construct with the given value and certainty.
    pub fn from(value: T, is_certain: bool) -> Self {
        if is_certain {
            Mu::Certain(value)
        } else {
            Mu::Uncertain(value)
        }
    }

    pub fn is_certain(&self) -> bool {
        matches!(self, Mu::Certain(_))
    }

    /// Unwrap the wrapped value regardless of certainty.
    pub fn inner(&self) -> &T {
        match self {
            Mu::Certain(value) => value,
            Mu::Uncertain(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Mu::Certain(value) => value,
            Mu::Uncertain(value) => value,
        }
    }
}

/// Representation of accession, e.g., `NM_01234.5`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Accession {
    pub value: String,
}

impl Accession {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// Representation of gene symbol, e.g., `TTN`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneSymbol {
    pub value: String,
}

/// Edit of nucleic acids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NaEdit {
    /// Substitution or deletion-insertion with explicit reference and
    /// alternative sequence.
    RefAlt {
        reference: String,
        alternative: String,
    },
    /// Deletion of the given reference sequence (may be empty when the
    /// notation does not spell out the deleted bases).
    DelRef { reference: String },
    /// Deletion of the given number of bases.
    DelNum { count: i32 },
    /// Insertion of one or more bases.
    Ins { alternative: String },
    /// Duplication, optionally spelling out the duplicated reference bases.
    Dup { reference: String },
    /// Inversion of the given reference sequence.
    InvRef { reference: String },
    /// Inversion of a stretch given by its length.
    InvNum { count: i32 },
    /// No change (`=`), optionally spelling out the unchanged bases.
    Ident { reference: String },
}

impl NaEdit {
    /// Return the declared reference bases, if the notation carries any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            NaEdit::RefAlt { reference, .. }
            | NaEdit::DelRef { reference }
            | NaEdit::Dup { reference }
            | NaEdit::InvRef { reference }
            | NaEdit::Ident { reference } => {
                if reference.is_empty() {
                    None
                } else {
                    Some(reference)
                }
            }
            NaEdit::DelNum { .. } | NaEdit::Ins { .. } | NaEdit::InvNum { .. } => None,
        }
    }

    /// Return a copy with the declared reference replaced by `reference`.
    pub fn with_reference(&self, reference: String) -> NaEdit {
        match self {
            NaEdit::RefAlt { alternative, .. } => NaEdit::RefAlt {
                reference,
                alternative: alternative.clone(),
            },
            NaEdit::DelRef { .. } => NaEdit::DelRef { reference },
            NaEdit::DelNum { .. } => NaEdit::DelRef { reference },
            NaEdit::Dup { .. } => NaEdit::Dup { reference },
            NaEdit::InvRef { .. } => NaEdit::InvRef { reference },
            NaEdit::InvNum { .. } => NaEdit::InvRef { reference },
            NaEdit::Ident { .. } => NaEdit::Ident { reference },
            NaEdit::Ins { alternative } => NaEdit::Ins {
                alternative: alternative.clone(),
            },
        }
    }
}

/// Uncertain change in protein length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UncertainLengthChange {
    None,
    Unknown,
    Known(i32),
}

/// Protein edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProteinEdit {
    /// Frameshift; `terminal` carries the stop marker, normalized to `*`,
    /// and `length` the distance to the new stop codon, when determinable.
    Fs {
        alternative: Option<String>,
        terminal: Option<String>,
        length: UncertainLengthChange,
    },
    Subst {
        alternative: String,
    },
    /// `delins`
    DelIns {
        alternative: String,
    },
    /// `ins`
    Ins {
        alternative: String,
    },
    /// `del`
    Del,
    /// `dup`
    Dup,
    /// `=`
    Ident,
}

/// Genome position interval; `None` encodes an unknown (`?`) endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenomeInterval {
    /// Start position
    pub start: Option<i32>,
    /// End position
    pub end: Option<i32>,
}

/// Transcript position with optional intron offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxPos {
    /// Base position.
    pub base: i32,
    /// Optional offset into the neighboring intron.
    pub offset: Option<i32>,
}

/// Transcript position interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInterval {
    /// Start position
    pub start: TxPos,
    /// End position
    pub end: TxPos,
}

/// Specifies whether a CDS position counts from the CDS start or end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CdsFrom {
    Start,
    End,
}

/// CDS position.
///
/// Negative bases lie in the 5' UTR, `CdsFrom::End` positions (`*`) in the
/// 3' UTR.  There is no position 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdsPos {
    /// Base position.
    pub base: i32,
    /// Optional offset into the neighboring intron.
    pub offset: Option<i32>,
    /// Whether the position counts from the CDS start or end.
    pub cds_from: CdsFrom,
}

/// CDS position interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdsInterval {
    /// Start position
    pub start: CdsPos,
    /// End position
    pub end: CdsPos,
}

/// Protein position: amino acid (1-letter) plus its number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtPos {
    /// Amino acid value.
    pub aa: String,
    /// Number of `aa`.
    pub number: i32,
}

/// Protein position interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtInterval {
    /// Start position
    pub start: ProtPos,
    /// End position
    pub end: ProtPos,
}

/// Genome location with edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenomeLocEdit {
    /// Location on the genome.
    pub loc: Mu<GenomeInterval>,
    /// DNA change description.
    pub edit: Mu<NaEdit>,
}

/// Transcript location with edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxLocEdit {
    /// Location on a transcript.
    pub loc: Mu<TxInterval>,
    /// DNA change description.
    pub edit: Mu<NaEdit>,
}

/// CDS location with edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdsLocEdit {
    /// Location on the CDS.
    pub loc: Mu<CdsInterval>,
    /// DNA change description.
    pub edit: Mu<NaEdit>,
}

/// Protein location with edit, or one of the special forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtLocEdit {
    Ordinary {
        loc: Mu<ProtInterval>,
        edit: Mu<ProteinEdit>,
    },
    /// `=`
    NoChange,
    /// `(=)`
    NoChangeUncertain,
    /// `0`
    NoProtein,
    /// `0?`
    NoProteinUncertain,
    /// `?`
    Unknown,
    /// `Met1?`
    InitiationUncertain,
}

/// A variant description: accession, coordinate system tag, location, edit.
///
/// Values are immutable once constructed; every projection produces a new
/// instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HgvsVariant {
    /// Variant specification with `g.` location.
    GenomeVariant {
        accession: Accession,
        gene_symbol: Option<GeneSymbol>,
        loc_edit: GenomeLocEdit,
    },
    /// Variant specification with `n.` location.
    TxVariant {
        accession: Accession,
        gene_symbol: Option<GeneSymbol>,
        loc_edit: TxLocEdit,
    },
    /// Variant specification with `c.` location.
    CdsVariant {
        accession: Accession,
        gene_symbol: Option<GeneSymbol>,
        loc_edit: CdsLocEdit,
    },
    /// Variant specification with `p.` location.
    ProtVariant {
        accession: Accession,
        gene_symbol: Option<GeneSymbol>,
        loc_edit: ProtLocEdit,
    },
}

impl HgvsVariant {
    /// Return the accession of the reference sequence.
    pub fn accession(&self) -> &Accession {
        match self {
            HgvsVariant::GenomeVariant { accession, .. }
            | HgvsVariant::TxVariant { accession, .. }
            | HgvsVariant::CdsVariant { accession, .. }
            | HgvsVariant::ProtVariant { accession, .. } => accession,
        }
    }

    /// Return the gene symbol, if any.
    pub fn gene_symbol(&self) -> Option<&GeneSymbol> {
        match self {
            HgvsVariant::GenomeVariant { gene_symbol, .. }
            | HgvsVariant::TxVariant { gene_symbol, .. }
            | HgvsVariant::CdsVariant { gene_symbol, .. }
            | HgvsVariant::ProtVariant { gene_symbol, .. } => gene_symbol.as_ref(),
        }
    }

    /// Return the nucleic acid edit, if the variant carries one.
    pub fn na_edit(&self) -> Option<&NaEdit> {
        self.mu_na_edit().map(Mu::inner)
    }

    /// Return the nucleic acid edit with its certainty, if the variant
    /// carries one.
    pub fn mu_na_edit(&self) -> Option<&Mu<NaEdit>> {
        match self {
            HgvsVariant::GenomeVariant { loc_edit, .. } => Some(&loc_edit.edit),
            HgvsVariant::TxVariant { loc_edit, .. } => Some(&loc_edit.edit),
            HgvsVariant::CdsVariant { loc_edit, .. } => Some(&loc_edit.edit),
            HgvsVariant::ProtVariant { .. } => None,
        }
    }

    /// Whether the location is marked certain.
    pub fn loc_is_certain(&self) -> bool {
        match self {
            HgvsVariant::GenomeVariant { loc_edit, .. } => loc_edit.loc.is_certain(),
            HgvsVariant::TxVariant { loc_edit, .. } => loc_edit.loc.is_certain(),
            HgvsVariant::CdsVariant { loc_edit, .. } => loc_edit.loc.is_certain(),
            HgvsVariant::ProtVariant { loc_edit, .. } => match loc_edit {
                ProtLocEdit::Ordinary { loc, .. } => loc.is_certain(),
                _ => true,
            },
        }
    }

    /// Return the interbase range covered on the reference sequence.
    ///
    /// `None` for protein variants, unknown genome endpoints, positions
    /// with intron offsets, and CDS-relative coordinates.
    pub fn loc_range(&self) -> Option<Range<i32>> {
        match self {
            HgvsVariant::GenomeVariant { loc_edit, .. } => {
                let loc = loc_edit.loc.inner();
                match (loc.start, loc.end) {
                    (Some(start), Some(end)) => Some(start - 1..end),
                    _ => None,
                }
            }
            HgvsVariant::TxVariant { loc_edit, .. } => {
                let loc = loc_edit.loc.inner();
                if loc.start.offset.is_none() && loc.end.offset.is_none() {
                    Some(loc.start.base - 1..loc.end.base)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Whether any position of the variant has an intron offset.
    pub fn spans_intron(&self) -> bool {
        match self {
            HgvsVariant::TxVariant { loc_edit, .. } => {
                let loc = loc_edit.loc.inner();
                loc.start.offset.is_some() || loc.end.offset.is_some()
            }
            HgvsVariant::CdsVariant { loc_edit, .. } => {
                let loc = loc_edit.loc.inner();
                loc.start.offset.is_some() || loc.end.offset.is_some()
            }
            _ => false,
        }
    }

    /// Return a copy with the declared reference bases replaced by
    /// `reference`.  Protein variants are returned unchanged.
    pub fn with_reference(self, reference: String) -> Self {
        fn replace(edit: Mu<NaEdit>, reference: String) -> Mu<NaEdit> {
            let certain = edit.is_certain();
            Mu::from(edit.into_inner().with_reference(reference), certain)
        }

        match self {
            HgvsVariant::GenomeVariant {
                accession,
                gene_symbol,
                loc_edit,
            } => HgvsVariant::GenomeVariant {
                accession,
                gene_symbol,
                loc_edit: GenomeLocEdit {
                    loc: loc_edit.loc,
                    edit: replace(loc_edit.edit, reference),
                },
            },
            HgvsVariant::TxVariant {
                accession,
                gene_symbol,
                loc_edit,
            } => HgvsVariant::TxVariant {
                accession,
                gene_symbol,
                loc_edit: TxLocEdit {
                    loc: loc_edit.loc,
                    edit: replace(loc_edit.edit, reference),
                },
            },
            HgvsVariant::CdsVariant {
                accession,
                gene_symbol,
                loc_edit,
            } => HgvsVariant::CdsVariant {
                accession,
                gene_symbol,
                loc_edit: CdsLocEdit {
                    loc: loc_edit.loc,
                    edit: replace(loc_edit.edit, reference),
                },
            },
            other => other,
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
