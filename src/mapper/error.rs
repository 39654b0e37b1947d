//! Error type definition.

use thiserror::Error;

/// Error type for variant mapping.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error")]
    ValidationFailed(#[from] crate::validator::Error),
    #[error("parsing failed")]
    ParsingFailed(#[from] crate::parser::Error),
    #[error("sequence operation failed")]
    SequenceOperationFailed(#[from] crate::sequences::Error),
    #[error("problem accessing data")]
    DataError(#[from] crate::data::error::Error),
    #[error("expected a GenomeVariant but received {0}")]
    ExpectedGenomeVariant(String),
    #[error("expected a TxVariant but received {0}")]
    ExpectedTxVariant(String),
    #[error("expected a CdsVariant but received {0}")]
    ExpectedCdsVariant(String),
    #[error("expected a ProtVariant but received {0}")]
    ExpectedProtVariant(String),
    #[error("invalid CIGAR op: {0}")]
    InvalidCigarOp(char),
    #[error("invalid CIGAR string: {0}")]
    InvalidCigarString(String),
    #[error("position {0} is outside the aligned region of length {1}")]
    OutOfBounds(i32, i32),
    #[error("cannot map a variant with missing or uncertain positions")]
    MissingPositions,
    #[error("no exons found for {0} to {1} using {2}")]
    NoExons(String, String, String),
    #[error("cannot build CIGAR from empty exon list")]
    EmptyExons,
    #[error("CDS start and end must both be defined or undefined for {0}")]
    IncompleteCds(String),
    #[error("exons {0} and {1} are not adjacent on the transcript")]
    NonAdjacentExons(String, String),
    #[error("transcript {0} aligned to {1} has invalid strand {2}")]
    InvalidStrand(String, String, i16),
    #[error("transcript {0} has no CDS; cannot use CDS coordinates")]
    NoCds(String),
    #[error(
        "reference sequence mismatch for {accession}: variant declares \
        {declared:?} but sequence has {actual:?}"
    )]
    ReferenceMismatch {
        accession: String,
        declared: String,
        actual: String,
    },
    #[error("transcript {0} has no protein accession")]
    NoProteinAccession(String),
    #[error("CDS length {1} of {0} is not a multiple of 3")]
    CdsLengthInvalid(String, usize),
    #[error("cannot project {0} back to the coding sequence")]
    CannotProjectProtein(String),
    #[error("no alignment of {0} in assembly {1} using {2}")]
    NoAlignments(String, String, String),
    #[error("multiple alignments of {0} in assembly {1} using {2}: {3}")]
    MultipleAlignments(String, String, String, String),
    #[error("intron offsets require a genomic alignment ({0})")]
    OffsetsRequireAlignment(String),
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
