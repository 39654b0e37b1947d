//! Definition of the interface for accessing transcript and sequence data.

use indexmap::IndexMap;

use crate::data::error::Error;

/// A single exon of a transcript-to-reference alignment.
///
/// Coordinates are interbase (0-based, end exclusive).  `ord` numbers the
/// exons in transcript order; `alt_start_i`/`alt_end_i` are genomic and
/// ascend with the genome regardless of strand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxExonsRecord {
    /// Transcript accession.
    pub tx_ac: String,
    /// Reference sequence accession.
    pub alt_ac: String,
    /// Alignment method, e.g., `"splign"`.
    pub alt_aln_method: String,
    /// Strand of the alignment, `1` or `-1`.
    pub alt_strand: i16,
    /// Exon number in transcript order, 0-based.
    pub ord: i32,
    /// Start of the exon on the transcript.
    pub tx_start_i: i32,
    /// End of the exon on the transcript.
    pub tx_end_i: i32,
    /// Start of the exon on the reference.
    pub alt_start_i: i32,
    /// End of the exon on the reference.
    pub alt_end_i: i32,
    /// CIGAR string of the exon alignment, oriented along the reference
    /// sequence.
    pub cigar: String,
}

/// Information about a transcript-to-reference alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxInfoRecord {
    /// Gene symbol.
    pub hgnc: String,
    /// Start of the CDS on the transcript, if coding.
    pub cds_start_i: Option<i32>,
    /// End of the CDS on the transcript, if coding.
    pub cds_end_i: Option<i32>,
    /// Transcript accession.
    pub tx_ac: String,
    /// Reference sequence accession.
    pub alt_ac: String,
    /// Alignment method.
    pub alt_aln_method: String,
}

/// Identity information about a transcript, without reference alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIdentityInfo {
    pub tx_ac: String,
    pub alt_ac: String,
    pub alt_aln_method: String,
    pub cds_start_i: i32,
    pub cds_end_i: i32,
    /// Lengths of the transcript exons, in transcript order.
    pub lengths: Vec<i32>,
    pub hgnc: String,
}

/// One option for aligning a transcript to a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxMappingOptionsRecord {
    pub tx_ac: String,
    pub alt_ac: String,
    pub alt_aln_method: String,
}

/// Interface for data providers.
///
/// Implementations must be usable from multiple threads; all methods take
/// `&self`.  Results must be stable for the lifetime of the provider: the
/// cache layer assumes that repeated queries for the same key return equal
/// records.
pub trait Provider: Send + Sync {
    /// Return the version string of the backing data.
    fn data_version(&self) -> &str;

    /// Return the exons of the given transcript-to-reference alignment.
    ///
    /// The records are returned in genomic coordinate order, independent of
    /// strand.
    fn get_tx_exons(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<Vec<TxExonsRecord>, Error>;

    /// Return information about the given transcript-to-reference alignment.
    fn get_tx_info(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<TxInfoRecord, Error>;

    /// Return identity information about the given transcript.
    fn get_tx_identity_info(&self, tx_ac: &str) -> Result<TxIdentityInfo, Error>;

    /// Return a slice `[begin, end)` of the sequence with the given
    /// accession; `None` bounds extend to the corresponding end.
    fn get_seq_part(
        &self,
        ac: &str,
        begin: Option<usize>,
        end: Option<usize>,
    ) -> Result<String, Error>;

    /// Return the full sequence with the given accession.
    fn get_seq(&self, ac: &str) -> Result<String, Error> {
        self.get_seq_part(ac, None, None)
    }

    /// Return the protein accession for the given transcript, if known.
    fn get_pro_ac_for_tx_ac(&self, tx_ac: &str) -> Result<Option<String>, Error>;

    /// Return all mapping options for the given transcript.
    fn get_tx_mapping_options(
        &self,
        tx_ac: &str,
    ) -> Result<Vec<TxMappingOptionsRecord>, Error>;

    /// Return the accession map of the given assembly, mapping contig names
    /// to reference sequence accessions in assembly order.
    fn get_assembly_map(&self, assembly: &str) -> Result<IndexMap<String, String>, Error>;
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
