//! Data provider backed by a JSON document.
//!
//! The document bundles transcripts, their alignments, and the sequence
//! slices needed to work with them.  Genomic sequences are stored as
//! offset slices so a document does not have to carry whole chromosomes.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::data::error::Error;
use crate::data::interface::{
    Provider as ProviderInterface, TxExonsRecord, TxIdentityInfo, TxInfoRecord,
    TxMappingOptionsRecord,
};

/// A slice of a reference sequence; `start` is the zero-based offset of the
/// first stored base.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceSlice {
    #[serde(default)]
    pub start: usize,
    pub seq: String,
}

/// One exon of a stored alignment, interbase coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct Exon {
    pub ord: i32,
    pub tx_start_i: i32,
    pub tx_end_i: i32,
    pub alt_start_i: i32,
    pub alt_end_i: i32,
    pub cigar: String,
}

/// One stored transcript-to-reference alignment.
#[derive(Debug, Clone, Deserialize)]
pub struct Alignment {
    pub alt_ac: String,
    pub alt_aln_method: String,
    pub alt_strand: i16,
    pub exons: Vec<Exon>,
}

/// One stored transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcript {
    pub hgnc: String,
    #[serde(default)]
    pub cds_start_i: Option<i32>,
    #[serde(default)]
    pub cds_end_i: Option<i32>,
    #[serde(default)]
    pub protein: Option<String>,
    pub alignments: Vec<Alignment>,
}

/// Schema of the JSON document.
#[derive(Debug, Clone, Deserialize)]
struct Document {
    version: String,
    #[serde(default)]
    assemblies: IndexMap<String, IndexMap<String, String>>,
    sequences: AHashMap<String, SequenceSlice>,
    transcripts: AHashMap<String, Transcript>,
}

/// Data provider reading from a JSON document.
pub struct Provider {
    doc: Document,
}

impl Provider {
    /// Load a provider from the JSON file at `path`.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, Error> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::JsonOpen(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::with_json(&json)
    }

    /// Load a provider from a JSON string.
    pub fn with_json(json: &str) -> Result<Arc<Self>, Error> {
        let doc: Document =
            serde_json::from_str(json).map_err(|e| Error::JsonParse(e.to_string()))?;
        Ok(Arc::new(Self { doc }))
    }

    fn transcript(&self, tx_ac: &str) -> Result<&Transcript, Error> {
        self.doc
            .transcripts
            .get(tx_ac)
            .ok_or_else(|| Error::NoTranscriptFound(tx_ac.to_string()))
    }

    fn alignment(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<&Alignment, Error> {
        self.transcript(tx_ac)?
            .alignments
            .iter()
            .find(|a| a.alt_ac == alt_ac && a.alt_aln_method == alt_aln_method)
            .ok_or_else(|| {
                Error::NoAlignmentFound(
                    tx_ac.to_string(),
                    alt_ac.to_string(),
                    alt_aln_method.to_string(),
                )
            })
    }
}

impl ProviderInterface for Provider {
    fn data_version(&self) -> &str {
        &self.doc.version
    }

    fn get_tx_exons(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<Vec<TxExonsRecord>, Error> {
        let alignment = self.alignment(tx_ac, alt_ac, alt_aln_method)?;
        let mut records: Vec<TxExonsRecord> = alignment
            .exons
            .iter()
            .map(|exon| TxExonsRecord {
                tx_ac: tx_ac.to_string(),
                alt_ac: alt_ac.to_string(),
                alt_aln_method: alt_aln_method.to_string(),
                alt_strand: alignment.alt_strand,
                ord: exon.ord,
                tx_start_i: exon.tx_start_i,
                tx_end_i: exon.tx_end_i,
                alt_start_i: exon.alt_start_i,
                alt_end_i: exon.alt_end_i,
                cigar: exon.cigar.clone(),
            })
            .collect();
        records.sort_by_key(|record| record.alt_start_i);
        Ok(records)
    }

    fn get_tx_info(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        alt_aln_method: &str,
    ) -> Result<TxInfoRecord, Error> {
        let transcript = self.transcript(tx_ac)?;
        let _ = self.alignment(tx_ac, alt_ac, alt_aln_method)?;
        Ok(TxInfoRecord {
            hgnc: transcript.hgnc.clone(),
            cds_start_i: transcript.cds_start_i,
            cds_end_i: transcript.cds_end_i,
            tx_ac: tx_ac.to_string(),
            alt_ac: alt_ac.to_string(),
            alt_aln_method: alt_aln_method.to_string(),
        })
    }

    fn get_tx_identity_info(&self, tx_ac: &str) -> Result<TxIdentityInfo, Error> {
        let transcript = self.transcript(tx_ac)?;
        let alignment = transcript
            .alignments
            .first()
            .ok_or_else(|| Error::NoTranscriptFound(tx_ac.to_string()))?;
        let mut exons = alignment.exons.clone();
        exons.sort_by_key(|exon| exon.ord);
        Ok(TxIdentityInfo {
            tx_ac: tx_ac.to_string(),
            alt_ac: tx_ac.to_string(),
            alt_aln_method: "transcript".to_string(),
            cds_start_i: transcript.cds_start_i.unwrap_or(-1),
            cds_end_i: transcript.cds_end_i.unwrap_or(-1),
            lengths: exons
                .iter()
                .map(|exon| exon.tx_end_i - exon.tx_start_i)
                .collect(),
            hgnc: transcript.hgnc.clone(),
        })
    }

    fn get_seq_part(
        &self,
        ac: &str,
        begin: Option<usize>,
        end: Option<usize>,
    ) -> Result<String, Error> {
        let slice = self
            .doc
            .sequences
            .get(ac)
            .ok_or_else(|| Error::NoSequenceRecord(ac.to_string()))?;
        let stored_end = slice.start + slice.seq.len();
        let begin = begin.unwrap_or(slice.start);
        let end = end.unwrap_or(stored_end).min(stored_end);
        if begin < slice.start || begin > end {
            return Err(Error::SequenceOutOfRange(ac.to_string(), begin, end));
        }
        Ok(slice.seq[begin - slice.start..end - slice.start].to_string())
    }

    fn get_pro_ac_for_tx_ac(&self, tx_ac: &str) -> Result<Option<String>, Error> {
        Ok(self.transcript(tx_ac)?.protein.clone())
    }

    fn get_tx_mapping_options(
        &self,
        tx_ac: &str,
    ) -> Result<Vec<TxMappingOptionsRecord>, Error> {
        Ok(self
            .transcript(tx_ac)?
            .alignments
            .iter()
            .map(|alignment| TxMappingOptionsRecord {
                tx_ac: tx_ac.to_string(),
                alt_ac: alignment.alt_ac.clone(),
                alt_aln_method: alignment.alt_aln_method.clone(),
            })
            .collect())
    }

    fn get_assembly_map(&self, assembly: &str) -> Result<IndexMap<String, String>, Error> {
        self.doc
            .assemblies
            .get(assembly)
            .cloned()
            .ok_or_else(|| Error::NoAssembly(assembly.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn example() -> Arc<Provider> {
        Provider::with_json(
            r#"{
                "version": "test-1",
                "assemblies": {
                    "GRCh37": { "11": "NC_000011.9" }
                },
                "sequences": {
                    "NC_000011.9": { "start": 100, "seq": "ACGTACGTAC" }
                },
                "transcripts": {
                    "NM_000001.1": {
                        "hgnc": "EX1",
                        "cds_start_i": 2,
                        "cds_end_i": 8,
                        "protein": "NP_000001.1",
                        "alignments": [
                            {
                                "alt_ac": "NC_000011.9",
                                "alt_aln_method": "splign",
                                "alt_strand": 1,
                                "exons": [
                                    {
                                        "ord": 1,
                                        "tx_start_i": 5,
                                        "tx_end_i": 10,
                                        "alt_start_i": 130,
                                        "alt_end_i": 135,
                                        "cigar": "5="
                                    },
                                    {
                                        "ord": 0,
                                        "tx_start_i": 0,
                                        "tx_end_i": 5,
                                        "alt_start_i": 100,
                                        "alt_end_i": 105,
                                        "cigar": "5="
                                    }
                                ]
                            }
                        ]
                    }
                }
            }"#,
        )
        .expect("example document must parse")
    }

    #[test]
    fn exons_sorted_genomically() {
        let provider = example();
        let exons = provider
            .get_tx_exons("NM_000001.1", "NC_000011.9", "splign")
            .unwrap();
        assert_eq!(exons.len(), 2);
        assert_eq!(exons[0].ord, 0);
        assert_eq!(exons[0].alt_start_i, 100);
        assert_eq!(exons[1].alt_start_i, 130);
    }

    #[test]
    fn seq_part_respects_offset() {
        let provider = example();
        assert_eq!(
            provider
                .get_seq_part("NC_000011.9", Some(102), Some(106))
                .unwrap(),
            "GTAC"
        );
        assert!(provider
            .get_seq_part("NC_000011.9", Some(90), Some(106))
            .is_err());
        // End clamps to the stored slice.
        assert_eq!(
            provider
                .get_seq_part("NC_000011.9", Some(108), None)
                .unwrap(),
            "AC"
        );
    }

    #[test]
    fn missing_keys_reported() {
        let provider = example();
        assert!(matches!(
            provider.get_tx_exons("NM_999999.9", "NC_000011.9", "splign"),
            Err(Error::NoTranscriptFound(_))
        ));
        assert!(matches!(
            provider.get_tx_exons("NM_000001.1", "NC_000011.9", "blat"),
            Err(Error::NoAlignmentFound(_, _, _))
        ));
        assert!(matches!(
            provider.get_seq_part("NC_000099.9", None, None),
            Err(Error::NoSequenceRecord(_))
        ));
    }

    #[test]
    fn identity_info_lengths() {
        let provider = example();
        let info = provider.get_tx_identity_info("NM_000001.1").unwrap();
        assert_eq!(info.lengths, vec![5, 5]);
        assert_eq!(info.cds_start_i, 2);
        assert_eq!(info.cds_end_i, 8);
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
