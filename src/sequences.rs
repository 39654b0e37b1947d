//! Utility code for working with nucleotide and protein sequences.

use ahash::AHashMap;

pub use error::Error;

mod error {
    /// Error type for sequence operations.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("invalid 1-letter aminoacid: {0}")]
        InvalidOneLetterAminoAcid(String),
        #[error("invalid 3-letter aminoacid: {0}")]
        InvalidThreeLetterAminoAcid(String),
        #[error("codon is undefined in codon table: {0}")]
        UndefinedCodon(String),
        #[error("can only translate DNA sequences whose length is multiple of 3, but is: {0}")]
        UntranslatableDnaLength(usize),
        #[error("no codon encodes amino acid: {0}")]
        NoCodonForAminoAcid(String),
    }
}

/// Reverse complementing shortcut.
pub fn revcomp(seq: &str) -> String {
    std::str::from_utf8(&bio::alphabets::dna::revcomp(seq.as_bytes()))
        .expect("invalid utf-8 encoding")
        .to_string()
}

/// Normalize a DNA sequence: upper case, RNA alphabet folded to DNA.
pub fn normalize_dna(seq: &str) -> String {
    seq.chars()
        .map(|c| match c.to_ascii_uppercase() {
            'U' => 'T',
            c => c,
        })
        .collect()
}

lazy_static::lazy_static! {
    /// Standard DNA codon translation table.
    static ref CODON_TABLE: AHashMap<&'static str, char> = {
        let mut m = AHashMap::with_capacity(64);
        let codons = [
            ("TTT", 'F'), ("TTC", 'F'), ("TTA", 'L'), ("TTG", 'L'),
            ("CTT", 'L'), ("CTC", 'L'), ("CTA", 'L'), ("CTG", 'L'),
            ("ATT", 'I'), ("ATC", 'I'), ("ATA", 'I'), ("ATG", 'M'),
            ("GTT", 'V'), ("GTC", 'V'), ("GTA", 'V'), ("GTG", 'V'),
            ("TCT", 'S'), ("TCC", 'S'), ("TCA", 'S'), ("TCG", 'S'),
            ("CCT", 'P'), ("CCC", 'P'), ("CCA", 'P'), ("CCG", 'P'),
            ("ACT", 'T'), ("ACC", 'T'), ("ACA", 'T'), ("ACG", 'T'),
            ("GCT", 'A'), ("GCC", 'A'), ("GCA", 'A'), ("GCG", 'A'),
            ("TAT", 'Y'), ("TAC", 'Y'), ("TAA", '*'), ("TAG", '*'),
            ("CAT", 'H'), ("CAC", 'H'), ("CAA", 'Q'), ("CAG", 'Q'),
            ("AAT", 'N'), ("AAC", 'N'), ("AAA", 'K'), ("AAG", 'K'),
            ("GAT", 'D'), ("GAC", 'D'), ("GAA", 'E'), ("GAG", 'E'),
            ("TGT", 'C'), ("TGC", 'C'), ("TGA", '*'), ("TGG", 'W'),
            ("CGT", 'R'), ("CGC", 'R'), ("CGA", 'R'), ("CGG", 'R'),
            ("AGT", 'S'), ("AGC", 'S'), ("AGA", 'R'), ("AGG", 'R'),
            ("GGT", 'G'), ("GGC", 'G'), ("GGA", 'G'), ("GGG", 'G'),
        ];
        for (codon, aa) in codons {
            m.insert(codon, aa);
        }
        m
    };
}

/// Translate a DNA sequence into a 1-letter amino acid sequence.
///
/// Translation does not stop at the first stop codon; stop codons are rendered
/// as `*` so that callers can locate new termination sites after frameshifts.
pub fn translate_cds(seq: &str) -> Result<String, Error> {
    let seq = normalize_dna(seq);
    if seq.len() % 3 != 0 {
        return Err(Error::UntranslatableDnaLength(seq.len()));
    }

    let mut result = String::with_capacity(seq.len() / 3);
    for codon in seq.as_bytes().chunks(3) {
        let codon = std::str::from_utf8(codon).expect("checked ASCII above");
        if let Some(aa) = CODON_TABLE.get(codon) {
            result.push(*aa);
        } else if codon.contains('N') {
            result.push('X');
        } else {
            return Err(Error::UndefinedCodon(codon.to_string()));
        }
    }
    Ok(result)
}

/// Return the codons encoding `aa` (1-letter), lexicographically sorted.
///
/// The first entry is the representative codon used when a protein-level
/// description has to be projected back to a nucleotide-level one.
pub fn codons_for_aa(aa: char) -> Result<Vec<&'static str>, Error> {
    let mut result = CODON_TABLE
        .iter()
        .filter(|(_, v)| **v == aa)
        .map(|(k, _)| *k)
        .collect::<Vec<_>>();
    if result.is_empty() {
        Err(Error::NoCodonForAminoAcid(aa.to_string()))
    } else {
        result.sort_unstable();
        Ok(result)
    }
}

lazy_static::lazy_static! {
    static ref AA3_TO_AA1: Vec<(&'static str, &'static str)> = vec![
        ("Ala", "A"), ("Arg", "R"), ("Asn", "N"), ("Asp", "D"), ("Cys", "C"),
        ("Gln", "Q"), ("Glu", "E"), ("Gly", "G"), ("His", "H"), ("Ile", "I"),
        ("Leu", "L"), ("Lys", "K"), ("Met", "M"), ("Phe", "F"), ("Pro", "P"),
        ("Ser", "S"), ("Thr", "T"), ("Trp", "W"), ("Tyr", "Y"), ("Val", "V"),
        ("Xaa", "X"), ("Ter", "*"), ("Sec", "U"),
    ];

    static ref AA1_MAP: AHashMap<&'static str, &'static str> =
        AA3_TO_AA1.iter().map(|(aa3, aa1)| (*aa1, *aa3)).collect();

    static ref AA3_MAP: AHashMap<&'static str, &'static str> =
        AA3_TO_AA1.iter().cloned().collect();
}

/// Convert a 1-letter amino acid sequence to 3-letter.  `?` passes through.
pub fn aa1_to_aa3(seq: &str) -> Result<String, Error> {
    let mut result = String::with_capacity(seq.len() * 3);
    for c in seq.chars() {
        if c == '?' {
            result.push('?');
        } else {
            let aa1 = c.to_string();
            result.push_str(
                AA1_MAP
                    .get(aa1.as_str())
                    .ok_or(Error::InvalidOneLetterAminoAcid(aa1.clone()))?,
            );
        }
    }
    Ok(result)
}

/// Convert a 3-letter amino acid sequence to 1-letter.
pub fn aa3_to_aa1(seq: &str) -> Result<String, Error> {
    if seq.len() % 3 != 0 {
        return Err(Error::InvalidThreeLetterAminoAcid(seq.to_string()));
    }

    let mut result = String::with_capacity(seq.len() / 3);
    for aa3 in seq.as_bytes().chunks(3) {
        let aa3 = std::str::from_utf8(aa3).expect("checked ASCII above");
        result.push_str(
            AA3_MAP
                .get(aa3)
                .ok_or(Error::InvalidThreeLetterAminoAcid(aa3.to_string()))?,
        );
    }
    Ok(result)
}

/// Coerce an amino acid string in either convention to 3-letter.
pub fn aa_to_aa3(seq: &str) -> Result<String, Error> {
    if seq.is_empty() || seq == "?" {
        return Ok(seq.to_string());
    }
    if seq.len() % 3 == 0 && aa3_to_aa1(seq).is_ok() {
        return Ok(seq.to_string());
    }
    aa1_to_aa3(seq)
}

/// Trim a common prefix of `reference` and `alternative`; returns the trim
/// length and the remaining suffixes.
pub fn trim_common_prefixes(reference: &str, alternative: &str) -> (usize, String, String) {
    let trim = reference
        .as_bytes()
        .iter()
        .zip(alternative.as_bytes())
        .take_while(|(a, b)| a == b)
        .count();
    (
        trim,
        reference[trim..].to_string(),
        alternative[trim..].to_string(),
    )
}

/// Trim a common suffix of `reference` and `alternative`; returns the trim
/// length and the remaining prefixes.
pub fn trim_common_suffixes(reference: &str, alternative: &str) -> (usize, String, String) {
    let trim = reference
        .as_bytes()
        .iter()
        .rev()
        .zip(alternative.as_bytes().iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    (
        trim,
        reference[..reference.len() - trim].to_string(),
        alternative[..alternative.len() - trim].to_string(),
    )
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn revcomp_cases() {
        assert_eq!(revcomp(""), "");
        assert_eq!(revcomp("ACGT"), "ACGT");
        assert_eq!(revcomp("GATTACA"), "TGTAATC");
    }

    #[test]
    fn normalize_dna_cases() {
        assert_eq!(normalize_dna("acgu"), "ACGT");
        assert_eq!(normalize_dna("ACGT"), "ACGT");
    }

    #[test]
    fn translate_cds_simple() -> Result<(), Error> {
        assert_eq!(translate_cds("ATGCATGTCTAG")?, "MHV*");
        // translation continues past stop codons
        assert_eq!(translate_cds("TAAATG")?, "*M");
        Ok(())
    }

    #[test]
    fn translate_cds_bad_length() {
        assert!(translate_cds("AT").is_err());
    }

    #[test]
    fn translate_cds_undefined_codon() {
        assert!(translate_cds("AT-").is_err());
        assert_eq!(translate_cds("ANT").unwrap(), "X");
    }

    #[test]
    fn codons_for_aa_sorted() -> Result<(), Error> {
        assert_eq!(codons_for_aa('M')?, vec!["ATG"]);
        assert_eq!(codons_for_aa('*')?, vec!["TAA", "TAG", "TGA"]);
        assert_eq!(codons_for_aa('K')?, vec!["AAA", "AAG"]);
        assert!(codons_for_aa('J').is_err());
        Ok(())
    }

    #[test]
    fn aa_conversions() -> Result<(), Error> {
        assert_eq!(aa1_to_aa3("MHV*")?, "MetHisValTer");
        assert_eq!(aa3_to_aa1("MetHisValTer")?, "MHV*");
        assert_eq!(aa_to_aa3("L")?, "Leu");
        assert_eq!(aa_to_aa3("Leu")?, "Leu");
        assert_eq!(aa_to_aa3("?")?, "?");
        assert!(aa1_to_aa3("J").is_err());
        Ok(())
    }

    #[test]
    fn trim_prefixes_suffixes() {
        assert_eq!(
            trim_common_prefixes("AACG", "AATT"),
            (2, "CG".to_string(), "TT".to_string())
        );
        assert_eq!(
            trim_common_suffixes("CGAA", "TTAA"),
            (2, "CG".to_string(), "TT".to_string())
        );
        assert_eq!(
            trim_common_prefixes("", "AA"),
            (0, "".to_string(), "AA".to_string())
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
