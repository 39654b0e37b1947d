//! Error type definition.

use thiserror::Error;

/// Error type for data access.
#[derive(Error, Debug)]
pub enum Error {
    /// The backing store could not be reached; retrying may succeed.
    #[error("data source temporarily unavailable: {0}")]
    DataUnavailable(String),
    #[error("could not open transcript JSON file: {0}")]
    JsonOpen(String),
    #[error("could not parse transcript JSON file: {0}")]
    JsonParse(String),
    #[error("no transcript found for {0}")]
    NoTranscriptFound(String),
    #[error("no alignment found for {0} to {1} ({2})")]
    NoAlignmentFound(String, String, String),
    #[error("found no sequence record for accession {0}")]
    NoSequenceRecord(String),
    #[error("sequence record {0} does not cover [{1}, {2})")]
    SequenceOutOfRange(String, usize, usize),
    #[error("no assembly {0}")]
    NoAssembly(String),
}

impl Error {
    /// Whether the failure is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::DataUnavailable(_))
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn retryable_errors() {
        assert!(Error::DataUnavailable("connection reset".to_string()).is_retryable());

        assert!(!Error::NoTranscriptFound("NM_000001.1".to_string()).is_retryable());
        assert!(!Error::NoSequenceRecord("NC_000001.10".to_string()).is_retryable());
        assert!(!Error::SequenceOutOfRange("NC_000001.10".to_string(), 0, 10).is_retryable());
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
