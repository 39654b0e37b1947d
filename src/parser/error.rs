//! Error type definition.

use thiserror::Error;

/// Error type for parsing of variant expressions.
#[derive(Error, Debug)]
pub enum Error {
    /// Syntax error with position context.
    #[error("syntax error in {input:?} at offset {offset}: expected {expected}")]
    Syntax {
        input: String,
        offset: usize,
        expected: &'static str,
    },
    /// The expression parsed but violates a structural invariant.
    #[error("malformed variant")]
    MalformedVariant(#[from] crate::validator::Error),
}

impl Error {
    /// Build a syntax error from the unparsed remainder of `input`.
    pub(crate) fn syntax(input: &str, rest: &str, expected: &'static str) -> Self {
        Error::Syntax {
            input: input.to_string(),
            offset: input.len() - rest.len(),
            expected,
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
