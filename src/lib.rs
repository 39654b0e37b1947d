//! Parsing, formatting, projection, and normalization of transcript-level
//! sequence variants.
//!
//! The crate is organized around three layers: `parser` holds the variant
//! data structures and their textual representation, `mapper` projects
//! variants between the genomic, transcript, CDS, and protein coordinate
//! systems, and `normalizer` shuffles variants to a canonical spot within
//! repetitive sequence.  `data` supplies the transcript and sequence
//! records everything else consumes.

pub mod data;
pub mod mapper;
pub mod normalizer;
pub mod parser;
pub mod sequences;
pub mod validator;

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
