//! Mapping of variants between coordinate systems.
//!
//! The work is split into layers: `cigar` maps single positions across
//! one alignment, `alignment` maps intervals between the g., n., and c.
//! systems of one transcript, `variant` maps whole variants (including
//! protein prediction via `altseq`), and `assembly` resolves contig
//! accessions from an assembly name.  `cache` holds the alignment
//! mappers shared by all of them.

pub mod alignment;
pub mod altseq;
pub mod assembly;
pub mod cache;
pub mod cigar;
pub mod error;
pub mod variant;

pub use error::Error;

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
