//! Structural validation of variant descriptions.
//!
//! Validation checks invariants that the grammar alone cannot express,
//! such as interval endpoint ordering.  It is purely intrinsic; no
//! sequence data is consulted.

use thiserror::Error;

use crate::parser::ds::*;

/// Error type for structural violations.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("interval start must not be after end: {0}")]
    IntervalOrder(String),
    #[error("position base must not be zero: {0}")]
    ZeroBase(String),
    #[error("insertion must be given as a two-base interval: {0}")]
    InsSpan(String),
}

/// Intrinsic validation of a variant description.
pub trait Validateable {
    fn validate(&self) -> Result<(), Error>;
}

/// Ordering key for CDS positions.
///
/// 5' UTR positions (negative base) precede CDS positions precede 3' UTR
/// (`*`) positions; within a base, intron offsets order the positions.
fn cds_key(pos: &CdsPos) -> (i32, i32, i32) {
    let from = match pos.cds_from {
        CdsFrom::Start => 0,
        CdsFrom::End => 1,
    };
    (from, pos.base, pos.offset.unwrap_or(0))
}

fn tx_key(pos: &TxPos) -> (i32, i32) {
    (pos.base, pos.offset.unwrap_or(0))
}

impl Validateable for GenomeInterval {
    fn validate(&self) -> Result<(), Error> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(Error::IntervalOrder(format!("{self}")));
            }
        }
        Ok(())
    }
}

impl Validateable for TxInterval {
    fn validate(&self) -> Result<(), Error> {
        if self.start.base == 0 || self.end.base == 0 {
            return Err(Error::ZeroBase(format!("{self}")));
        }
        if tx_key(&self.start) > tx_key(&self.end) {
            return Err(Error::IntervalOrder(format!("{self}")));
        }
        Ok(())
    }
}

impl Validateable for CdsInterval {
    fn validate(&self) -> Result<(), Error> {
        if self.start.base == 0 || self.end.base == 0 {
            return Err(Error::ZeroBase(format!("{self}")));
        }
        if cds_key(&self.start) > cds_key(&self.end) {
            return Err(Error::IntervalOrder(format!("{self}")));
        }
        Ok(())
    }
}

impl Validateable for ProtInterval {
    fn validate(&self) -> Result<(), Error> {
        if self.start.number > self.end.number {
            return Err(Error::IntervalOrder(format!("{self}")));
        }
        Ok(())
    }
}

/// An insertion changes nothing of the reference; its location must be the
/// two bases flanking the insertion point.
fn validate_ins_span(span: i64, loc: &impl std::fmt::Display) -> Result<(), Error> {
    if span != 2 {
        Err(Error::InsSpan(format!("{loc}")))
    } else {
        Ok(())
    }
}

impl Validateable for HgvsVariant {
    fn validate(&self) -> Result<(), Error> {
        match self {
            HgvsVariant::GenomeVariant { loc_edit, .. } => {
                let loc = loc_edit.loc.inner();
                loc.validate()?;
                if let NaEdit::Ins { .. } = loc_edit.edit.inner() {
                    if let (Some(start), Some(end)) = (loc.start, loc.end) {
                        validate_ins_span(end as i64 - start as i64 + 1, loc)?;
                    }
                }
                Ok(())
            }
            HgvsVariant::TxVariant { loc_edit, .. } => {
                let loc = loc_edit.loc.inner();
                loc.validate()?;
                if let NaEdit::Ins { .. } = loc_edit.edit.inner() {
                    if loc.start.offset.is_none() && loc.end.offset.is_none() {
                        validate_ins_span(
                            loc.end.base as i64 - loc.start.base as i64 + 1,
                            loc,
                        )?;
                    }
                }
                Ok(())
            }
            HgvsVariant::CdsVariant { loc_edit, .. } => {
                let loc = loc_edit.loc.inner();
                loc.validate()?;
                if let NaEdit::Ins { .. } = loc_edit.edit.inner() {
                    if loc.start.offset.is_none()
                        && loc.end.offset.is_none()
                        && loc.start.cds_from == loc.end.cds_from
                    {
                        validate_ins_span(
                            loc.end.base as i64 - loc.start.base as i64 + 1,
                            loc,
                        )?;
                    }
                }
                Ok(())
            }
            HgvsVariant::ProtVariant { loc_edit, .. } => match loc_edit {
                ProtLocEdit::Ordinary { loc, .. } => loc.inner().validate(),
                _ => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn interval_order() {
        assert!(GenomeInterval {
            start: Some(100),
            end: Some(200)
        }
        .validate()
        .is_ok());
        assert!(GenomeInterval {
            start: Some(200),
            end: Some(100)
        }
        .validate()
        .is_err());
        // Unknown endpoints cannot be ordered; accept them.
        assert!(GenomeInterval {
            start: None,
            end: Some(100)
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn cds_interval_order() {
        // -1 (last 5' UTR base) precedes 1 (first CDS base).
        assert!(CdsInterval::from_str("-1_1").unwrap().validate().is_ok());
        // CDS positions precede `*` (3' UTR) positions.
        assert!(CdsInterval::from_str("332_*2").unwrap().validate().is_ok());
        assert!(CdsInterval::from_str("*2_332").unwrap().validate().is_err());
        // Intron offsets break ties within a base.
        assert!(CdsInterval::from_str("526+1_526+2")
            .unwrap()
            .validate()
            .is_ok());
        assert!(CdsInterval::from_str("526+2_526+1")
            .unwrap()
            .validate()
            .is_err());
    }

    #[test]
    fn zero_base_rejected() {
        assert!(CdsInterval::from_str("0_1").unwrap().validate().is_err());
    }

    #[test]
    fn ins_span() {
        assert!(
            HgvsVariant::from_str("NC_000011.9:g.118898437_118898438insAG").is_ok()
        );
        assert!(HgvsVariant::from_str("NC_000011.9:g.118898437insAG").is_err());
        assert!(
            HgvsVariant::from_str("NC_000011.9:g.118898437_118898440insAG").is_err()
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
