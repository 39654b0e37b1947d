//! Coordinate mapping along a CIGAR-described alignment.

use std::fmt::Display;

use crate::mapper::error::Error;

/// CIGAR operation; the transcript is the reference side of the alignment.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CigarOp {
    /// `=`
    Eq,
    /// `D`
    Del,
    /// `I`
    Ins,
    /// `M`
    Match,
    /// `N`
    Skip,
    /// `X`
    Mismatch,
}

impl CigarOp {
    pub fn advances_ref(&self) -> bool {
        matches!(
            self,
            CigarOp::Eq | CigarOp::Match | CigarOp::Mismatch | CigarOp::Ins | CigarOp::Skip
        )
    }

    pub fn advances_tgt(&self) -> bool {
        matches!(
            self,
            CigarOp::Eq | CigarOp::Match | CigarOp::Mismatch | CigarOp::Del
        )
    }
}

impl TryFrom<char> for CigarOp {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Error> {
        Ok(match value {
            '=' => Self::Eq,
            'D' => Self::Del,
            'I' => Self::Ins,
            'M' => Self::Match,
            'N' => Self::Skip,
            'X' => Self::Mismatch,
            _ => return Err(Error::InvalidCigarOp(value)),
        })
    }
}

impl From<CigarOp> for char {
    fn from(val: CigarOp) -> Self {
        match val {
            CigarOp::Eq => '=',
            CigarOp::Del => 'D',
            CigarOp::Ins => 'I',
            CigarOp::Match => 'M',
            CigarOp::Skip => 'N',
            CigarOp::Mismatch => 'X',
        }
    }
}

impl Display for CigarOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// CIGAR element consisting of count and operation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CigarElement {
    pub count: i32,
    pub op: CigarOp,
}

impl Display for CigarElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count > 1 {
            write!(f, "{}", self.count)?;
        }
        write!(f, "{}", self.op)
    }
}

/// A CIGAR string as a list of elements.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct CigarString {
    pub elems: Vec<CigarElement>,
}

impl CigarString {
    pub fn new(elems: Vec<CigarElement>) -> Self {
        Self { elems }
    }

    /// Parse from the textual representation, e.g., `"637="` or `"20=5I10="`.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let mut elems = Vec::new();
        let mut count: i32 = 0;
        let mut have_count = false;
        for c in input.chars() {
            if let Some(digit) = c.to_digit(10) {
                count = count
                    .checked_mul(10)
                    .and_then(|count| count.checked_add(digit as i32))
                    .ok_or_else(|| Error::InvalidCigarString(input.to_string()))?;
                have_count = true;
            } else {
                // A spelled-out count of zero cannot survive reformatting.
                if have_count && count == 0 {
                    return Err(Error::InvalidCigarString(input.to_string()));
                }
                elems.push(CigarElement {
                    count: if have_count { count } else { 1 },
                    op: CigarOp::try_from(c)?,
                });
                count = 0;
                have_count = false;
            }
        }
        if have_count {
            return Err(Error::InvalidCigarString(input.to_string()));
        }
        Ok(Self { elems })
    }
}

impl std::ops::Deref for CigarString {
    type Target = Vec<CigarElement>;
    fn deref(&self) -> &Self::Target {
        &self.elems
    }
}

impl std::ops::DerefMut for CigarString {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.elems
    }
}

impl Display for CigarString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for item in &self.elems {
            write!(f, "{}", &item)?;
        }
        Ok(())
    }
}

/// Which endpoint of an interval a position represents.
///
/// Positions falling into insertions, deletions, or skipped regions map
/// differently depending on whether they close or open the interval.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum IntervalEnd {
    Start,
    End,
}

/// One aligned segment; `ref_start`/`tgt_start` are the cumulative offsets
/// of the segment on either side of the alignment.
#[derive(Debug, Clone, Copy)]
struct Segment {
    ref_start: i32,
    tgt_start: i32,
    op: CigarOp,
}

/// Result of mapping a position through a [`CigarMapper`].
#[derive(Debug, PartialEq)]
pub struct CigarMapperResult {
    pub pos: i32,
    pub offset: i32,
    pub cigar_op: CigarOp,
}

/// Maps positions between two sequences whose alignment is given by a
/// CIGAR string.
///
/// Positions are interbase.  "ref" is the side that advances on `I` and
/// `N`; for assembled transcript alignments this is the genomic side.
#[derive(Debug)]
pub struct CigarMapper {
    segments: Vec<Segment>,
    pub ref_len: i32,
    pub tgt_len: i32,
}

#[derive(Clone, Copy)]
enum Direction {
    RefToTgt,
    TgtToRef,
}

impl CigarMapper {
    pub fn new(cigar_string: &CigarString) -> Self {
        let mut segments = Vec::with_capacity(cigar_string.len());
        let mut ref_cur = 0;
        let mut tgt_cur = 0;
        for &CigarElement { count, op } in cigar_string.iter() {
            segments.push(Segment {
                ref_start: ref_cur,
                tgt_start: tgt_cur,
                op,
            });
            if op.advances_ref() {
                ref_cur += count;
            }
            if op.advances_tgt() {
                tgt_cur += count;
            }
        }
        Self {
            segments,
            ref_len: ref_cur,
            tgt_len: tgt_cur,
        }
    }

    pub fn map_ref_to_tgt(
        &self,
        pos: i32,
        end: IntervalEnd,
        strict_bounds: bool,
    ) -> Result<CigarMapperResult, Error> {
        self.map(Direction::RefToTgt, pos, end, strict_bounds)
    }

    pub fn map_tgt_to_ref(
        &self,
        pos: i32,
        end: IntervalEnd,
        strict_bounds: bool,
    ) -> Result<CigarMapperResult, Error> {
        self.map(Direction::TgtToRef, pos, end, strict_bounds)
    }

    fn map(
        &self,
        direction: Direction,
        pos: i32,
        end: IntervalEnd,
        strict_bounds: bool,
    ) -> Result<CigarMapperResult, Error> {
        let from = |segment: &Segment| match direction {
            Direction::RefToTgt => segment.ref_start,
            Direction::TgtToRef => segment.tgt_start,
        };
        let to = |segment: &Segment| match direction {
            Direction::RefToTgt => segment.tgt_start,
            Direction::TgtToRef => segment.ref_start,
        };
        let from_len = match direction {
            Direction::RefToTgt => self.ref_len,
            Direction::TgtToRef => self.tgt_len,
        };

        if self.segments.is_empty() || strict_bounds && (pos < 0 || pos > from_len) {
            return Err(Error::OutOfBounds(pos, from_len));
        }

        // Select the segment whose half-open "from" interval contains pos;
        // positions before the first or after the last segment clamp to it.
        let i = self
            .segments
            .partition_point(|segment| from(segment) <= pos)
            .max(1)
            - 1;
        let segment = &self.segments[i];
        let from_end = self
            .segments
            .get(i + 1)
            .map(|next| from(next))
            .unwrap_or(from_len);

        match segment.op {
            CigarOp::Eq | CigarOp::Match | CigarOp::Mismatch => Ok(CigarMapperResult {
                pos: to(segment) + (pos - from(segment)),
                offset: 0,
                cigar_op: segment.op,
            }),
            CigarOp::Del | CigarOp::Ins => Ok(CigarMapperResult {
                pos: match end {
                    IntervalEnd::Start => to(segment) - 1,
                    IntervalEnd::End => to(segment),
                },
                offset: 0,
                cigar_op: segment.op,
            }),
            CigarOp::Skip => {
                // Within an intron; anchor at the closer exon boundary and
                // record the distance as offset.
                if pos - from(segment) < from_end - pos {
                    Ok(CigarMapperResult {
                        pos: to(segment) - 1,
                        offset: pos - from(segment) + 1,
                        cigar_op: segment.op,
                    })
                } else {
                    Ok(CigarMapperResult {
                        pos: to(segment),
                        offset: -(from_end - pos),
                        cigar_op: segment.op,
                    })
                }
            }
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
