//! Parsing and formatting of variant descriptions.
//!
//! The data structures from [`ds`] model the supported subset of the
//! nomenclature.  Parsing goes through `FromStr`, formatting through
//! `Display`:
//!
//! ```
//! use std::str::FromStr;
//! use txmap::parser::HgvsVariant;
//!
//! let variant = HgvsVariant::from_str("NM_001164277.1:c.526+1C>A").unwrap();
//! assert_eq!(format!("{}", &variant), "NM_001164277.1:c.526+1C>A");
//! ```
//!
//! `FromStr` also runs structural validation; expressions such as
//! `g.200_100del` (end before start) are rejected with
//! [`Error::MalformedVariant`].

mod display;
pub mod ds;
mod error;
mod impl_parse;
mod parse_funcs;

pub use ds::*;
pub use error::Error;

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::HgvsVariant;

    // Canonically written expressions must survive a parse/format cycle
    // unchanged.
    #[rstest]
    #[case("NC_000011.9:g.118898437G>T")]
    #[case("NC_000011.9:g.118898436_118898437del")]
    #[case("NC_000011.9:g.118898436_118898437delGC")]
    #[case("NC_000011.9:g.118898437_118898438insAG")]
    #[case("NC_000011.9:g.118898437dup")]
    #[case("NC_000011.9:g.118898437_118898440inv")]
    #[case("NC_000011.9:g.118898437=")]
    #[case("NC_000011.9:g.(118898437_118898440)del")]
    #[case("NC_000011.9:g.?_118898440del")]
    #[case("NM_001164277.1:n.748G>T")]
    #[case("NM_001164277.1:n.637+1C>A")]
    #[case("NM_001164277.1:c.526+1C>A")]
    #[case("NM_001164277.1:c.-12A>G")]
    #[case("NM_001164277.1:c.*5del")]
    #[case("NM_001164277.1:c.525_526delinsTT")]
    #[case("NM_000051.3(ATM):c.3245_3247delinsTGAT")]
    #[case("NP_000293.2:p.Leu25Arg")]
    #[case("NP_000293.2:p.(Leu25Arg)")]
    #[case("NP_000293.2:p.Leu25_Ala28del")]
    #[case("NP_000293.2:p.Leu25delinsArgThr")]
    #[case("NP_000293.2:p.Leu25dup")]
    #[case("NP_000293.2:p.Leu25=")]
    #[case("NP_000293.2:p.Arg97ProfsTer23")]
    #[case("NP_000293.2:p.Arg97fs")]
    #[case("NP_000293.2:p.Ile327ArgfsTer?")]
    #[case("NP_000293.2:p.=")]
    #[case("NP_000293.2:p.(=)")]
    #[case("NP_000293.2:p.0")]
    #[case("NP_000293.2:p.0?")]
    #[case("NP_000293.2:p.?")]
    #[case("NP_000293.2:p.Met1?")]
    fn roundtrip(#[case] expression: &str) -> Result<(), anyhow::Error> {
        let variant = HgvsVariant::from_str(expression)?;
        assert_eq!(format!("{}", &variant), expression);
        Ok(())
    }

    #[rstest]
    #[case("NC_000011.9")]
    #[case("NC_000011.9:")]
    #[case("NC_000011.9:g.")]
    #[case("NC_000011.9:q.118898437G>T")]
    #[case("NC_000011.9:g.118898437G>")]
    #[case("NC_000011.9:g.118898437G>T trailing")]
    fn reject_malformed(#[case] expression: &str) {
        assert!(HgvsVariant::from_str(expression).is_err());
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
