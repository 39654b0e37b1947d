//! End-to-end projections: parse, project, format.

use std::str::FromStr;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use txmap::data::json::Provider as JsonProvider;
use txmap::mapper::variant::{Config, Mapper};
use txmap::mapper::Error;
use txmap::parser::HgvsVariant;

const TX: &str = "NM_001164277.1";
const CONTIG: &str = "NC_000011.9";

fn provider() -> Arc<JsonProvider> {
    JsonProvider::with_path("tests/data/transcripts.json").expect("fixture must parse")
}

fn mapper() -> Mapper {
    let config = Config {
        shared_cache: false,
        ..Default::default()
    };
    Mapper::new(&config, provider())
}

#[test]
fn g_to_c_round_trips() -> Result<(), anyhow::Error> {
    let mapper = mapper();
    for (hgvs_g, hgvs_c) in [
        ("NC_000011.9:g.118898963T>A", "NM_001164277.1:c.1A>T"),
        ("NC_000011.9:g.118898437G>T", "NM_001164277.1:c.526+1C>A"),
    ] {
        let var_g = HgvsVariant::from_str(hgvs_g)?;
        let var_c = mapper.g_to_c(&var_g, TX, "splign")?;
        assert_eq!(format!("{var_c}"), hgvs_c);

        let back = mapper.c_to_g(&var_c, CONTIG, "splign")?;
        assert_eq!(format!("{back}"), hgvs_g);
    }
    Ok(())
}

#[test]
fn g_to_n_round_trips() -> Result<(), anyhow::Error> {
    let mapper = mapper();
    let var_g = HgvsVariant::from_str("NC_000011.9:g.118898963T>A")?;

    let var_n = mapper.g_to_n(&var_g, TX, "splign")?;
    assert_eq!(format!("{var_n}"), "NM_001164277.1:n.112A>T");

    let back = mapper.n_to_g(&var_n, CONTIG, "splign")?;
    assert_eq!(format!("{back}"), "NC_000011.9:g.118898963T>A");

    Ok(())
}

#[test]
fn out_of_bounds_positions_rejected() -> Result<(), anyhow::Error> {
    let mapper = mapper();

    let var_g = HgvsVariant::from_str("NC_000011.9:g.118897000C>T")?;
    assert!(matches!(
        mapper.g_to_c(&var_g, TX, "splign"),
        Err(Error::OutOfBounds(_, _))
    ));

    let var_c = HgvsVariant::from_str("NM_001164277.1:c.99999G>A")?;
    assert!(matches!(
        mapper.c_to_g(&var_c, CONTIG, "splign"),
        Err(Error::OutOfBounds(_, _))
    ));

    Ok(())
}

#[test]
fn reference_mismatch_strict_vs_replace() -> Result<(), anyhow::Error> {
    let provider = provider();
    let strict = Mapper::new(
        &Config {
            replace_reference: false,
            shared_cache: false,
            ..Default::default()
        },
        provider.clone(),
    );
    let lenient = Mapper::new(
        &Config {
            shared_cache: false,
            ..Default::default()
        },
        provider,
    );

    // Declares A where the genome has G.
    let var_g = HgvsVariant::from_str("NC_000011.9:g.118898437A>T")?;
    assert!(matches!(
        strict.g_to_c(&var_g, TX, "splign"),
        Err(Error::ReferenceMismatch { .. })
    ));

    let var_c = lenient.g_to_c(&var_g, TX, "splign")?;
    assert_eq!(format!("{var_c}"), "NM_001164277.1:c.526+1C>A");

    Ok(())
}

#[test]
fn protein_consequences() -> Result<(), anyhow::Error> {
    let mapper = mapper();

    // Single-base deletion shifts the frame.
    let var_c = HgvsVariant::from_str("NM_001164277.1:c.5del")?;
    let var_p = mapper.c_to_p(&var_c, None)?;
    assert_eq!(format!("{var_p}"), "NP_001157749.1:p.(Asp2ValfsTer?)");

    // Whole-codon deletion stays in frame; the repeat resolves to the
    // last affected codon.
    let var_c = HgvsVariant::from_str("NM_001164277.1:c.4_6del")?;
    let var_p = mapper.c_to_p(&var_c, None)?;
    assert_eq!(format!("{var_p}"), "NP_001157749.1:p.(Asp234del)");

    // Touching the initiation codon.
    let var_c = HgvsVariant::from_str("NM_001164277.1:c.1A>T")?;
    let var_p = mapper.c_to_p(&var_c, None)?;
    assert_eq!(format!("{var_p}"), "NP_001157749.1:p.Met1?");

    Ok(())
}

#[test]
fn p_to_c_picks_minimal_codon_change() -> Result<(), anyhow::Error> {
    let mapper = mapper();
    let var_p = HgvsVariant::from_str("NP_001157749.1:p.Asp2Val")?;

    let var_c = mapper.p_to_c(&var_p, TX)?;
    assert_eq!(format!("{var_c}"), "NM_001164277.1:c.5A>T");

    Ok(())
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
