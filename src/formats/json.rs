//! JSON snapshot of already-parsed election results, using the serde
//! layout of [`ElectionResults`].

use super::Result;
use crate::model::election::ElectionResults;
use std::io::{Read, Write};

pub fn read_snapshot<R: Read>(input: R) -> Result<ElectionResults> {
    Ok(serde_json::from_reader(input)?)
}

pub fn write_snapshot<W: Write>(election: &ElectionResults, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, election)?;
    Ok(())
}
