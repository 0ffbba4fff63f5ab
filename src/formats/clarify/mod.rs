//! Clarify ENR `detail.xml` reader.
//!
//! Layout of the parts we use:
//!
//! ```text
//! ElectionResult
//!   Timestamp / ElectionName / ElectionDate / Region      (text)
//!   ElectionVoterTurnout
//!     Counties/County  or  Precincts/Precinct             name totalVoters ballotsCast
//!   Contest key text voteFor isQuestion countiesParticipating
//!     VoteType name votes                                 contest-level (undervotes...)
//!       County|Precinct name votes
//!     Choice key text party totalVotes
//!       VoteType name votes
//!         County|Precinct name votes
//! ```
//!
//! Statewide files break results down by county, county files by precinct;
//! either element is read as a jurisdiction.

use super::{FormatError, Result};
use crate::model::election::{Choice, Contest, ElectionResults, Jurisdiction, VoteResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::{debug, warn};

const ROOT: &str = "ElectionResult";
const MAX_COUNT: u64 = i64::MAX as u64;

/// Parse a complete `detail.xml` document.
pub fn read_detail_xml<R: BufRead>(input: R) -> Result<ElectionResults> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut parser = DetailParser::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = element_name(&e);
                parser.open(&name, &e)?;
                parser.stack.push(name);
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                parser.open(&name, &e)?;
                parser.close(&name);
            }
            Event::End(_) => {
                if let Some(name) = parser.stack.pop() {
                    parser.close(&name);
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                parser.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    parser.finish()
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Attributes of one element, unescaped.
struct Attrs {
    element: String,
    values: HashMap<String, String>,
}

impl Attrs {
    fn read(element: &str, e: &BytesStart) -> Result<Attrs> {
        let mut values = HashMap::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            values.insert(key, value);
        }
        Ok(Attrs {
            element: element.to_string(),
            values,
        })
    }

    fn get(&self, attribute: &str) -> Option<&str> {
        self.values.get(attribute).map(|v| v.as_str())
    }

    fn required(&self, attribute: &str) -> Result<&str> {
        self.get(attribute)
            .ok_or_else(|| FormatError::MissingAttribute {
                element: self.element.clone(),
                attribute: attribute.to_string(),
            })
    }

    /// Counts above `i64::MAX` are invalid: residuals are signed.
    fn parse_count(&self, attribute: &str, value: &str) -> Result<u64> {
        value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|&count| count <= MAX_COUNT)
            .ok_or_else(|| FormatError::InvalidNumber {
                element: self.element.clone(),
                attribute: attribute.to_string(),
                value: value.to_string(),
            })
    }

    fn count(&self, attribute: &str) -> Result<u64> {
        let value = self.required(attribute)?;
        self.parse_count(attribute, value)
    }

    fn optional_count(&self, attribute: &str) -> Result<Option<u64>> {
        match self.get(attribute) {
            Some(value) => self.parse_count(attribute, value).map(Some),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
struct DetailParser {
    election: ElectionResults,
    stack: Vec<String>,
    saw_root: bool,
    contest: Option<Contest>,
    choice: Option<String>,
    vote_type: Option<String>,
}

impl DetailParser {
    fn inside(&self, element: &str) -> bool {
        self.stack.iter().any(|e| e == element)
    }

    fn open(&mut self, name: &str, e: &BytesStart) -> Result<()> {
        match name {
            ROOT => self.saw_root = true,
            "Contest" => self.open_contest(&Attrs::read(name, e)?)?,
            "Choice" => self.open_choice(&Attrs::read(name, e)?)?,
            "VoteType" => self.open_vote_type(&Attrs::read(name, e)?)?,
            "County" | "Precinct" => {
                let attrs = Attrs::read(name, e)?;
                if self.inside("ElectionVoterTurnout") {
                    self.election.result_jurisdictions.push(Jurisdiction {
                        name: attrs.required("name")?.to_string(),
                        ballots_cast: attrs.count("ballotsCast")?,
                        total_voters: attrs.count("totalVoters")?,
                    });
                } else if self.inside("VoteType") {
                    self.push_result(Some(attrs.required("name")?), attrs.count("votes")?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn open_contest(&mut self, attrs: &Attrs) -> Result<()> {
        // County-level files count counties; precinct-level files only
        // carry precinct participation.
        let participating = match attrs.optional_count("countiesParticipating")? {
            Some(n) => n,
            None => attrs.optional_count("precinctsParticipating")?.unwrap_or(0),
        };

        let mut contest = Contest::new(
            attrs.required("key")?,
            attrs.required("text")?,
            Vec::new(),
            participating as u32,
        );
        if let Some(vote_for) = attrs.optional_count("voteFor")? {
            contest.vote_for = vote_for as u32;
        }
        contest.is_question = attrs
            .get("isQuestion")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if let Some(open) = self.contest.take() {
            warn!("Contest {} was not closed before {}", open.label, contest.label);
            self.election.contests.push(open);
        }
        self.contest = Some(contest);
        Ok(())
    }

    fn open_choice(&mut self, attrs: &Attrs) -> Result<()> {
        let contest = match self.contest.as_mut() {
            Some(contest) => contest,
            None => return Ok(()),
        };
        let mut choice = Choice::new(attrs.required("key")?, attrs.required("text")?);
        choice.party = attrs.get("party").filter(|p| !p.is_empty()).map(String::from);
        self.choice = Some(choice.key.clone());
        contest.choices.push(choice);
        Ok(())
    }

    fn open_vote_type(&mut self, attrs: &Attrs) -> Result<()> {
        self.vote_type = Some(attrs.required("name")?.to_string());
        // The VoteType element's own votes are the file-wide total.
        if let Some(votes) = attrs.optional_count("votes")? {
            self.push_result(None, votes);
        }
        Ok(())
    }

    fn push_result(&mut self, jurisdiction: Option<&str>, votes: u64) {
        if let Some(contest) = &self.contest {
            self.election.results.push(VoteResult {
                contest: contest.key.clone(),
                choice: self.choice.clone(),
                jurisdiction: jurisdiction.map(String::from),
                vote_type: self.vote_type.clone(),
                votes,
            });
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "Contest" => {
                if let Some(contest) = self.contest.take() {
                    self.election.contests.push(contest);
                }
                self.choice = None;
                self.vote_type = None;
            }
            "Choice" => self.choice = None,
            "VoteType" => self.vote_type = None,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let value = text.to_string();
        match self.stack.last().map(|s| s.as_str()) {
            Some("Timestamp") => self.election.timestamp = Some(value),
            Some("ElectionName") => self.election.election_name = value,
            Some("ElectionDate") => self.election.election_date = value,
            Some("Region") => self.election.region = value,
            _ => {}
        }
    }

    fn finish(mut self) -> Result<ElectionResults> {
        if !self.saw_root {
            return Err(FormatError::Malformed(format!("no <{}> element", ROOT)));
        }
        if let Some(contest) = self.contest.take() {
            warn!("Contest {} was not closed", contest.label);
            self.election.contests.push(contest);
        }
        debug!(
            "Parsed {} contests, {} jurisdictions, {} results",
            self.election.contests.len(),
            self.election.result_jurisdictions.len(),
            self.election.results.len()
        );
        Ok(self.election)
    }
}
