use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A vote-counting unit (a county in a statewide file, a precinct in a
/// county file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub name: String,
    pub ballots_cast: u64,
    /// Registered voters. Expected to be positive but not enforced here.
    pub total_voters: u64,
}

impl Jurisdiction {
    pub fn new(name: &str, ballots_cast: u64, total_voters: u64) -> Jurisdiction {
        Jurisdiction {
            name: name.to_string(),
            ballots_cast,
            total_voters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Source identifier, unique within its contest.
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
}

impl Choice {
    pub fn new(key: &str, name: &str) -> Choice {
        Choice {
            key: key.to_string(),
            name: name.to_string(),
            party: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub key: String,
    pub label: String,
    pub choices: Vec<Choice>,
    /// Number of jurisdictions reporting this contest.
    pub counties_participating: u32,
    #[serde(default = "default_vote_for")]
    pub vote_for: u32,
    #[serde(default)]
    pub is_question: bool,
}

fn default_vote_for() -> u32 {
    1
}

impl Contest {
    pub fn new(key: &str, label: &str, choices: Vec<Choice>, counties_participating: u32) -> Contest {
        Contest {
            key: key.to_string(),
            label: label.to_string(),
            choices,
            counties_participating,
            vote_for: 1,
            is_question: false,
        }
    }

    /// A contest is statewide when every jurisdiction in the file reports it.
    pub fn is_statewide(&self, jurisdiction_count: usize) -> bool {
        jurisdiction_count > 0 && self.counties_participating as usize == jurisdiction_count
    }
}

/// One tally line from the results file.
///
/// `choice` is absent for contest-level vote types (undervotes, overvotes)
/// and `jurisdiction` is absent for file-wide totals. Neither kind ever
/// matches a per-jurisdiction rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub contest: String,
    #[serde(default)]
    pub choice: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub vote_type: Option<String>,
    pub votes: u64,
}

impl VoteResult {
    pub fn new(contest: &str, choice: &str, jurisdiction: &str, votes: u64) -> VoteResult {
        VoteResult {
            contest: contest.to_string(),
            choice: Some(choice.to_string()),
            jurisdiction: Some(jurisdiction.to_string()),
            vote_type: None,
            votes,
        }
    }

    pub fn with_vote_type(mut self, vote_type: &str) -> VoteResult {
        self.vote_type = Some(vote_type.to_string());
        self
    }

    pub fn matches(&self, contest: &Contest, choice: &Choice, jurisdiction: &Jurisdiction) -> bool {
        self.contest == contest.key
            && self.choice.as_deref() == Some(choice.key.as_str())
            && self.jurisdiction.as_deref() == Some(jurisdiction.name.as_str())
    }
}

/// Everything one results file says about an election.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionResults {
    pub region: String,
    pub election_name: String,
    pub election_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub contests: Vec<Contest>,
    pub result_jurisdictions: Vec<Jurisdiction>,
    pub results: Vec<VoteResult>,
}

impl ElectionResults {
    /// Election date as a calendar date, when it is in one of the layouts
    /// Clarify uses (`11/8/2016`) or ISO form.
    pub fn election_day(&self) -> Option<NaiveDate> {
        let raw = self.election_date.trim();
        NaiveDate::parse_from_str(raw, "%m/%d/%Y")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }
}
