use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub type DivisionId = u32;
pub type MemberId = u32;

/// Recorded position of a member in a division.
///
/// The integer codes are written verbatim into the matrix file and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteOutcome {
    Missing,
    AyeTeller,
    Aye,
    Both,
    No,
    NoTeller,
}

impl VoteOutcome {
    pub const fn code(self) -> i8 {
        match self {
            VoteOutcome::Missing => -9,
            VoteOutcome::AyeTeller => 1,
            VoteOutcome::Aye => 2,
            VoteOutcome::Both => 3,
            VoteOutcome::No => 4,
            VoteOutcome::NoTeller => 5,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -9 => Some(VoteOutcome::Missing),
            1 => Some(VoteOutcome::AyeTeller),
            2 => Some(VoteOutcome::Aye),
            3 => Some(VoteOutcome::Both),
            4 => Some(VoteOutcome::No),
            5 => Some(VoteOutcome::NoTeller),
            _ => None,
        }
    }
}

impl std::fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            VoteOutcome::Missing => "missing",
            VoteOutcome::AyeTeller => "aye_teller",
            VoteOutcome::Aye => "aye",
            VoteOutcome::Both => "both",
            VoteOutcome::No => "no",
            VoteOutcome::NoTeller => "no_teller",
        };
        write!(f, "{value}")
    }
}

impl Serialize for VoteOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

/// The five member lists of a division, in the order they are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Ayes,
    AyeTellers,
    Noes,
    NoTellers,
    NoVoteRecorded,
}

impl Category {
    /// Earlier categories win when a member appears twice in one division.
    pub const ORDER: [Category; 5] = [
        Category::Ayes,
        Category::AyeTellers,
        Category::Noes,
        Category::NoTellers,
        Category::NoVoteRecorded,
    ];

    pub const fn outcome(self) -> VoteOutcome {
        match self {
            Category::Ayes => VoteOutcome::Aye,
            Category::AyeTellers => VoteOutcome::AyeTeller,
            Category::Noes => VoteOutcome::No,
            Category::NoTellers => VoteOutcome::NoTeller,
            Category::NoVoteRecorded => VoteOutcome::Missing,
        }
    }

    /// Field name used by the API document.
    pub const fn field(self) -> &'static str {
        match self {
            Category::Ayes => "Ayes",
            Category::AyeTellers => "AyeTellers",
            Category::Noes => "Noes",
            Category::NoTellers => "NoTellers",
            Category::NoVoteRecorded => "NoVoteRecorded",
        }
    }
}

// Wire shapes, as served by the votes API. Unknown fields are dropped.

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct MemberDocument {
    pub member_id: MemberId,
    pub name: String, // "Given Surname"
    pub party: String,
    pub sub_party: Option<String>,
    pub party_colour: Option<String>,
    pub party_abbreviation: Option<String>,
    pub member_from: Option<String>,
    pub list_as: Option<String>,
    pub proxy_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DivisionDocument {
    pub division_id: DivisionId,
    pub date: String, // ISO-8601, a trailing "Z" means UTC
    pub title: String,
    pub ayes: Option<Vec<MemberDocument>>,
    pub aye_tellers: Option<Vec<MemberDocument>>,
    pub noes: Option<Vec<MemberDocument>>,
    pub no_tellers: Option<Vec<MemberDocument>>,
    pub no_vote_recorded: Option<Vec<MemberDocument>>,
}

// Decoded records.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub member_id: MemberId,
    pub name: String,
    pub party: String,
    pub party_abbreviation: Option<String>,
    pub sub_party: Option<String>,
}

impl From<MemberDocument> for MemberRecord {
    fn from(doc: MemberDocument) -> Self {
        Self {
            member_id: doc.member_id,
            name: doc.name,
            party: doc.party,
            party_abbreviation: doc.party_abbreviation,
            sub_party: doc.sub_party,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionRecord {
    pub division_id: DivisionId,
    pub held_at: PrimitiveDateTime,
    pub title: String,
    pub ayes: Vec<MemberRecord>,
    pub aye_tellers: Vec<MemberRecord>,
    pub noes: Vec<MemberRecord>,
    pub no_tellers: Vec<MemberRecord>,
    pub no_vote_recorded: Vec<MemberRecord>,
}

impl DivisionRecord {
    pub fn date(&self) -> Date {
        self.held_at.date()
    }

    pub fn members(&self, category: Category) -> &[MemberRecord] {
        match category {
            Category::Ayes => &self.ayes,
            Category::AyeTellers => &self.aye_tellers,
            Category::Noes => &self.noes,
            Category::NoTellers => &self.no_tellers,
            Category::NoVoteRecorded => &self.no_vote_recorded,
        }
    }

    pub fn members_mut(&mut self, category: Category) -> &mut Vec<MemberRecord> {
        match category {
            Category::Ayes => &mut self.ayes,
            Category::AyeTellers => &mut self.aye_tellers,
            Category::Noes => &mut self.noes,
            Category::NoTellers => &mut self.no_tellers,
            Category::NoVoteRecorded => &mut self.no_vote_recorded,
        }
    }
}

/// Parses an API timestamp. A trailing `Z` is read as UTC; an explicit offset is accepted and
/// dropped, so the wall-clock date as written is kept. A bare date reads as midnight.
pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let trimmed = raw.trim();
    let local = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .unwrap_or(trimmed);

    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    if let Ok(parsed) = PrimitiveDateTime::parse(local, format) {
        return Some(parsed);
    }
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(PrimitiveDateTime::new(parsed.date(), parsed.time()));
    }
    parse_date(trimmed).map(|date| date.midnight())
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}
