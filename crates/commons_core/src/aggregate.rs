use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use time::Date;
use tracing::warn;

use crate::error::AggregateError;
use crate::schema::{Category, DivisionId, DivisionRecord, MemberId, MemberRecord, VoteOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionSummary {
    pub division_id: DivisionId,
    pub date: Date,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    pub member_id: MemberId,
    pub first_name: String,
    pub surname: String,
    pub party: String,
    pub votes: BTreeMap<DivisionId, VoteOutcome>,
}

impl MemberSummary {
    /// Builds a summary from the first record seen for this member.
    pub fn from_record(record: &MemberRecord) -> Self {
        let (first_name, surname) = split_name(&record.name);
        Self {
            member_id: record.member_id,
            first_name: first_name.to_string(),
            surname: surname.to_string(),
            party: display_party(record).to_string(),
            votes: BTreeMap::new(),
        }
    }

    pub fn vote(&self, division_id: DivisionId) -> Option<VoteOutcome> {
        self.votes.get(&division_id).copied()
    }
}

/// A second outcome offered for a (member, division) pair that already had one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteConflict {
    pub member_id: MemberId,
    pub division_id: DivisionId,
    pub existing: VoteOutcome,
    pub rejected: VoteOutcome,
}

pub type DivisionRegistry = BTreeMap<DivisionId, DivisionSummary>;
pub type MemberRegistry = BTreeMap<MemberId, MemberSummary>;

/// Owns the division and member registries for one run.
#[derive(Debug, Default)]
pub struct Aggregator {
    divisions: DivisionRegistry,
    members: MemberRegistry,
    conflicts: Vec<VoteConflict>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an admitted division and applies its five categories in [`Category::ORDER`].
    pub fn ingest(&mut self, record: &DivisionRecord) -> Result<(), AggregateError> {
        self.register_division(record)?;
        for category in Category::ORDER {
            self.apply_category(record.division_id, record.members(category), category.outcome());
        }
        Ok(())
    }

    pub fn register_division(
        &mut self,
        record: &DivisionRecord,
    ) -> Result<&DivisionSummary, AggregateError> {
        match self.divisions.entry(record.division_id) {
            Entry::Occupied(_) => {
                warn!(division_id = record.division_id, "duplicate division ignored");
                Err(AggregateError::DuplicateDivision(record.division_id))
            }
            Entry::Vacant(slot) => Ok(slot.insert(DivisionSummary {
                division_id: record.division_id,
                date: record.date(),
                title: record.title.clone(),
            })),
        }
    }

    /// Records `outcome` for every member in the list. The first outcome for a (member,
    /// division) pair is kept; later ones are logged and kept in [`Aggregator::conflicts`].
    pub fn apply_category(
        &mut self,
        division_id: DivisionId,
        members: &[MemberRecord],
        outcome: VoteOutcome,
    ) {
        for record in members {
            let member = self
                .members
                .entry(record.member_id)
                .or_insert_with(|| MemberSummary::from_record(record));

            match member.votes.entry(division_id) {
                Entry::Vacant(slot) => {
                    slot.insert(outcome);
                }
                Entry::Occupied(slot) => {
                    let existing = *slot.get();
                    warn!(
                        member_id = record.member_id,
                        division_id,
                        %existing,
                        rejected = %outcome,
                        "duplicate vote, keeping existing outcome"
                    );
                    self.conflicts.push(VoteConflict {
                        member_id: record.member_id,
                        division_id,
                        existing,
                        rejected: outcome,
                    });
                }
            }
        }
    }

    pub fn divisions(&self) -> &DivisionRegistry {
        &self.divisions
    }

    pub fn members(&self) -> &MemberRegistry {
        &self.members
    }

    pub fn conflicts(&self) -> &[VoteConflict] {
        &self.conflicts
    }
}

/// Splits a display name on its first whitespace run. No whitespace means no surname.
pub fn split_name(name: &str) -> (&str, &str) {
    let name = name.trim_start();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (name, ""),
    }
}

fn display_party(record: &MemberRecord) -> &str {
    match record.party_abbreviation.as_deref() {
        Some(abbreviation) if !abbreviation.is_empty() => abbreviation,
        _ => &record.party,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn member(id: MemberId, name: &str, party: &str) -> MemberRecord {
        MemberRecord {
            member_id: id,
            name: name.to_string(),
            party: party.to_string(),
            party_abbreviation: None,
            sub_party: None,
        }
    }

    fn division(id: DivisionId) -> DivisionRecord {
        DivisionRecord {
            division_id: id,
            held_at: datetime!(2021-06-15 17:00:00),
            title: format!("Division {id}"),
            ayes: Vec::new(),
            aye_tellers: Vec::new(),
            noes: Vec::new(),
            no_tellers: Vec::new(),
            no_vote_recorded: Vec::new(),
        }
    }

    #[test]
    fn name_split_rules() {
        assert_eq!(split_name("Jo Smith"), ("Jo", "Smith"));
        assert_eq!(split_name("Sir Keir  Starmer"), ("Sir", "Keir  Starmer"));
        assert_eq!(split_name("Jo \t Smith"), ("Jo", "Smith"));
        assert_eq!(split_name("  Cher"), ("Cher", ""));
        assert_eq!(split_name(""), ("", ""));
    }

    #[test]
    fn abbreviation_preferred_over_party() {
        let mut record = member(1, "A B", "Scottish National Party");
        assert_eq!(MemberSummary::from_record(&record).party, "Scottish National Party");
        record.party_abbreviation = Some("SNP".to_string());
        assert_eq!(MemberSummary::from_record(&record).party, "SNP");
        record.party_abbreviation = Some(String::new());
        assert_eq!(MemberSummary::from_record(&record).party, "Scottish National Party");
    }

    #[test]
    fn first_seen_identity_wins() {
        let mut agg = Aggregator::new();
        let mut first = division(1);
        first.ayes.push(member(7, "Jo Smith", "X"));
        let mut second = division(2);
        second.noes.push(member(7, "J. Smith", "Y"));

        agg.ingest(&first).unwrap();
        agg.ingest(&second).unwrap();

        let stored = &agg.members()[&7];
        assert_eq!(stored.first_name, "Jo");
        assert_eq!(stored.surname, "Smith");
        assert_eq!(stored.party, "X");
        assert_eq!(stored.vote(1), Some(VoteOutcome::Aye));
        assert_eq!(stored.vote(2), Some(VoteOutcome::No));
    }

    #[test]
    fn duplicate_vote_keeps_original_and_reports_once() {
        let mut agg = Aggregator::new();
        let jo = [member(7, "Jo Smith", "X")];
        agg.apply_category(10, &jo, VoteOutcome::Aye);
        agg.apply_category(10, &jo, VoteOutcome::No);

        assert_eq!(agg.members()[&7].vote(10), Some(VoteOutcome::Aye));
        assert_eq!(
            agg.conflicts(),
            &[VoteConflict {
                member_id: 7,
                division_id: 10,
                existing: VoteOutcome::Aye,
                rejected: VoteOutcome::No,
            }]
        );
    }

    #[test]
    fn earlier_category_wins_within_one_division() {
        let mut record = division(5);
        record.noes.push(member(3, "A B", "X"));
        record.no_tellers.push(member(3, "A B", "X"));
        record.aye_tellers.push(member(3, "A B", "X"));

        let mut agg = Aggregator::new();
        agg.ingest(&record).unwrap();

        assert_eq!(agg.members()[&3].vote(5), Some(VoteOutcome::AyeTeller));
        let rejected: Vec<VoteOutcome> = agg.conflicts().iter().map(|c| c.rejected).collect();
        assert_eq!(rejected, vec![VoteOutcome::No, VoteOutcome::NoTeller]);
    }

    #[test]
    fn each_category_maps_to_its_outcome() {
        let mut record = division(4);
        record.ayes.push(member(1, "A A", "X"));
        record.aye_tellers.push(member(2, "B B", "X"));
        record.noes.push(member(3, "C C", "X"));
        record.no_tellers.push(member(4, "D D", "X"));
        record.no_vote_recorded.push(member(5, "E E", "X"));

        let mut agg = Aggregator::new();
        agg.ingest(&record).unwrap();

        let votes: Vec<VoteOutcome> = agg
            .members()
            .values()
            .filter_map(|m| m.vote(4))
            .collect();
        assert_eq!(
            votes,
            vec![
                VoteOutcome::Aye,
                VoteOutcome::AyeTeller,
                VoteOutcome::No,
                VoteOutcome::NoTeller,
                VoteOutcome::Missing,
            ]
        );
        assert!(agg.conflicts().is_empty());
    }

    #[test]
    fn duplicate_division_is_rejected_and_registry_untouched() {
        let mut agg = Aggregator::new();
        let mut first = division(9);
        first.ayes.push(member(1, "A B", "X"));
        agg.ingest(&first).unwrap();

        let mut again = division(9);
        again.title = "Replacement".to_string();
        again.noes.push(member(1, "A B", "X"));
        again.noes.push(member(2, "C D", "Y"));

        assert_eq!(agg.ingest(&again), Err(AggregateError::DuplicateDivision(9)));
        assert_eq!(agg.divisions()[&9].title, "Division 9");
        assert_eq!(agg.members()[&1].vote(9), Some(VoteOutcome::Aye));
        assert!(!agg.members().contains_key(&2));
        assert!(agg.conflicts().is_empty());
    }

    #[test]
    fn empty_category_is_a_no_op() {
        let mut agg = Aggregator::new();
        agg.apply_category(1, &[], VoteOutcome::Aye);
        assert!(agg.members().is_empty());
    }
}
