use time::Date;

use crate::aggregate::{DivisionRegistry, MemberRegistry};
use crate::schema::{DivisionId, MemberId, VoteOutcome};

/// Fixed metadata columns that precede the vote columns.
pub const ROW_HEADER: [&str; 4] = ["rowid", "date", "voteno", "Bill"];

/// Prefix of every vote column header; the member id follows it.
pub const COLUMN_PREFIX: &str = "mpid";

pub fn column_label(member_id: MemberId) -> String {
    format!("{COLUMN_PREFIX}{member_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub division_id: DivisionId,
    pub date: Date,
    pub title: String,
    pub cells: Vec<VoteOutcome>,
}

/// Dense division-by-member projection. Rows ascend by division id, columns by member id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteMatrix {
    pub columns: Vec<MemberId>,
    pub rows: Vec<MatrixRow>,
}

impl VoteMatrix {
    pub fn header(&self) -> Vec<String> {
        ROW_HEADER
            .iter()
            .map(|field| field.to_string())
            .chain(self.columns.iter().map(|id| column_label(*id)))
            .collect()
    }

    pub fn cell(&self, division_id: DivisionId, member_id: MemberId) -> Option<VoteOutcome> {
        let row = self.rows.iter().find(|row| row.division_id == division_id)?;
        let column = self.columns.binary_search(&member_id).ok()?;
        row.cells.get(column).copied()
    }
}

/// Projects the registries into a dense matrix. Any pair without a recorded outcome reads as
/// [`VoteOutcome::Missing`].
pub fn materialize(divisions: &DivisionRegistry, members: &MemberRegistry) -> VoteMatrix {
    let columns: Vec<MemberId> = members.keys().copied().collect();

    let rows = divisions
        .values()
        .map(|division| MatrixRow {
            division_id: division.division_id,
            date: division.date,
            title: division.title.clone(),
            cells: members
                .values()
                .map(|member| {
                    member
                        .vote(division.division_id)
                        .unwrap_or(VoteOutcome::Missing)
                })
                .collect(),
        })
        .collect();

    VoteMatrix { columns, rows }
}
