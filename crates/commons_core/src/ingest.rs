use std::ops::Range;

use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::decode::decode_division;
use crate::error::{AggregateError, FetchError};
use crate::fetch::DivisionSource;
use crate::filter::DateRange;
use crate::matrix::{VoteMatrix, materialize};
use crate::schema::{DivisionId, DivisionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Fetch,
    Decode,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            FailureKind::NotFound => "not_found",
            FailureKind::Fetch => "fetch",
            FailureKind::Decode => "decode",
        };
        write!(f, "{value}")
    }
}

/// A division id that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub division_id: DivisionId,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub admitted: usize,
    pub filtered_out: usize,
    pub duplicate_divisions: Vec<DivisionId>,
    pub vote_conflicts: usize,
    pub failures: Vec<IngestFailure>,
}

/// Result of walking a division range: the filled registries plus what was skipped.
#[derive(Debug)]
pub struct Ingest {
    pub aggregator: Aggregator,
    pub report: IngestReport,
}

impl Ingest {
    pub fn matrix(&self) -> VoteMatrix {
        materialize(self.aggregator.divisions(), self.aggregator.members())
    }
}

/// Walks `ids` in ascending order, one division at a time. Fetch and decode failures are
/// recorded and skipped; they never stop the walk.
pub fn run<S: DivisionSource + ?Sized>(
    source: &S,
    ids: Range<DivisionId>,
    dates: &DateRange,
) -> Ingest {
    let mut aggregator = Aggregator::new();
    let mut report = IngestReport::default();

    info!(
        first = ids.start,
        last = ids.end.saturating_sub(1),
        since = %dates.start(),
        until = %dates.end(),
        "walking divisions"
    );

    for division_id in ids {
        let record = match fetch_record(source, division_id) {
            Ok(record) => record,
            Err(failure) => {
                warn!(
                    division_id,
                    kind = %failure.kind,
                    "skipping division: {}",
                    failure.message
                );
                report.failures.push(failure);
                continue;
            }
        };

        if !dates.admits(record.date()) {
            debug!(division_id, date = %record.date(), "division outside date range");
            report.filtered_out += 1;
            continue;
        }

        match aggregator.ingest(&record) {
            Ok(()) => {
                debug!(division_id = record.division_id, "division aggregated");
                report.admitted += 1;
            }
            Err(AggregateError::DuplicateDivision(id)) => report.duplicate_divisions.push(id),
        }
    }

    report.vote_conflicts = aggregator.conflicts().len();

    info!(
        divisions = report.admitted,
        members = aggregator.members().len(),
        filtered_out = report.filtered_out,
        failures = report.failures.len(),
        conflicts = report.vote_conflicts,
        "ingest finished"
    );

    Ingest { aggregator, report }
}

fn fetch_record<S: DivisionSource + ?Sized>(
    source: &S,
    division_id: DivisionId,
) -> Result<DivisionRecord, IngestFailure> {
    debug!(division_id, "fetching division");
    let document = source.fetch(division_id).map_err(|err| IngestFailure {
        division_id,
        kind: match &err {
            FetchError::NotFound(_) => FailureKind::NotFound,
            _ => FailureKind::Fetch,
        },
        message: err.to_string(),
    })?;

    decode_division(document).map_err(|err| IngestFailure {
        division_id,
        kind: FailureKind::Decode,
        message: err.to_string(),
    })
}
