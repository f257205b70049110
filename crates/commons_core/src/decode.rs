use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::DecodeError;
use crate::schema::{
    Category, DivisionId, DivisionRecord, MemberDocument, MemberRecord, parse_timestamp,
};

/// Decodes one API document into a typed division.
///
/// Unrecognized fields are dropped. Absent or `null` member lists decode as empty. A member entry
/// that fails to decode is logged and skipped without failing the division.
pub fn decode_division(value: Value) -> Result<DivisionRecord, DecodeError> {
    let Value::Object(mut fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let division_id: DivisionId = required(&mut fields, "DivisionId")?;
    let raw_date: String = required(&mut fields, "Date")?;
    let held_at = parse_timestamp(&raw_date).ok_or(DecodeError::Timestamp { value: raw_date })?;
    let title: String = required(&mut fields, "Title")?;

    let mut record = DivisionRecord {
        division_id,
        held_at,
        title,
        ayes: Vec::new(),
        aye_tellers: Vec::new(),
        noes: Vec::new(),
        no_tellers: Vec::new(),
        no_vote_recorded: Vec::new(),
    };

    for category in Category::ORDER {
        let members = decode_category(division_id, category, fields.remove(category.field()))?;
        *record.members_mut(category) = members;
    }

    Ok(record)
}

fn required<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    field: &'static str,
) -> Result<T, DecodeError> {
    match fields.remove(field) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
        Some(value) => serde_json::from_value(value).map_err(|err| DecodeError::WrongType {
            field,
            message: err.to_string(),
        }),
    }
}

fn decode_category(
    division_id: DivisionId,
    category: Category,
    value: Option<Value>,
) -> Result<Vec<MemberRecord>, DecodeError> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: category.field(),
                message: "expected an array of members".to_string(),
            });
        }
    };

    let mut members = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<MemberDocument>(entry) {
            Ok(doc) => members.push(MemberRecord::from(doc)),
            Err(err) => warn!(
                division_id,
                category = category.field(),
                index,
                "dropping malformed member entry: {err}"
            ),
        }
    }
    Ok(members)
}
