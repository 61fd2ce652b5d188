//! Canonical merged state of all current hacomments.

use chrono::NaiveDateTime;

use crate::dfmap::{MapValue, ShapeError, Value};
use crate::timestamp;

use super::piece::{FORMAT_VERSION, HacommentPiece};

/// Flat pickup: at most one current annotation per schema element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HacommentPickup {
    pub format_version: String,
    /// When this pickup was generated (injected clock, never wall time directly)
    pub pickup_datetime: NaiveDateTime,
    pub entries: Vec<HacommentEntry>,
}

impl HacommentPickup {
    pub fn empty(pickup_datetime: NaiveDateTime) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            pickup_datetime,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
        map.insert("formatVersion", Value::str(&self.format_version));
        map.insert(
            "pickupDatetime",
            Value::str(timestamp::format_display(self.pickup_datetime)),
        );
        map.insert(
            "entryList",
            Value::List(self.entries.iter().map(|e| Value::Map(e.to_map())).collect()),
        );
        map
    }

    pub fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        let mut entries = Vec::new();
        for item in map.required_list("entryList")? {
            let entry_map = item.as_map().ok_or_else(|| ShapeError::WrongType {
                key: "entryList".to_string(),
                expected: "map",
                found: item.type_name(),
            })?;
            entries.push(HacommentEntry::from_map(entry_map)?);
        }
        let datetime_raw = map.required_str("pickupDatetime")?;
        let pickup_datetime =
            timestamp::parse_display(datetime_raw).map_err(|err| ShapeError::InvalidValue {
                key: "pickupDatetime".to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            format_version: map.required_str("formatVersion")?.to_string(),
            pickup_datetime,
            entries,
        })
    }
}

/// The current annotation for one schema element.
///
/// Content-wise identical to the piece that produced it; the entry is the
/// piece after it won the merge for its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HacommentEntry {
    pub table_name: String,
    pub column_name: Option<String>,
    pub comment: String,
    pub authors: Vec<String>,
    pub piece_code: String,
    pub piece_datetime: NaiveDateTime,
    pub piece_owner: String,
}

impl HacommentEntry {
    pub fn from_piece(piece: &HacommentPiece) -> Self {
        Self {
            table_name: piece.table_name.clone(),
            column_name: piece.column_name.clone(),
            comment: piece.comment.clone(),
            authors: piece.authors.clone(),
            piece_code: piece.piece_code.clone(),
            piece_datetime: piece.piece_datetime,
            piece_owner: piece.piece_owner.clone(),
        }
    }

    /// Merge identity: the table, or the table plus column.
    pub fn identity(&self) -> (&str, Option<&str>) {
        (self.table_name.as_str(), self.column_name.as_deref())
    }

    fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
        map.insert("tableName", Value::str(&self.table_name));
        map.insert(
            "columnName",
            Value::str(self.column_name.clone().unwrap_or_default()),
        );
        map.insert("comment", Value::str(&self.comment));
        map.insert(
            "authorList",
            Value::List(self.authors.iter().map(Value::str).collect()),
        );
        map.insert("pieceCode", Value::str(&self.piece_code));
        map.insert(
            "pieceDatetime",
            Value::str(timestamp::format_display(self.piece_datetime)),
        );
        map.insert("pieceOwner", Value::str(&self.piece_owner));
        map
    }

    fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        let authors = map
            .opt_list("authorList")?
            .unwrap_or_default()
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or(ShapeError::WrongType {
                    key: "authorList".to_string(),
                    expected: "string",
                    found: item.type_name(),
                })
            })
            .collect::<Result<Vec<String>, ShapeError>>()?;
        let datetime_raw = map.required_str("pieceDatetime")?;
        let piece_datetime =
            timestamp::parse_display(datetime_raw).map_err(|err| ShapeError::InvalidValue {
                key: "pieceDatetime".to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            table_name: map.required_str("tableName")?.to_string(),
            column_name: map.opt_str("columnName")?.map(str::to_string),
            comment: map.required_str("comment")?.to_string(),
            authors,
            piece_code: map.required_str("pieceCode")?.to_string(),
            piece_datetime,
            piece_owner: map.required_str("pieceOwner")?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_map_round_trip() {
        let entry = HacommentEntry {
            table_name: "MEMBER".to_string(),
            column_name: None,
            comment: "Watch the status transition here.".to_string(),
            authors: vec!["deco".to_string(), "hadem".to_string()],
            piece_code: "HA77EE88".to_string(),
            piece_datetime: NaiveDate::from_ymd_opt(2026, 8, 6)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
            piece_owner: "deco".to_string(),
        };
        let pickup = HacommentPickup {
            format_version: "1.0".to_string(),
            pickup_datetime: entry.piece_datetime,
            entries: vec![entry],
        };
        let reparsed = HacommentPickup::from_map(&pickup.to_map()).unwrap();
        assert_eq!(reparsed, pickup);
    }
}
