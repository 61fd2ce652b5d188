//! One decomment contribution, serialized to its own file.

use chrono::NaiveDateTime;

use crate::dfmap::{MapValue, ShapeError, Value};
use crate::timestamp;

pub(crate) const FORMAT_VERSION: &str = "1.0";

/// One annotation authored by one contributor action.
///
/// Immutable once stamped; the file is deleted when a pickup folds it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecommentPiece {
    /// Target table
    pub table_name: String,
    /// Target column; absent for a table-level comment
    pub column_name: Option<String>,
    /// The comment text itself; never empty
    pub decomment: String,
    /// Database comment of the target at authoring time, if any
    pub database_comment: Option<String>,
    /// Version counter of the comment thread this piece continues
    pub comment_version: u64,
    /// Everyone who contributed to this comment text
    pub authors: Vec<String>,
    /// Random code identifying this piece
    pub piece_code: String,
    /// When the piece was stamped
    pub piece_datetime: NaiveDateTime,
    /// Contributor who stamped the piece
    pub piece_owner: String,
    /// Codes of pieces this one supersedes
    pub previous_pieces: Vec<String>,
}

impl DecommentPiece {
    /// Merge identity: the table, or the table plus column.
    pub fn identity(&self) -> (&str, Option<&str>) {
        (self.table_name.as_str(), self.column_name.as_deref())
    }

    /// Display form of the target, e.g. `MEMBER` or `MEMBER.MEMBER_NAME`.
    pub fn target_display(&self) -> String {
        match &self.column_name {
            Some(column) => format!("{}.{column}", self.table_name),
            None => self.table_name.clone(),
        }
    }

    /// File name this piece is stored under.
    pub fn file_name(&self) -> String {
        format!(
            "decomment-piece-{}-on-{}-{}-{}.dfmap",
            self.table_name,
            timestamp::format_filename(self.piece_datetime),
            self.piece_owner,
            self.piece_code,
        )
    }

    pub fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
        map.insert("formatVersion", Value::str(FORMAT_VERSION));
        map.insert("tableName", Value::str(&self.table_name));
        map.insert(
            "columnName",
            Value::str(self.column_name.clone().unwrap_or_default()),
        );
        map.insert("decomment", Value::str(&self.decomment));
        map.insert(
            "databaseComment",
            Value::str(self.database_comment.clone().unwrap_or_default()),
        );
        map.insert("commentVersion", Value::str(self.comment_version.to_string()));
        map.insert("authorList", string_list(&self.authors));
        map.insert("pieceCode", Value::str(&self.piece_code));
        map.insert(
            "pieceDatetime",
            Value::str(timestamp::format_display(self.piece_datetime)),
        );
        map.insert("pieceOwner", Value::str(&self.piece_owner));
        map.insert("previousPieceList", string_list(&self.previous_pieces));
        map
    }

    pub fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        Ok(Self {
            table_name: map.required_str("tableName")?.to_string(),
            column_name: map.opt_str("columnName")?.map(str::to_string),
            decomment: map.required_str("decomment")?.to_string(),
            database_comment: map.opt_str("databaseComment")?.map(str::to_string),
            comment_version: parse_version(map, "commentVersion")?,
            authors: read_string_list(map, "authorList")?,
            piece_code: map.required_str("pieceCode")?.to_string(),
            piece_datetime: parse_datetime(map, "pieceDatetime")?,
            piece_owner: map.required_str("pieceOwner")?.to_string(),
            previous_pieces: read_string_list(map, "previousPieceList")?,
        })
    }
}

pub(crate) fn string_list(items: &[String]) -> Value {
    Value::List(items.iter().map(Value::str).collect())
}

pub(crate) fn read_string_list(map: &MapValue, key: &str) -> Result<Vec<String>, ShapeError> {
    let Some(items) = map.opt_list(key)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or(ShapeError::WrongType {
                key: key.to_string(),
                expected: "string",
                found: item.type_name(),
            })
        })
        .collect()
}

pub(crate) fn parse_datetime(map: &MapValue, key: &str) -> Result<NaiveDateTime, ShapeError> {
    let raw = map.required_str(key)?;
    timestamp::parse_display(raw).map_err(|err| ShapeError::InvalidValue {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) fn parse_version(map: &MapValue, key: &str) -> Result<u64, ShapeError> {
    let raw = map.required_str(key)?;
    raw.parse().map_err(|_| ShapeError::InvalidValue {
        key: key.to_string(),
        reason: format!("'{raw}' is not a number"),
    })
}
