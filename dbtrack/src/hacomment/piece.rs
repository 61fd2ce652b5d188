//! One hacomment contribution, serialized to its own file.

use chrono::NaiveDateTime;

use crate::dfmap::{MapValue, ShapeError, Value};
use crate::timestamp;

pub(crate) const FORMAT_VERSION: &str = "1.0";

/// One annotation for a schema element, authored by one contributor action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HacommentPiece {
    /// Target table
    pub table_name: String,
    /// Target column; absent for a table-level annotation
    pub column_name: Option<String>,
    /// The annotation text; never empty
    pub comment: String,
    /// Everyone who contributed to this annotation
    pub authors: Vec<String>,
    /// Random code identifying this piece
    pub piece_code: String,
    /// When the piece was stamped
    pub piece_datetime: NaiveDateTime,
    /// Contributor who stamped the piece
    pub piece_owner: String,
}

impl HacommentPiece {
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
            "hacomment-piece-{}-on-{}-{}-{}.dfmap",
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

    pub fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
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
