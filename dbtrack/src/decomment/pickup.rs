//! Canonical merged state of all current decomments.

use chrono::NaiveDateTime;

use crate::dfmap::{MapValue, ShapeError, Value};
use crate::timestamp;

use super::piece::{
    DecommentPiece, FORMAT_VERSION, parse_datetime, parse_version, read_string_list, string_list,
};

/// The pickup: one entry per annotated table, nested column entries inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecommentPickup {
    pub format_version: String,
    /// When this pickup was generated (injected clock, never wall time directly)
    pub pickup_datetime: NaiveDateTime,
    pub tables: Vec<PickupTable>,
}

impl DecommentPickup {
    pub fn empty(pickup_datetime: NaiveDateTime) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            pickup_datetime,
            tables: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
        map.insert("formatVersion", Value::str(&self.format_version));
        map.insert(
            "pickupDatetime",
            Value::str(timestamp::format_display(self.pickup_datetime)),
        );
        let mut deco_map = MapValue::new();
        deco_map.insert(
            "tableList",
            Value::List(self.tables.iter().map(|t| Value::Map(t.to_map())).collect()),
        );
        map.insert("decoMap", Value::Map(deco_map));
        map
    }

    pub fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        let deco_map = map.required_map("decoMap")?;
        let mut tables = Vec::new();
        for item in deco_map.required_list("tableList")? {
            let table_map = item.as_map().ok_or_else(|| ShapeError::WrongType {
                key: "tableList".to_string(),
                expected: "map",
                found: item.type_name(),
            })?;
            tables.push(PickupTable::from_map(table_map)?);
        }
        Ok(Self {
            format_version: map.required_str("formatVersion")?.to_string(),
            pickup_datetime: parse_datetime(map, "pickupDatetime")?,
            tables,
        })
    }
}

/// One annotated table with its current table-level comments and columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupTable {
    pub table_name: String,
    pub properties: Vec<DecommentProperty>,
    pub columns: Vec<PickupColumn>,
}

impl PickupTable {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            properties: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.columns.is_empty()
    }

    fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
        map.insert("tableName", Value::str(&self.table_name));
        if !self.properties.is_empty() {
            map.insert("propertyList", property_list(&self.properties));
        }
        if !self.columns.is_empty() {
            map.insert(
                "columnList",
                Value::List(self.columns.iter().map(|c| Value::Map(c.to_map())).collect()),
            );
        }
        map
    }

    fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        let mut columns = Vec::new();
        if let Some(items) = map.opt_list("columnList")? {
            for item in items {
                let column_map = item.as_map().ok_or_else(|| ShapeError::WrongType {
                    key: "columnList".to_string(),
                    expected: "map",
                    found: item.type_name(),
                })?;
                columns.push(PickupColumn::from_map(column_map)?);
            }
        }
        Ok(Self {
            table_name: map.required_str("tableName")?.to_string(),
            properties: read_property_list(map)?,
            columns,
        })
    }
}

/// One annotated column inside a table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupColumn {
    pub column_name: String,
    pub properties: Vec<DecommentProperty>,
}

impl PickupColumn {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            properties: Vec::new(),
        }
    }

    fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
        map.insert("columnName", Value::str(&self.column_name));
        if !self.properties.is_empty() {
            map.insert("propertyList", property_list(&self.properties));
        }
        map
    }

    fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        Ok(Self {
            column_name: map.required_str("columnName")?.to_string(),
            properties: read_property_list(map)?,
        })
    }
}

/// Current comment content for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecommentProperty {
    pub decomment: String,
    pub database_comment: Option<String>,
    pub comment_version: u64,
    pub authors: Vec<String>,
    pub piece_code: String,
    pub piece_datetime: NaiveDateTime,
    pub piece_owner: String,
    pub previous_pieces: Vec<String>,
}

impl DecommentProperty {
    /// The piece's content as a pickup property, verbatim.
    pub fn from_piece(piece: &DecommentPiece) -> Self {
        Self {
            decomment: piece.decomment.clone(),
            database_comment: piece.database_comment.clone(),
            comment_version: piece.comment_version,
            authors: piece.authors.clone(),
            piece_code: piece.piece_code.clone(),
            piece_datetime: piece.piece_datetime,
            piece_owner: piece.piece_owner.clone(),
            previous_pieces: piece.previous_pieces.clone(),
        }
    }

    fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
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

    fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        Ok(Self {
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

fn property_list(properties: &[DecommentProperty]) -> Value {
    Value::List(properties.iter().map(|p| Value::Map(p.to_map())).collect())
}

fn read_property_list(map: &MapValue) -> Result<Vec<DecommentProperty>, ShapeError> {
    let Some(items) = map.opt_list("propertyList")? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| {
            let property_map = item.as_map().ok_or_else(|| ShapeError::WrongType {
                key: "propertyList".to_string(),
                expected: "map",
                found: item.type_name(),
            })?;
            DecommentProperty::from_map(property_map)
        })
        .collect()
}
