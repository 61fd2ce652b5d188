//! Mapping overrides: follow a rename by re-keying existing decomments.

use chrono::NaiveDateTime;

use crate::dfmap::{MapValue, ShapeError, Value};
use crate::timestamp;

use super::piece::{FORMAT_VERSION, parse_datetime, read_string_list, string_list};

/// One re-keying rule, consumed once by the next pickup.
///
/// A rule with no column names moves a whole table entry; a rule with
/// column names moves one column entry, possibly across tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecommentMapping {
    pub old_table_name: String,
    pub old_column_name: Option<String>,
    pub new_table_name: String,
    pub new_column_name: Option<String>,
    /// Everyone who contributed to this mapping
    pub authors: Vec<String>,
    /// Random code identifying this mapping
    pub mapping_code: String,
    /// When the mapping was stamped
    pub mapping_datetime: NaiveDateTime,
    /// Contributor who stamped the mapping
    pub mapping_owner: String,
}

impl DecommentMapping {
    /// File name this mapping is stored under.
    pub fn file_name(&self) -> String {
        format!(
            "decomment-mapping-{}-on-{}-{}-{}.dfmap",
            self.old_table_name,
            timestamp::format_filename(self.mapping_datetime),
            self.mapping_owner,
            self.mapping_code,
        )
    }

    pub fn to_map(&self) -> MapValue {
        let mut map = MapValue::new();
        map.insert("formatVersion", Value::str(FORMAT_VERSION));
        map.insert("oldTableName", Value::str(&self.old_table_name));
        map.insert(
            "oldColumnName",
            Value::str(self.old_column_name.clone().unwrap_or_default()),
        );
        map.insert("newTableName", Value::str(&self.new_table_name));
        map.insert(
            "newColumnName",
            Value::str(self.new_column_name.clone().unwrap_or_default()),
        );
        map.insert("authorList", string_list(&self.authors));
        map.insert("mappingCode", Value::str(&self.mapping_code));
        map.insert(
            "mappingDatetime",
            Value::str(timestamp::format_display(self.mapping_datetime)),
        );
        map.insert("mappingOwner", Value::str(&self.mapping_owner));
        map
    }

    pub fn from_map(map: &MapValue) -> Result<Self, ShapeError> {
        Ok(Self {
            old_table_name: map.required_str("oldTableName")?.to_string(),
            old_column_name: map.opt_str("oldColumnName")?.map(str::to_string),
            new_table_name: map.required_str("newTableName")?.to_string(),
            new_column_name: map.opt_str("newColumnName")?.map(str::to_string),
            authors: read_string_list(map, "authorList")?,
            mapping_code: map.required_str("mappingCode")?.to_string(),
            mapping_datetime: parse_datetime(map, "mappingDatetime")?,
            mapping_owner: map.required_str("mappingOwner")?.to_string(),
        })
    }
}
