//! Table templates handed to a schema generator.

use std::collections::HashSet;

use dtt_dictionary::Dictionary;
use serde::{Deserialize, Serialize};

use crate::descriptor::{TypeDescriptor, natural_type};
use crate::error::{Result, TypeError};

fn default_true() -> bool {
    true
}

/// One column of a table template.
///
/// `name` is a dictionary keyword (or tag text) unless `explicit_type` is
/// given, in which case it may be any column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTemplate {
    pub name: String,
    #[serde(default = "default_true")]
    pub allow_nulls: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_type: Option<TypeDescriptor>,
}

impl ColumnTemplate {
    /// Nullable column typed from the dictionary.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_nulls: true,
            is_primary_key: false,
            explicit_type: None,
        }
    }

    /// Mark the column as primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.allow_nulls = false;
        self
    }

    /// Disallow nulls.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.allow_nulls = false;
        self
    }

    /// Override the dictionary type.
    #[must_use]
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.explicit_type = Some(descriptor);
        self
    }
}

/// Named set of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableTemplate {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnTemplate>,
}

/// Fully typed column ready for a schema generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRequest {
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub nullable: bool,
    pub primary_key: bool,
}

impl TableTemplate {
    /// Create an empty template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnTemplate) -> Self {
        self.columns.push(column);
        self
    }

    /// Resolve every column to a typed request.
    ///
    /// An explicit type wins over the dictionary. Primary key columns are
    /// never nullable.
    pub fn column_requests(&self, dict: &Dictionary) -> Result<Vec<ColumnRequest>> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .map(|column| {
                if !seen.insert(column.name.as_str()) {
                    return Err(TypeError::DuplicateColumn {
                        table: self.name.clone(),
                        column: column.name.clone(),
                    });
                }
                let descriptor = match column.explicit_type {
                    Some(descriptor) => descriptor,
                    None => self.dictionary_type(dict, &column.name)?,
                };
                Ok(ColumnRequest {
                    name: column.name.clone(),
                    descriptor,
                    nullable: column.allow_nulls && !column.is_primary_key,
                    primary_key: column.is_primary_key,
                })
            })
            .collect()
    }

    fn dictionary_type(&self, dict: &Dictionary, column: &str) -> Result<TypeDescriptor> {
        let tag = dict.resolve_token(column).map_err(|err| {
            tracing::debug!(table = %self.name, column = %column, error = %err, "Column is not a dictionary attribute");
            TypeError::MissingType {
                table: self.name.clone(),
                column: column.to_string(),
            }
        })?;
        let entry = dict.by_tag(&tag);
        natural_type(&entry.vrs, entry.vm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NaturalKind;

    #[test]
    fn test_requests_follow_dictionary() {
        let table = TableTemplate::new("series")
            .with_column(ColumnTemplate::new("SeriesInstanceUID").primary_key())
            .with_column(ColumnTemplate::new("Modality"))
            .with_column(ColumnTemplate::new("SliceThickness"))
            .with_column(ColumnTemplate::new("ImageType"));

        let requests = table.column_requests(Dictionary::standard()).unwrap();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].descriptor, TypeDescriptor::string(64));
        assert!(requests[0].primary_key);
        assert!(!requests[0].nullable);
        assert_eq!(requests[1].descriptor, TypeDescriptor::string(16));
        assert!(requests[1].nullable);
        assert_eq!(requests[2].descriptor.kind, NaturalKind::Decimal);
        // ImageType is 2-n
        assert!(requests[3].descriptor.is_unbounded_string());
    }

    #[test]
    fn test_explicit_type_wins() {
        let table = TableTemplate::new("custom").with_column(
            ColumnTemplate::new("report_text").with_type(TypeDescriptor::text()),
        );
        let requests = table.column_requests(Dictionary::standard()).unwrap();
        assert!(requests[0].descriptor.is_unbounded_string());
    }

    #[test]
    fn test_untyped_column_fails() {
        let table = TableTemplate::new("custom").with_column(ColumnTemplate::new("report_text"));
        let err = table.column_requests(Dictionary::standard()).unwrap_err();
        assert!(matches!(err, TypeError::MissingType { ref column, .. } if column == "report_text"));
    }

    #[test]
    fn test_duplicate_column_fails() {
        let table = TableTemplate::new("t")
            .with_column(ColumnTemplate::new("Modality"))
            .with_column(ColumnTemplate::new("Modality"));
        assert!(matches!(
            table.column_requests(Dictionary::standard()),
            Err(TypeError::DuplicateColumn { .. })
        ));
    }
}
