// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use sqljson_dbmd::RelId;
use thiserror::Error;

/// Where in a query specification a problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLocation {
    pub query_name: String,
    /// Path to the offending part, outermost part first, parts separated by `" / "`
    pub query_part: Option<String>,
}

impl SpecLocation {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            query_part: None,
        }
    }

    pub fn with_part(&self, part: impl Display) -> Self {
        let query_part = match &self.query_part {
            Some(parts) => format!("{parts} / {part}"),
            None => part.to_string(),
        };

        Self {
            query_name: self.query_name.clone(),
            query_part: Some(query_part),
        }
    }
}

impl Display for SpecLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "query '{}'", self.query_name)?;
        if let Some(part) = &self.query_part {
            write!(f, " at {part}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("In {location}: {kind}")]
pub struct SpecError {
    pub location: SpecLocation,
    pub kind: SpecErrorKind,
}

impl SpecError {
    pub fn new(location: SpecLocation, kind: SpecErrorKind) -> Self {
        Self { location, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecErrorKind {
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    #[error("Field '{field}' not found in table {table}")]
    FieldNotFound { table: RelId, field: String },

    #[error(
        "Multiple foreign keys found from {child} to {parent}; specify the foreign key fields or a custom match condition"
    )]
    AmbiguousForeignKey { child: RelId, parent: RelId },

    #[error("No foreign key found from {child} to {parent}{}", via_fields_note(.field_names))]
    ForeignKeyNotFound {
        child: RelId,
        parent: RelId,
        field_names: Option<Vec<String>>,
    },

    #[error("Invalid custom match condition: {0}")]
    InvalidCustomMatchCondition(String),

    #[error("An unwrapped collection must have exactly one property, found {property_count}")]
    InvalidUnwrap { property_count: usize },

    #[error("At least one property must be specified")]
    EmptySelectList,

    #[error("A json property name is required for expression '{expression}'")]
    MissingJsonPropertyForExpression { expression: String },

    #[error("A generated source type is required for expression '{expression}'")]
    MissingGeneratedTypeForExpression { expression: String },

    #[error("Exactly one of 'field' or 'expression' must be provided")]
    ConflictingFieldAndExpression,

    #[error("One or more result representations must be specified")]
    NoResultRepresentations,

    #[error("FOR UPDATE is only allowed with the MULTI_COLUMN_ROWS result representation")]
    ForUpdateRequiresMultiColumnRows,

    #[error("Foreign key fields cannot be specified together with a custom match condition")]
    ForeignKeyFieldsWithCustomMatch,

    #[error("Generated SQL structure is inconsistent: {0}")]
    InconsistentSqlSpec(String),

    #[error("Result type name '{name}' is given to result types of different structure")]
    ConflictingResultTypeName { name: String },
}

fn via_fields_note(field_names: &Option<Vec<String>>) -> String {
    match field_names {
        Some(names) => format!(" via fields [{}]", names.join(", ")),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_locations() {
        let loc = SpecLocation::new("drugs query")
            .with_part("parent table 'compound' via compound")
            .with_part("fieldExpressions entry #2 of table 'compound'");

        assert_eq!(
            loc.query_part.as_deref(),
            Some(
                "parent table 'compound' via compound / fieldExpressions entry #2 of table 'compound'"
            )
        );

        let error = SpecError::new(loc, SpecErrorKind::EmptySelectList);
        assert_eq!(
            error.to_string(),
            "In query 'drugs query' at parent table 'compound' via compound / fieldExpressions entry #2 of table 'compound': At least one property must be specified"
        );
    }

    #[test]
    fn foreign_key_not_found_message() {
        let kind = SpecErrorKind::ForeignKeyNotFound {
            child: RelId::new("compound", Some("drugs")),
            parent: RelId::new("analyst", Some("drugs")),
            field_names: Some(vec!["cas".to_string()]),
        };

        assert_eq!(
            kind.to_string(),
            "No foreign key found from drugs.compound to drugs.analyst via fields [cas]"
        );
    }
}
