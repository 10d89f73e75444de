// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

/// How the database treats the case of unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseSensitivity {
    /// Unquoted identifiers are case-insensitive and stored in lower case (PostgreSQL)
    InsensitiveStoredLower,
    /// Unquoted identifiers are case-insensitive and stored in upper case (Oracle)
    InsensitiveStoredUpper,
    /// Unquoted identifiers are case-insensitive and stored as written
    InsensitiveStoredMixed,
    Sensitive,
}

pub fn is_quoted(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('"') && name.ends_with('"')
}

/// Normalize the case of an unquoted identifier the way the database would when storing it.
/// Quoted identifiers are returned unchanged (quotes included).
pub fn case_normalize_name(name: &str, case_sensitivity: CaseSensitivity) -> String {
    if is_quoted(name) {
        return name.to_string();
    }

    match case_sensitivity {
        CaseSensitivity::InsensitiveStoredLower => name.to_lowercase(),
        CaseSensitivity::InsensitiveStoredUpper => name.to_uppercase(),
        CaseSensitivity::InsensitiveStoredMixed | CaseSensitivity::Sensitive => name.to_string(),
    }
}

/// The exact name as stored by the database: quotes are removed from a quoted name, otherwise the
/// name is case-normalized. Quoting the result always yields an identifier the database resolves
/// to the same object as the input.
pub fn exact_unquoted_name(name: &str, case_sensitivity: CaseSensitivity) -> String {
    if is_quoted(name) {
        name[1..name.len() - 1].to_string()
    } else {
        case_normalize_name(name, case_sensitivity)
    }
}

/// Split a possibly schema-qualified relation name into its schema and relation parts. Either part
/// may be quoted, and a quoted part may contain dots. Returns `None` for an empty name or one with
/// more than two parts.
pub fn split_schema_and_relation_names(qualified_name: &str) -> Option<(Option<&str>, &str)> {
    let mut parts = Vec::with_capacity(2);
    let mut in_quotes = false;
    let mut part_start = 0;

    for (ix, ch) in qualified_name.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(&qualified_name[part_start..ix]);
                part_start = ix + 1;
            }
            _ => {}
        }
    }
    parts.push(&qualified_name[part_start..]);

    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }

    match parts.as_slice() {
        [name] => Some((None, *name)),
        [schema, name] => Some((Some(*schema), *name)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_normalization() {
        assert_eq!(
            case_normalize_name("Drug", CaseSensitivity::InsensitiveStoredLower),
            "drug"
        );
        assert_eq!(
            case_normalize_name("Drug", CaseSensitivity::InsensitiveStoredUpper),
            "DRUG"
        );
        assert_eq!(case_normalize_name("Drug", CaseSensitivity::Sensitive), "Drug");
        assert_eq!(
            case_normalize_name("\"Drug\"", CaseSensitivity::InsensitiveStoredLower),
            "\"Drug\""
        );
    }

    #[test]
    fn exact_unquoted_names() {
        assert_eq!(
            exact_unquoted_name("\"MixedCase\"", CaseSensitivity::InsensitiveStoredUpper),
            "MixedCase"
        );
        assert_eq!(
            exact_unquoted_name("mesh_id", CaseSensitivity::InsensitiveStoredUpper),
            "MESH_ID"
        );
    }

    #[test]
    fn schema_splitting() {
        assert_eq!(
            split_schema_and_relation_names("drugs.drug"),
            Some((Some("drugs"), "drug"))
        );
        assert_eq!(split_schema_and_relation_names("drug"), Some((None, "drug")));
        assert_eq!(
            split_schema_and_relation_names("\"My.Schema\".\"Drug\""),
            Some((Some("\"My.Schema\""), "\"Drug\""))
        );
        assert_eq!(split_schema_and_relation_names("a.b.c"), None);
        assert_eq!(split_schema_and_relation_names("drugs."), None);
        assert_eq!(split_schema_and_relation_names(""), None);
    }
}
