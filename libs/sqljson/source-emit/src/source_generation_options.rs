// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqljson_core::SourceLanguage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceGenerationOptions {
    pub source_language: SourceLanguage,
    /// Prepended to the SQL resource names referenced from the generated source
    #[serde(default)]
    pub sql_resource_path_prefix: Option<String>,
    /// Text placed at the top of every generated source file
    #[serde(default)]
    pub types_file_header: Option<String>,
    /// Target types by lower-case database type, consulted before the built-in mapping
    #[serde(default)]
    pub database_type_overrides: BTreeMap<String, String>,
    #[serde(default)]
    pub java_options: JavaOptions,
    /// For relations metadata source: write names stored in upper case as lower case
    #[serde(default)]
    pub prefer_lowercase_names: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaOptions {
    #[serde(default)]
    pub java_package: Option<String>,
    #[serde(default)]
    pub emit_records: Option<bool>,
}

impl SourceGenerationOptions {
    pub fn new(source_language: SourceLanguage) -> Self {
        Self {
            source_language,
            sql_resource_path_prefix: None,
            types_file_header: None,
            database_type_overrides: BTreeMap::new(),
            java_options: JavaOptions::default(),
            prefer_lowercase_names: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn database_type_override(&self, database_type: &str) -> Option<&str> {
        self.database_type_overrides
            .get(&database_type.to_lowercase())
            .map(|t| t.as_str())
    }

    pub fn prefer_lowercase_names(&self) -> bool {
        self.prefer_lowercase_names.unwrap_or(true)
    }
}

impl JavaOptions {
    pub fn emit_records(&self) -> bool {
        self.emit_records.unwrap_or(true)
    }
}
