// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use sqljson_dbmd::CaseSensitivity;

use crate::PropertyNameDefault;

/// Return `base_name` if it is not taken, else the first of `base_name{sep}1`, `base_name{sep}2`, ...
/// that is not.
pub fn make_name_not_in_set(base_name: &str, existing: &BTreeSet<String>, sep: &str) -> String {
    if !existing.contains(base_name) {
        return base_name.to_string();
    }

    (1..)
        .map(|i| format!("{base_name}{sep}{i}"))
        .find(|name| !existing.contains(name))
        .unwrap_or_else(|| base_name.to_string())
}

/// Lower-cased first characters of the words of a name (`advisory_type` -> `at`).
pub fn lower_case_initials(name: &str) -> String {
    name.split(['_', '.', ' '])
        .filter_map(|word| word.chars().find(|c| c.is_ascii_alphanumeric()))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn upper_camel_case(name: &str) -> String {
    name.to_upper_camel_case()
}

fn is_mixed_case(name: &str) -> bool {
    name.chars().any(|c| c.is_lowercase()) && name.chars().any(|c| c.is_uppercase())
}

impl PropertyNameDefault {
    /// The default property name for a field as written in the query specification.
    pub fn property_name(self, field_name: &str, case_sensitivity: CaseSensitivity) -> String {
        match self {
            PropertyNameDefault::Camelcase => field_name.to_lower_camel_case(),
            PropertyNameDefault::AsInDb if is_mixed_case(field_name) => field_name.to_string(),
            PropertyNameDefault::AsInDb => match case_sensitivity {
                CaseSensitivity::InsensitiveStoredLower => field_name.to_lowercase(),
                CaseSensitivity::InsensitiveStoredUpper => field_name.to_uppercase(),
                CaseSensitivity::InsensitiveStoredMixed | CaseSensitivity::Sensitive => {
                    field_name.to_string()
                }
            },
        }
    }
}
