// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use crate::naming::make_name_not_in_set;

/// Table aliases visible at some point of a query. Adding an alias yields a new scope and leaves
/// the original untouched, so sibling sub-queries never observe each other's aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasScope {
    aliases: BTreeSet<String>,
}

impl AliasScope {
    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains(alias)
    }

    pub fn with(&self, alias: &str) -> Self {
        let mut aliases = self.aliases.clone();
        aliases.insert(alias.to_string());
        Self { aliases }
    }

    /// An alias based on `base` that does not shadow any alias in this scope.
    pub fn fresh_alias(&self, base: &str) -> String {
        make_name_not_in_set(base, &self.aliases, "")
    }
}
