// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![cfg(test)]

use sqljson_dbmd::DatabaseMetadata;
use sqljson_dbmd::test_support::DRUGS_SCHEMA;

use crate::{PropertyNameDefault, QuerySpec, Resolver};

pub fn drugs_resolver(dbmd: &DatabaseMetadata) -> Resolver<'_> {
    Resolver::new(dbmd, Some(DRUGS_SCHEMA), PropertyNameDefault::Camelcase)
}

pub fn query_spec(json: serde_json::Value) -> QuerySpec {
    serde_json::from_value(json).unwrap()
}
