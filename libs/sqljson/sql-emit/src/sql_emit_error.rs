// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlEmitError {
    #[error("Database '{0}' is not supported")]
    UnsupportedDbms(String),

    #[error("The {dialect} dialect does not support ordering within aggregate functions")]
    AggregateOrderingUnsupported { dialect: &'static str },

    #[error(
        "An unwrapped collection of table '{table}' must have exactly one property, found {property_count}"
    )]
    UnwrappedCollectionProperties {
        table: String,
        property_count: usize,
    },
}
