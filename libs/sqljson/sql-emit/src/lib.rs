// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! SQL text for the dialect-neutral [`sqljson_core::SqlSpec`] of a query.

mod dialect;
mod expression_builder;
mod sql_builder;
mod sql_emit_error;
mod sql_source_generator;

pub use dialect::{MySqlDialect, OracleDialect, PostgresDialect, SqlDialect, dialect_for_dbms};
pub use expression_builder::ExpressionBuilder;
pub use sql_builder::{SqlBuilder, indent_lines};
pub use sql_emit_error::SqlEmitError;
pub use sql_source_generator::SqlSourceGenerator;
