// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sqljson_core::SpecError;
use sqljson_dbmd::DatabaseMetadataError;
use sqljson_source_emit::SourceEmitError;
use sqljson_sql_emit::SqlEmitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Invalid input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Database metadata: {0}")]
    Metadata(#[from] DatabaseMetadataError),

    #[error("{0}")]
    Spec(#[from] SpecError),

    #[error("SQL generation: {0}")]
    SqlEmit(#[from] SqlEmitError),

    #[error("Source generation: {0}")]
    SourceEmit(#[from] SourceEmitError),

    #[error("{0} {1}")]
    WithContext(String, #[source] Box<CompileError>),
}

impl CompileError {
    pub fn with_context(self, context: String) -> CompileError {
        CompileError::WithContext(context, Box::new(self))
    }

    /// The error without any added context.
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::WithContext(_, source) => source.root(),
            _ => self,
        }
    }
}

pub trait WithContext {
    fn with_context(self, context: String) -> Self;
}

impl<T> WithContext for Result<T, CompileError> {
    fn with_context(self, context: String) -> Result<T, CompileError> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context() {
        let error: Result<(), CompileError> =
            Err(SqlEmitError::UnsupportedDbms("SQLite".to_string()).into());
        let error = error
            .with_context("While compiling query 'drugs':".to_string())
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "While compiling query 'drugs': SQL generation: Database 'SQLite' is not supported"
        );
        assert!(matches!(
            error.root(),
            CompileError::SqlEmit(SqlEmitError::UnsupportedDbms(_))
        ));
    }
}
