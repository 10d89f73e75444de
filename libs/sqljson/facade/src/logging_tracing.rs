// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Tracing subscriber setup for applications embedding the compiler.
//!
//! The compiler crates log through `tracing`. Calling [`init`] installs a global subscriber that
//! prints compact console output filtered by the `SQLJSON_LOG` environment variable, which follows
//! the `RUST_LOG` conventions (for example `SQLJSON_LOG=sqljson_core=debug`). Only warnings are
//! printed when the variable is not set.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*, util::TryInitError};

const SQLJSON_LOG: &str = "SQLJSON_LOG";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install the tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Initialize the global tracing subscriber.
pub fn init() -> Result<(), LoggingError> {
    let fmt_layer = tracing_subscriber::fmt::layer().compact();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(SQLJSON_LOG)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
