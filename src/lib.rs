#![forbid(unsafe_code)]

pub mod accounting;
pub mod avl;
pub mod balance;
pub mod computed_data;
pub mod config;
pub mod decimal;
pub mod error;
pub mod gain_loss;
pub mod gain_loss_set;
pub mod model;
pub mod tax_engine;
pub mod util;

pub use config::{Configuration, Country};
pub use decimal::Decimal;
pub use error::{Error, Result};

use std::io::IsTerminal;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

/// Installs a `tracing` subscriber honoring `RUST_LOG`, defaulting to INFO.
/// Callers embedding the engine (a CLI, a test harness) call this once at
/// startup; the library itself never installs a subscriber implicitly.
pub fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(env_filter)
        .init();
}
