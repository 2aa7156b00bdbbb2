#![doc(test(attr(deny(warnings))))]

//! Bucketwise Core offers the transaction auto-categorization rule engine
//! that powers Bucketwise dashboards and automation clients: user-authored
//! rules, deterministic resolution, previews, and bulk runs.

pub mod api;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod rules;
pub mod storage;
pub mod transactions;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Bucketwise Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
