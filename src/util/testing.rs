//! Test support: logging setup and tree fixtures.

use std::sync::Arc;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{ApplicationResult, EditorController};
use crate::domain::{NodeId, Snapshot};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let noisy_modules = ["config"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // RUST_LOG wins; otherwise only warnings so test output stays readable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
}

/// Builds a tree from `(parent, label)` pairs, adding them in order.
///
/// Ids are assigned by the controller, so the n-th pair becomes node `n + 2`.
pub fn build_tree(
    controller: &mut EditorController,
    children: &[(u64, &str)],
) -> ApplicationResult<Arc<Snapshot>> {
    for (parent, label) in children {
        controller.add_child_labeled(NodeId(*parent), label)?;
    }
    Ok(controller.snapshot())
}
