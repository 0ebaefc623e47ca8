//! Installs a test-writer subscriber for the studio integration tests.
//!
//! The loaders log at `info` (`models loaded`, `presets loaded`) and `warn` when a
//! document is missing or the catalog falls back to the secrets endpoint. The session
//! engine logs `preset applied`, `preset skipped; user edits present` and edit detection
//! at `debug`, and rejected backend selections at `warn`. By default only studio's
//! warnings are shown; set `RUST_LOG` to see the rest:
//!
//! ```bash
//! RUST_LOG=studio=debug cargo test -p studio --test session_flow -- --nocapture
//! ```

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "studio=warn";

#[ctor::ctor]
fn install_studio_subscriber() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    // Ignored if a global default is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}
