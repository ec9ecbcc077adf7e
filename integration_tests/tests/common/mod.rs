use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the fmt subscriber once per test binary so failing runs can be
/// replayed with `RUST_LOG=anoikis=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
