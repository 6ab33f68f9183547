use std::path::PathBuf;
use std::time::Duration;

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, PublishDiagnosticsParams, Range, Uri};

/// Parses a URI literal.
#[allow(clippy::unwrap_used)]
pub fn uri(s: &str) -> Uri {
    s.parse().unwrap()
}

/// Returns the path to a configuration fixture.
pub fn config_fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/configs")
        .join(name)
}

/// Returns the path to a contract fixture.
#[allow(dead_code)]
pub fn contract_fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/contracts")
        .join(name)
}

/// Builds a diagnostic spanning `start` to `end` (protocol coordinates).
pub fn diagnostic(
    severity: Option<DiagnosticSeverity>,
    message: &str,
    start: (u32, u32),
    end: (u32, u32),
) -> Diagnostic {
    Diagnostic {
        range: Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1)),
        severity,
        code: None,
        code_description: None,
        source: Some("solc".to_string()),
        message: message.to_string(),
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Builds a publication for one document.
pub fn publication(uri: &Uri, diagnostics: Vec<Diagnostic>) -> PublishDiagnosticsParams {
    PublishDiagnosticsParams::new(uri.clone(), diagnostics, None)
}

/// Yields to the runtime until `condition` holds, failing after one second.
#[allow(clippy::expect_used, dead_code)]
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
