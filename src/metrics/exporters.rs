use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::info;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from inside a tokio runtime; the listener runs as a
/// background task for the life of the process.
pub fn install_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    info!(
        "Prometheus metrics available at http://{}/metrics",
        addr
    );
    Ok(())
}
