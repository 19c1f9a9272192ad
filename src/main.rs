use std::process::ExitCode;

use chainkit::bundle::BundleExporter;
use chainkit::chain::ChainBuilder;
use chainkit::config::{ChainConfig, ExportConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let chain = match ChainBuilder::new(ChainConfig::default()).build() {
        Ok(chain) => chain,
        Err(err) => {
            tracing::error!(tier = %err.tier, "chain construction failed: {}", err.source);
            return ExitCode::FAILURE;
        }
    };

    match BundleExporter::new(ExportConfig::default()).export(chain) {
        Ok(paths) => {
            tracing::info!(count = paths.len(), "exported certificate bundles");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("export failed: {err}");
            ExitCode::FAILURE
        }
    }
}
