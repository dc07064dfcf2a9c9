use anyhow::Context;
use skyparcel::{run_batch, Credentials, PngWriter, RunPaths, SentinelHubClient, SentinelHubConfig};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let base_dir = std::env::current_dir().context("cannot determine working directory")?;
    let paths = RunPaths::under(&base_dir);
    log::info!("Run paths: {:?}", paths);

    let credentials = Credentials::from_env()?;
    let mut client = SentinelHubClient::new(credentials, SentinelHubConfig::default())?;

    let summary = run_batch(&paths, &mut client, &PngWriter)?;
    log::info!(
        "Run complete: {} saved, {} failed of {}",
        summary.saved.len(),
        summary.failures.len(),
        summary.total
    );

    Ok(())
}
