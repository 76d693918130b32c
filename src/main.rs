use anyhow::Result;
use clap::Parser;
use network_hub::cli::Cli;
use network_hub::collectors::SystemProbes;
use network_hub::config::ProbeConfig;
use network_hub::report;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let _cli = Cli::parse();

    let probes = SystemProbes::new(ProbeConfig::default());
    let ping_target = probes.config().ping_target.clone();
    report::run_report(&probes, &ping_target, std::io::stdout()).await?;

    Ok(())
}
