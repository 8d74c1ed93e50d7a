use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use synwall_core::config::{LogFormat, SynwallConfig};
use synwall_core::counters::CounterBank;
use synwall_daemon::cli::DaemonCli;
use synwall_daemon::{logging, metrics_server, replay};
use synwall_filter::FilterPipeline;
use synwall_monitor::{MetricsSampler, summarize};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // Config precedence: CLI > environment > file > defaults
    let mut config = SynwallConfig::load(&cli.config).await?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format.parse()?;
    }
    config.validate()?;

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(config = %cli.config.display(), "synwall-daemon starting");

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    // Shared counter bank: written by the filter path, read by the sampler
    let counters = Arc::new(CounterBank::new());

    let (mut pipeline, frame_tx) = FilterPipeline::builder()
        .config(config.filter.clone())
        .counters(Arc::clone(&counters))
        .build()?;
    pipeline.start()?;
    tracing::info!(
        window_secs = config.filter.window_secs,
        syn_threshold = config.filter.syn_threshold,
        block_policy = %config.filter.block_policy,
        "filter pipeline started"
    );

    let sampler_handle = MetricsSampler::builder()
        .counters(Arc::clone(&counters))
        .interval(Duration::from_secs(config.monitor.sample_interval_secs))
        .build()?
        .start();
    tracing::info!("metrics sampler started");

    if let Some(path) = cli.replay {
        // Offline run: feed the capture file, then drain and shut down.
        // frame_tx is consumed here, so the classify loop ends after the
        // last queued frame.
        let frames = replay::replay_file(&path, frame_tx).await?;
        tracing::info!(frames, "replay complete, shutting down");
    } else {
        tracing::info!("synwall-daemon running -- filter active");
        tokio::signal::ctrl_c().await?;
        tracing::info!("shutdown signal received");
        drop(frame_tx);
    }

    if let Err(e) = pipeline.stop().await {
        tracing::error!(error = %e, "failed to stop filter pipeline");
    }
    let samples = sampler_handle.stop().await;

    let summary = summarize(&samples);
    tracing::info!(
        syn_total = summary.syn_total,
        syn_blocked = summary.syn_blocked,
        syn_accepted = summary.syn_accepted,
        success_rate_pct = summary.success_rate_pct,
        avg_cpu_pct = summary.avg_cpu_pct,
        avg_pps = summary.avg_pps,
        "final summary"
    );
    match config.general.log_format {
        LogFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        LogFormat::Pretty => println!("{summary}"),
    }

    tracing::info!("synwall-daemon shut down");
    Ok(())
}
