/*
 *  main.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind}; // Import specific Unix signals

use pixeldeck::config::{self, Cli, Config};
use pixeldeck::display::drivers::create_sink;
use pixeldeck::display::task::{ClockTask, StockTask, TaskSpec, TextTask, WeatherTask};
use pixeldeck::display::Scheduler;
use pixeldeck::feeds::HttpFetcher;
use pixeldeck::playlist::PlaylistRunner;
use pixeldeck::presets::PresetBook;
use pixeldeck::runtime::{display_channel, run_display_loop};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
/// always unix so forget the cfg
async fn signal_handler() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

enum Startup {
    Task(TaskSpec),
    Playlist(PlaylistRunner),
}

/// What to show first: command line shortcuts, then preset or playlist,
/// else a 24h clock
fn startup(cli: &Cli, cfg: &Config, book: &PresetBook) -> Result<Startup> {
    if let Some(text) = &cli.text {
        return Ok(Startup::Task(TaskSpec::Text(TextTask { text: text.clone(), ..Default::default() })));
    }
    if let Some(location) = &cli.weather {
        return Ok(Startup::Task(TaskSpec::Weather(WeatherTask {
            location: location.clone(),
            units: cfg.units(),
            ..Default::default()
        })));
    }
    if let Some(ticker) = &cli.stock {
        return Ok(Startup::Task(TaskSpec::Stock(StockTask { ticker: ticker.clone(), ..Default::default() })));
    }
    if let Some(name) = &cli.preset {
        return Ok(Startup::Task(book.find(name)?.task.clone()));
    }
    if let Some(name) = &cli.playlist {
        let runner = PlaylistRunner::new(book.playlist(name)?, book)?;
        return Ok(Startup::Playlist(runner));
    }
    Ok(Startup::Task(TaskSpec::Clock(ClockTask::default())))
}

fn list_presets(book: &PresetBook) {
    println!("Presets:");
    for p in &book.presets {
        println!("  {:<20} {:?}  {}", p.name, p.task.kind(), p.description.as_deref().unwrap_or(""));
    }
    println!("Playlists:");
    for pl in &book.playlists {
        println!("  {:<20} {} items{}", pl.name, pl.items.len(), if pl.looped { ", looped" } else { "" });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        println!("{}", cfg.to_yaml()?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("This {} counts every pixel", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let book = match &cfg.presets_file {
        Some(path) => PresetBook::load_or_empty(path)
            .with_context(|| format!("loading presets from {}", path.display()))?,
        None => PresetBook::default(),
    };

    if cli.list_presets {
        list_presets(&book);
        return Ok(());
    }

    let first = startup(&cli, &cfg, &book)?;

    let scheduler = Scheduler::new(cfg.geometry()?, cfg.font_table()?, cfg.policy(), create_sink(cfg.sink_kind()));
    let fetcher = Arc::new(HttpFetcher::new(cfg.api_keys()).context("building HTTP client")?);
    let (handle, control) = display_channel();
    let display = tokio::spawn(run_display_loop(scheduler, fetcher, control));

    match first {
        Startup::Task(task) => handle.switch_to(task).await?,
        Startup::Playlist(runner) => handle.play(runner).await?,
    }

    if let Err(e) = signal_handler().await {
        error!("Signal handler failed: {}", e);
    }

    if handle.shutdown().await.is_err() {
        info!("Display loop already stopped");
    }
    display.await.context("display loop panicked")?;
    info!("Shutdown complete");
    Ok(())
}
