/*
 *  config.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration layered under clap overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::display::drivers::SinkKind;
use crate::display::error::FontError;
use crate::display::font::{FontTable, SpriteFont};
use crate::display::scheduler::SchedulerPolicy;
use crate::display::traits::PanelGeometry;
use crate::feeds::{ApiKeys, TempUnit};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Font(#[from] FontError),
}

/// Top-level app configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>, // e.g., "info" | "debug"
    pub panel: Option<PanelConfig>,
    pub scheduler: Option<SchedulerConfig>,
    pub api: Option<ApiConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontEntry>,
    /// JSON presets and playlists
    pub presets_file: Option<PathBuf>,
    pub sink: Option<SinkKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PanelConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchedulerConfig {
    pub sink_failure_threshold: Option<u32>, // 0 = never auto stop
    pub clock_interval_ms: Option<u64>,
    pub ticker_interval_ms: Option<u64>,
    pub scroll_step: Option<u32>,
    pub scroll_gap: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    pub weather_key: Option<String>,
    pub youtube_key: Option<String>,
    /// Units for weather tasks started from the command line
    pub units: Option<TempUnit>,
}

/// A sprite font sheet given as text rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    pub name: String,
    pub glyph_order: String,
    pub columns: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default = "default_fallback")]
    pub fallback: char,
    pub rows: Vec<String>,
}

fn default_fallback() -> char {
    ' '
}

impl FontEntry {
    pub fn to_font(&self) -> Result<SpriteFont, FontError> {
        SpriteFont::from_rows(&self.name, &self.glyph_order, self.columns, self.spacing, self.fallback, &self.rows)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "pixeldeck", about = "PixelDeck LED panel driver", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shorthand for --log-level debug
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub panel_width: Option<u32>,
    #[arg(long)]
    pub panel_height: Option<u32>,
    #[arg(long, value_enum)]
    pub sink: Option<SinkKind>,
    #[arg(long)]
    pub sink_failure_threshold: Option<u32>,
    /// JSON presets file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub presets: Option<PathBuf>,
    /// Run a named preset
    #[arg(long, conflicts_with = "playlist")]
    pub preset: Option<String>,
    /// Run a named playlist
    #[arg(long)]
    pub playlist: Option<String>,
    /// Show a one-off text message
    #[arg(long, conflicts_with_all = ["preset", "playlist"])]
    pub text: Option<String>,
    /// Weather ticker for a location
    #[arg(long, conflicts_with_all = ["preset", "playlist", "text"])]
    pub weather: Option<String>,
    /// Stock ticker for a symbol
    #[arg(long, conflicts_with_all = ["preset", "playlist", "text", "weather"])]
    pub stock: Option<String>,
    /// List presets and playlists then exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub list_presets: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Read YAML (explicit path or search), apply CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/pixeldeck/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/pixeldeck/config.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["pixeldeck.yaml", "config/pixeldeck.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()     { dst.log_level = src.log_level; }
    if src.presets_file.is_some()  { dst.presets_file = src.presets_file; }
    if src.sink.is_some()          { dst.sink = src.sink; }
    if !src.fonts.is_empty()       { dst.fonts = src.fonts; }
    match (&mut dst.panel, src.panel) {
        (None, Some(p)) => dst.panel = Some(p),
        (Some(d), Some(s)) => {
            if s.width.is_some()  { d.width = s.width; }
            if s.height.is_some() { d.height = s.height; }
        }
        _ => {}
    }
    match (&mut dst.scheduler, src.scheduler) {
        (None, Some(s)) => dst.scheduler = Some(s),
        (Some(d), Some(s)) => merge_scheduler(d, s),
        _ => {}
    }
    match (&mut dst.api, src.api) {
        (None, Some(a)) => dst.api = Some(a),
        (Some(d), Some(s)) => {
            if s.weather_key.is_some() { d.weather_key = s.weather_key; }
            if s.youtube_key.is_some() { d.youtube_key = s.youtube_key; }
            if s.units.is_some()       { d.units = s.units; }
        }
        _ => {}
    }
}

fn merge_scheduler(dst: &mut SchedulerConfig, src: SchedulerConfig) {
    if src.sink_failure_threshold.is_some() { dst.sink_failure_threshold = src.sink_failure_threshold; }
    if src.clock_interval_ms.is_some()      { dst.clock_interval_ms = src.clock_interval_ms; }
    if src.ticker_interval_ms.is_some()     { dst.ticker_interval_ms = src.ticker_interval_ms; }
    if src.scroll_step.is_some()            { dst.scroll_step = src.scroll_step; }
    if src.scroll_gap.is_some()             { dst.scroll_gap = src.scroll_gap; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".into()); }
    if cli.presets.is_some()   { cfg.presets_file = cli.presets.clone(); }
    if cli.sink.is_some()      { cfg.sink = cli.sink; }

    if cli.panel_width.is_some() || cli.panel_height.is_some() {
        let panel = cfg.panel.get_or_insert_with(PanelConfig::default);
        if cli.panel_width.is_some()  { panel.width = cli.panel_width; }
        if cli.panel_height.is_some() { panel.height = cli.panel_height; }
    }
    if cli.sink_failure_threshold.is_some() {
        let sched = cfg.scheduler.get_or_insert_with(SchedulerConfig::default);
        sched.sink_failure_threshold = cli.sink_failure_threshold;
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(panel) = cfg.panel.as_ref() {
        if panel.width == Some(0) || panel.height == Some(0) {
            return Err(ConfigError::Validation("panel width/height must be > 0".into()));
        }
    }
    if let Some(sched) = cfg.scheduler.as_ref() {
        if sched.clock_interval_ms == Some(0) || sched.ticker_interval_ms == Some(0) {
            return Err(ConfigError::Validation("scheduler intervals must be > 0".into()));
        }
    }
    for entry in &cfg.fonts {
        entry.to_font()?;
    }
    Ok(())
}

impl Config {
    pub fn geometry(&self) -> Result<PanelGeometry, ConfigError> {
        let d = PanelGeometry::default();
        let panel = self.panel.clone().unwrap_or_default();
        PanelGeometry::new(panel.width.unwrap_or(d.width), panel.height.unwrap_or(d.height))
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn policy(&self) -> SchedulerPolicy {
        let mut p = SchedulerPolicy::default();
        if let Some(s) = self.scheduler.as_ref() {
            if let Some(t) = s.sink_failure_threshold { p.sink_failure_threshold = t; }
            if let Some(ms) = s.clock_interval_ms     { p.clock_tick = Duration::from_millis(ms); }
            if let Some(ms) = s.ticker_interval_ms    { p.ticker_tick = Duration::from_millis(ms); }
            if let Some(n) = s.scroll_step            { p.scroll_step = n; }
            if let Some(n) = s.scroll_gap             { p.scroll_gap = n; }
        }
        p.normalized()
    }

    pub fn api_keys(&self) -> ApiKeys {
        let api = self.api.clone().unwrap_or_default();
        ApiKeys { weather: api.weather_key, youtube: api.youtube_key }
    }

    pub fn units(&self) -> TempUnit {
        self.api.as_ref().and_then(|a| a.units).unwrap_or_default()
    }

    pub fn sink_kind(&self) -> SinkKind {
        self.sink.unwrap_or_default()
    }

    /// Built-in fonts plus every configured sheet
    pub fn font_table(&self) -> Result<FontTable, ConfigError> {
        let mut table = FontTable::new();
        for entry in &self.fonts {
            table.register(entry.to_font()?)?;
        }
        Ok(table)
    }

    /// Pretty YAML of the effective config
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
log_level: info
panel:
  width: 96
  height: 16
scheduler:
  sink_failure_threshold: 0
  clock_interval_ms: 500
api:
  weather_key: abc
  units: imperial
sink: log
fonts:
  - name: tiny
    glyph_order: "AB"
    columns: 2
    spacing: 1
    rows:
      - "#..#"
      - "#..#"
"##;

    #[test]
    fn test_parse_and_derive() {
        let cfg = parse_yaml(SAMPLE).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.geometry().unwrap(), PanelGeometry::new(96, 16).unwrap());
        let p = cfg.policy();
        assert_eq!(p.sink_failure_threshold, 0);
        assert_eq!(p.clock_tick, Duration::from_millis(500));
        assert_eq!(p.ticker_tick, SchedulerPolicy::default().ticker_tick);
        assert_eq!(cfg.units(), TempUnit::Imperial);
        assert_eq!(cfg.sink_kind(), SinkKind::Log);
        assert_eq!(cfg.api_keys().weather.as_deref(), Some("abc"));
        assert_eq!(cfg.fonts[0].rows, vec!["#..#".to_string(), "#..#".to_string()]);
        let fonts = cfg.font_table().unwrap();
        assert!(fonts.get("tiny").is_ok());
        assert!(fonts.get("default").is_ok());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut cfg = parse_yaml(SAMPLE).unwrap();
        let cli = Cli {
            panel_width: Some(128),
            debug: true,
            sink_failure_threshold: Some(7),
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.geometry().unwrap().width, 128);
        assert_eq!(cfg.geometry().unwrap().height, 16);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.policy().sink_failure_threshold, 7);
    }

    #[test]
    fn test_validation_rejects() {
        let zero = parse_yaml("panel:\n  width: 0\n").unwrap();
        assert!(matches!(validate(&zero), Err(ConfigError::Validation(_))));
        let ragged = parse_yaml(
            "fonts:\n  - name: bad\n    glyph_order: A\n    columns: 1\n    rows: ['##', '#']\n",
        )
        .unwrap();
        assert!(matches!(validate(&ragged), Err(ConfigError::Font(_))));
    }

    #[test]
    fn test_merge_keeps_unset() {
        let mut base = parse_yaml(SAMPLE).unwrap();
        merge(&mut base, parse_yaml("panel:\n  height: 32\n").unwrap());
        assert_eq!(base.geometry().unwrap(), PanelGeometry::new(96, 32).unwrap());
        assert_eq!(base.fonts.len(), 1);
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::default();
        assert_eq!(cfg.geometry().unwrap(), PanelGeometry::default());
        assert_eq!(cfg.policy(), SchedulerPolicy::default());
        assert_eq!(cfg.sink_kind(), SinkKind::Console);
    }
}
