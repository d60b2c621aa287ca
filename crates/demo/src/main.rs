// File: crates/demo/src/main.rs
// Summary: Demo drives a chart stack manager against the in-process series service and writes
//          PNG frames of a scripted session (load, pan, zoom, live ticks, crosshair).
// Notes:
// - Usage: constellation-demo [CANDLES.csv] [--config manager.json] [--log demo.log]
// - Without a CSV a seeded random walk of 5-minute candles is served instead.

mod indicators;
mod logger;
mod server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chart_core::chart::presets::{self, RsiChart, StrategyChart};
use chart_core::chart::OhlcChart;
use chart_core::{ChartStackManager, CodecRegistry, ManagerConfig, TransportAdapter};
use chart_render_skia::SkiaRenderer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::indicators::Candle;
use crate::server::{SimChannel, SimulatedService};

const WIDTH: f64 = 1280.0;
const HEIGHT: f64 = 800.0;
/// Base candles revealed per scripted tick.
const TICK_STEPS: u32 = 12;
const TICKS: u32 = 3;
/// Upper bound on pump rounds per settle; each round answers one wave of fetches.
const MAX_PUMPS: usize = 16;

#[derive(Default)]
struct Args {
    csv: Option<String>,
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Self::default();
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
                "--log" => args.log_file = Some(it.next().context("--log needs a path")?.into()),
                flag if flag.starts_with("--") => anyhow::bail!("unknown flag {flag}"),
                _ => args.csv = Some(arg),
            }
        }
        Ok(args)
    }
}

fn main() -> Result<()> {
    let args = Args::parse()?;
    logger::setup(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => ManagerConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => ManagerConfig::default(),
    };

    let (candles, label) = match &args.csv {
        Some(raw) => {
            let (path, used_alt) = resolve_path(raw)?;
            log::info!("using input file {}", path.display());
            if used_alt {
                log::info!("  (extension swapped between .csv/.cvs)");
            }
            let candles = load_ohlc_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?;
            (candles, short_stem(&path))
        }
        None => (random_walk(6_000, 300, 0x5EED_CAFE), "sim".to_string()),
    };
    if candles.is_empty() {
        anyhow::bail!("no candles loaded, check headers/delimiter");
    }
    log::info!("loaded {} candles", candles.len());

    let hold_back = (TICK_STEPS * TICKS) as usize;
    let revealed = candles.len().saturating_sub(hold_back).max(1);
    let service = SimulatedService::new(candles, revealed);
    let base = service.base_period();
    let period = if config.initial_period % base == 0 { config.initial_period } else { base };

    let adapter = TransportAdapter::new(SimChannel::new(service), CodecRegistry::with_defaults());
    let mut manager = ChartStackManager::new(adapter, WIDTH, HEIGHT, config);
    if manager.period() != period {
        log::info!("base period {base}s does not divide the configured period; using {period}s");
        manager.set_period(period);
    }

    let symbol = label.to_uppercase();
    manager.add_chart("ohlc-chart", Box::new(OhlcChart::new("ohlc", &symbol)));
    manager.add_chart("ohlc-chart", Box::new(presets::volume("volume", &symbol)));
    manager.add_chart("ohlc-chart", Box::new(presets::bbands("bbands", &symbol)));
    manager.add_chart("ohlc-chart", Box::new(presets::sar("sar", &symbol)));
    manager.add_chart("ohlc-chart", Box::new(StrategyChart::new("trades", &symbol, "SARStrategy")));
    manager.add_chart("macd-chart", Box::new(presets::macd("macd", &symbol)));
    manager.add_chart("rsi-chart", Box::new(RsiChart::new("rsi", &symbol)));
    manager.set_stack_size_ratios([("ohlc-chart", 3.0), ("macd-chart", 1.0), ("rsi-chart", 1.0)]);

    let renderer = SkiaRenderer::new();

    manager.request_max_time()?;
    settle(&mut manager)?;
    write_frame(&renderer, &manager, &label, "initial")?;

    manager.scroll(-400.0, 0.0);
    settle(&mut manager)?;
    write_frame(&renderer, &manager, &label, "panned")?;

    manager.scroll(0.0, -300.0);
    settle(&mut manager)?;
    write_frame(&renderer, &manager, &label, "zoomed")?;

    manager.scroll(400.0, 0.0);
    settle(&mut manager)?;
    for _ in 0..TICKS {
        manager.tick(TICK_STEPS)?;
        settle(&mut manager)?;
    }
    write_frame(&renderer, &manager, &label, "live")?;

    manager.draw_crosshair(WIDTH * 0.6, HEIGHT * 0.3);
    write_frame(&renderer, &manager, &label, "crosshair")?;

    log::info!(
        "done: {} fetches issued, {} panels",
        manager.cache().borrow().fetches_issued(),
        manager.stacks().len()
    );
    Ok(())
}

/// Pump until the service has answered everything the redraws asked for.
fn settle(manager: &mut ChartStackManager) -> Result<()> {
    for _ in 0..MAX_PUMPS {
        let events = manager.pump()?;
        let pending = manager.cache().borrow().in_flight();
        log::debug!("pump: {} events, {} in flight", events.len(), pending);
        if events.is_empty() && pending == 0 {
            return Ok(());
        }
    }
    log::warn!("still waiting on replies after {MAX_PUMPS} pumps");
    Ok(())
}

fn write_frame(renderer: &SkiaRenderer, manager: &ChartStackManager, label: &str, suffix: &str) -> Result<()> {
    let out = out_name_with(label, suffix);
    let bytes = renderer.render_manager(manager)?;
    std::fs::write(&out, bytes).with_context(|| format!("writing {}", out.display()))?;
    log::info!("wrote {}", out.display());
    Ok(())
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => alt.set_extension("csv"),
        "csv" => alt.set_extension("cvs"),
        _ => return None,
    };
    Some(alt)
}

/// First three `_`-separated parts of the file stem, e.g. `binanceus_CRVUSDT_6h`.
fn short_stem(input: &Path) -> String {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("chart");
    stem.split('_').take(3).collect::<Vec<_>>().join("_")
}

/// Produce output file name like target/out/chart_<label>_<suffix>.png
fn out_name_with(label: &str, suffix: &str) -> PathBuf {
    let mut out = PathBuf::from("target/out");
    std::fs::create_dir_all(&out).ok();
    if label.is_empty() {
        out.push(format!("chart_{suffix}.png"));
    } else {
        out.push(format!("chart_{label}_{suffix}.png"));
    }
    out
}

/// Load Binance-like OHLCV CSV. Rows without a parseable time or price are skipped.
fn load_ohlc_csv(path: &Path) -> Result<Vec<Candle>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    log::debug!("headers: {headers:?}");

    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]);
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);
    let i_volume = idx(&["volume", "v", "vol"]);

    if i_time.is_none() {
        anyhow::bail!("no time column in {}", path.display());
    }
    if i_open.is_none() || i_high.is_none() || i_low.is_none() || i_close.is_none() {
        log::warn!("could not find one of open/high/low/close columns");
    }

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let parse = |i: Option<usize>| -> Option<f64> { i.and_then(|ix| rec.get(ix)).and_then(|s| s.trim().parse::<f64>().ok()) };
        let t = i_time.and_then(|ix| rec.get(ix)).and_then(parse_time_secs);
        match (t, parse(i_open), parse(i_high), parse(i_low), parse(i_close)) {
            (Some(t), Some(o), Some(h), Some(l), Some(c)) => {
                out.push(Candle { t, o, h, l, c, v: parse(i_volume).unwrap_or(0.0) });
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} unparseable rows");
    }
    out.sort_by_key(|k| k.t);
    out.dedup_by_key(|k| k.t);
    Ok(out)
}

/// Epoch seconds or milliseconds, or an RFC 3339 / `YYYY-MM-DD HH:MM:SS` date.
fn parse_time_secs(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        // epoch ms -> sec
        return Some(if n > 10_i64.pow(12) { n / 1000 } else { n });
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok().map(|dt| dt.and_utc().timestamp())
}

/// Seeded random walk of `n` candles, `step` seconds apart, ending at the latest whole step.
fn random_walk(n: usize, step: i64, seed: u64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let end = chart_core::types::periodize(chart_core::types::now(), step);
    let start = end - (n as i64 - 1) * step;
    let mut price = 100.0f64;
    (0..n)
        .map(|i| {
            let o = price;
            let drift = (i as f64 / 400.0).sin() * 0.05;
            let c = (o * (1.0 + drift / 100.0 + (rng.gen::<f64>() - 0.5) * 0.006)).max(1.0);
            let h = o.max(c) * (1.0 + rng.gen::<f64>() * 0.002);
            let l = o.min(c) * (1.0 - rng.gen::<f64>() * 0.002);
            price = c;
            Candle { t: start + i as i64 * step, o, h, l, c, v: rng.gen_range(50.0..1000.0) }
        })
        .collect()
}
