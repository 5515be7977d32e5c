use anyhow::{bail, Context};
use glam::DVec2;
use instant::Instant;
use rand::prelude::*;

use tessera_core::{
    AudioSink, EngineConfig, Frame, GameEngine, LevelKind, NoteRequest, PointerDown, Rect,
    RenderSink, ToneRequest, ToneStop, CANVAS_HEIGHT, CANVAS_WIDTH,
};

const ENGINE_SEED: u64 = 0x7e55_e7a;
const SCRIPTED_DRAGS: usize = 6;
const MOVES_PER_DRAG: usize = 24;
const FRAME_DT_SEC: f64 = 1.0 / 60.0;
const SETTLE_STEPS: usize = 30;

/// Logs every request instead of synthesizing it.
#[derive(Default)]
struct LoggingAudio {
    notes: usize,
}

impl AudioSink for LoggingAudio {
    fn schedule_note(&mut self, note: NoteRequest) {
        self.notes += 1;
        log::debug!(
            "[audio] note cell={} +{:.3}s {:.1}Hz",
            note.site,
            note.start_offset_sec,
            note.frequency_hz
        );
    }

    fn set_tone(&mut self, tone: ToneRequest) {
        log::debug!(
            "[audio] tone cell={} vol={:.2} {:.1}Hz",
            tone.site,
            tone.volume,
            tone.frequency_hz
        );
    }

    fn stop_tone(&mut self, site: usize, kind: ToneStop) {
        log::debug!("[audio] stop cell={} ({:?})", site, kind);
    }
}

#[derive(Default)]
struct LoggingRenderer {
    frames: usize,
}

impl RenderSink for LoggingRenderer {
    fn draw(&mut self, frame: &Frame) {
        self.frames += 1;
        let highlighted = frame.cells.iter().filter(|c| c.highlighted).count();
        log::debug!(
            "[frame] #{} cells={} highlighted={} fronts={}",
            self.frames,
            frame.cells.len(),
            highlighted,
            frame.fronts.len()
        );
        if let Some(cell) = frame.cells.first() {
            log::trace!("[frame] cell {} fill {:?}", cell.site, cell.fill.rgb());
        }
        if let Some(ratio) = frame.drag_link.and_then(|l| l.frequency_ratio) {
            log::debug!("[frame] drag link ratio {:.3}", ratio);
        }
    }
}

/// `name=value` overrides; `level` takes a generator name, everything else a number.
fn parse_overrides(args: impl Iterator<Item = String>) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::default();
    for arg in args {
        let Some((name, value)) = arg.split_once('=') else {
            bail!("expected name=value, got `{}`", arg);
        };
        if name == "level" {
            config.level = value.parse::<LevelKind>()?;
            continue;
        }
        let v: f64 = value
            .parse()
            .with_context(|| format!("parameter `{}` is not a number: `{}`", name, value))?;
        config
            .set(name, v)
            .with_context(|| format!("while applying `{}`", arg))?;
        log::info!("[config] {} = {}", name, v);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = parse_overrides(std::env::args().skip(1))?;
    let canvas = Rect::from_size(CANVAS_WIDTH, CANVAS_HEIGHT);
    let mut engine = GameEngine::new(config, canvas, ENGINE_SEED);
    let mut audio = LoggingAudio::default();
    let mut renderer = LoggingRenderer::default();
    let mut rng = StdRng::seed_from_u64(ENGINE_SEED ^ 0x5eed);

    let started = Instant::now();
    let outcome = engine.seed_balanced();
    for w in &outcome.warnings {
        log::warn!("[seed] {}", w);
    }
    log::info!(
        "[seed] {} attempt(s), balanced={}, A={:.0} B={:.0} in {:?}",
        outcome.attempts,
        outcome.balanced,
        outcome.areas.a,
        outcome.areas.b,
        started.elapsed()
    );

    for _ in 0..SETTLE_STEPS {
        let report = engine.step();
        if report.converged && report.recolored == 0 {
            break;
        }
    }

    let mut now = 0.0;
    for round in 0..SCRIPTED_DRAGS {
        // Pick a site on the side whose turn it is.
        let active = engine.active_color();
        let candidates: Vec<usize> = (0..engine.sites().len())
            .filter(|&i| active.map_or(true, |c| engine.color(i) == c))
            .collect();
        let Some(&site) = candidates.choose(&mut rng) else {
            log::warn!("[script] no movable site in round {}", round);
            break;
        };
        let from = engine.sites()[site];
        let to = DVec2::new(
            rng.gen_range(canvas.min.x..canvas.max.x),
            rng.gen_range(canvas.min.y..canvas.max.y),
        );

        match engine.pointer_down(from, now, &mut audio) {
            PointerDown::Drag(s) => log::info!("[script] round {}: dragging site {}", round, s),
            other => {
                log::info!("[script] round {}: pointer down gave {:?}", round, other);
                continue;
            }
        }

        for k in 1..=MOVES_PER_DRAG {
            now += FRAME_DT_SEC;
            let t = k as f64 / MOVES_PER_DRAG as f64;
            let Some(update) = engine.pointer_move(from.lerp(to, t), &mut audio) else {
                break;
            };
            engine.render(now, &mut renderer);
            if let Some(color) = update.handed_over {
                log::info!("[script] turn handed to {:?} mid-drag", color);
                break;
            }
        }
        let release = engine.sites()[site];
        engine.pointer_up(release, now, &mut audio);

        let areas = engine.color_areas();
        let fronts = engine.front_lines();
        let front_len: f64 = fronts.iter().map(|f| f.length).sum();
        log::info!(
            "[script] round {}: A={:.0} B={:.0} fronts={} ({:.0}px) next={:?}",
            round,
            areas.a,
            areas.b,
            fronts.len(),
            front_len,
            engine.active_color()
        );
    }

    engine.render(now, &mut renderer);
    log::info!(
        "[script] done: {} frames, {} notes, {} tessellation builds in {:?}",
        renderer.frames,
        audio.notes,
        engine.tessellation_builds(),
        started.elapsed()
    );
    Ok(())
}
