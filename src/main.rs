//! Rooftop Chase entry point
//!
//! Native headless driver: loads tuning, plays a scripted session at the
//! nominal frame rate and logs the event stream the renderer and UI would
//! receive.
//!
//! Usage: `rooftop-chase [archetype] [tuning.json]`, seed from `ROOFTOP_SEED`.

use rooftop_chase::consts::SIM_DT;
use rooftop_chase::sim::{GameEvent, SessionPhase};
use rooftop_chase::{Game, Tuning};

const DEMO_SECONDS: u32 = 180;
/// Frames between scripted hits during a fight
const FRAMES_PER_HIT: u32 = 6;
const DEFAULT_SEED: u64 = 0x5eed;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let archetype = args.next().unwrap_or_else(|| "city".to_string());
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let seed = std::env::var("ROOFTOP_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    log::info!("Rooftop Chase (headless) starting, scene '{}', seed {}", archetype, seed);

    let mut game = Game::new(tuning, seed);
    game.start(&archetype, 0)?;
    game.equip_vehicle(Some("skates"))?;
    for i in 0..24 {
        game.enqueue_ad(format!("campaign-{:02}", i));
    }

    let total_frames = DEMO_SECONDS * 60;
    let pause_at = total_frames / 2;
    let mut fight_frames = 0;

    for frame in 1..=total_frames {
        let now = (frame as f64 * SIM_DT as f64 * 1000.0) as u64;

        // Tab hidden for five seconds halfway through
        if frame == pause_at {
            game.pause(now);
        } else if frame == pause_at + 300 {
            game.resume(now);
        }

        match game.phase() {
            SessionPhase::Chase => {
                fight_frames = 0;
                let session = game.session();
                let to_opponent = session.opponent.planar() - session.player.planar();
                game.steer(to_opponent);
                game.dash();
            }
            SessionPhase::Fight => {
                fight_frames += 1;
                if fight_frames % FRAMES_PER_HIT == 0 {
                    game.add_attack_count();
                }
            }
            _ => {}
        }

        game.frame(now);

        for event in game.drain_events() {
            log_event(&event);
        }
    }

    // Bonus round: a rewarded video watched to the end
    game.finish_rewarded_video(Ok(()));
    game.end();
    for event in game.drain_events() {
        log_event(&event);
    }

    let session = game.session();
    println!(
        "Scene '{}': {} fights won, final score {}, {} ads still queued",
        session.layout().archetype_id,
        session.fights_won(),
        session.score(),
        game.pending_ads()
    );
    Ok(())
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PhaseChanged(phase) => log::info!("Phase -> {:?}", phase),
        GameEvent::ScoreChanged(score) => log::info!("Score -> {}", score),
        GameEvent::EntityTransformChanged {
            entity,
            position,
            rotation,
        } => log::trace!("{:?} at {:?} facing {:.2}", entity, position, rotation),
        GameEvent::AdAssigned { slot, content } => log::debug!("Slot {} <- '{}'", slot, content),
        GameEvent::AdEvicted { slot, content } => log::debug!("Slot {} dropped '{}'", slot, content),
        GameEvent::AdContentChanged { slot, content } => {
            log::debug!("Slot {} now showing '{}'", slot, content)
        }
    }
}
