//! Torchlit Depths entry point
//!
//! The browser build is driven from JavaScript through `WebSession`. The
//! native binary runs a headless scripted walk, handy for checking a seed:
//!
//! ```text
//! torchlit-depths [seed] [ticks]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use torchlit_depths::SimConfig;
    use torchlit_depths::consts::*;
    use torchlit_depths::sim::{FixedStep, RunPhase, Session, TickInput};

    env_logger::init();
    log::info!("Torchlit Depths (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("invalid seed: {e}");
            std::process::exit(2);
        }
        None => rand::random(),
    };
    let ticks: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);

    let config = SimConfig::load();
    let mut session = match Session::new(config, seed) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("cannot build level: {e}");
            std::process::exit(1);
        }
    };

    println!("{}", session.grid.to_ascii());

    // Scripted walk: press forward, sweep the view, cast and hop now and then
    let mut clock = FixedStep::default();
    let mut input = TickInput {
        forward: true,
        ..Default::default()
    };
    let mut frames = 0u32;
    while session.time_ticks < ticks as u64 {
        input.yaw = Some(std::f32::consts::PI + (frames as f32 * 0.01).sin());
        input.cast = frames % 30 == 0;
        input.jump = frames % 120 == 60;
        if session.phase == RunPhase::GameOver {
            input.continue_run = true;
        }
        clock.run(&mut session, &mut input, SIM_DT);
        frames += 1;
    }

    let p = session.player.position();
    log::info!(
        "After {} ticks: player at ({:.2}, {:.2}, {:.2}), health {:.0}, mana {:.0}",
        session.time_ticks,
        p.x,
        p.y,
        p.z,
        session.player.health,
        session.player.mana
    );
    log::info!(
        "{} enemies left, {} slain, boss {}",
        session.enemies.len(),
        session.kills,
        session.boss().map_or("absent", |b| b.name())
    );
    println!(
        "seed {seed}: {} ticks, health {:.0}, {} kills",
        session.time_ticks, session.player.health, session.kills
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
