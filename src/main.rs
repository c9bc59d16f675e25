//! Thirteen Souls headless runner
//!
//! Drives the encounter core in idle mode and prints the final HUD snapshot.
//!
//! Usage: `thirteen-souls [seed] [seconds] [tuning.json|-] [pierce|single]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use thirteen_souls::consts::*;
    use thirteen_souls::sim::{GameEvent, GameState, Phase, TickInput, tick};
    use thirteen_souls::{Headless, StrikePolicy, Tuning, TuningError};

    /// Host frame time; two sim steps per frame on average
    const FRAME_DT: f32 = 1.0 / 30.0;

    /// Runner options from the command line
    struct Options {
        seed: u64,
        seconds: f32,
        tuning_path: Option<String>,
        strike_policy: Option<String>,
    }

    impl Options {
        fn from_args() -> Self {
            let mut args = std::env::args().skip(1);
            let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
            let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);
            // "-" keeps the default table but still allows a policy override
            let tuning_path = args.next().filter(|p| p != "-");
            let strike_policy = args.next();
            Self {
                seed,
                seconds,
                tuning_path,
                strike_policy,
            }
        }
    }

    fn load_tuning(options: &Options) -> Result<Tuning, TuningError> {
        let mut tuning = match options.tuning_path.as_deref() {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        if let Some(name) = options.strike_policy.as_deref() {
            tuning.strike_policy = StrikePolicy::from_str(name)
                .ok_or_else(|| TuningError::UnknownStrikePolicy(name.to_string()))?;
        }
        Ok(tuning)
    }

    /// Runner holding the sim and the frame accumulator
    struct Runner {
        state: GameState,
        hooks: Headless,
        accumulator: f32,
        runs: u32,
    }

    impl Runner {
        fn new(state: GameState) -> Self {
            Self {
                state,
                hooks: Headless,
                accumulator: 0.0,
                runs: 0,
            }
        }

        /// Advance one host frame with the fixed-step accumulator
        fn frame(&mut self, dt: f32) {
            self.accumulator += dt;
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = TickInput {
                    // Title, story and run-over all advance on activate
                    activate: self.state.phase != Phase::Active,
                    idle_mode: true,
                    ..Default::default()
                };
                tick(&mut self.state, &input, SIM_DT, &mut self.hooks);
                self.accumulator -= SIM_DT;
                substeps += 1;
                self.report_events();
            }
            if substeps >= MAX_SUBSTEPS {
                self.accumulator = 0.0;
            }
        }

        fn report_events(&mut self) {
            for event in &self.state.events {
                match event {
                    GameEvent::PhaseChanged {
                        to: Phase::Active, ..
                    } => {
                        self.runs += 1;
                        log::info!("Run {} started", self.runs);
                    }
                    GameEvent::BossSummoned { difficulty, .. } => {
                        log::info!("Boss summoned at difficulty {:.1}x", difficulty);
                    }
                    GameEvent::PlayerDied => {
                        log::info!(
                            "Player died after {} kills",
                            self.state.run.kill_count()
                        );
                    }
                    _ => {}
                }
            }
        }
    }

    pub fn run() -> std::process::ExitCode {
        thirteen_souls::init_logging();
        let options = Options::from_args();

        let tuning = match load_tuning(&options) {
            Ok(t) => t,
            Err(e) => {
                log::error!("Invalid tuning: {}", e);
                return std::process::ExitCode::FAILURE;
            }
        };

        log::info!(
            "Thirteen Souls (headless) seed={} seconds={} strikes={}",
            options.seed,
            options.seconds,
            tuning.strike_policy.as_str()
        );
        let mut runner = Runner::new(GameState::with_tuning(options.seed, tuning));
        let frames = (options.seconds / FRAME_DT).ceil() as u64;
        for _ in 0..frames {
            runner.frame(FRAME_DT);
        }

        match serde_json::to_string_pretty(&runner.state.hud()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize HUD: {}", e),
        }
        std::process::ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm artifact; the runner is native only
}
