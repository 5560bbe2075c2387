// --- File: main.rs ---
use boidcage::constants::*;
use boidcage::{Simulation, SimulationConfig};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "boidcage")]
#[command(about = "Headless predator/prey boid simulation")]
struct Args {
    /// Ticks to run; runs until interrupted when omitted
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = DEFAULT_WORLD_WIDTH)]
    width: f64,
    #[arg(long, default_value_t = DEFAULT_WORLD_HEIGHT)]
    height: f64,
    /// Boids per species
    #[arg(long, default_value_t = DEFAULT_POPULATION_PER_SPECIES)]
    population: usize,
    #[arg(long, default_value_t = DEFAULT_TURNING_SPEED)]
    turning_speed: f64,
    /// Three radii, shared by channels {0,3}, {1,4} and {2,5}
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_VISION_RADII)]
    vision_radii: Vec<f64>,
    /// Run the perception pass on all cores
    #[arg(long, default_value_t = false)]
    parallel: bool,
    /// Pause between ticks
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
    /// Log a population summary every N ticks
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

impl Args {
    fn config(&self) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
        let vision_radii: [f64; 3] = self.vision_radii.as_slice().try_into().map_err(|_| {
            format!(
                "--vision-radii takes exactly three values, got {}",
                self.vision_radii.len()
            )
        })?;
        let mut config = SimulationConfig::new(self.width, self.height, self.population);
        config.turning_speed = self.turning_speed;
        config.vision_radii = vision_radii;
        config.parallel_perception = self.parallel;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = args.config()?;
    let mut simulation = Simulation::new(config, args.seed)?;

    let stop = AtomicBool::new(args.ticks == Some(0));
    let delay = Duration::from_millis(args.delay_ms);
    let report_every = args.report_every.max(1);
    let started = Instant::now();

    simulation.run_until(&stop, |report, sim| {
        if report.tick % report_every == 0 {
            let stats = sim.stats();
            log::info!(
                "Tick {}: {} prey, {} predators alive ({} prey / {} predator deaths so far)",
                report.tick,
                report.prey_alive,
                report.predators_alive,
                stats.prey_deaths,
                stats.predator_deaths
            );
        }
        for &slot in &report.extinct {
            log::warn!("Slot {} emptied for good at tick {}", slot, report.tick);
        }
        if args.ticks.is_some_and(|limit| report.tick >= limit) {
            stop.store(true, Ordering::Relaxed);
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    });

    let stats = simulation.stats();
    let (prey, predators) = simulation.counts();
    log::info!(
        "Finished {} ticks in {:.2?}: {}/{} prey/predators alive, {}/{} deaths, {} extinct",
        stats.ticks,
        started.elapsed(),
        prey,
        predators,
        stats.prey_deaths,
        stats.predator_deaths,
        stats.extinctions
    );
    Ok(())
}
// --- End of File: main.rs ---
