use clap::Parser;

use wisim_core::scheduler::Scheduler;

use crate::simulation::builder::SimulationBuilder;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub(crate) mod simulation;
pub(crate) mod wifi;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: String,
}

fn main() {
    let args = CliArgs::parse();
    let start = std::time::Instant::now();
    let mut builder = SimulationBuilder::new(&args.config);
    let mut scheduler = builder.build();
    scheduler.initialize();
    while scheduler.now < scheduler.duration() {
        scheduler.activate();
        scheduler.trigger();
    }
    scheduler.terminate();
    let elapsed = start.elapsed();
    println!("Simulation finished in {} ms.", elapsed.as_millis());
}
