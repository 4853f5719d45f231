use log::info;
use typed_builder::TypedBuilder;

use wisim_core::bucket::{Bucket, TimeMS};
use wisim_output::measurement::Results;

use crate::wifi::nodes::NodeSpace;
use crate::wifi::traffic::TrafficModel;

/// Input models shared by the agents through the bucket.
#[derive(Clone, Debug, TypedBuilder)]
pub struct BucketModels {
    pub space: NodeSpace,
    pub traffic: TrafficModel,
}

/// Shared state of one adaptive WiFi run: the node registry, the traffic
/// counter source standing in for the packet-level simulator, and the result
/// writers. Everything runs on the scheduler's thread, the time-ordered
/// execution is the only synchronization needed.
#[derive(TypedBuilder)]
pub struct WifiBucket {
    pub models: BucketModels,
    pub results: Results,
    pub step_size: TimeMS,
    #[builder(default = TimeMS::default())]
    pub step: TimeMS,
}

impl Bucket for WifiBucket {
    fn initialize(&mut self, step: TimeMS) {
        self.step = step;
        info!(
            "Starting the run with {} nodes at {}",
            self.models.space.node_count(),
            step
        );
    }

    fn before_agents(&mut self, step: TimeMS) {
        self.step = step;
        self.models
            .traffic
            .advance(step, self.step_size, &self.models.space);
    }

    fn after_agents(&mut self) {}

    fn stream_output(&mut self) {
        self.results.write_to_file();
    }

    fn terminate(mut self) {
        self.results.write_to_file();
        self.results.close_files();
        info!("Run complete at {}", self.step);

        println!("\n=== Adaptive WiFi run summary ===");
        println!(
            "{:<12}{:>18}{:>10}{:>10}{:>12}",
            "Flow", "Throughput(Mbps)", "PDR(%)", "Loss(%)", "Delay(ms)"
        );
        for flow in self.models.traffic.flows() {
            let counters = flow.counters;
            let active_s = (flow.settings.stop - flow.settings.start).as_secs_f64();
            let throughput = if active_s > 0.0 {
                counters.rx_bytes as f64 * 8.0 / active_s / 1e6
            } else {
                0.0
            };
            let pdr = if counters.tx_packets > 0 {
                counters.rx_packets as f64 / counters.tx_packets as f64 * 100.0
            } else {
                0.0
            };
            let delay_ms = if counters.rx_packets > 0 {
                counters.delay_sum_us as f64 / counters.rx_packets as f64 / 1000.0
            } else {
                0.0
            };
            println!(
                "{:<12}{:>18.3}{:>10.2}{:>10.2}{:>12.3}",
                flow.name,
                throughput,
                pdr,
                100.0 - pdr,
                delay_ms
            );
        }
    }
}
