use hashbrown::HashMap;
use log::debug;
use serde::Deserialize;
use typed_builder::TypedBuilder;

use wisim_core::agent::AgentId;
use wisim_core::bucket::TimeMS;
use wisim_models::dist::RngSampler;
use wisim_models::flow::{FlowCounters, FlowId};
use wisim_models::propagation::distance_between;

use crate::wifi::nodes::NodeSpace;

/// Offered load of one station, a constant bit rate stream towards the wired
/// server between start and stop.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct TrafficSettings {
    pub rate_mbps: f64,
    pub packet_bytes: u64,
    pub start: TimeMS,
    pub stop: TimeMS,
}

/// Stand-in for the packet-level simulator's per-flow statistics. Cumulative
/// counters accumulate from the configured rate, delivery degrades with the
/// AP-station distance and is jittered by a seeded sampler so runs stay
/// reproducible. The real PHY/MAC behavior is explicitly out of scope.
#[derive(Clone, Debug, TypedBuilder)]
pub struct UdpFlow {
    pub flow_id: FlowId,
    pub name: String,
    pub ap_id: AgentId,
    pub sta_id: AgentId,
    pub settings: TrafficSettings,
    pub delivery_jitter: RngSampler,
    pub delay_jitter: RngSampler,
    #[builder(default)]
    pub counters: FlowCounters,
    #[builder(default)]
    tx_credit: f64,
}

impl UdpFlow {
    fn advance(&mut self, step: TimeMS, interval: TimeMS, space: &NodeSpace) {
        if step <= self.settings.start || step > self.settings.stop {
            return;
        }
        let interval_s = interval.as_secs_f64();
        let offered_packets =
            self.settings.rate_mbps * 1e6 * interval_s / 8.0 / self.settings.packet_bytes as f64;
        self.tx_credit += offered_packets;
        let tx_new = self.tx_credit.floor() as u64;
        self.tx_credit -= tx_new as f64;

        let ap_pos = space.position_of(self.ap_id, step);
        let sta_pos = space.position_of(self.sta_id, step);
        let distance = distance_between(&ap_pos, &sta_pos);

        let delivered_share =
            (delivery_share_at(distance) + self.delivery_jitter.sample()).clamp(0.0, 1.0);
        let rx_new = ((tx_new as f64 * delivered_share).round() as u64).min(tx_new);
        let delay_us_per_packet = (2000.0 + 80.0 * distance + self.delay_jitter.sample()).max(0.0);

        self.counters.tx_packets += tx_new;
        self.counters.rx_packets += rx_new;
        self.counters.rx_bytes += rx_new * self.settings.packet_bytes;
        self.counters.delay_sum_us += (rx_new as f64 * delay_us_per_packet) as u64;
        debug!(
            "Flow {} at {}: {} tx, {} rx over {:.2} m",
            self.flow_id, step, tx_new, rx_new, distance
        );
    }
}

/// Share of offered packets that make it through at a given distance. Close
/// stations see a nearly clean channel, beyond the association range the
/// share falls off linearly.
fn delivery_share_at(distance_m: f64) -> f64 {
    if distance_m <= 10.0 {
        0.99
    } else if distance_m <= 20.0 {
        0.99 - 0.02 * (distance_m - 10.0)
    } else {
        (0.79 - 0.04 * (distance_m - 20.0)).max(0.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrafficModel {
    flows: HashMap<FlowId, UdpFlow>,
}

impl TrafficModel {
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    pub fn add_flow(&mut self, flow: UdpFlow) {
        if self.flows.insert(flow.flow_id, flow).is_some() {
            panic!("Flow registered twice in the traffic model");
        }
    }

    pub fn advance(&mut self, step: TimeMS, interval: TimeMS, space: &NodeSpace) {
        for flow in self.flows.values_mut() {
            flow.advance(step, interval, space);
        }
    }

    /// An unknown flow id is a configuration defect and stops the run.
    pub fn counters_of(&self, flow_id: FlowId) -> FlowCounters {
        match self.flows.get(&flow_id) {
            Some(flow) => flow.counters,
            None => panic!("Counters queried for unknown flow {}", flow_id),
        }
    }

    pub fn flows(&self) -> impl Iterator<Item = &UdpFlow> {
        self.flows.values()
    }
}
