use log::debug;
use typed_builder::TypedBuilder;

use wisim_core::agent::{Activatable, Agent, AgentId, AgentOrder, Orderable};
use wisim_core::bucket::TimeMS;
use wisim_models::control::{PowerController, PowerDecision, SignalReading};
use wisim_models::flow::{DeltaTracker, FlowId, IntervalMetrics};
use wisim_models::propagation::{distance_between, FriisEstimator};
use wisim_output::measurement::Measurement;

use crate::wifi::bucket::WifiBucket;

/// One monitored AP-station pair. The static group keeps its configured
/// transmit power for the whole run, the adaptive group's power belongs to
/// the controller.
#[derive(Clone, Debug, TypedBuilder)]
pub struct GroupMonitor {
    pub flow_id: FlowId,
    pub flow_name: String,
    pub ap_id: AgentId,
    pub sta_id: AgentId,
    pub adaptive: bool,
    pub fixed_power_dbm: f64,
}

/// The measurement-and-control loop. Once per recording tick it walks both
/// monitored flows in order: counters, deltas, derived metrics, positions,
/// distance, signal estimate, then the control decision for the adaptive
/// group, and finally appends one measurement row per flow. The recorded
/// power of a tick is the value the signal estimate was computed with, the
/// decision takes effect from the next tick.
#[derive(Clone, TypedBuilder)]
pub struct MetricsRecorder {
    pub id: AgentId,
    pub order: AgentOrder,
    pub start: TimeMS,
    pub end: TimeMS,
    pub interval: TimeMS,
    pub groups: Vec<GroupMonitor>,
    pub estimator: FriisEstimator,
    pub controller: PowerController,
    #[builder(default)]
    pub deltas: DeltaTracker,
    #[builder(default)]
    stopped: bool,
}

impl MetricsRecorder {
    fn record_group(&mut self, group_idx: usize, bucket: &mut WifiBucket) {
        let group = self.groups[group_idx].clone();
        let now = bucket.step;

        let counters = bucket.models.traffic.counters_of(group.flow_id);
        let deltas = self.deltas.observe(group.flow_id, counters);
        let metrics = IntervalMetrics::from_deltas(&deltas, self.interval.as_secs_f64());

        let ap_pos = bucket.models.space.position_of(group.ap_id, now);
        let sta_pos = bucket.models.space.position_of(group.sta_id, now);
        let distance = distance_between(&ap_pos, &sta_pos);

        let tx_power = if group.adaptive {
            self.controller.tx_power_dbm()
        } else {
            group.fixed_power_dbm
        };
        let rssi = self.estimator.received_power(distance, tx_power);

        let decision = if group.adaptive {
            let reading = SignalReading::builder()
                .distance_m(distance)
                .throughput_mbps(metrics.throughput_mbps)
                .signal_dbm(rssi)
                .build();
            self.controller.update(&reading)
        } else {
            PowerDecision::Maintain
        };
        debug!(
            "Tick {}s flow {}: {:.2} m, {:.3} Mbps, {:.2} dBm -> {}",
            now.as_secs(),
            group.flow_name,
            distance,
            metrics.throughput_mbps,
            rssi,
            decision
        );

        let measurement = Measurement::builder()
            .flow_name(group.flow_name)
            .distance_m(distance)
            .throughput_mbps(metrics.throughput_mbps)
            .pdr_pct(metrics.pdr_pct)
            .loss_pct(metrics.loss_pct)
            .delay_ms(metrics.delay_ms)
            .rssi_dbm(rssi)
            .tx_power_dbm(tx_power)
            .decision(decision.to_string())
            .build();
        if let Some(writer) = bucket.results.flow_metrics.as_mut() {
            writer.add_data(now, &measurement);
        }
    }
}

impl Activatable<WifiBucket> for MetricsRecorder {
    fn activate(&mut self, _bucket: &mut WifiBucket) {
        self.stopped = false;
    }

    fn deactivate(&mut self) {
        self.stopped = true;
    }

    fn is_deactivated(&self) -> bool {
        self.stopped
    }

    fn has_activation(&self) -> bool {
        false
    }

    fn time_of_activation(&self) -> TimeMS {
        self.start
    }
}

impl Orderable for MetricsRecorder {
    fn order(&self) -> AgentOrder {
        self.order
    }
}

impl Agent<WifiBucket> for MetricsRecorder {
    fn id(&self) -> AgentId {
        self.id
    }

    fn step(&mut self, bucket: &mut WifiBucket) {
        for group_idx in 0..self.groups.len() {
            self.record_group(group_idx, bucket);
        }
        if bucket.step >= self.end {
            self.deactivate();
        }
    }
}
