use std::fmt;
use std::fmt::Display;

use hashbrown::HashMap;
use serde::Deserialize;
use typed_builder::TypedBuilder;

/// Identity of one monitored traffic flow.
#[derive(Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowId(u32);

impl Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FlowId {
    fn from(f: u32) -> Self {
        Self(f)
    }
}

impl FlowId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Cumulative counters of one flow as reported by the traffic source. The
/// delay sum is kept in whole microseconds so every counter is an integer
/// that only grows, except across a source restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, TypedBuilder)]
pub struct FlowCounters {
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub delay_sum_us: u64,
}

/// Tracks the last observed cumulative counters per flow and converts each
/// new observation into a per-interval delta. A counter that went backwards
/// is treated as a source reset, the fresh cumulative value then stands in
/// for the delta. The baseline is replaced on every observation and the map
/// only ever grows.
#[derive(Clone, Debug, Default)]
pub struct DeltaTracker {
    last_seen: HashMap<FlowId, FlowCounters>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self {
            last_seen: HashMap::new(),
        }
    }

    pub fn observe(&mut self, flow_id: FlowId, current: FlowCounters) -> FlowCounters {
        let deltas = match self.last_seen.get(&flow_id) {
            Some(previous) => FlowCounters::builder()
                .rx_bytes(Self::delta_of(current.rx_bytes, previous.rx_bytes))
                .tx_packets(Self::delta_of(current.tx_packets, previous.tx_packets))
                .rx_packets(Self::delta_of(current.rx_packets, previous.rx_packets))
                .delay_sum_us(Self::delta_of(current.delay_sum_us, previous.delay_sum_us))
                .build(),
            None => current,
        };
        self.last_seen.insert(flow_id, current);
        deltas
    }

    pub fn tracked_flows(&self) -> usize {
        self.last_seen.len()
    }

    #[inline]
    fn delta_of(current: u64, previous: u64) -> u64 {
        if current >= previous {
            current - previous
        } else {
            current
        }
    }
}

/// Metrics derived from one interval's deltas. Ratios and the mean delay fall
/// back to zero when their denominator is zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalMetrics {
    pub throughput_mbps: f64,
    pub pdr_pct: f64,
    pub loss_pct: f64,
    pub delay_ms: f64,
}

impl IntervalMetrics {
    pub fn from_deltas(deltas: &FlowCounters, interval_s: f64) -> Self {
        let throughput_mbps = (deltas.rx_bytes as f64 * 8.0 / interval_s) / 1e6;
        let pdr_pct = if deltas.tx_packets > 0 {
            deltas.rx_packets as f64 / deltas.tx_packets as f64 * 100.0
        } else {
            0.0
        };
        let delay_ms = if deltas.rx_packets > 0 {
            (deltas.delay_sum_us as f64 / deltas.rx_packets as f64) / 1000.0
        } else {
            0.0
        };
        Self {
            throughput_mbps,
            pdr_pct,
            loss_pct: 100.0 - pdr_pct,
            delay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(rx_bytes: u64, tx_packets: u64, rx_packets: u64, delay_sum_us: u64) -> FlowCounters {
        FlowCounters::builder()
            .rx_bytes(rx_bytes)
            .tx_packets(tx_packets)
            .rx_packets(rx_packets)
            .delay_sum_us(delay_sum_us)
            .build()
    }

    #[test]
    fn test_first_observation_is_raw_cumulative() {
        let mut tracker = DeltaTracker::new();
        let deltas = tracker.observe(FlowId::from(1), counters(1000, 10, 9, 500));
        assert_eq!(deltas, counters(1000, 10, 9, 500));
    }

    #[test]
    fn test_subsequent_observation_yields_difference() {
        let mut tracker = DeltaTracker::new();
        tracker.observe(FlowId::from(1), counters(1000, 10, 9, 500));
        let deltas = tracker.observe(FlowId::from(1), counters(2500, 25, 22, 900));
        assert_eq!(deltas, counters(1500, 15, 13, 400));
    }

    #[test]
    fn test_counter_reset_uses_fresh_value() {
        let mut tracker = DeltaTracker::new();
        tracker.observe(FlowId::from(1), counters(5000, 50, 45, 2000));
        let deltas = tracker.observe(FlowId::from(1), counters(300, 3, 60, 2500));
        // Each counter falls back independently.
        assert_eq!(deltas.rx_bytes, 300);
        assert_eq!(deltas.tx_packets, 3);
        assert_eq!(deltas.rx_packets, 15);
        assert_eq!(deltas.delay_sum_us, 500);
    }

    #[test]
    fn test_baseline_replaced_after_reset() {
        let mut tracker = DeltaTracker::new();
        tracker.observe(FlowId::from(1), counters(5000, 50, 45, 2000));
        tracker.observe(FlowId::from(1), counters(300, 3, 2, 100));
        let deltas = tracker.observe(FlowId::from(1), counters(800, 8, 6, 300));
        assert_eq!(deltas, counters(500, 5, 4, 200));
    }

    #[test]
    fn test_deltas_never_exceed_the_observation() {
        let mut tracker = DeltaTracker::new();
        let sequence: [u64; 6] = [0, 100, 50, 50, 200, 0];
        for value in sequence {
            let deltas = tracker.observe(FlowId::from(7), counters(value, value, value, value));
            // u64 rules out negatives, the reset policy also bounds the delta.
            assert!(deltas.rx_bytes <= value);
            assert!(deltas.tx_packets <= value);
        }
    }

    #[test]
    fn test_tracker_grows_by_insertion_only() {
        let mut tracker = DeltaTracker::new();
        tracker.observe(FlowId::from(1), counters(1, 1, 1, 1));
        tracker.observe(FlowId::from(2), counters(1, 1, 1, 1));
        tracker.observe(FlowId::from(1), counters(2, 2, 2, 2));
        assert_eq!(tracker.tracked_flows(), 2);
    }

    #[test]
    fn test_throughput_conversion() {
        // 125_000 bytes in one second is 1 Mbps.
        let metrics = IntervalMetrics::from_deltas(&counters(125_000, 0, 0, 0), 1.0);
        assert!((metrics.throughput_mbps - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pdr_and_loss_sum_to_hundred() {
        let metrics = IntervalMetrics::from_deltas(&counters(0, 640, 600, 0), 1.0);
        assert!((metrics.pdr_pct + metrics.loss_pct - 100.0).abs() < 1e-9);
        assert!((metrics.pdr_pct - 93.75).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominators_yield_zero_not_nan() {
        let metrics = IntervalMetrics::from_deltas(&counters(0, 0, 0, 0), 1.0);
        assert_eq!(metrics.throughput_mbps, 0.0);
        assert_eq!(metrics.pdr_pct, 0.0);
        assert_eq!(metrics.delay_ms, 0.0);
        assert!(!metrics.delay_ms.is_nan());
    }

    #[test]
    fn test_mean_delay_in_milliseconds() {
        // 10 packets, 50ms summed delay -> 5ms mean.
        let metrics = IntervalMetrics::from_deltas(&counters(0, 10, 10, 50_000), 1.0);
        assert!((metrics.delay_ms - 5.0).abs() < 1e-9);
    }
}
