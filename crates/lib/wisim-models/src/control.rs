use std::fmt;
use std::fmt::Display;

use log::info;
use serde::Deserialize;
use typed_builder::TypedBuilder;

/// Outcome of one control evaluation for the adaptive access point.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PowerDecision {
    Increase,
    Decrease,
    AggressiveIncrease,
    #[default]
    Maintain,
}

impl Display for PowerDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerDecision::Increase => write!(f, "increase_power"),
            PowerDecision::Decrease => write!(f, "decrease_power"),
            PowerDecision::AggressiveIncrease => write!(f, "increase_power_change_channel"),
            PowerDecision::Maintain => write!(f, "maintain"),
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, TypedBuilder)]
pub struct ControlSettings {
    pub initial_power_dbm: f64,
    #[builder(default = 10.0)]
    #[serde(default = "default_min_power")]
    pub min_power_dbm: f64,
    #[builder(default = 20.0)]
    #[serde(default = "default_max_power")]
    pub max_power_dbm: f64,
    #[builder(default = 2.0)]
    #[serde(default = "default_step")]
    pub step_dbm: f64,
    #[builder(default = 3.0)]
    #[serde(default = "default_aggressive_step")]
    pub aggressive_step_dbm: f64,
    pub target_throughput_mbps: f64,
}

fn default_min_power() -> f64 {
    10.0
}

fn default_max_power() -> f64 {
    20.0
}

fn default_step() -> f64 {
    2.0
}

fn default_aggressive_step() -> f64 {
    3.0
}

/// One tick's worth of measurements fed into the decision policy.
#[derive(Clone, Copy, Debug, TypedBuilder)]
pub struct SignalReading {
    pub distance_m: f64,
    pub throughput_mbps: f64,
    pub signal_dbm: f64,
}

struct Rule {
    decision: PowerDecision,
    applies: fn(&SignalReading, &ControlSettings) -> bool,
}

/// Ordered decision table, evaluated top-down with first-match-wins
/// semantics. Falls through to Maintain when no rule applies. The thresholds
/// are asymmetric (15/10/7 m, -65/-60/-50 dBm) which together with the fixed
/// step size gives the loop its implicit hysteresis.
const DECISION_RULES: [Rule; 3] = [
    // Far away or weak signal.
    Rule {
        decision: PowerDecision::Increase,
        applies: |reading, _| reading.distance_m > 15.0 || reading.signal_dbm < -65.0,
    },
    // Mid range with degraded throughput.
    Rule {
        decision: PowerDecision::Increase,
        applies: |reading, settings| {
            (reading.distance_m > 10.0 || reading.signal_dbm < -60.0)
                && reading.throughput_mbps < settings.target_throughput_mbps * 0.9
        },
    },
    // Close with an excellent link, back off to save energy.
    Rule {
        decision: PowerDecision::Decrease,
        applies: |reading, settings| {
            reading.distance_m < 7.0
                && reading.signal_dbm > -50.0
                && reading.throughput_mbps > settings.target_throughput_mbps
        },
    },
];

/// Bounded-state controller over a single scalar, the transmit power of the
/// adaptive access point. The scalar persists across ticks and is mutated
/// only through [PowerController::apply].
#[derive(Clone, Debug)]
pub struct PowerController {
    settings: ControlSettings,
    tx_power_dbm: f64,
}

impl PowerController {
    pub fn new(settings: ControlSettings) -> Self {
        let tx_power_dbm = settings
            .initial_power_dbm
            .clamp(settings.min_power_dbm, settings.max_power_dbm);
        Self {
            settings,
            tx_power_dbm,
        }
    }

    pub fn tx_power_dbm(&self) -> f64 {
        self.tx_power_dbm
    }

    pub fn decide(&self, reading: &SignalReading) -> PowerDecision {
        DECISION_RULES
            .iter()
            .find(|rule| (rule.applies)(reading, &self.settings))
            .map(|rule| rule.decision)
            .unwrap_or(PowerDecision::Maintain)
    }

    /// Mutates the power scalar, silently clamped to the configured bounds.
    /// AggressiveIncrease is accepted here although no decision rule emits it
    /// yet, the channel-switching policy that would produce it is not wired up.
    pub fn apply(&mut self, decision: PowerDecision) {
        let step = match decision {
            PowerDecision::Increase => self.settings.step_dbm,
            PowerDecision::Decrease => -self.settings.step_dbm,
            PowerDecision::AggressiveIncrease => self.settings.aggressive_step_dbm,
            PowerDecision::Maintain => return,
        };
        let updated = (self.tx_power_dbm + step)
            .clamp(self.settings.min_power_dbm, self.settings.max_power_dbm);
        if updated != self.tx_power_dbm {
            info!(
                "Power control: {} moves tx power from {} to {} dBm",
                decision, self.tx_power_dbm, updated
            );
            self.tx_power_dbm = updated;
        }
    }

    /// Evaluates the policy and applies the outcome for the next tick.
    pub fn update(&mut self, reading: &SignalReading) -> PowerDecision {
        let decision = self.decide(reading);
        self.apply(decision);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ControlSettings {
        ControlSettings::builder()
            .initial_power_dbm(16.0)
            .target_throughput_mbps(4.5)
            .build()
    }

    fn reading(distance_m: f64, throughput_mbps: f64, signal_dbm: f64) -> SignalReading {
        SignalReading::builder()
            .distance_m(distance_m)
            .throughput_mbps(throughput_mbps)
            .signal_dbm(signal_dbm)
            .build()
    }

    #[test]
    fn test_far_or_weak_signal_increases() {
        let controller = PowerController::new(settings());
        assert_eq!(
            controller.decide(&reading(20.0, 2.0, -70.0)),
            PowerDecision::Increase
        );
        // Either condition alone is enough.
        assert_eq!(
            controller.decide(&reading(16.0, 5.0, -40.0)),
            PowerDecision::Increase
        );
        assert_eq!(
            controller.decide(&reading(5.0, 5.0, -66.0)),
            PowerDecision::Increase
        );
    }

    #[test]
    fn test_mid_range_with_degraded_throughput_increases() {
        let controller = PowerController::new(settings());
        // 0.9 * 4.5 = 4.05 Mbps threshold.
        assert_eq!(
            controller.decide(&reading(12.0, 3.5, -55.0)),
            PowerDecision::Increase
        );
        // Same range with healthy throughput holds.
        assert_eq!(
            controller.decide(&reading(12.0, 4.4, -55.0)),
            PowerDecision::Maintain
        );
    }

    #[test]
    fn test_close_and_excellent_link_decreases() {
        let controller = PowerController::new(settings());
        assert_eq!(
            controller.decide(&reading(5.0, 5.0, -40.0)),
            PowerDecision::Decrease
        );
    }

    #[test]
    fn test_no_rule_matches_maintains() {
        let controller = PowerController::new(settings());
        assert_eq!(
            controller.decide(&reading(8.0, 4.9, -55.0)),
            PowerDecision::Maintain
        );
    }

    #[test]
    fn test_rule_priority_is_top_down() {
        let controller = PowerController::new(settings());
        // Close and strong but also below -65 dBm is impossible physically,
        // craft a reading that matches rule 1 and rule 3 bounds conflict:
        // distance 20 matches rule 1 before anything else.
        assert_eq!(
            controller.decide(&reading(20.0, 5.0, -40.0)),
            PowerDecision::Increase
        );
    }

    #[test]
    fn test_apply_respects_bounds() {
        let mut controller = PowerController::new(settings());
        for _ in 0..10 {
            controller.apply(PowerDecision::Increase);
            assert!(controller.tx_power_dbm() <= 20.0);
        }
        assert_eq!(controller.tx_power_dbm(), 20.0);
        for _ in 0..10 {
            controller.apply(PowerDecision::Decrease);
            assert!(controller.tx_power_dbm() >= 10.0);
        }
        assert_eq!(controller.tx_power_dbm(), 10.0);
    }

    #[test]
    fn test_apply_at_ceiling_is_noop() {
        let mut controller = PowerController::new(
            ControlSettings::builder()
                .initial_power_dbm(20.0)
                .target_throughput_mbps(4.5)
                .build(),
        );
        controller.apply(PowerDecision::Increase);
        assert_eq!(controller.tx_power_dbm(), 20.0);
        controller.apply(PowerDecision::AggressiveIncrease);
        assert_eq!(controller.tx_power_dbm(), 20.0);
    }

    #[test]
    fn test_apply_at_floor_is_noop() {
        let mut controller = PowerController::new(
            ControlSettings::builder()
                .initial_power_dbm(10.0)
                .target_throughput_mbps(4.5)
                .build(),
        );
        controller.apply(PowerDecision::Decrease);
        assert_eq!(controller.tx_power_dbm(), 10.0);
    }

    #[test]
    fn test_maintain_does_not_mutate() {
        let mut controller = PowerController::new(settings());
        controller.apply(PowerDecision::Maintain);
        assert_eq!(controller.tx_power_dbm(), 16.0);
    }

    #[test]
    fn test_power_stays_bounded_over_random_walks() {
        let mut controller = PowerController::new(settings());
        let decisions = [
            PowerDecision::Increase,
            PowerDecision::Increase,
            PowerDecision::Decrease,
            PowerDecision::AggressiveIncrease,
            PowerDecision::Increase,
            PowerDecision::Maintain,
            PowerDecision::Decrease,
            PowerDecision::Increase,
            PowerDecision::Increase,
            PowerDecision::Increase,
        ];
        for decision in decisions.iter().cycle().take(50) {
            controller.apply(*decision);
            assert!(controller.tx_power_dbm() >= 10.0);
            assert!(controller.tx_power_dbm() <= 20.0);
        }
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(PowerDecision::Increase.to_string(), "increase_power");
        assert_eq!(PowerDecision::Decrease.to_string(), "decrease_power");
        assert_eq!(PowerDecision::Maintain.to_string(), "maintain");
        assert_eq!(
            PowerDecision::AggressiveIncrease.to_string(),
            "increase_power_change_channel"
        );
    }
}
