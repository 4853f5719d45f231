use wisim_core::agent::{Activatable, Agent, AgentId, AgentOrder, Orderable};
use wisim_core::bucket::TimeMS;

use crate::bucket::TBucket;

/// A periodic task double that counts its own steps and deactivates itself
/// once a configured number of steps has been taken.
#[derive(Default, Clone, Debug)]
pub struct TTask {
    pub id: AgentId,
    pub order: AgentOrder,
    pub activation_time: TimeMS,
    pub steps_to_live: u32,
    pub step_count: u32,
    pub stopped: bool,
}

impl TTask {
    pub fn make_task(id: AgentId, order: u32, activation_time: TimeMS, steps_to_live: u32) -> Self {
        Self {
            id,
            order: AgentOrder::from(order),
            activation_time,
            steps_to_live,
            step_count: 0,
            stopped: false,
        }
    }
}

impl Activatable<TBucket> for TTask {
    fn activate(&mut self, _bucket: &mut TBucket) {
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
        self.activation_time
    }
}

impl Orderable for TTask {
    fn order(&self) -> AgentOrder {
        self.order
    }
}

impl Agent<TBucket> for TTask {
    fn id(&self) -> AgentId {
        self.id
    }

    fn step(&mut self, _bucket: &mut TBucket) {
        self.step_count += 1;
        if self.step_count >= self.steps_to_live {
            self.deactivate();
        }
    }
}
