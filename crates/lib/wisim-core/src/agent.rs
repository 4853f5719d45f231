use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;

use serde::Deserialize;

use crate::bucket::{Bucket, TimeMS};

/// A unique ID shared by everything the engine schedules or positions,
/// both the periodic tasks and the network nodes they observe.
#[derive(Deserialize, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct AgentId(u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>()?;
        Ok(Self(id))
    }
}

impl From<u64> for AgentId {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl AgentId {
    pub fn as_i64(&self) -> i64 {
        self.0 as i64
    }
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Agent order indicates the order in which the agents are stepped within one
/// time step. Agents with a lower order are stepped first.
#[derive(Deserialize, Debug, Copy, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentOrder(pub u32);

impl From<u32> for AgentOrder {
    fn from(f: u32) -> Self {
        Self(f)
    }
}

impl AgentOrder {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

pub trait Orderable {
    fn order(&self) -> AgentOrder;
}

/// A trait that lets the scheduler bring an agent into and out of the
/// simulation. An agent that deactivates itself is dropped from the run queue
/// and, if it reports a later activation, parked until that time.
pub trait Activatable<B>
where
    B: Bucket,
{
    fn activate(&mut self, bucket: &mut B);
    fn deactivate(&mut self);
    fn is_deactivated(&self) -> bool;
    fn has_activation(&self) -> bool;
    fn time_of_activation(&self) -> TimeMS;
}

/// A periodic task driven by the scheduler. Extend this for anything that
/// should run once per time step while it is active. Each agent owns its own
/// state and reaches the shared state only through the bucket.
pub trait Agent<B>: Activatable<B> + Orderable + Clone + Send
where
    B: Bucket,
{
    fn id(&self) -> AgentId;
    fn step(&mut self, bucket: &mut B);
}
