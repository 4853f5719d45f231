use keyed_priority_queue::KeyedPriorityQueue;
use log::debug;
use typed_builder::TypedBuilder;

use crate::agent::{Agent, AgentId, AgentOrder};
use crate::bucket::{Bucket, TimeMS};
use crate::hashbrown::HashMap;

/// A trait used to represent a scheduler. A scheduler drives the registered
/// agents through simulated time. The order of calling the scheduler's
/// functions is important to ensure the correct behavior of the engine.
pub trait Scheduler<B: Bucket>: Send {
    fn duration(&self) -> TimeMS;
    fn initialize(&mut self);
    fn activate(&mut self);
    fn trigger(&mut self) -> TimeMS;
    fn terminate(self);
}

/// Clock-driven scheduler with a fixed step size. Agents waiting for a later
/// activation sit in the cache, active agents are stepped once per trigger in
/// their order. Agents that deactivate themselves leave the queue and are
/// re-cached when they report another activation time.
#[derive(TypedBuilder)]
pub struct DefaultScheduler<A, B>
where
    A: Agent<B>,
    B: Bucket,
{
    pub bucket: B,
    pub agents: HashMap<AgentId, A>,
    pub duration: TimeMS,
    pub step_size: TimeMS,
    pub output_interval: TimeMS,
    #[builder(default)]
    pub agent_cache: HashMap<TimeMS, Vec<AgentId>>,
    #[builder(default)]
    pub agent_queue: KeyedPriorityQueue<AgentId, AgentOrder>,
    #[builder(default = TimeMS::default())]
    pub now: TimeMS,
    #[builder(default = TimeMS::default())]
    pub output_step: TimeMS,
}

impl<A, B> DefaultScheduler<A, B>
where
    A: Agent<B>,
    B: Bucket,
{
    pub fn agent_of(&self, agent_id: &AgentId) -> &A {
        self.agents
            .get(agent_id)
            .expect("Agent not found in scheduler")
    }

    #[inline]
    pub fn add_to_queue(&mut self, agent_id: AgentId, order: AgentOrder) {
        self.agent_queue.push(agent_id, order);
    }
}

impl<A, B> Scheduler<B> for DefaultScheduler<A, B>
where
    A: Agent<B>,
    B: Bucket,
{
    fn duration(&self) -> TimeMS {
        self.duration
    }

    fn initialize(&mut self) {
        for agent in self.agents.values() {
            debug!(
                "Adding agent {} to the scheduler at {}",
                agent.id(),
                agent.time_of_activation()
            );
            self.agent_cache
                .entry(agent.time_of_activation())
                .or_default()
                .push(agent.id());
        }
        self.bucket.initialize(self.now);
    }

    fn activate(&mut self) {
        if self.agent_cache.contains_key(&self.now) {
            let agent_ids = self.agent_cache.remove(&self.now).unwrap();
            for agent_id in agent_ids.iter() {
                self.add_to_queue(*agent_id, self.agent_of(agent_id).order());
                self.agents
                    .get_mut(agent_id)
                    .expect("Agent not found in scheduler")
                    .activate(&mut self.bucket);
            }
        }
    }

    fn trigger(&mut self) -> TimeMS {
        self.bucket.before_agents(self.now);

        if self.now == self.output_step {
            self.bucket.stream_output();
            self.output_step += self.output_interval;
        }

        // Early return if the agent queue is empty.
        if self.agent_queue.is_empty() {
            self.bucket.after_agents();
            self.now += self.step_size;
            return self.now;
        }

        // Pop all the agents from the queue. The queue pops the highest order
        // first, stepping is done in reverse so the lowest order goes first.
        let mut agent_ids: Vec<AgentId> = Vec::new();
        while let Some((agent_id, _)) = self.agent_queue.pop() {
            agent_ids.push(agent_id);
        }

        agent_ids.iter().rev().for_each(|agent_id| {
            self.agents
                .get_mut(agent_id)
                .expect("Agent not found in scheduler")
                .step(&mut self.bucket);
        });

        self.bucket.after_agents();

        for agent_id in agent_ids.into_iter() {
            // Reschedule the agent if not stopped.
            if !self.agent_of(&agent_id).is_deactivated() {
                self.add_to_queue(agent_id, self.agent_of(&agent_id).order());
                continue;
            }

            // If the agent needs a later activation, add it to the cache.
            let agent = self
                .agents
                .get(&agent_id)
                .expect("Agent not found in scheduler");
            if agent.has_activation() {
                self.agent_cache
                    .entry(agent.time_of_activation())
                    .or_default()
                    .push(agent.id());
            }
        }

        self.now += self.step_size;
        self.now
    }

    fn terminate(self) {
        self.bucket.terminate();
    }
}
