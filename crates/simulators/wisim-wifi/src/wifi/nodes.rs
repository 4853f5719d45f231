use hashbrown::HashMap;

use wisim_core::agent::AgentId;
use wisim_core::bucket::TimeMS;
use wisim_models::mobility::{Mobility, Point3D};

/// Registry of every node's mobility model. Position queries are pure, the
/// same node and time always give the same answer.
#[derive(Clone, Debug, Default)]
pub struct NodeSpace {
    mobility: HashMap<AgentId, Mobility>,
}

impl NodeSpace {
    pub fn new() -> Self {
        Self {
            mobility: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, node_id: AgentId, mobility: Mobility) {
        if self.mobility.insert(node_id, mobility).is_some() {
            panic!("Node {} is registered twice", node_id);
        }
    }

    /// An unknown node id is a configuration defect and stops the run.
    pub fn position_of(&self, node_id: AgentId, time: TimeMS) -> Point3D {
        match self.mobility.get(&node_id) {
            Some(mobility) => mobility.position_at(time),
            None => panic!("Position queried for unknown node {}", node_id),
        }
    }

    pub fn node_count(&self) -> usize {
        self.mobility.len()
    }
}
