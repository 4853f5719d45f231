use std::path::PathBuf;

use serde::Deserialize;

use wisim_core::agent::AgentId;
use wisim_core::bucket::TimeMS;
use wisim_models::control::ControlSettings;
use wisim_models::flow::FlowId;
use wisim_models::mobility::{MobilityType, Point3D, Waypoint};
use wisim_models::propagation::FriisEstimator;
use wisim_output::logger::LogSettings;
use wisim_output::measurement::OutputSettings;

use crate::wifi::traffic::TrafficSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct BaseConfig {
    pub simulation_settings: SimSettings,
    pub log_settings: LogSettings,
    pub output_settings: OutputSettings,
    pub propagation_settings: FriisEstimator,
    pub recorder_settings: RecorderSettings,
    pub control_settings: ControlSettings,
    pub wifi_groups: Vec<WifiGroupSettings>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SimSettings {
    pub scenario: String,
    pub duration: TimeMS,
    pub step_size: TimeMS,
    pub seed: u64,
}

/// Cadence of the measurement-and-control loop. The defaults of the shipped
/// scenario record once per second from 2 s through 20 s.
#[derive(Deserialize, Debug, Clone)]
pub struct RecorderSettings {
    pub start: TimeMS,
    pub end: TimeMS,
    pub interval: TimeMS,
}

/// One AP-STA pair with its offered traffic. Exactly one group may be marked
/// adaptive, its transmit power is then owned by the power controller.
#[derive(Deserialize, Debug, Clone)]
pub struct WifiGroupSettings {
    pub name: String,
    pub flow_id: FlowId,
    pub adaptive: bool,
    pub tx_power_dbm: f64,
    pub access_point: NodeSettings,
    pub station: NodeSettings,
    pub traffic: TrafficSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NodeSettings {
    pub id: AgentId,
    pub mobility_type: MobilityType,
    pub position: Option<Point3D>,
    pub waypoints: Option<Vec<Waypoint>>,
}

pub struct BaseConfigReader {
    file_path: PathBuf,
}

impl BaseConfigReader {
    pub fn new(file_name: &str) -> Self {
        let file_path = PathBuf::from(file_name);
        Self { file_path }
    }

    pub fn parse(&self) -> Result<BaseConfig, Box<dyn std::error::Error>> {
        let parsing_result = std::fs::read_to_string(&self.file_path)?;
        let config: BaseConfig = toml::from_str(&parsing_result)?;
        Ok(config)
    }
}
