use std::path::{Path, PathBuf};

use log::info;

use wisim_core::agent::{Agent, AgentId, AgentOrder};
use wisim_core::hashbrown::HashMap;
use wisim_core::scheduler::DefaultScheduler;
use wisim_models::control::PowerController;
use wisim_models::dist::{DistParams, RngSampler};
use wisim_models::mobility::{Mobility, MobilityType, WaypointPath};
use wisim_output::logger::initiate_logger;
use wisim_output::measurement::Results;

use crate::simulation::config::{BaseConfig, BaseConfigReader, NodeSettings, WifiGroupSettings};
use crate::wifi::bucket::{BucketModels, WifiBucket};
use crate::wifi::nodes::NodeSpace;
use crate::wifi::recorder::{GroupMonitor, MetricsRecorder};
use crate::wifi::traffic::{TrafficModel, UdpFlow};

pub type WifiScheduler = DefaultScheduler<MetricsRecorder, WifiBucket>;

pub struct SimulationBuilder {
    base_config: BaseConfig,
    config_path: PathBuf,
}

impl SimulationBuilder {
    pub(crate) fn new(base_config_file: &str) -> Self {
        if !Path::new(base_config_file).exists() {
            panic!("Configuration file is not found.");
        }
        let config_path = Path::new(base_config_file)
            .parent()
            .unwrap_or_else(|| {
                panic!("Invalid directory for the configuration file");
            })
            .to_path_buf();

        let config_reader = BaseConfigReader::new(base_config_file);
        match config_reader.parse() {
            Ok(base_config) => Self {
                base_config,
                config_path,
            },
            Err(e) => {
                panic!("Error while parsing the base configuration file: {}", e);
            }
        }
    }

    pub(crate) fn build(&mut self) -> WifiScheduler {
        initiate_logger(&self.config_path, &self.base_config.log_settings);

        info!(
            "Building scenario {} with {} wifi groups...",
            self.base_config.simulation_settings.scenario,
            self.base_config.wifi_groups.len()
        );
        self.validate_groups();

        let bucket = self.build_bucket();
        let recorder = self.build_recorder();
        let mut agents = HashMap::new();
        agents.insert(recorder.id(), recorder);

        DefaultScheduler::builder()
            .bucket(bucket)
            .agents(agents)
            .duration(self.base_config.simulation_settings.duration)
            .step_size(self.base_config.simulation_settings.step_size)
            .output_interval(self.base_config.output_settings.output_interval)
            .build()
    }

    fn validate_groups(&self) {
        let adaptive_count = self
            .base_config
            .wifi_groups
            .iter()
            .filter(|group| group.adaptive)
            .count();
        if adaptive_count != 1 {
            panic!(
                "Exactly one wifi group must be adaptive, found {}",
                adaptive_count
            );
        }
    }

    fn build_bucket(&self) -> WifiBucket {
        let mut space = NodeSpace::new();
        let mut traffic = TrafficModel::new();
        for group in self.base_config.wifi_groups.iter() {
            space.add_node(group.access_point.id, Self::mobility_of(&group.access_point));
            space.add_node(group.station.id, Self::mobility_of(&group.station));
            traffic.add_flow(self.build_flow(group));
        }

        WifiBucket::builder()
            .models(BucketModels::builder().space(space).traffic(traffic).build())
            .results(Results::new(&self.base_config.output_settings))
            .step_size(self.base_config.simulation_settings.step_size)
            .build()
    }

    fn build_flow(&self, group: &WifiGroupSettings) -> UdpFlow {
        let seed = self.base_config.simulation_settings.seed;
        UdpFlow::builder()
            .flow_id(group.flow_id)
            .name(group.name.clone())
            .ap_id(group.access_point.id)
            .sta_id(group.station.id)
            .settings(group.traffic)
            .delivery_jitter(Self::jitter_sampler(
                seed + group.flow_id.as_u32() as u64,
                0.005,
            ))
            .delay_jitter(Self::jitter_sampler(
                seed + group.flow_id.as_u32() as u64 + 100,
                50.0,
            ))
            .build()
    }

    fn jitter_sampler(seed: u64, std_dev: f64) -> RngSampler {
        RngSampler::new(&DistParams {
            dist_name: "normal".to_string(),
            seed: Some(seed),
            mean: Some(0.0),
            std_dev: Some(std_dev),
            min: None,
            max: None,
        })
    }

    fn mobility_of(node: &NodeSettings) -> Mobility {
        match node.mobility_type {
            MobilityType::Stationary => {
                let position = node
                    .position
                    .unwrap_or_else(|| panic!("Node {} needs a position", node.id));
                Mobility::Static(position)
            }
            MobilityType::Waypoint => {
                let waypoints = node
                    .waypoints
                    .clone()
                    .unwrap_or_else(|| panic!("Node {} needs waypoints", node.id));
                Mobility::Waypoints(WaypointPath::new(waypoints))
            }
        }
    }

    fn build_recorder(&self) -> MetricsRecorder {
        let groups = self
            .base_config
            .wifi_groups
            .iter()
            .map(|group| {
                GroupMonitor::builder()
                    .flow_id(group.flow_id)
                    .flow_name(group.name.clone())
                    .ap_id(group.access_point.id)
                    .sta_id(group.station.id)
                    .adaptive(group.adaptive)
                    .fixed_power_dbm(group.tx_power_dbm)
                    .build()
            })
            .collect();

        // The recorder's own id is kept clear of the node ids.
        let recorder_id = self
            .base_config
            .wifi_groups
            .iter()
            .flat_map(|group| [group.access_point.id, group.station.id])
            .max()
            .map(|max_id| AgentId::from(max_id.as_u64() + 1))
            .expect("No wifi groups configured");

        MetricsRecorder::builder()
            .id(recorder_id)
            .order(AgentOrder::from(1))
            .start(self.base_config.recorder_settings.start)
            .end(self.base_config.recorder_settings.end)
            .interval(self.base_config.recorder_settings.interval)
            .groups(groups)
            .estimator(self.base_config.propagation_settings)
            .controller(PowerController::new(self.base_config.control_settings))
            .build()
    }
}
