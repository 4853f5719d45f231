use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use serde::Deserialize;
use typed_builder::TypedBuilder;

use wisim_core::bucket::TimeMS;

use crate::writer::DataOutput;

#[derive(Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputType {
    FlowMetrics,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OutputSettings {
    pub output_interval: TimeMS,
    pub output_path: String,
    pub outputs: Vec<Outputs>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Outputs {
    pub output_type: OutputType,
    pub output_filename: String,
}

pub trait ResultWriter {
    fn schema() -> Schema;
    fn write_to_file(&mut self);
    fn close_file(self);
}

/// One row of the measurement log, immutable once appended. Exactly one row
/// is written per monitored flow per recording tick.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Measurement {
    pub flow_name: String,
    pub distance_m: f64,
    pub throughput_mbps: f64,
    pub pdr_pct: f64,
    pub loss_pct: f64,
    pub delay_ms: f64,
    pub rssi_dbm: f64,
    pub tx_power_dbm: f64,
    pub decision: String,
}

/// Buffers measurement rows column-wise and flushes them as record batches.
#[derive(Debug)]
pub struct MeasurementWriter {
    time_s: Vec<u64>,
    flow_name: Vec<String>,
    distance_m: Vec<f64>,
    throughput_mbps: Vec<f64>,
    pdr_pct: Vec<f64>,
    loss_pct: Vec<f64>,
    delay_ms: Vec<f64>,
    rssi_dbm: Vec<f64>,
    tx_power_dbm: Vec<f64>,
    decision: Vec<String>,
    to_output: DataOutput,
}

impl MeasurementWriter {
    pub fn new(output_file: PathBuf) -> Self {
        Self {
            to_output: DataOutput::new(&output_file, Self::schema()),
            time_s: Vec::new(),
            flow_name: Vec::new(),
            distance_m: Vec::new(),
            throughput_mbps: Vec::new(),
            pdr_pct: Vec::new(),
            loss_pct: Vec::new(),
            delay_ms: Vec::new(),
            rssi_dbm: Vec::new(),
            tx_power_dbm: Vec::new(),
            decision: Vec::new(),
        }
    }

    pub fn add_data(&mut self, time: TimeMS, measurement: &Measurement) {
        self.time_s.push(time.as_secs());
        self.flow_name.push(measurement.flow_name.clone());
        self.distance_m.push(measurement.distance_m);
        self.throughput_mbps.push(measurement.throughput_mbps);
        self.pdr_pct.push(measurement.pdr_pct);
        self.loss_pct.push(measurement.loss_pct);
        self.delay_ms.push(measurement.delay_ms);
        self.rssi_dbm.push(measurement.rssi_dbm);
        self.tx_power_dbm.push(measurement.tx_power_dbm);
        self.decision.push(measurement.decision.clone());
    }

    pub fn buffered_rows(&self) -> usize {
        self.time_s.len()
    }
}

impl ResultWriter for MeasurementWriter {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("time_s", DataType::UInt64, false),
            Field::new("flow", DataType::Utf8, false),
            Field::new("distance_m", DataType::Float64, false),
            Field::new("throughput_mbps", DataType::Float64, false),
            Field::new("pdr_pct", DataType::Float64, false),
            Field::new("loss_pct", DataType::Float64, false),
            Field::new("delay_ms", DataType::Float64, false),
            Field::new("rssi_dbm", DataType::Float64, false),
            Field::new("tx_power_dbm", DataType::Float64, false),
            Field::new("decision", DataType::Utf8, false),
        ])
    }

    fn write_to_file(&mut self) {
        if self.time_s.is_empty() {
            return;
        }
        let record_batch = RecordBatch::try_from_iter(vec![
            (
                "time_s",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.time_s))) as ArrayRef,
            ),
            (
                "flow",
                Arc::new(StringArray::from(std::mem::take(&mut self.flow_name))) as ArrayRef,
            ),
            (
                "distance_m",
                Arc::new(Float64Array::from(std::mem::take(&mut self.distance_m))) as ArrayRef,
            ),
            (
                "throughput_mbps",
                Arc::new(Float64Array::from(std::mem::take(&mut self.throughput_mbps)))
                    as ArrayRef,
            ),
            (
                "pdr_pct",
                Arc::new(Float64Array::from(std::mem::take(&mut self.pdr_pct))) as ArrayRef,
            ),
            (
                "loss_pct",
                Arc::new(Float64Array::from(std::mem::take(&mut self.loss_pct))) as ArrayRef,
            ),
            (
                "delay_ms",
                Arc::new(Float64Array::from(std::mem::take(&mut self.delay_ms))) as ArrayRef,
            ),
            (
                "rssi_dbm",
                Arc::new(Float64Array::from(std::mem::take(&mut self.rssi_dbm))) as ArrayRef,
            ),
            (
                "tx_power_dbm",
                Arc::new(Float64Array::from(std::mem::take(&mut self.tx_power_dbm))) as ArrayRef,
            ),
            (
                "decision",
                Arc::new(StringArray::from(std::mem::take(&mut self.decision))) as ArrayRef,
            ),
        ])
        .expect("Failed to convert measurements to record batch");
        self.to_output.record_batch_to_file(&record_batch);
    }

    fn close_file(self) {
        self.to_output.close()
    }
}

/// Owns the configured result writers. Creating the results directory is a
/// precondition of any run, it is handled here before a writer opens a file.
#[derive(Debug)]
pub struct Results {
    pub flow_metrics: Option<MeasurementWriter>,
}

impl Results {
    pub fn new(output_settings: &OutputSettings) -> Self {
        let output_path = Path::new(&output_settings.output_path);
        if !output_path.exists() {
            fs::create_dir_all(output_path).expect("Failed to create output directory");
        }

        let flow_metrics = output_settings
            .outputs
            .iter()
            .filter(|output| output.output_type == OutputType::FlowMetrics)
            .last()
            .map(|settings| MeasurementWriter::new(output_path.join(&settings.output_filename)));
        Self { flow_metrics }
    }

    pub fn write_to_file(&mut self) {
        if let Some(writer) = &mut self.flow_metrics {
            writer.write_to_file();
        }
    }

    pub fn close_files(self) {
        if let Some(writer) = self.flow_metrics {
            writer.close_file();
        }
    }
}
