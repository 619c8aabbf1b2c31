// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod annotate;
pub mod capture;
pub mod cli;
pub mod config;
pub mod host;
pub mod node;
pub mod processor;
pub mod scheduler;
pub mod sensor;
pub mod service;
pub mod version;

// Re-export main types
pub use annotate::{AnnotationError, ResultAnnotator};
pub use capture::{AcquisitionError, CameraSource, FlashSwitch, ImageGrabber};
pub use config::{DeviceSettings, IndicamConfig};
pub use host::HomeAssistantClient;
pub use node::IndicamNode;
pub use processor::{
    CameraConfigSynchronizer, MeasurementError, MeasurementOutcome, MeasurementPoller,
    ResyncPolicy,
};
pub use scheduler::Scheduler;
pub use sensor::{CycleError, GaugeSensor, MeasurementEvent, MeasurementSink};
pub use service::{
    CamConfig, GaugeMeasurement, HttpIndicamClient, IndicamService, ServiceError,
};
