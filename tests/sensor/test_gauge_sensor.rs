use crate::common::{
    sample_measurement, test_jpeg, Call, InstantFlash, RecordingService, StaticCamera,
};
use indicam_node::capture::AcquisitionError;
use indicam_node::config::{DeviceSettings, IndicamConfig};
use indicam_node::node::build_sensor;
use indicam_node::processor::MeasurementError;
use indicam_node::sensor::{CycleError, GaugeSensor};
use indicam_node::service::GaugeMeasurement;
use std::sync::Arc;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn device(camera: Option<&str>) -> DeviceSettings {
        DeviceSettings {
            name: "Oil Tank".to_string(),
            service_device: "oiltank".to_string(),
            camera_entity_id: camera.map(|c| c.to_string()),
            flash_entity_id: Some("switch.tank_led".to_string()),
            min_perc: 0.1,
            max_perc: 0.1,
            scan_interval_secs: 24 * 3600,
        }
    }

    fn sensor(
        service: &Arc<RecordingService>,
        camera: Option<&str>,
        output_dir: Option<&TempDir>,
    ) -> GaugeSensor {
        let config = IndicamConfig {
            output_dir: output_dir.map(|d| d.path().to_path_buf()),
            poll_schedule_secs: vec![1],
            ..Default::default()
        };
        build_sensor(
            &config,
            &device(camera),
            service.clone(),
            Arc::new(StaticCamera::new(test_jpeg(320, 640))),
            Arc::new(InstantFlash::default()),
        )
    }

    #[tokio::test]
    async fn test_no_value_before_first_success() {
        let service = Arc::new(RecordingService::new());
        let sensor = sensor(&service, Some("camera.tank"), None);

        assert_eq!(sensor.entity_id(), "sensor.oil_tank");
        assert_eq!(sensor.native_value(), None);
        assert!(sensor.measurement_event().is_none());
        assert_eq!(sensor.state().state, "unknown");
        assert!(sensor.attributes().gauge_measurement.is_none());
    }

    #[tokio::test]
    async fn test_successful_cycle_updates_value() {
        let service = Arc::new(RecordingService::new().with_measurement(Some(GaugeMeasurement {
            value: Some(0.4567),
            ..sample_measurement()
        })));
        let mut sensor = sensor(&service, Some("camera.tank"), None);

        let measurement = sensor.update().await.unwrap();

        assert_eq!(measurement.value, Some(0.4567));
        assert_eq!(sensor.native_value(), Some(45.7));
        assert_eq!(sensor.state().state, "45.7");
        assert!(sensor.last_elapsed().is_some());

        let attributes = sensor.attributes();
        assert_eq!(attributes.unit_of_measurement, "%");
        assert_eq!(attributes.gauge_measurement, Some(measurement));
        assert!(attributes.last_measured.is_some());

        let event = sensor.measurement_event().unwrap();
        assert_eq!(event.entity_id, "sensor.oil_tank");
        assert_eq!(event.value, Some(0.4567));
        assert_eq!(event.float_top, 300);
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_value() {
        let service = Arc::new(RecordingService::new());
        let mut sensor = sensor(&service, Some("camera.tank"), None);

        sensor.update().await.unwrap();
        assert_eq!(sensor.native_value(), Some(50.0));

        service.set_measurement(Some(GaugeMeasurement {
            value: None,
            ..sample_measurement()
        }));
        let result = sensor.update().await;

        assert!(matches!(
            result,
            Err(CycleError::Measurement(MeasurementError::InvalidMeasurement { .. }))
        ));
        assert_eq!(sensor.native_value(), Some(50.0));
        assert_eq!(sensor.last_result(), Some(&sample_measurement()));
    }

    #[tokio::test]
    async fn test_no_camera_skips_processing() {
        let service = Arc::new(RecordingService::new());
        let mut sensor = sensor(&service, None, None);

        let result = sensor.update().await;

        assert!(matches!(
            result,
            Err(CycleError::Acquisition(AcquisitionError::NoCameraConfigured))
        ));
        assert!(service.calls().is_empty());
        assert_eq!(sensor.native_value(), None);
    }

    #[tokio::test]
    async fn test_failed_measurement_still_saves_snapshot() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(RecordingService::new());
        let mut sensor = sensor(&service, Some("camera.tank"), Some(&dir));

        sensor.update().await.unwrap();
        let measure = dir.path().join("oiltank-measure.jpg");
        let snapshot = dir.path().join("oiltank-snapshot.jpg");
        assert!(measure.exists());
        assert!(snapshot.exists());

        service.set_fail_upload(true);
        let result = sensor.update().await;

        assert!(matches!(
            result,
            Err(CycleError::Measurement(MeasurementError::UploadFailed { .. }))
        ));
        assert!(snapshot.exists());
        assert!(!measure.exists());
        assert_eq!(service.count(|c| matches!(c, Call::Upload(..))), 2);
    }
}
