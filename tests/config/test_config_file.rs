use indicam_node::config::{IndicamConfig, DEFAULT_SCAN_INTERVAL_SECS};
use indicam_node::processor::ResyncPolicy;
use indicam_node::service::CamConfig;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
output_dir = "/config/www/indicam"
resync_policy = "on_change"
poll_schedule_secs = [2, 10, 30]

[service]
url = "https://indicam.example.com/api"
auth_key = "abc123"

[host]
url = "http://homeassistant.local:8123"
token = "long-lived-token"

[capture]
flash_delay_secs = 30
image_get_retries = 5

[[devices]]
name = "Oil Tank"
service_device = "oiltank"
camera_entity_id = "camera.tank"
flash_entity_id = "switch.tank_led"
min_perc = 0.12
max_perc = 0.08
scan_interval_secs = 21600

[[devices]]
name = "Water Tank"
service_device = "watertank"
camera_entity_id = "camera.water"
"#;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("indicam.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_full_config() {
        let dir = TempDir::new().unwrap();
        let config = IndicamConfig::from_file(write_config(&dir, FULL_CONFIG)).unwrap();

        assert_eq!(config.service.url, "https://indicam.example.com/api");
        assert_eq!(config.service.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.host.token, "long-lived-token");
        assert_eq!(config.output_dir, Some(PathBuf::from("/config/www/indicam")));
        assert_eq!(config.resync_policy, ResyncPolicy::OnChange);
        assert_eq!(config.poll_schedule().len(), 3);
        assert_eq!(config.capture.flash_delay_secs, 30);
        assert_eq!(config.capture.image_get_retries, 5);
        // Unset capture fields keep their defaults
        assert_eq!(config.capture.grab_timeout_secs, 10);

        assert_eq!(config.devices.len(), 2);
        let oil = config.device("Oil Tank").unwrap();
        assert_eq!(oil.cam_config(), CamConfig::new(0.12, 0.08));
        assert_eq!(oil.scan_interval(), Duration::from_secs(6 * 3600));

        let water = config.device("Water Tank").unwrap();
        assert_eq!(water.flash_entity_id, None);
        assert_eq!(water.cam_config(), CamConfig::default());
        assert_eq!(water.scan_interval_secs, DEFAULT_SCAN_INTERVAL_SECS);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = IndicamConfig::from_toml_str(
            r#"
[service]
auth_key = "abc123"
"#,
        )
        .unwrap();

        assert_eq!(config.poll_schedule_secs, vec![1, 5, 25, 60, 90]);
        assert_eq!(config.resync_policy, ResyncPolicy::Once);
        assert!(config.devices.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = IndicamConfig::from_file(dir.path().join("missing.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[[devices]]\nname = 5\n");
        assert!(IndicamConfig::from_file(path).is_err());
    }

    #[test]
    fn test_device_without_service_handle_is_rejected() {
        let result = IndicamConfig::from_toml_str(
            r#"
[service]
auth_key = "abc123"

[[devices]]
name = "Oil Tank"
service_device = ""
"#,
        )
        .unwrap()
        .validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[service]
auth_key = "abc123"

[[devices]]
name = "Oil Tank"
service_device = "oiltank"
scan_interval_secs = 60
"#,
        );
        let err = IndicamConfig::load(path).unwrap_err();
        assert!(err.to_string().contains("scan interval"));
    }
}
