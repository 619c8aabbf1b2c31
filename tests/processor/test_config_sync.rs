use crate::common::{Call, RecordingService, INDICAM_ID};
use indicam_node::processor::{
    CameraConfigSynchronizer, DeviceBinding, MeasurementError, ResyncPolicy,
};
use indicam_node::service::CamConfig;

#[cfg(test)]
mod tests {
    use super::*;

    fn is_set(call: &Call) -> bool {
        matches!(call, Call::SetConfig(..))
    }

    #[tokio::test]
    async fn test_equal_config_is_never_written() {
        let service = RecordingService::new().with_remote_config(Some(CamConfig::new(0.1, 0.1)));
        let mut sync = CameraConfigSynchronizer::new(ResyncPolicy::Once);
        let mut binding = DeviceBinding::new("oiltank");
        let local = CamConfig::new(0.1, 0.1);

        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();

        assert!(sync.is_synced(&local));
        assert_eq!(service.count(is_set), 0);
        assert_eq!(
            service.calls(),
            vec![Call::Resolve("oiltank".to_string()), Call::GetConfig(INDICAM_ID)]
        );
    }

    #[tokio::test]
    async fn test_latched_after_first_success() {
        let service = RecordingService::new();
        let mut sync = CameraConfigSynchronizer::new(ResyncPolicy::Once);
        let mut binding = DeviceBinding::new("oiltank");
        let local = CamConfig::new(0.1, 0.1);

        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();
        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();
        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();

        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_differing_config_written_once() {
        let service = RecordingService::new().with_remote_config(Some(CamConfig::new(0.0, 0.0)));
        let mut sync = CameraConfigSynchronizer::new(ResyncPolicy::Once);
        let mut binding = DeviceBinding::new("oiltank");
        let local = CamConfig::new(0.15, 0.05);

        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();
        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();

        assert_eq!(service.count(is_set), 1);
        assert!(service
            .calls()
            .contains(&Call::SetConfig(INDICAM_ID, CamConfig::new(0.15, 0.05))));
        assert_eq!(service.remote_config(), Some(local));
        assert!(sync.is_synced(&local));
    }

    #[tokio::test]
    async fn test_failed_write_stays_unsynced_and_retries() {
        let service = RecordingService::new().with_remote_config(Some(CamConfig::new(0.0, 0.0)));
        service.set_fail_set_config(true);
        let mut sync = CameraConfigSynchronizer::new(ResyncPolicy::Once);
        let mut binding = DeviceBinding::new("oiltank");
        let local = CamConfig::new(0.2, 0.2);

        let result = sync.ensure_synced(&service, &mut binding, &local).await;
        assert!(matches!(result, Err(MeasurementError::ServiceUnavailable(_))));
        assert!(!sync.is_synced(&local));

        service.set_fail_set_config(false);
        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();
        assert!(sync.is_synced(&local));
        assert_eq!(service.count(is_set), 2);
    }

    #[tokio::test]
    async fn test_missing_remote_config_is_unavailable() {
        let service = RecordingService::new().with_remote_config(None);
        let mut sync = CameraConfigSynchronizer::default();
        let mut binding = DeviceBinding::new("oiltank");

        let result = sync
            .ensure_synced(&service, &mut binding, &CamConfig::new(0.1, 0.1))
            .await;

        assert!(matches!(result, Err(MeasurementError::ServiceUnavailable(_))));
        assert_eq!(service.count(is_set), 0);
    }

    #[tokio::test]
    async fn test_device_id_resolved_once() {
        let service = RecordingService::new();
        service.set_fail_resolve(true);
        let mut sync = CameraConfigSynchronizer::default();
        let mut binding = DeviceBinding::new("oiltank");
        let local = CamConfig::new(0.1, 0.1);

        let result = sync.ensure_synced(&service, &mut binding, &local).await;
        assert!(matches!(result, Err(MeasurementError::ServiceUnavailable(_))));
        assert_eq!(binding.indicam_id(), None);

        service.set_fail_resolve(false);
        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();
        assert_eq!(binding.indicam_id(), Some(INDICAM_ID));

        sync.invalidate();
        sync.ensure_synced(&service, &mut binding, &local).await.unwrap();
        assert_eq!(service.count(|c| matches!(c, Call::Resolve(_))), 2);
        assert_eq!(service.count(|c| matches!(c, Call::GetConfig(_))), 2);
    }

    #[tokio::test]
    async fn test_on_change_policy_pushes_new_config() {
        let service = RecordingService::new();
        let mut sync = CameraConfigSynchronizer::new(ResyncPolicy::OnChange);
        let mut binding = DeviceBinding::new("oiltank");

        sync.ensure_synced(&service, &mut binding, &CamConfig::new(0.1, 0.1))
            .await
            .unwrap();
        assert_eq!(service.count(is_set), 0);

        let changed = CamConfig::new(0.1, 0.2);
        sync.ensure_synced(&service, &mut binding, &changed).await.unwrap();
        assert_eq!(service.count(is_set), 1);
        assert!(sync.is_synced(&changed));
    }

    #[tokio::test]
    async fn test_once_policy_ignores_local_change() {
        let service = RecordingService::new();
        let mut sync = CameraConfigSynchronizer::new(ResyncPolicy::Once);
        let mut binding = DeviceBinding::new("oiltank");

        sync.ensure_synced(&service, &mut binding, &CamConfig::new(0.1, 0.1))
            .await
            .unwrap();
        sync.ensure_synced(&service, &mut binding, &CamConfig::new(0.3, 0.3))
            .await
            .unwrap();

        assert_eq!(service.count(is_set), 0);
        assert_eq!(service.count(|c| matches!(c, Call::GetConfig(_))), 1);
    }
}
