use crate::common::{sample_measurement, test_jpeg};
use indicam_node::annotate::{AnnotationError, ResultAnnotator};
use indicam_node::service::{CamConfig, GaugeMeasurement};
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn annotator(dir: &TempDir) -> ResultAnnotator {
        ResultAnnotator::new(Some(dir.path().join("indicam")), "oiltank")
    }

    /// Red dominates at `(x, y)` after JPEG compression
    fn is_reddish(img: &image::RgbImage, x: u32, y: u32) -> bool {
        let p = img.get_pixel(x, y);
        p[0] as i32 > p[1] as i32 + 60 && p[0] as i32 > p[2] as i32 + 60
    }

    #[tokio::test]
    async fn test_writes_snapshot_and_measure() {
        let dir = TempDir::new().unwrap();
        let annotator = annotator(&dir);
        let image = test_jpeg(320, 640);

        annotator
            .decorate_and_save(&image, Some(&sample_measurement()), &CamConfig::new(0.1, 0.1))
            .await
            .unwrap();

        let snapshot = annotator.snapshot_path().unwrap();
        let measure = annotator.measure_path().unwrap();
        assert_eq!(snapshot.file_name().unwrap(), "oiltank-snapshot.jpg");
        assert_eq!(std::fs::read(&snapshot).unwrap(), image);

        let drawn = image::open(&measure).unwrap().to_rgb8();
        assert_eq!(drawn.dimensions(), (320, 640));
        // Max, min and float lines
        assert!(is_reddish(&drawn, 150, 140));
        assert!(is_reddish(&drawn, 150, 460));
        assert!(is_reddish(&drawn, 150, 300));
        assert!(!is_reddish(&drawn, 150, 220));
    }

    #[tokio::test]
    async fn test_no_measurement_removes_measure_file() {
        let dir = TempDir::new().unwrap();
        let annotator = annotator(&dir);
        let image = test_jpeg(320, 640);
        let cam_config = CamConfig::new(0.1, 0.1);

        annotator
            .decorate_and_save(&image, Some(&sample_measurement()), &cam_config)
            .await
            .unwrap();
        assert!(annotator.measure_path().unwrap().exists());

        annotator
            .decorate_and_save(&image, None, &cam_config)
            .await
            .unwrap();

        assert!(!annotator.measure_path().unwrap().exists());
        assert!(annotator.snapshot_path().unwrap().exists());
    }

    #[tokio::test]
    async fn test_no_measurement_without_previous_file() {
        let dir = TempDir::new().unwrap();
        let annotator = annotator(&dir);

        annotator
            .decorate_and_save(&test_jpeg(16, 16), None, &CamConfig::default())
            .await
            .unwrap();

        assert!(annotator.snapshot_path().unwrap().exists());
        assert!(!annotator.measure_path().unwrap().exists());
    }

    #[tokio::test]
    async fn test_undecodable_image_clears_stale_measure() {
        let dir = TempDir::new().unwrap();
        let annotator = annotator(&dir);
        let cam_config = CamConfig::new(0.1, 0.1);

        annotator
            .decorate_and_save(&test_jpeg(320, 640), Some(&sample_measurement()), &cam_config)
            .await
            .unwrap();

        let result = annotator
            .decorate_and_save(b"corrupt", Some(&sample_measurement()), &cam_config)
            .await;

        assert!(matches!(result, Err(AnnotationError::Decode(_))));
        assert!(!annotator.measure_path().unwrap().exists());
        assert_eq!(std::fs::read(annotator.snapshot_path().unwrap()).unwrap(), b"corrupt");
    }

    #[tokio::test]
    async fn test_extreme_coordinates_still_render() {
        let dir = TempDir::new().unwrap();
        let annotator = annotator(&dir);
        let image = test_jpeg(320, 640);
        let cam_config = CamConfig::new(0.1, 0.1);

        let float_off_image = GaugeMeasurement {
            float_top: i64::MAX,
            ..sample_measurement()
        };
        annotator
            .decorate_and_save(&image, Some(&float_off_image), &cam_config)
            .await
            .unwrap();
        assert!(annotator.measure_path().unwrap().exists());

        let body_off_image = GaugeMeasurement {
            body_top: i64::MIN,
            ..sample_measurement()
        };
        annotator
            .decorate_and_save(&image, Some(&body_off_image), &cam_config)
            .await
            .unwrap();

        let drawn = image::open(annotator.measure_path().unwrap()).unwrap().to_rgb8();
        assert_eq!(drawn.dimensions(), (320, 640));
    }

    #[tokio::test]
    async fn test_disabled_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let annotator = ResultAnnotator::new(None, "oiltank");

        annotator
            .decorate_and_save(&test_jpeg(16, 16), Some(&sample_measurement()), &CamConfig::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
