// Version information for the IndiCam node

/// Full version string with feature description
pub const VERSION: &str = "v1.2.0-resync-policy-2025-10-20";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.2.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-20";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("IndiCam Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
