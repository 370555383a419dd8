//! Destination stamping values shared by every rewrite in a run

use super::ids::AssetUid;
use serde::{Deserialize, Serialize};

/// Values injected into every rewritten submission
///
/// Resolved once before the first page is fetched and then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferMetadata {
    /// Destination asset uid (new root tag and `id` attribute)
    pub destination_asset_id: AssetUid,

    /// Uid of the latest deployed version (`version` root attribute)
    pub destination_version: String,

    /// Human readable version label written to `__version__`
    pub destination_version_label: String,

    /// Form hub uuid written to `formhub/uuid`
    pub destination_hub_id: String,
}

/// Formats the `__version__` label: `"<count> (<date> <time>)"`
///
/// The deployment timestamp is split on its `T` separator and the time part is
/// truncated at the first `.`, dropping sub-second precision. Without a fraction the
/// time part is kept as is, zone suffix included.
///
/// # Examples
///
/// ```
/// use kobo_transfer::domain::metadata::format_version_label;
///
/// assert_eq!(
///     format_version_label(3, "2021-03-29T19:40:28.123456Z"),
///     "3 (2021-03-29 19:40:28)"
/// );
/// ```
pub fn format_version_label(version_count: u64, date_deployed: &str) -> String {
    let (date, time) = date_deployed
        .split_once('T')
        .unwrap_or((date_deployed, ""));
    let time = time.split('.').next().unwrap_or(time);
    format!("{version_count} ({date} {time})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_version_label_truncates_fraction() {
        assert_eq!(
            format_version_label(1, "2021-03-29T19:40:28.829273Z"),
            "1 (2021-03-29 19:40:28)"
        );
    }

    #[test]
    fn test_format_version_label_without_fraction() {
        assert_eq!(
            format_version_label(12, "2024-11-02T08:00:01"),
            "12 (2024-11-02 08:00:01)"
        );
    }

    #[test]
    fn test_format_version_label_keeps_zone_suffix_without_fraction() {
        assert_eq!(
            format_version_label(12, "2024-11-02T08:00:01Z"),
            "12 (2024-11-02 08:00:01Z)"
        );
    }

    #[test]
    fn test_format_version_label_date_only() {
        assert_eq!(format_version_label(2, "2024-11-02"), "2 (2024-11-02 )");
    }
}
