/// Engagement rate of a post: interactions divided by views. Zero views
/// means zero engagement rather than a division error.
pub fn engagement_rate(likes: u64, comments: u64, shares: u64, views: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    (likes + comments + shares) as f64 / views as f64
}

/// Render a byte count in human-readable units.
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_rate() {
        let rate = engagement_rate(89, 12, 5, 1250);
        assert!((rate - 106.0 / 1250.0).abs() < 1e-12);
    }

    #[test]
    fn test_engagement_rate_zero_views() {
        assert_eq!(engagement_rate(10, 5, 2, 0), 0.0);
    }

    #[test]
    fn test_format_file_size_units() {
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
