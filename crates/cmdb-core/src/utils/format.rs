use chrono::{DateTime, NaiveDateTime};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a backend timestamp for display.
/// Accepts RFC 3339 and the backend's `YYYY-MM-DD HH:MM:SS` / ISO forms.
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return dt.format("%b %d, %Y %H:%M").to_string();
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, fmt) {
            return dt.format("%b %d, %Y %H:%M").to_string();
        }
    }
    date.to_string()
}

/// Minutes as hours with one decimal, e.g. `90` -> `1.5 hours`.
pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes as f64 / 60.0;
    if (hours - 1.0).abs() < f64::EPSILON {
        "1.0 hour".to_string()
    } else {
        format!("{:.1} hours", hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-01 10:30:00"), "May 01, 2024 10:30");
        assert_eq!(format_date("2024-05-01T10:30:00"), "May 01, 2024 10:30");
        assert_eq!(format_date("2024-05-01T10:30:00Z"), "May 01, 2024 10:30");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(90), "1.5 hours");
        assert_eq!(format_minutes(60), "1.0 hour");
        assert_eq!(format_minutes(0), "0.0 hours");
    }
}
