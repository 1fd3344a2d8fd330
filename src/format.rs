//! Display helpers shared by the Drive, Gmail and Calendar tools

/// Format a byte count for display
///
/// Uses 1024 thresholds; bytes are shown as an integer, larger units with
/// one decimal place.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a size reported by the Drive API as a decimal string
pub fn format_size_str(size: &str) -> String {
    match size.trim().parse::<u64>() {
        Ok(bytes) => format_size(bytes),
        Err(_) => "Size unknown".to_string(),
    }
}

/// Emoji used to annotate a file in listings
pub fn file_type_emoji(mime_type: &str) -> &'static str {
    const EXACT: &[(&str, &str)] = &[
        ("application/vnd.google-apps.folder", "📁"),
        ("application/vnd.google-apps.document", "📝"),
        ("application/vnd.google-apps.spreadsheet", "📊"),
        ("application/vnd.google-apps.presentation", "📽️"),
        ("application/vnd.google-apps.drawing", "🎨"),
        ("application/pdf", "📄"),
        ("application/zip", "📦"),
        ("application/json", "🔧"),
    ];
    const PREFIX: &[(&str, &str)] = &[
        ("image/", "🖼️"),
        ("video/", "🎥"),
        ("audio/", "🎵"),
        ("text/", "📄"),
    ];

    EXACT
        .iter()
        .find(|(mime, _)| *mime == mime_type)
        .or_else(|| PREFIX.iter().find(|(prefix, _)| mime_type.starts_with(prefix)))
        .map(|(_, emoji)| *emoji)
        .unwrap_or("📄")
}

/// Display name of a sender, `"Jane Doe" <jane@example.com>` becomes `Jane Doe`
pub fn clean_sender(from: &str) -> String {
    match from.split_once('<') {
        Some((name, _)) => name.trim().trim_matches('"').to_string(),
        None => from.to_string(),
    }
}

/// First `max` characters of `text`, never splitting a UTF-8 sequence
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Date part of an RFC 3339 timestamp (`2024-05-01T10:00:00Z` -> `2024-05-01`)
pub fn date_part(timestamp: &str) -> &str {
    truncate_chars(timestamp, 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.0 MB");
        assert_eq!(format_size(11 * 1024 * 1024), "11.0 MB");
        assert_eq!(format_size(1073741824), "1.0 GB");
    }

    #[test]
    fn test_format_size_str() {
        assert_eq!(format_size_str("2048"), "2.0 KB");
        assert_eq!(format_size_str("N/A"), "Size unknown");
    }

    #[test]
    fn test_file_type_emoji() {
        assert_eq!(file_type_emoji("application/vnd.google-apps.folder"), "📁");
        assert_eq!(file_type_emoji("application/vnd.google-apps.spreadsheet"), "📊");
        assert_eq!(file_type_emoji("image/png"), "🖼️");
        assert_eq!(file_type_emoji("video/mp4"), "🎥");
        assert_eq!(file_type_emoji("application/zip"), "📦");
        assert_eq!(file_type_emoji("application/x-unknown"), "📄");
    }

    #[test]
    fn test_clean_sender() {
        assert_eq!(clean_sender("\"Jane Doe\" <jane@example.com>"), "Jane Doe");
        assert_eq!(clean_sender("Bob <bob@example.com>"), "Bob");
        assert_eq!(clean_sender("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(date_part("2024-05-01T10:00:00Z"), "2024-05-01");
    }
}
