//! Filename helpers shared across crates.

/// Sanitize a title for use in filenames and object keys.
///
/// Only allows ASCII alphanumeric, hyphen, underscore, and space.
/// Non-ASCII characters are stripped to prevent URL encoding mismatches
/// between stored object keys and published URLs.
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
        .chars()
        .take(50)
        .collect();

    if sanitized.is_empty() {
        "video".to_string()
    } else {
        sanitized
    }
}

/// Artifact file name for a segment.
///
/// Format: `{safe_title}_part_{n:03}.mp4` with `n` the 1-based display
/// number (segment index 0 becomes `_part_001`).
pub fn artifact_file_name(title: &str, index: usize) -> String {
    format!("{}_part_{:03}.mp4", sanitize_title(title), index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Hello World!"), "hello_world");
        assert_eq!(sanitize_title("Test@#$%123"), "test123");
        assert_eq!(sanitize_title("The  Big   Heist"), "the_big_heist");
    }

    #[test]
    fn test_sanitize_title_unicode() {
        // Non-ASCII letters are stripped rather than transliterated
        assert_eq!(sanitize_title("Café résumé"), "caf_rsum");
        assert_eq!(sanitize_title("Soluția românească"), "soluia_romneasc");
    }

    #[test]
    fn test_sanitize_title_empty_falls_back() {
        assert_eq!(sanitize_title(""), "video");
        assert_eq!(sanitize_title("!!!"), "video");
    }

    #[test]
    fn test_sanitize_title_length_cap() {
        let long = "a".repeat(80);
        assert_eq!(sanitize_title(&long).len(), 50);
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("My Movie", 0), "my_movie_part_001.mp4");
        assert_eq!(artifact_file_name("My Movie", 4), "my_movie_part_005.mp4");
        assert_eq!(artifact_file_name("My Movie", 122), "my_movie_part_123.mp4");
    }
}
