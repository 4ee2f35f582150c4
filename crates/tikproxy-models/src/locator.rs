//! Locator parsing for TikTok video URLs.

use crate::VideoId;

/// Errors that can occur during video ID extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Locator contains no `/video/` path segment
    MissingVideoSegment,
    /// A `/video/` segment exists but is never followed by digits
    InvalidVideoId,
}

impl std::fmt::Display for LocatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocatorError::MissingVideoSegment => {
                write!(f, "Locator contains no /video/ path segment")
            }
            LocatorError::InvalidVideoId => {
                write!(f, "No numeric video ID after /video/ segment")
            }
        }
    }
}

impl std::error::Error for LocatorError {}

/// Result type for locator parsing.
pub type LocatorResult<T> = Result<T, LocatorError>;

const VIDEO_SEGMENT: &str = "/video/";

/// Extract the numeric TikTok video ID from a locator.
///
/// Supports every locator shape that carries a `/video/<digits>` path
/// segment:
/// - https://www.tiktok.com/@user/video/7301234567890123456
/// - https://m.tiktok.com/@user/video/7301234567890123456?lang=en
/// - bare paths such as /video/7301234567890123456
///
/// The first `/video/` occurrence followed by at least one ASCII digit
/// wins, and the ID is the maximal digit run after it. No host check is
/// applied: share-link resolvers rewrite hosts freely, and the path
/// segment is the stable part.
pub fn extract_video_id(locator: &str) -> LocatorResult<VideoId> {
    let locator = locator.trim();

    let mut saw_segment = false;
    let mut search_from = 0;
    while let Some(found) = locator[search_from..].find(VIDEO_SEGMENT) {
        let start = search_from + found;
        saw_segment = true;

        let digits = leading_digits(&locator[start + VIDEO_SEGMENT.len()..]);
        if !digits.is_empty() {
            return Ok(VideoId::from_string(digits));
        }

        // Occurrences may overlap (`/video/video/123`); advance one byte,
        // not past the whole match. `start` always sits on an ASCII '/'.
        search_from = start + 1;
    }

    if saw_segment {
        Err(LocatorError::InvalidVideoId)
    } else {
        Err(LocatorError::MissingVideoSegment)
    }
}

/// Maximal run of ASCII digits at the start of the string.
fn leading_digits(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_success_cases() {
        // Canonical web format
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@someuser/video/7301234567890123456")
                .unwrap()
                .as_str(),
            "7301234567890123456"
        );

        // Without www
        assert_eq!(
            extract_video_id("https://tiktok.com/@someuser/video/7301234567890123456")
                .unwrap()
                .as_str(),
            "7301234567890123456"
        );

        // Mobile host
        assert_eq!(
            extract_video_id("https://m.tiktok.com/@someuser/video/7301234567890123456")
                .unwrap()
                .as_str(),
            "7301234567890123456"
        );

        // With query parameters
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@u/video/42?lang=en&is_copy_url=1")
                .unwrap()
                .as_str(),
            "42"
        );

        // Trailing path segment
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@u/video/42/").unwrap().as_str(),
            "42"
        );

        // Bare path, no host at all
        assert_eq!(extract_video_id("/video/42").unwrap().as_str(), "42");

        // Surrounding whitespace
        assert_eq!(
            extract_video_id("  https://www.tiktok.com/@u/video/42  ").unwrap().as_str(),
            "42"
        );
    }

    #[test]
    fn test_extract_video_id_no_host_filtering() {
        // Resolved share links can land on arbitrary hosts; only the path
        // segment matters.
        assert_eq!(
            extract_video_id("https://example.com/video/1234567890123456789")
                .unwrap()
                .as_str(),
            "1234567890123456789"
        );
    }

    #[test]
    fn test_extract_video_id_stops_at_first_non_digit() {
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@u/video/123abc456").unwrap().as_str(),
            "123"
        );
    }

    #[test]
    fn test_extract_video_id_skips_non_numeric_segments() {
        // The first digit-bearing /video/ segment wins
        assert_eq!(
            extract_video_id("https://host/video/preview/video/99").unwrap().as_str(),
            "99"
        );
    }

    #[test]
    fn test_extract_video_id_overlapping_segments() {
        assert_eq!(extract_video_id("/video/video/123").unwrap().as_str(), "123");
    }

    #[test]
    fn test_extract_video_id_error_cases() {
        // No /video/ segment at all
        assert!(matches!(
            extract_video_id("https://www.tiktok.com/@someuser"),
            Err(LocatorError::MissingVideoSegment)
        ));

        assert!(matches!(
            extract_video_id(""),
            Err(LocatorError::MissingVideoSegment)
        ));

        // Case sensitive, like a URL path
        assert!(matches!(
            extract_video_id("https://www.tiktok.com/@u/VIDEO/42"),
            Err(LocatorError::MissingVideoSegment)
        ));

        // Segment present but no digits after it
        assert!(matches!(
            extract_video_id("https://www.tiktok.com/@u/video/"),
            Err(LocatorError::InvalidVideoId)
        ));

        assert!(matches!(
            extract_video_id("https://www.tiktok.com/@u/video/abc"),
            Err(LocatorError::InvalidVideoId)
        ));
    }

    #[test]
    fn test_locator_error_display() {
        assert_eq!(
            LocatorError::MissingVideoSegment.to_string(),
            "Locator contains no /video/ path segment"
        );
        assert_eq!(
            LocatorError::InvalidVideoId.to_string(),
            "No numeric video ID after /video/ segment"
        );
    }
}
