// Group link parsing: loose extraction of a candidate screen-name from a
// free-form link, then strict validation against what the API accepts.

use std::sync::LazyLock;

use regex::Regex;
use wallstat_common::{Result, WallstatError};

/// Path segments containing this are the host, not the group.
const HOST_MARKER: &str = "vk.com";

static SCREEN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]+|club\d+|public\d+|-\d+)$").expect("valid regex")
});

/// Extract and validate the screen-name of a group link.
/// "https://vk.com/example" → "example"
pub fn resolve(link: &str) -> Result<String> {
    let screen_name = extract_screen_name(link)?;
    validate_screen_name(&screen_name)?;
    Ok(screen_name)
}

/// First path segment that is neither empty nor the host.
pub fn extract_screen_name(link: &str) -> Result<String> {
    let rest = link.trim();
    let rest = rest.strip_prefix("https://").unwrap_or(rest);
    let rest = rest.strip_prefix("http://").unwrap_or(rest);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);

    rest.split('/')
        .find(|segment| !segment.is_empty() && !segment.contains(HOST_MARKER))
        .map(str::to_string)
        .ok_or_else(|| WallstatError::InvalidLink(link.to_string()))
}

pub fn validate_screen_name(screen_name: &str) -> Result<()> {
    if SCREEN_NAME_RE.is_match(screen_name) {
        Ok(())
    } else {
        Err(WallstatError::InvalidScreenName(screen_name.to_string()))
    }
}
