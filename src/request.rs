//! Player request inspection: content classification and URI rewriting.
//!
//! These helpers return errors for unparseable input; the session layer is
//! responsible for failing open on them.

use crate::error::ApiError;
use crate::profile::ClientType;
use url::Url;

/// Player parameter prefixes identifying clips (`kAIB`) and shorts (`8AEB`).
pub const CLIPS_OR_SHORTS_PARAMETERS: [&str; 2] = ["kAIB", "8AEB"];

/// Any unreachable address. Used to make requests fail on purpose.
pub const UNREACHABLE_HOST_URI: &str = "https://127.0.0.0";

/// Classify a player request as short/clip from its parameters.
pub fn is_short_or_clip(parameters: Option<&str>, is_short_opening_or_playing: bool) -> bool {
    if is_short_opening_or_playing {
        return true;
    }
    parameters.is_some_and(|p| {
        CLIPS_OR_SHORTS_PARAMETERS
            .iter()
            .any(|prefix| p.starts_with(prefix))
    })
}

fn path_contains(uri: &str, needle: &str) -> Result<(Url, bool), ApiError> {
    let parsed = Url::parse(uri.trim())?;
    let matches = parsed.path().contains(needle);
    Ok((parsed, matches))
}

/// Replacement for a `/get_watch` request, or `None` to leave it alone.
pub fn rewrite_get_watch(uri: &str) -> Result<Option<String>, ApiError> {
    let (_, matches) = path_contains(uri, "get_watch")?;
    Ok(matches.then(|| UNREACHABLE_HOST_URI.to_string()))
}

/// Replacement for an `/initplayback` request, or `None` to leave it alone.
///
/// The testsuite client still needs the request to reach the server, so only
/// its query string is dropped; every other client is sent nowhere.
/// `client` is only consulted for matching requests.
pub fn rewrite_init_playback<F>(url: &str, client: F) -> Result<Option<String>, ApiError>
where
    F: FnOnce() -> ClientType,
{
    let (mut parsed, matches) = path_contains(url, "initplayback")?;
    if !matches {
        return Ok(None);
    }
    if client() == ClientType::AndroidTestsuite {
        parsed.set_query(None);
        Ok(Some(parsed.to_string()))
    } else {
        Ok(Some(UNREACHABLE_HOST_URI.to_string()))
    }
}
