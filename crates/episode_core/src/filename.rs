pub const DEFAULT_DOWNLOAD_FILENAME: &str = "episode.mp4";

const FALLBACK_TITLE: &str = "Anime";
const FALLBACK_EPISODE: &str = "Episode";

/// Collapses every run of non-alphanumeric characters into one underscore.
///
/// Leading and trailing separators are dropped: `"My/Anime: S1"` → `"My_Anime_S1"`.
pub fn sanitize_title(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut pending_separator = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !cleaned.is_empty() {
                cleaned.push('_');
            }
            pending_separator = false;
            cleaned.push(c);
        } else {
            pending_separator = true;
        }
    }
    cleaned
}

/// Download name for one episode: `{sanitized_title}_{episode}.mp4`.
pub fn download_filename(series_title: Option<&str>, episode_label: Option<&str>) -> String {
    let title = series_title
        .map(sanitize_title)
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());
    let episode = episode_label
        .map(sanitize_title)
        .filter(|episode| !episode.is_empty())
        .unwrap_or_else(|| FALLBACK_EPISODE.to_string());
    format!("{title}_{episode}.mp4")
}

/// Makes a caller-provided filename safe inside a quoted
/// `Content-Disposition` parameter (printable ASCII only).
pub fn header_safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            other if !other.is_ascii() => '_',
            other => other,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        DEFAULT_DOWNLOAD_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}
