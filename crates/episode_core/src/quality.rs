//! Numeric-aware ordering of quality labels such as `"1080p"` or
//! `"SubsPlease · 720p (87MB)"`.
use std::cmp::Ordering;

/// Extracts the resolution number embedded in a quality label.
///
/// A digit run directly followed by `p`/`P` wins (`"BD 1080p"` → 1080);
/// otherwise the first digit run is used. Labels without digits yield `None`.
pub fn quality_rank(label: &str) -> Option<u32> {
    let mut first = None;
    let mut chars = label.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !c.is_ascii_digit() {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(idx, next)) = chars.peek() {
            if !next.is_ascii_digit() {
                break;
            }
            end = idx + next.len_utf8();
            chars.next();
        }
        let Ok(value) = label[start..end].parse::<u32>() else {
            continue;
        };
        if matches!(chars.peek(), Some(&(_, 'p' | 'P'))) {
            return Some(value);
        }
        first.get_or_insert(value);
    }

    first
}

/// Orders labels best-first: higher resolution before lower, labels without
/// a number after every numeric one. Equal ranks compare as `Equal` so a
/// stable sort keeps their original order.
pub fn compare_quality_desc(a: &str, b: &str) -> Ordering {
    match (quality_rank(a), quality_rank(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
