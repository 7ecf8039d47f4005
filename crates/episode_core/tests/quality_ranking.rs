use std::cmp::Ordering;

use episode_core::{compare_quality_desc, quality_rank};

#[test]
fn resolution_suffix_is_preferred_over_other_numbers() {
    assert_eq!(quality_rank("1080p"), Some(1080));
    assert_eq!(quality_rank("SubsPlease · 720p (87MB)"), Some(720));
    assert_eq!(quality_rank("Erai 2 · 360P"), Some(360));
}

#[test]
fn first_number_is_used_without_resolution_suffix() {
    assert_eq!(quality_rank("Mirror 2"), Some(2));
    assert_eq!(quality_rank("Auto"), None);
    assert_eq!(quality_rank(""), None);
}

#[test]
fn higher_resolution_sorts_first_unlike_plain_string_order() {
    // As plain strings "1080p" < "720p"; numerically it must rank first.
    assert_eq!(compare_quality_desc("1080p", "720p"), Ordering::Less);
    assert_eq!(compare_quality_desc("360p", "720p"), Ordering::Greater);
}

#[test]
fn non_numeric_labels_sort_after_numeric_ones() {
    let mut labels = vec!["Auto", "360p", "Source", "1080p", "720p"];
    labels.sort_by(|a, b| compare_quality_desc(a, b));
    assert_eq!(labels, vec!["1080p", "720p", "360p", "Auto", "Source"]);
}

#[test]
fn ranking_is_strictly_descending_for_numeric_labels() {
    let mut labels = vec!["480p", "2160p", "144p", "1080p", "720p", "240p"];
    labels.sort_by(|a, b| compare_quality_desc(a, b));
    let ranks: Vec<u32> = labels.iter().filter_map(|l| quality_rank(l)).collect();
    assert!(ranks.windows(2).all(|pair| pair[0] > pair[1]));
}
