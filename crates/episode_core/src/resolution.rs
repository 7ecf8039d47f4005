use std::collections::HashSet;

use crate::quality::compare_quality_desc;
use crate::ResolvedSource;

/// Resolved sources of one episode, best quality first.
///
/// Holds each quality label at most once. The first entry is the default
/// playback choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EpisodeResolution {
    sources: Vec<ResolvedSource>,
}

impl EpisodeResolution {
    /// Builds a resolution from successes listed in candidate order.
    ///
    /// A repeated label keeps its earliest entry; ranking is stable, so
    /// labels of equal rank stay in candidate order.
    pub fn from_ordered_successes(successes: impl IntoIterator<Item = ResolvedSource>) -> Self {
        let mut seen = HashSet::new();
        let mut sources: Vec<ResolvedSource> = successes
            .into_iter()
            .filter(|source| seen.insert(source.quality_label.clone()))
            .collect();
        sources.sort_by(|a, b| compare_quality_desc(&a.quality_label, &b.quality_label));
        Self { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn default_source(&self) -> Option<&ResolvedSource> {
        self.sources.first()
    }

    pub fn sources(&self) -> &[ResolvedSource] {
        &self.sources
    }

    pub fn find(&self, quality_label: &str) -> Option<&ResolvedSource> {
        self.sources
            .iter()
            .find(|source| source.quality_label == quality_label)
    }
}
