use std::fmt;

use serde::Serialize;

/// One quality offered for an episode, still behind the obfuscated host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub quality_label: String,
    pub obfuscated_url: String,
}

impl CandidateLink {
    pub fn new(quality_label: impl Into<String>, obfuscated_url: impl Into<String>) -> Self {
        Self {
            quality_label: quality_label.into(),
            obfuscated_url: obfuscated_url.into(),
        }
    }
}

/// A candidate whose bypass succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    pub quality_label: String,
    pub direct_url: String,
    pub original_obfuscated_url: String,
}

impl ResolvedSource {
    pub fn from_candidate(candidate: &CandidateLink, direct_url: impl Into<String>) -> Self {
        Self {
            quality_label: candidate.quality_label.clone(),
            direct_url: direct_url.into(),
            original_obfuscated_url: candidate.obfuscated_url.clone(),
        }
    }
}

/// One harvested episode: its label and best-ranked direct link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestEntry {
    pub episode_label: String,
    pub direct_url: String,
}

impl fmt::Display for HarvestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.episode_label, self.direct_url)
    }
}

/// A catalog page whose episode listing could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPage {
    pub page: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HarvestProgress {
    pub pages_completed: u32,
    pub total_pages: u32,
    pub phase_label: String,
}

impl HarvestProgress {
    pub fn new(total_pages: u32) -> Self {
        Self {
            pages_completed: 0,
            total_pages,
            phase_label: String::new(),
        }
    }

    /// Marks `page` (1-based) as the page being fetched.
    pub fn start_page(&mut self, page: u32) {
        self.pages_completed = page.saturating_sub(1).min(self.total_pages);
        self.phase_label = format!("Fetching Page {}/{}...", page, self.total_pages);
    }

    pub fn complete_page(&mut self, page: u32) {
        self.pages_completed = page.min(self.total_pages);
    }

    pub fn finish(&mut self) {
        self.pages_completed = self.total_pages;
        self.phase_label = "Complete!".to_string();
    }

    /// Percentage reported before a page starts: `(page - 1) / total * 100`.
    /// A finished harvest, or one with no pages, reports 100.
    pub fn percent(&self) -> f64 {
        if self.total_pages == 0 || self.pages_completed >= self.total_pages {
            return 100.0;
        }
        f64::from(self.pages_completed) / f64::from(self.total_pages) * 100.0
    }
}
