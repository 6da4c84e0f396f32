use crate::slug::slugify;
use std::collections::BTreeMap;

/// Hands out unique heading anchors for one render pass.
///
/// The first heading with a given slug gets the bare slug. Every later
/// collision bumps the stored count and gets `slug-N`, so three headings
/// titled "Usage" become `usage`, `usage-1`, `usage-2`.
#[derive(Debug, Clone, Default)]
pub struct AnchorAllocator {
    counts: BTreeMap<String, usize>,
}

impl AnchorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, text: &str) -> String {
        let slug = slugify(text);
        match self.counts.get_mut(&slug) {
            Some(count) => {
                *count += 1;
                let anchor = format!("{}-{}", slug, count);
                log::debug!("disambiguated anchor: {anchor}");
                anchor
            }
            None => {
                log::debug!("new anchor: {slug}");
                self.counts.insert(slug.clone(), 0);
                slug
            }
        }
    }

    /// Collision counts keyed by bare slug.
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}
