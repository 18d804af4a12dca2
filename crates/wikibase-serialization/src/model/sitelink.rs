//! Links from items to pages on client sites.

use crate::model::id::ItemId;

/// A link to `title` on `site`, with optional badge items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteLink {
    site: String,
    title: String,
    badges: Vec<ItemId>,
}

impl SiteLink {
    pub fn new(site: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            title: title.into(),
            badges: Vec::new(),
        }
    }

    pub fn with_badges(mut self, badges: Vec<ItemId>) -> Self {
        self.badges = badges;
        self
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn badges(&self) -> &[ItemId] {
        &self.badges
    }
}

/// Site links keyed by site identifier, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteLinkSet {
    links: Vec<SiteLink>,
}

impl SiteLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `link`, replacing any link for the same site.
    pub fn set(&mut self, link: SiteLink) -> Option<SiteLink> {
        match self.links.iter_mut().find(|l| l.site == link.site) {
            Some(slot) => Some(std::mem::replace(slot, link)),
            None => {
                self.links.push(link);
                None
            }
        }
    }

    pub fn get(&self, site: &str) -> Option<&SiteLink> {
        self.links.iter().find(|l| l.site == site)
    }

    pub fn has(&self, site: &str) -> bool {
        self.get(site).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteLink> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
