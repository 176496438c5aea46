//! Link entries and ordered link lists.
//!
//! A draft carries three link families (service links, socials, contacts)
//! with the same entry shape and disjoint id namespaces. Insertion order is
//! significant; removal is by id, never by position.

use serde::{Deserialize, Serialize};

use super::identity::LinkId;

/// Which of the draft's three lists an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkFamily {
    Links,
    Socials,
    Contacts,
}

impl LinkFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Links => "links",
            Self::Socials => "socials",
            Self::Contacts => "contacts",
        }
    }
}

/// One entry of a link list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub id: LinkId,
    /// Platform/category slug, e.g. "spotify", "apple_music", "instagram".
    pub category: String,
    pub url: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<String>,
}

impl LinkEntry {
    pub fn new(
        id: LinkId,
        category: impl Into<String>,
        url: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category: category.into(),
            url: url.into(),
            display_name: display_name.into(),
            icon: None,
            color: None,
        }
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Partial entry update - present fields overwrite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPatch {
    pub category: Option<String>,
    pub url: Option<String>,
    pub display_name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Ordered link list with unique entry ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkList(Vec<LinkEntry>);

impl LinkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries, keeping the first occurrence of each id.
    pub fn from_entries(entries: impl IntoIterator<Item = LinkEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            list.push(entry);
        }
        list
    }

    /// Append an entry. Returns false (and leaves the list untouched) when
    /// the id is already present.
    pub fn push(&mut self, entry: LinkEntry) -> bool {
        if self.contains(&entry.id) {
            return false;
        }
        self.0.push(entry);
        true
    }

    /// Remove by id, preserving the order of the remaining entries.
    /// Returns false when the id was not present.
    pub fn remove(&mut self, id: &LinkId) -> bool {
        let before = self.0.len();
        self.0.retain(|entry| entry.id != *id);
        self.0.len() != before
    }

    /// Patch an entry in place. Returns true when a field actually changed.
    pub fn update(&mut self, id: &LinkId, patch: LinkPatch) -> bool {
        let Some(entry) = self.0.iter_mut().find(|entry| entry.id == *id) else {
            return false;
        };
        let mut changed = false;
        if let Some(category) = patch.category {
            changed |= entry.category != category;
            entry.category = category;
        }
        if let Some(url) = patch.url {
            changed |= entry.url != url;
            entry.url = url;
        }
        if let Some(display_name) = patch.display_name {
            changed |= entry.display_name != display_name;
            entry.display_name = display_name;
        }
        if let Some(icon) = patch.icon {
            changed |= entry.icon.as_deref() != Some(icon.as_str());
            entry.icon = Some(icon);
        }
        if let Some(color) = patch.color {
            changed |= entry.color.as_deref() != Some(color.as_str());
            entry.color = Some(color);
        }
        changed
    }

    pub fn get(&self, id: &LinkId) -> Option<&LinkEntry> {
        self.0.iter().find(|entry| entry.id == *id)
    }

    pub fn contains(&self, id: &LinkId) -> bool {
        self.0.iter().any(|entry| entry.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// At least one entry with a non-empty url.
    pub fn any_with_url(&self) -> bool {
        self.0.iter().any(LinkEntry::has_url)
    }
}

impl<'a> IntoIterator for &'a LinkList {
    type Item = &'a LinkEntry;
    type IntoIter = std::slice::Iter<'a, LinkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, url: &str) -> LinkEntry {
        LinkEntry::new(LinkId::new(id).unwrap(), "spotify", url, "Spotify")
    }

    #[test]
    fn push_rejects_duplicate_id() {
        let mut list = LinkList::new();
        assert!(list.push(entry("l1", "https://a")));
        assert!(!list.push(entry("l1", "https://b")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(&LinkId::new("l1").unwrap()).unwrap().url, "https://a");
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut list = LinkList::from_entries([
            entry("l1", "https://a"),
            entry("l2", "https://b"),
            entry("l3", "https://c"),
        ]);
        assert!(list.remove(&LinkId::new("l2").unwrap()));
        let ids: Vec<&str> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["l1", "l3"]);
        assert!(!list.remove(&LinkId::new("l2").unwrap()));
    }

    #[test]
    fn update_reports_real_changes_only() {
        let mut list = LinkList::from_entries([entry("l1", "https://a")]);
        let id = LinkId::new("l1").unwrap();

        let noop = LinkPatch {
            url: Some("https://a".into()),
            ..LinkPatch::default()
        };
        assert!(!list.update(&id, noop));

        let real = LinkPatch {
            url: Some("https://b".into()),
            color: Some("#1db954".into()),
            ..LinkPatch::default()
        };
        assert!(list.update(&id, real));
        let entry = list.get(&id).unwrap();
        assert_eq!(entry.url, "https://b");
        assert_eq!(entry.color.as_deref(), Some("#1db954"));
    }

    #[test]
    fn from_entries_dedupes_first_wins() {
        let list = LinkList::from_entries([entry("l1", "https://a"), entry("l1", "https://b")]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().url, "https://a");
    }
}
