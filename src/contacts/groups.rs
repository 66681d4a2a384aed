use crate::contacts::feed::GroupFeed;
use crate::contacts::normalize::safe_text;
use crate::contacts::types::ContactGroup;
use std::collections::HashMap;

/// Known contact groups keyed by their href.
///
/// Built once from the group feeds of every account before any contact is
/// processed, then only read.
#[derive(Debug, Clone, Default)]
pub struct GroupCatalog {
    groups: Vec<ContactGroup>,
    index: HashMap<String, usize>,
}

impl GroupCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog for one account's group feed
    pub fn from_feed(feed: &GroupFeed) -> Self {
        feed.entries()
            .iter()
            .filter_map(|entry| {
                let href = safe_text(entry.id.as_ref());
                if href.is_empty() {
                    tracing::debug!("Skipping group entry without id");
                    return None;
                }

                let name = safe_text(entry.title.as_ref());
                Some(match entry.system_group {
                    Some(_) => ContactGroup::system(href, name),
                    None => ContactGroup::new(href, name),
                })
            })
            .collect()
    }

    /// Insert a group, replacing any previous group with the same href
    pub fn insert(&mut self, group: ContactGroup) {
        match self.index.get(&group.href) {
            Some(&pos) => {
                tracing::debug!(
                    "Group {} already known as '{}', replacing with '{}'",
                    group.href,
                    self.groups[pos].name,
                    group.name
                );
                self.groups[pos] = group;
            }
            None => {
                self.index.insert(group.href.clone(), self.groups.len());
                self.groups.push(group);
            }
        }
    }

    /// Merge another account's catalog into this one; later entries win
    pub fn merge(&mut self, other: GroupCatalog) {
        for group in other.groups {
            self.insert(group);
        }
    }

    pub fn get(&self, href: &str) -> Option<&ContactGroup> {
        self.index.get(href).map(|&pos| &self.groups[pos])
    }

    /// Look up a membership href, ignoring system groups
    pub fn resolve(&self, href: &str) -> Option<&ContactGroup> {
        self.get(href).filter(|group| !group.is_system)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<ContactGroup> for GroupCatalog {
    fn from_iter<I: IntoIterator<Item = ContactGroup>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for group in iter {
            catalog.insert(group);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_feed() {
        let feed: GroupFeed = serde_json::from_value(json!({"feed": {"entry": [
            {
                "id": {"$t": "g/6"},
                "title": {"$t": "System Group: My Contacts"},
                "gContact$systemGroup": {"id": "Contacts"}
            },
            {"id": {"$t": "g/7"}, "title": {"$t": "Book Club"}},
            {"title": {"$t": "No Id"}}
        ]}}))
        .unwrap();

        let catalog = GroupCatalog::from_feed(&feed);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("g/6").unwrap().is_system);
        assert!(!catalog.get("g/7").unwrap().is_system);
        assert_eq!(catalog.get("g/7").unwrap().name, "Book Club");
    }

    #[test]
    fn test_resolve_skips_system_groups() {
        let catalog: GroupCatalog = vec![
            ContactGroup::system("g/6", "My Contacts"),
            ContactGroup::new("g/7", "Book Club"),
        ]
        .into_iter()
        .collect();

        assert!(catalog.resolve("g/6").is_none());
        assert_eq!(catalog.resolve("g/7").unwrap().name, "Book Club");
        assert!(catalog.resolve("g/unknown").is_none());
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut first: GroupCatalog = vec![
            ContactGroup::new("g/1", "Work"),
            ContactGroup::new("g/2", "Chess"),
        ]
        .into_iter()
        .collect();
        let second: GroupCatalog = vec![
            ContactGroup::new("g/2", "Go"),
            ContactGroup::new("g/3", "Choir"),
        ]
        .into_iter()
        .collect();

        first.merge(second);

        assert_eq!(first.len(), 3);
        assert_eq!(first.get("g/2").unwrap().name, "Go");
        let order: Vec<_> = first.iter().map(|g| g.href.as_str()).collect();
        assert_eq!(order, vec!["g/1", "g/2", "g/3"]);
    }
}
