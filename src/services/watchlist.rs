use std::sync::Arc;

use crate::{
    db::{
        store::{load_json, save_json},
        SharedStore, StorageKey,
    },
    error::{AppError, AppResult},
    models::ContentItem,
    services::{policy::ContentPolicy, profiles::ProfileStore},
};

/// Per-profile saved titles.
///
/// Items are stored as full snapshots. Kid profiles see their list through
/// the content policy; stored entries are never pruned by it.
#[derive(Clone)]
pub struct Watchlist {
    store: SharedStore,
    profiles: ProfileStore,
    policy: Arc<ContentPolicy>,
}

impl Watchlist {
    pub fn new(store: SharedStore, profiles: ProfileStore, policy: Arc<ContentPolicy>) -> Self {
        Self {
            store,
            profiles,
            policy,
        }
    }

    fn key(profile_id: &str) -> StorageKey {
        StorageKey::Watchlist(profile_id.to_string())
    }

    fn stored(&self, profile_id: &str) -> Vec<ContentItem> {
        load_json(self.store.as_ref(), &Self::key(profile_id)).unwrap_or_default()
    }

    /// Appends `item` unless an entry with the same id is already saved
    pub fn add(&self, profile_id: &str, item: ContentItem) -> AppResult<()> {
        let mut items = self.stored(profile_id);
        if items.iter().any(|i| i.id == item.id) {
            return Err(AppError::AlreadyInList(item.id));
        }

        tracing::info!(profile_id = %profile_id, item_id = item.id, "Added to watchlist");
        items.push(item);
        save_json(self.store.as_ref(), &Self::key(profile_id), &items)
    }

    /// Removes the entry with `item_id`; absent ids are ignored
    pub fn remove(&self, profile_id: &str, item_id: u64) -> AppResult<()> {
        let mut items = self.stored(profile_id);
        let Some(position) = items.iter().position(|i| i.id == item_id) else {
            return Ok(());
        };

        items.remove(position);
        tracing::info!(profile_id = %profile_id, item_id, "Removed from watchlist");
        save_json(self.store.as_ref(), &Self::key(profile_id), &items)
    }

    /// The profile's saved items in insertion order, policy-filtered for kids
    pub fn list(&self, profile_id: &str) -> Vec<ContentItem> {
        let Some(owner) = self.profiles.get(profile_id) else {
            tracing::debug!(profile_id = %profile_id, "Watchlist requested for unknown profile");
            return Vec::new();
        };
        self.policy.filter(self.stored(profile_id), owner.is_kid)
    }

    pub fn contains(&self, profile_id: &str, item_id: u64) -> bool {
        self.stored(profile_id).iter().any(|i| i.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{KeyValueStore, MemoryStore};
    use crate::services::policy::genres::{ANIMATION, HORROR};

    fn item(id: u64, genre_ids: Vec<u32>) -> ContentItem {
        ContentItem {
            id,
            title: format!("Title {}", id),
            overview: String::new(),
            genre_ids,
            vote_average: 6.5,
            adult: false,
            release_date: None,
            poster_path: None,
            backdrop_path: None,
            original_language: None,
        }
    }

    fn setup() -> (Watchlist, ProfileStore, Arc<MemoryStore>) {
        let backing = Arc::new(MemoryStore::new());
        let profiles = ProfileStore::new(backing.clone()).unwrap();
        let watchlist = Watchlist::new(
            backing.clone(),
            profiles.clone(),
            Arc::new(ContentPolicy::default()),
        );
        (watchlist, profiles, backing)
    }

    #[test]
    fn test_duplicate_add_keeps_one_entry() {
        let (watchlist, profiles, _) = setup();
        let sam = profiles.create_profile("Sam").unwrap();

        watchlist.add(&sam.id, item(7, vec![ANIMATION])).unwrap();
        assert!(matches!(
            watchlist.add(&sam.id, item(7, vec![ANIMATION])),
            Err(AppError::AlreadyInList(7))
        ));

        let listed = watchlist.list(&sam.id);
        assert_eq!(listed.iter().filter(|i| i.id == 7).count(), 1);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let (watchlist, profiles, _) = setup();
        let sam = profiles.create_profile("Sam").unwrap();
        for id in [3, 1, 2] {
            watchlist.add(&sam.id, item(id, vec![HORROR])).unwrap();
        }

        let ids: Vec<u64> = watchlist.list(&sam.id).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_present_and_absent() {
        let (watchlist, profiles, _) = setup();
        let sam = profiles.create_profile("Sam").unwrap();
        watchlist.add(&sam.id, item(1, vec![ANIMATION])).unwrap();

        watchlist.remove(&sam.id, 99).unwrap();
        assert!(watchlist.contains(&sam.id, 1));

        watchlist.remove(&sam.id, 1).unwrap();
        assert!(watchlist.list(&sam.id).is_empty());
    }

    #[test]
    fn test_kid_view_is_filtered_but_storage_is_not() {
        let (watchlist, _, backing) = setup();
        watchlist.add("kid", item(1, vec![ANIMATION])).unwrap();
        watchlist.add("kid", item(2, vec![HORROR])).unwrap();

        let visible: Vec<u64> = watchlist.list("kid").iter().map(|i| i.id).collect();
        assert_eq!(visible, vec![1]);

        assert!(watchlist.contains("kid", 2));
        let raw = backing.get("myList_kid").unwrap().unwrap();
        let stored: Vec<ContentItem> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_lists_are_scoped_per_profile() {
        let (watchlist, profiles, _) = setup();
        let sam = profiles.create_profile("Sam").unwrap();
        watchlist.add(&sam.id, item(1, vec![ANIMATION])).unwrap();

        assert!(watchlist.list("kid").is_empty());
        assert_eq!(watchlist.list(&sam.id).len(), 1);
    }

    #[test]
    fn test_unknown_profile_lists_nothing() {
        let (watchlist, _, _) = setup();
        watchlist.add("ghost", item(1, vec![ANIMATION])).unwrap();
        assert!(watchlist.list("ghost").is_empty());
    }

    #[test]
    fn test_detail_shaped_snapshot_is_filtered_correctly() {
        let (watchlist, _, backing) = setup();
        backing
            .set(
                "myList_kid",
                r#"[{"id": 5, "title": "It", "genres": [{"id": 27, "name": "Horror"}], "vote_average": 6.0}]"#,
            )
            .unwrap();

        assert!(watchlist.list("kid").is_empty());
        assert!(watchlist.contains("kid", 5));
    }
}
