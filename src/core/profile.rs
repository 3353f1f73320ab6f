use crate::domain::model::{Allergen, UserAllergenProfile};
use crate::domain::ports::KeyValueStore;

pub const STORAGE_KEY: &str = "@user_allergens";

/// Persists the selected allergen ids under a single key.
///
/// Storage failures never reach the caller: `load` falls back to an empty
/// profile and `save`/`clear` only log.
#[derive(Debug, Clone)]
pub struct ProfileStore<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> ProfileStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn load(&self) -> UserAllergenProfile {
        let raw = match self.storage.get_item(STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return UserAllergenProfile::new(),
            Err(e) => {
                tracing::error!("Error loading allergens from storage: {}", e);
                return UserAllergenProfile::new();
            }
        };

        match serde_json::from_str::<UserAllergenProfile>(&raw) {
            Ok(profile) => {
                tracing::debug!("Loaded {} allergens from storage", profile.len());
                profile
            }
            Err(e) => {
                tracing::error!("Error parsing stored allergens: {}", e);
                UserAllergenProfile::new()
            }
        }
    }

    /// 整個值覆寫，沒有合併
    pub async fn save(&self, profile: &UserAllergenProfile) {
        let payload = match serde_json::to_string(profile) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Error serializing allergens: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set_item(STORAGE_KEY, &payload).await {
            tracing::error!("Error saving allergens to storage: {}", e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.storage.remove_item(STORAGE_KEY).await {
            tracing::error!("Error clearing allergens from storage: {}", e);
        }
    }
}

/// Remove `id` when present, append it otherwise.
pub fn toggle(profile: &UserAllergenProfile, id: &str) -> UserAllergenProfile {
    if profile.contains(id) {
        profile.ids().iter().filter(|existing| *existing != id).cloned().collect()
    } else {
        profile
            .ids()
            .iter()
            .cloned()
            .chain(std::iter::once(id.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    Toggle(String),
    Set(Vec<String>),
    Clear,
}

pub fn reduce(profile: &UserAllergenProfile, action: &ProfileAction) -> UserAllergenProfile {
    match action {
        ProfileAction::Toggle(id) => toggle(profile, id),
        ProfileAction::Set(ids) => {
            let mut unique: Vec<String> = Vec::with_capacity(ids.len());
            for id in ids {
                if !unique.contains(id) {
                    unique.push(id.clone());
                }
            }
            UserAllergenProfile::from(unique)
        }
        ProfileAction::Clear => UserAllergenProfile::new(),
    }
}

/// State container: pure reducer first, persist effect after.
pub struct ProfileState<S: KeyValueStore> {
    store: ProfileStore<S>,
    profile: UserAllergenProfile,
}

impl<S: KeyValueStore> ProfileState<S> {
    pub async fn load(store: ProfileStore<S>) -> Self {
        let profile = store.load().await;
        Self { store, profile }
    }

    pub fn profile(&self) -> &UserAllergenProfile {
        &self.profile
    }

    /// Awaiting the write here keeps saves in dispatch order, so the last write wins.
    pub async fn dispatch(&mut self, action: ProfileAction) -> &UserAllergenProfile {
        self.profile = reduce(&self.profile, &action);
        tracing::debug!(?action, selected = self.profile.len(), "Allergen profile updated");

        match action {
            ProfileAction::Clear => self.store.clear().await,
            _ => self.store.save(&self.profile).await,
        }
        &self.profile
    }
}

/// Settings screen search: case-insensitive name filter, sorted by name.
pub fn filter_catalogue(allergens: &[Allergen], query: &str) -> Vec<Allergen> {
    let query = query.to_lowercase();
    let mut filtered: Vec<Allergen> = allergens
        .iter()
        .filter(|allergen| allergen.name.to_lowercase().contains(&query))
        .cloned()
        .collect();
    filtered.sort_by_key(|allergen| allergen.name.to_lowercase());
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{QsineError, Result};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        items: Arc<Mutex<HashMap<String, String>>>,
        fail_writes: bool,
        fail_reads: bool,
    }

    impl KeyValueStore for MockStorage {
        async fn get_item(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(QsineError::storage("read failed"));
            }
            Ok(self.items.lock().await.get(key).cloned())
        }

        async fn set_item(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(QsineError::storage("disk full"));
            }
            self.items
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove_item(&self, key: &str) -> Result<()> {
            self.items.lock().await.remove(key);
            Ok(())
        }
    }

    fn profile(ids: &[&str]) -> UserAllergenProfile {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_toggle_appends_and_removes() {
        let p = profile(&["milk"]);
        assert_eq!(toggle(&p, "soy"), profile(&["milk", "soy"]));
        assert_eq!(toggle(&p, "milk"), profile(&[]));
    }

    #[test]
    fn test_toggle_twice_restores_profile() {
        let p = profile(&["milk", "soy"]);
        for id in ["peanut", "milk", "soy"] {
            assert_eq!(toggle(&toggle(&p, id), id), p, "toggling {} twice", id);
        }

        // 已存在的 id 會被移到最後，存檔順序改變但集合不變
        let twice = toggle(&toggle(&p, "milk"), "milk");
        assert_eq!(twice.ids(), ["soy", "milk"]);

        let repeated = profile(&["milk", "milk", "soy"]);
        assert_eq!(toggle(&toggle(&repeated, "milk"), "milk"), repeated);
    }

    #[test]
    fn test_set_drops_repeated_ids() {
        let set = reduce(
            &UserAllergenProfile::new(),
            &ProfileAction::Set(vec!["milk".into(), "soy".into(), "milk".into()]),
        );
        assert_eq!(set.ids(), ["milk", "soy"]);
    }

    #[test]
    fn test_reduce_set_and_clear() {
        let p = profile(&["milk"]);
        let set = reduce(&p, &ProfileAction::Set(vec!["egg".into(), "soy".into()]));
        assert_eq!(set, profile(&["egg", "soy"]));
        assert!(reduce(&set, &ProfileAction::Clear).is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_key_is_empty() {
        let store = ProfileStore::new(MockStorage::default());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_value_is_empty() {
        let storage = MockStorage::default();
        storage
            .items
            .lock()
            .await
            .insert(STORAGE_KEY.to_string(), "{not json".to_string());
        let store = ProfileStore::new(storage);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_read_failure_is_empty() {
        let storage = MockStorage {
            fail_reads: true,
            ..Default::default()
        };
        assert!(ProfileStore::new(storage).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_round_trip_keeps_order() {
        let store = ProfileStore::new(MockStorage::default());
        let p = profile(&["soy", "milk"]);
        store.save(&p).await;

        let raw = store.storage().items.lock().await.get(STORAGE_KEY).cloned();
        assert_eq!(raw.as_deref(), Some(r#"["soy","milk"]"#));
        assert_eq!(store.load().await, p);
    }

    #[tokio::test]
    async fn test_dispatch_persists_every_transition() {
        let storage = MockStorage::default();
        let mut state = ProfileState::load(ProfileStore::new(storage.clone())).await;

        state.dispatch(ProfileAction::Toggle("milk".into())).await;
        state.dispatch(ProfileAction::Toggle("soy".into())).await;
        assert_eq!(
            storage.items.lock().await.get(STORAGE_KEY).cloned().as_deref(),
            Some(r#"["milk","soy"]"#)
        );

        state.dispatch(ProfileAction::Clear).await;
        assert!(state.profile().is_empty());
        assert!(storage.items.lock().await.get(STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_profile() {
        let storage = MockStorage {
            fail_writes: true,
            ..Default::default()
        };
        let mut state = ProfileState::load(ProfileStore::new(storage)).await;
        let current = state.dispatch(ProfileAction::Toggle("egg".into())).await;
        assert_eq!(current, &profile(&["egg"]));
    }

    #[test]
    fn test_filter_catalogue_sorts_by_name() {
        let catalogue = vec![
            Allergen { id: "soy".into(), name: "soy".into() },
            Allergen { id: "milk".into(), name: "milk".into() },
            Allergen { id: "nonfat_milk".into(), name: "Nonfat Milk".into() },
        ];
        let filtered = filter_catalogue(&catalogue, "MILK");
        let ids: Vec<&str> = filtered.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["milk", "nonfat_milk"]);
        assert_eq!(filter_catalogue(&catalogue, "").len(), 3);
    }
}
