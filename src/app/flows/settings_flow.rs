use crate::core::profile::{filter_catalogue, ProfileAction, ProfileState};
use crate::core::screen::ScreenScope;
use crate::domain::model::{Allergen, UserAllergenProfile};
use crate::domain::ports::{FoodBackend, KeyValueStore};
use crate::utils::error::Result;

/// Allergen selection screen: remote catalogue plus the local profile.
pub struct SettingsFlow<B: FoodBackend, S: KeyValueStore> {
    backend: B,
    state: ProfileState<S>,
    catalogue: Vec<Allergen>,
}

impl<B: FoodBackend, S: KeyValueStore> SettingsFlow<B, S> {
    pub fn new(backend: B, state: ProfileState<S>) -> Self {
        Self {
            backend,
            state,
            catalogue: Vec::new(),
        }
    }

    pub async fn load_catalogue(&mut self, scope: &ScreenScope) -> Result<&[Allergen]> {
        self.catalogue = scope
            .run(self.backend.list_allergens())
            .await
            .inspect_err(|e| tracing::error!("Error initializing settings: {}", e))?;
        tracing::debug!("Loaded {} allergens", self.catalogue.len());
        Ok(&self.catalogue)
    }

    pub fn visible(&self, query: &str) -> Vec<Allergen> {
        filter_catalogue(&self.catalogue, query)
    }

    pub fn profile(&self) -> &UserAllergenProfile {
        self.state.profile()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.state.profile().contains(id)
    }

    pub async fn toggle(&mut self, id: &str) -> &UserAllergenProfile {
        self.state.dispatch(ProfileAction::Toggle(id.to_string())).await
    }

    pub async fn set(&mut self, ids: Vec<String>) -> &UserAllergenProfile {
        self.state.dispatch(ProfileAction::Set(ids)).await
    }

    pub async fn clear(&mut self) -> &UserAllergenProfile {
        self.state.dispatch(ProfileAction::Clear).await
    }

    pub fn into_state(self) -> ProfileState<S> {
        self.state
    }
}
