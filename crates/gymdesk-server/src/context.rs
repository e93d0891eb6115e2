//! Wiring of configuration into the permission components.

use std::sync::Arc;

use gymdesk_config::{DefaultGrantConfig, GymdeskConfig, SaveStrategyConfig};
use gymdesk_rbac::{
    EditorResult, Grant, InMemoryPermissionStore, PermissionEditor, PermissionResolver,
    PermissionStore, ResourceCatalog, SaveStrategy, UserDirectory,
};
use gymdesk_types::UserSummary;

use crate::handler::PermissionApi;

/// Shared store handle used by every component of one server.
pub type SharedStore = Arc<dyn PermissionStore>;

/// Components built from one [`GymdeskConfig`].
#[derive(Debug, Clone)]
pub struct ServerContext {
    catalog: Arc<ResourceCatalog>,
    resolver: PermissionResolver,
    store: SharedStore,
    strategy: SaveStrategy,
    show_all_roles: bool,
}

impl ServerContext {
    /// Builds a context backed by an in-memory store.
    pub fn from_config(config: &GymdeskConfig) -> Self {
        let default_grant = grant_from_config(config.permissions.default_grant);
        Self {
            catalog: Arc::new(ResourceCatalog::standard().clone()),
            resolver: PermissionResolver::new().with_default_grant(default_grant),
            store: Arc::new(InMemoryPermissionStore::new()),
            strategy: strategy_from_config(config.permissions.save_strategy),
            show_all_roles: config.editor.show_all_roles,
        }
    }

    /// Replaces the permission store.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = store;
        self
    }

    /// Replaces the resource catalog.
    pub fn with_catalog(mut self, catalog: Arc<ResourceCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.catalog
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn save_strategy(&self) -> SaveStrategy {
        self.strategy
    }

    /// Permission API sharing this context's store and resolver.
    pub fn api(&self) -> PermissionApi<SharedStore> {
        PermissionApi::new(self.store.clone(), self.resolver, self.catalog.clone())
    }

    /// Fresh editor configured with the save strategy and default grant.
    pub fn editor(&self) -> PermissionEditor<SharedStore> {
        PermissionEditor::new(self.catalog.clone(), self.store.clone())
            .with_strategy(self.strategy)
            .with_default_grant(self.resolver.default_grant())
    }

    /// Users the editor may pick, honouring `editor.show_all_roles`.
    pub fn editor_users(
        &self,
        editor: &PermissionEditor<SharedStore>,
        directory: &dyn UserDirectory,
    ) -> EditorResult<Vec<UserSummary>> {
        editor.available_users(directory, self.show_all_roles)
    }
}

fn grant_from_config(config: DefaultGrantConfig) -> Grant {
    Grant::new(config.create, config.read, config.update, config.delete)
}

fn strategy_from_config(config: SaveStrategyConfig) -> SaveStrategy {
    match config {
        SaveStrategyConfig::Transactional => SaveStrategy::Transactional,
        SaveStrategyConfig::FanOut => SaveStrategy::FanOut,
    }
}
