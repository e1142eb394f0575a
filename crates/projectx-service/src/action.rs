//! Action lookups for menus and page permissions.

use std::collections::BTreeSet;

use tracing::debug;

use projectx_core::{AppError, AppResult};
use projectx_database::criteria::{ActionCriteria, RoleCriteria};
use projectx_database::repositories::ActionRepository;
use projectx_database::{FetchGraph, RepositoryPolicy, Store};
use projectx_entity::action::ActionType;
use projectx_entity::action::model::ACTION;

/// Handles read-side action queries.
#[derive(Debug, Clone)]
pub struct ActionService {
    /// Action repository.
    actions: ActionRepository,
}

impl ActionService {
    /// Creates an action service.
    pub fn new(policy: RepositoryPolicy) -> Self {
        Self {
            actions: ActionRepository::new(policy),
        }
    }

    /// The underlying action repository.
    pub fn repository(&self) -> &ActionRepository {
        &self.actions
    }

    /// Distinct page names of an application, ascending.
    pub async fn select_pages<S: Store + ?Sized>(
        &self,
        store: &mut S,
        app_name: &str,
    ) -> AppResult<Vec<String>> {
        self.actions.select_pages(store, app_name).await
    }

    /// Action names a user holding `role_ids` may use: every main action of
    /// the application, followed by the sub actions of `page` when a page is
    /// given.
    ///
    /// A user with no roles gets nothing.
    pub async fn available_actions_for_user<S: Store + ?Sized>(
        &self,
        store: &mut S,
        page: Option<&str>,
        app_name: &str,
        role_ids: &BTreeSet<i64>,
    ) -> AppResult<Vec<String>> {
        if app_name.trim().is_empty() {
            return Err(AppError::validation("Application name is required"));
        }
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let graph = FetchGraph::none(&ACTION);
        let held = || {
            RoleCriteria::builder()
                .include_ids(role_ids.iter().copied())
                .build()
        };

        let main = ActionCriteria::builder()
            .action_type(ActionType::Main)
            .app_name(app_name)
            .role(held()?)
            .build()?;
        let mut names: Vec<String> = self
            .actions
            .find_all(store, &main, &graph)
            .await?
            .into_iter()
            .map(|action| action.action_name)
            .collect();

        if let Some(page) = page.map(str::trim).filter(|page| !page.is_empty()) {
            let sub = ActionCriteria::builder()
                .action_type(ActionType::Sub)
                .app_name(app_name)
                .page_name(page)
                .role(held()?)
                .build()?;
            let actions = self.actions.find_all(store, &sub, &graph).await?;
            names.extend(actions.into_iter().map(|action| action.action_name));
        }

        debug!(app_name, ?page, roles = role_ids.len(), actions = names.len(), "Available actions");
        Ok(names)
    }
}
