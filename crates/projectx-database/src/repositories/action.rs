use tracing::debug;

use projectx_core::{AppError, AppResult};
use projectx_core::types::SortDirection;
use projectx_entity::ValueKind;
use projectx_entity::action::model::ACTION;

use super::base::CriteriaRepository;
use crate::criteria::ActionFilter;
use crate::query::{OrderTerm, Predicate, Projection, Scope, Select, Selected};
use crate::store::Store;

pub type ActionRepository = CriteriaRepository<ActionFilter>;

impl CriteriaRepository<ActionFilter> {
    /// Distinct page names registered for an application, in name order.
    pub async fn select_pages<S: Store + ?Sized>(
        &self,
        store: &mut S,
        app_name: &str,
    ) -> AppResult<Vec<String>> {
        let mut scope = Scope::new();
        let root = scope.bind(&ACTION);
        let page = root.col("page");
        let select = Select::new(
            root.clone(),
            Projection::Columns(vec![Selected {
                column: page.clone(),
                kind: ValueKind::Text,
            }]),
        )
        .distinct()
        .filter(Some(Predicate::eq(root.col("app_name"), app_name)))
        .order_by(vec![OrderTerm::column(page, SortDirection::Asc)]);

        let pages = store
            .fetch(&select)
            .await?
            .into_iter()
            .map(|row| match row.into_iter().next() {
                Some(value) => value
                    .as_text()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::internal("Action page is NULL")),
                None => Err(AppError::internal("Page query returned an empty row")),
            })
            .collect::<AppResult<Vec<_>>>()?;
        debug!(app_name, count = pages.len(), "Selected action pages");
        Ok(pages)
    }
}
