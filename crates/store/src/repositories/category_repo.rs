//! Repository for the `categories` table.

use crate::error::StoreError;
use crate::models::category::Category;
use crate::remote::{Filter, OrderBy, RemoteStore};

use super::decode_rows;

pub struct CategoryRepo;

impl CategoryRepo {
    pub const RESOURCE: &'static str = "categories";

    /// All categories ordered by display order (name breaks ties).
    pub async fn list_all(store: &dyn RemoteStore) -> Result<Vec<Category>, StoreError> {
        let rows = store
            .fetch_all(
                Self::RESOURCE,
                &Filter::new(),
                &[OrderBy::asc("display_order"), OrderBy::asc("name")],
            )
            .await?;
        decode_rows(rows)
    }
}
