//! Repository for the `vr_entries` table.

use crate::error::StoreError;
use crate::models::vr_entry::VrEntry;
use crate::remote::{Filter, OrderBy, RemoteStore};

use super::decode_rows;

pub struct VrEntryRepo;

impl VrEntryRepo {
    pub const RESOURCE: &'static str = "vr_entries";

    pub async fn list_all(store: &dyn RemoteStore) -> Result<Vec<VrEntry>, StoreError> {
        let rows = store
            .fetch_all(
                Self::RESOURCE,
                &Filter::new(),
                &[OrderBy::asc("display_order"), OrderBy::asc("title")],
            )
            .await?;
        decode_rows(rows)
    }
}
