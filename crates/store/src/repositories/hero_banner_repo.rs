//! Repository for the `hero_banners` table.

use crate::error::StoreError;
use crate::models::hero_banner::HeroBanner;
use crate::remote::{Filter, OrderBy, RemoteStore};

use super::decode_rows;

pub struct HeroBannerRepo;

impl HeroBannerRepo {
    pub const RESOURCE: &'static str = "hero_banners";

    /// Active banners in carousel order.
    pub async fn list_active(store: &dyn RemoteStore) -> Result<Vec<HeroBanner>, StoreError> {
        let rows = store
            .fetch_all(
                Self::RESOURCE,
                &Filter::new().eq("is_active", true),
                &[OrderBy::asc("display_order")],
            )
            .await?;
        decode_rows(rows)
    }
}
