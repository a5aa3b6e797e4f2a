//! Repository for the `site_settings` key/value table.

use crate::error::StoreError;
use crate::models::site_setting::SiteSetting;
use crate::remote::RemoteStore;

pub struct SiteSettingRepo;

impl SiteSettingRepo {
    pub const RESOURCE: &'static str = "site_settings";

    /// Look a setting up by key. `None` when the key was never saved.
    pub async fn find_by_key(
        store: &dyn RemoteStore,
        key: &str,
    ) -> Result<Option<SiteSetting>, StoreError> {
        match store.fetch_one(Self::RESOURCE, "key", key).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}
