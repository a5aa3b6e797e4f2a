use vizfolio_core::settings::GallerySettings;
use vizfolio_store::repositories::SiteSettingRepo;
use vizfolio_store::RemoteStore;

/// Read the gallery settings row once.
///
/// Never fails: an unreachable store or a missing key yields the defaults.
pub async fn load_gallery_settings(store: &dyn RemoteStore, key: &str) -> GallerySettings {
    match SiteSettingRepo::find_by_key(store, key).await {
        Ok(Some(setting)) => GallerySettings::from_json(&setting.value),
        Ok(None) => {
            tracing::debug!(key, "No gallery settings saved, using defaults");
            GallerySettings::default()
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to load gallery settings, using defaults");
            GallerySettings::default()
        }
    }
}
