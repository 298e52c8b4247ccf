use std::{path::PathBuf, sync::LazyLock};

use platform_dirs::AppDirs;
use shared::{
    storage::{GeneralStorage, RawStorage},
    types::{Campaign, CampaignId},
};

use crate::storage::APP_NAME;

pub static FALLBACK_CACHE_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    let mut path = PathBuf::new();
    path.push(APP_NAME);
    path.push("cache");
    path
});

const CAMPAIGN_LIST_FILE: &str = "campaigns.bin";

/// Last fetched campaigns, shown when the service can't be reached.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    base_path: PathBuf,
}

impl Default for CacheStorage {
    fn default() -> Self {
        let cache_dir = AppDirs::new(Some(APP_NAME), false)
            .map_or(FALLBACK_CACHE_PATH.to_path_buf(), |dirs| dirs.cache_dir);
        Self {
            base_path: cache_dir,
        }
    }
}

impl RawStorage for CacheStorage {
    fn get_base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl GeneralStorage for CacheStorage {}

impl CacheStorage {
    pub fn at(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn campaign_file(id: &CampaignId) -> String {
        // Ids come from the server; keep them from escaping the cache dir.
        let id: String = id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("campaign-{id}.bin")
    }

    pub fn store_campaign_list(&self, campaigns: &[Campaign]) -> bool {
        self.store(&CAMPAIGN_LIST_FILE, &campaigns)
    }

    pub fn load_campaign_list(&self) -> Option<Vec<Campaign>> {
        self.load(&CAMPAIGN_LIST_FILE)
    }

    pub fn store_campaign(&self, campaign: &Campaign) -> bool {
        self.store(&Self::campaign_file(&campaign.id), campaign)
    }

    pub fn load_campaign(&self, id: &CampaignId) -> Option<Campaign> {
        self.load(&Self::campaign_file(id))
    }

    /// Drops everything cached; used on logout.
    pub fn clear(&self) -> bool {
        match std::fs::remove_dir_all(&self.base_path) {
            Ok(()) => true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(err) => {
                tracing::error!("Unexpected error while clearing cache {:?}: {err}", self.base_path);
                false
            }
        }
    }
}
