use std::{path::PathBuf, sync::LazyLock};

use platform_dirs::AppDirs;

use shared::storage::{GeneralStorage, RawStorage};

pub const APP_NAME: &str = "campaigns";

pub static FALLBACK_DATA_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    let mut path = PathBuf::new();
    path.push(APP_NAME);
    path
});

/// Per-user persisted state, the native counterpart of `localStorage`.
#[derive(Debug, Clone)]
pub struct Storage {
    base_path: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        let data_dir = AppDirs::new(Some(APP_NAME), false)
            .map_or(FALLBACK_DATA_PATH.to_path_buf(), |dirs| dirs.data_dir);
        Self {
            base_path: data_dir,
        }
    }
}

macro_rules! storage_key {
    ($vis:vis [ $store_fn:ident, $load_fn:ident, $remove_fn:ident $(,)? ], $key:ident $(,)?) => {
        $vis fn $store_fn(&self, raw: &str) -> bool {
            self.set_item(&Self::$key, raw)
        }

        $vis fn $load_fn(&self) -> Option<String> {
            self.get_item(&Self::$key)
        }

        $vis fn $remove_fn(&self) -> bool {
            self.remove(&Self::$key)
        }
    };
}

impl RawStorage for Storage {
    fn get_base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl GeneralStorage for Storage {}

impl Storage {
    pub const ACCESS_TOKEN_KEY: &str = "accessToken";

    pub fn at(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    storage_key!(
        pub [
            store_access_token,
            load_access_token,
            remove_access_token,
        ],
        ACCESS_TOKEN_KEY,
    );
}
