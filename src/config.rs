use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

pub const LABEL_FILE_NAME: &str = "shipping-labels.pdf";

pub const DB_PATH_ENV: &str = "WMS_DB_PATH";
pub const OWNER_ID_ENV: &str = "WMS_OWNER_ID";

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "wms", "wms-ingest")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("inventory.sqlite"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub owner_id: Option<String>,
}

impl Settings {
    pub fn resolve(db_path: Option<PathBuf>, owner_id: Option<String>) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };
        let owner_id = owner_id
            .map(|owner| owner.trim().to_string())
            .filter(|owner| !owner.is_empty());
        Ok(Self { db_path, owner_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_db_path_uses_app_directory() {
        let path = default_db_path().expect("should resolve db path");
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("inventory.sqlite")
        );
    }

    #[test]
    fn explicit_db_path_wins_and_blank_owner_is_dropped() {
        let settings = Settings::resolve(Some(PathBuf::from("/tmp/x.sqlite")), Some("  ".into()))
            .expect("should resolve settings");
        assert_eq!(settings.db_path, PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(settings.owner_id, None);
    }
}
