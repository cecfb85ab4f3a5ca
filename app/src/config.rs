use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub port: u16,
    pub watch_folder: PathBuf,
    pub uploads_dir: PathBuf,
    pub db_path: PathBuf,
    pub drive_folder_id: Option<String>,
    pub sync_interval_secs: u64,
}

pub struct AppConfigOverrides {
    pub log_level: Option<String>,
    pub port: Option<u16>,
    pub watch_folder: Option<PathBuf>,
    pub uploads_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub drive_folder_id: Option<String>,
    pub sync_interval_secs: Option<u64>,
}

fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".galleria")
}

impl AppConfig {
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut builder = config::Config::builder();
        let path = match path {
            Some(p) => p,
            None => data_dir().join("config"),
        };
        builder = builder.add_source(config::File::from(path).required(false));
        let cfg = builder.build().unwrap_or_default();

        let log_level = cfg
            .get_string("log_level")
            .unwrap_or_else(|_| "info".to_string());
        let port = cfg.get_int("port").unwrap_or(3000) as u16;
        let watch_folder = cfg
            .get_string("watch_folder")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir().join("watch"));
        let uploads_dir = cfg
            .get_string("uploads_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir().join("uploads"));
        let db_path = cfg
            .get_string("db_path")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir().join("photos.sqlite"));
        let drive_folder_id = cfg.get_string("drive_folder_id").ok();
        let sync_interval_secs = cfg.get_int("sync_interval_secs").unwrap_or(30) as u64;

        Self {
            log_level,
            port,
            watch_folder,
            uploads_dir,
            db_path,
            drive_folder_id,
            sync_interval_secs,
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(l) = &ov.log_level {
            self.log_level = l.clone();
        }
        if let Some(p) = ov.port {
            self.port = p;
        }
        if let Some(w) = &ov.watch_folder {
            self.watch_folder = w.clone();
        }
        if let Some(u) = &ov.uploads_dir {
            self.uploads_dir = u.clone();
        }
        if let Some(d) = &ov.db_path {
            self.db_path = d.clone();
        }
        if let Some(f) = &ov.drive_folder_id {
            self.drive_folder_id = Some(f.clone());
        }
        if let Some(s) = ov.sync_interval_secs {
            self.sync_interval_secs = s;
        }
        self
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = match path {
            Some(p) => p,
            None => data_dir().join("config"),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}
