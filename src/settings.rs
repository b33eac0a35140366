use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::sshconfig::parse_port;

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const SETTINGS_FILE: &str = "settings";

pub const DEFAULT_USER: &str = "admin";
pub const DEFAULT_PORT: u16 = 22;

/// Defaults used by the add wizard and the locations of the files it edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub default_user: String,
    pub default_port: u16,
    pub config_file: PathBuf,
    pub key_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    DefaultUser,
    DefaultPort,
    ConfigFile,
    SshKeyDir,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::DefaultUser,
        SettingKey::DefaultPort,
        SettingKey::ConfigFile,
        SettingKey::SshKeyDir,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::DefaultUser => "DEFAULT-USER",
            SettingKey::DefaultPort => "DEFAULT-PORT",
            SettingKey::ConfigFile => "CONFIG-FILE",
            SettingKey::SshKeyDir => "SSH-KEY-DIR",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownSetting(s.to_string()))
    }
}

impl Settings {
    /// Defaults rooted at `home`: `~/.ssh/config` and `~/.ssh/keys`.
    pub fn with_home<P: AsRef<Path>>(home: P) -> Self {
        let ssh_dir = home.as_ref().join(".ssh");
        Self {
            default_user: DEFAULT_USER.to_string(),
            default_port: DEFAULT_PORT,
            config_file: ssh_dir.join("config"),
            key_dir: ssh_dir.join("keys"),
        }
    }

    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::with_home(home))
    }

    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::DefaultUser => self.default_user.clone(),
            SettingKey::DefaultPort => self.default_port.to_string(),
            SettingKey::ConfigFile => self.config_file.display().to_string(),
            SettingKey::SshKeyDir => self.key_dir.display().to_string(),
        }
    }

    /// Updates one value. A leading `~/` in paths is expanded.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            SettingKey::DefaultUser => {
                if value.is_empty() || value.contains(char::is_whitespace) {
                    return Err(Error::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.default_user = value.to_string();
            }
            SettingKey::DefaultPort => self.default_port = parse_port(value)?,
            SettingKey::ConfigFile => self.config_file = expand_home(value)?,
            SettingKey::SshKeyDir => self.key_dir = expand_home(value)?,
        }
        Ok(())
    }
}

fn expand_home(value: &str) -> Result<PathBuf> {
    match value.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(rest)),
        None => Ok(PathBuf::from(value)),
    }
}

/// Settings persisted between runs, stored with bincode.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: PathBuf::from(path.as_ref()),
        }
    }

    /// `<config dir>/sshwiz/settings`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(Error::NoHomeDir)?;
        Ok(config_dir.join(CRATE_NAME).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved settings, or the defaults if nothing was saved yet.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Settings::from_env();
        }

        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let settings = bincode::deserialize_from(file)?;
        debug!(path = %self.path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let data = bincode::serialize(settings)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        file.write_all(&data)
            .map_err(|e| Error::io(&self.path, e))?;
        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::with_home("/home/me");
        assert_eq!(settings.default_user, "admin");
        assert_eq!(settings.default_port, 22);
        assert_eq!(settings.config_file, PathBuf::from("/home/me/.ssh/config"));
        assert_eq!(settings.key_dir, PathBuf::from("/home/me/.ssh/keys"));
    }

    #[test]
    fn test_key_names() {
        assert_eq!(
            "DEFAULT-PORT".parse::<SettingKey>().unwrap(),
            SettingKey::DefaultPort
        );
        assert_eq!(
            "ssh-key-dir".parse::<SettingKey>().unwrap(),
            SettingKey::SshKeyDir
        );
        assert!(matches!(
            "COLOR".parse::<SettingKey>(),
            Err(Error::UnknownSetting(_))
        ));
    }

    #[test]
    fn test_set_values() {
        let mut settings = Settings::with_home("/home/me");
        settings.set(SettingKey::DefaultUser, "deploy").unwrap();
        settings.set(SettingKey::DefaultPort, "2222").unwrap();
        settings.set(SettingKey::ConfigFile, "/tmp/config").unwrap();

        assert_eq!(settings.get(SettingKey::DefaultUser), "deploy");
        assert_eq!(settings.default_port, 2222);
        assert_eq!(settings.config_file, PathBuf::from("/tmp/config"));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut settings = Settings::with_home("/home/me");
        assert!(settings.set(SettingKey::DefaultPort, "abc").is_err());
        assert!(settings.set(SettingKey::DefaultUser, "two words").is_err());
        assert_eq!(settings, Settings::with_home("/home/me"));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join(CRATE_NAME).join("settings"));

        let mut settings = Settings::with_home(dir.path());
        settings.default_user = "ops".to_string();
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings");
        fs::write(&path, b"\xff").unwrap();

        let store = SettingsStore::new(&path);
        assert!(matches!(store.load(), Err(Error::Settings(_))));
    }
}
