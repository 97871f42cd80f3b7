use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use kotoba_config::Config;
use serde::{Deserialize, Serialize};

/// Load a config file as written by hand
fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    tracing::info!(path = %path.display(), "Loading config file");
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

/// `$KOTOBA_CONFIG_DIR`, else `$XDG_CONFIG_HOME/kotoba`, else `~/.config/kotoba`
pub fn config_root() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("KOTOBA_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("kotoba"));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("kotoba"))
}

fn profiles_dir() -> Option<PathBuf> {
    config_root().map(|root| root.join("profiles"))
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)?;
    Ok(profile.value)
}

/// Load a user profile by name, defaulting to main if name not found
pub fn load_user_profile(name: &str) -> anyhow::Result<Config> {
    let Some(dir) = profiles_dir() else {
        tracing::warn!("No config directory, using environment defaults");
        return Ok(Config::new());
    };

    let profile_file = dir.join(format!("{name}.json"));
    if profile_file.exists() {
        return read_profile(&profile_file);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
    let main_file = dir.join("main.json");
    if main_file.exists() {
        read_profile(&main_file)
    } else {
        Ok(Config::new())
    }
}

/// Save `config` as a named profile
pub fn save_profile(name: &str, config: &Config) -> anyhow::Result<PathBuf> {
    let dir = profiles_dir().ok_or_else(|| anyhow::anyhow!("no config directory"))?;
    fs::create_dir_all(&dir)?;
    let profile = Profile {
        name: name.into(),
        value: config.clone(),
    };
    let file = dir.join(format!("{name}.json"));
    fs::write(&file, serde_json::to_string_pretty(&profile)?)?;
    tracing::info!("Saved profile: {name}");
    Ok(file)
}

/// An explicit config file wins over a profile; environment defaults fill
/// in dictionaries a file leaves out
pub fn load(config_file: Option<&Path>, profile: Option<&str>) -> anyhow::Result<Config> {
    let mut config = match config_file {
        Some(path) => load_config_file(path)?,
        None => load_user_profile(profile.unwrap_or("main"))?,
    };

    if config.dictionaries.is_empty() {
        config.dictionaries = Config::new().dictionaries;
    }
    Ok(config)
}
