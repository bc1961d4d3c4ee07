// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub tools: ToolConfig,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    #[serde(default = "default_inference_url")]
    pub base_url: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_audio_model")]
    pub audio_model: String,
    #[serde(default = "default_asr_model")]
    pub asr_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            audio_model: default_audio_model(),
            asr_model: default_asr_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_url")]
    pub base_url: String,
    #[serde(default = "default_knowledge_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_knowledge_url(),
            timeout_secs: default_knowledge_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            tesseract_path: default_tesseract_path(),
        }
    }
}

fn default_bind_addr() -> String { "127.0.0.1:8000".to_string() }
fn default_inference_url() -> String { "https://api-inference.huggingface.co".to_string() }
fn default_text_model() -> String { "roberta-base-openai-detector".to_string() }
fn default_image_model() -> String { "umm-maybe/ai-image-detector".to_string() }
fn default_audio_model() -> String { "superb/wav2vec2-base-superb-ks".to_string() }
fn default_asr_model() -> String { "openai/whisper-base".to_string() }
fn default_timeout_secs() -> u64 { 80 }
fn default_knowledge_url() -> String { "https://en.wikipedia.org".to_string() }
fn default_knowledge_timeout_secs() -> u64 { 15 }
fn default_ffmpeg_path() -> String { "ffmpeg".to_string() }
fn default_tesseract_path() -> String { "tesseract".to_string() }

impl AppConfig {
    /// Apply environment overrides on top of the loaded file config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = env::var("TRUTHGUARD_BIND") {
            if !addr.trim().is_empty() {
                self.server.bind_addr = addr.trim().to_string();
            }
        }
        if let Ok(url) = env::var("TRUTHGUARD_INFERENCE_URL") {
            if !url.trim().is_empty() {
                self.inference.base_url = url.trim().to_string();
            }
        }
        if let Ok(url) = env::var("TRUTHGUARD_KNOWLEDGE_URL") {
            if !url.trim().is_empty() {
                self.knowledge.base_url = url.trim().to_string();
            }
        }
        if let Ok(path) = env::var("TRUTHGUARD_FFMPEG_PATH") {
            if !path.trim().is_empty() {
                self.tools.ffmpeg_path = path.trim().to_string();
            }
        }
        if let Ok(path) = env::var("TRUTHGUARD_TESSERACT_PATH") {
            if !path.trim().is_empty() {
                self.tools.tesseract_path = path.trim().to_string();
            }
        }
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("truthguard"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &PathBuf, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Sort by modification time (oldest first)
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        // Remove oldest entries
        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Get service API key from config file
    pub fn get_api_key(&self, service: &str) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.api_keys.get(service).cloned())
    }

    /// Store service API key in config file
    pub fn set_api_key(&self, service: &str, key: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.insert(service.to_string(), key.to_string());
        self.save(&config)
    }
}

/// Get API key for an external service from environment or config file
pub fn get_api_key(service: &str) -> Option<String> {
    // Try environment variables first
    let env_keys = match service {
        "inference" => vec!["TRUTHGUARD_HF_API_KEY", "HF_API_KEY"],
        _ => vec![],
    };

    for key in env_keys {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    // Try config file
    if let Some(config_dir) = ConfigStore::default_config_dir() {
        let store = ConfigStore::new(config_dir);
        if let Ok(Some(key)) = store.get_api_key(service) {
            return Some(key);
        }
    }

    None
}

/// Load the process configuration: config file first, then env overrides.
pub fn load_config() -> AppConfig {
    let mut config = match ConfigStore::default_config_dir() {
        Some(dir) => ConfigStore::new(dir).load().unwrap_or_else(|e| {
            tracing::warn!("Config load failed, using defaults: {}", e);
            AppConfig::default()
        }),
        None => AppConfig::default(),
    };
    config.apply_env_overrides();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.inference.text_model, "roberta-base-openai-detector");
        assert_eq!(config.tools.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            version: "1.0.0".to_string(),
            ..AppConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "1.0.0");
        assert_eq!(parsed.inference.asr_model, "openai/whisper-base");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"version":"1","server":{"bindAddr":"0.0.0.0:9000"}}"#)
                .unwrap();
        assert_eq!(parsed.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(parsed.knowledge.base_url, "https://en.wikipedia.org");
    }
}
