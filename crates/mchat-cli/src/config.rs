use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mchat_core::models::patient::ExaminerPosition;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MchatConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub region: String,
    /// Bedrock inference profile used for the narrative analysis. Added in
    /// v1; older configs get [`DEFAULT_MODEL_ID`].
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub credentials: CredentialSource,
    /// Where exported reports are written. Defaults to the working directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// TrueType font embedded in PDF exports, for names outside Latin-1.
    #[serde(default)]
    pub pdf_font: Option<PathBuf>,
    /// Pre-filled examiner details for new screenings.
    #[serde(default)]
    pub examiner_name: String,
    #[serde(default)]
    pub examiner_position: ExaminerPosition,
    /// Request the narrative analysis after scoring.
    #[serde(default = "default_true")]
    pub generate_analysis: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MchatConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            credentials: CredentialSource::default(),
            output_dir: None,
            pdf_font: None,
            examiner_name: String::new(),
            examiner_position: ExaminerPosition::default(),
            generate_analysis: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSource {
    Inline {
        access_key_id: String,
        secret_access_key: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        session_token: Option<String>,
    },
    Profile {
        profile_name: String,
    },
    #[default]
    DefaultChain,
}

/// Redacted config info safe to print.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigInfo {
    pub path: String,
    pub region: String,
    pub model_id: String,
    pub credential_type: String,
    pub profile_name: Option<String>,
    pub access_key_hint: Option<String>,
    pub output_dir: Option<String>,
    pub pdf_font: Option<String>,
    pub examiner_name: String,
    pub examiner_position: String,
    pub generate_analysis: bool,
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("mchat").join("config.json"))
}

/// Load the config at `path`, or defaults when the file does not exist.
pub fn load_config(path: &Path) -> eyre::Result<MchatConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(MchatConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: MchatConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update mchat."
        ));
    }

    // v0 → v1: add model_id
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        let missing = obj
            .get("model_id")
            .and_then(|v| v.as_str())
            .is_none_or(str::is_empty);
        if missing {
            obj.insert(
                "model_id".to_string(),
                serde_json::Value::String(DEFAULT_MODEL_ID.to_string()),
            );
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added model_id)");
    }

    Ok(json)
}

pub fn save_config(config: &MchatConfig, path: &Path) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // Set restrictive permissions on Unix before renaming
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

pub fn config_info(config: &MchatConfig, path: &Path) -> ConfigInfo {
    let (credential_type, profile_name, access_key_hint) = match &config.credentials {
        CredentialSource::Inline {
            access_key_id,
            session_token,
            ..
        } => {
            let cred_type = if session_token.is_some() {
                "temporary".to_string()
            } else {
                "inline".to_string()
            };
            (cred_type, None, Some(redact_access_key(access_key_id)))
        }
        CredentialSource::Profile { profile_name } => {
            ("profile".to_string(), Some(profile_name.clone()), None)
        }
        CredentialSource::DefaultChain => ("default_chain".to_string(), None, None),
    };

    ConfigInfo {
        path: path.display().to_string(),
        region: config.region.clone(),
        model_id: config.model_id.clone(),
        credential_type,
        profile_name,
        access_key_hint,
        output_dir: config.output_dir.as_ref().map(|p| p.display().to_string()),
        pdf_font: config.pdf_font.as_ref().map(|p| p.display().to_string()),
        examiner_name: config.examiner_name.clone(),
        examiner_position: config.examiner_position.label().to_string(),
        generate_analysis: config.generate_analysis,
    }
}

fn redact_access_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
