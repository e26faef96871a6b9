use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    #[default]
    Gemini,
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAiCompatible => "openai-compatible",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => DEFAULT_GEMINI_BASE_URL,
            ProviderKind::OpenAiCompatible => DEFAULT_OPENAI_BASE_URL,
        }
    }

    /// Environment variable checked first for this provider's API key.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAiCompatible => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
            ProviderKind::OpenAiCompatible => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai-compatible" | "openai" => Ok(ProviderKind::OpenAiCompatible),
            other => Err(format!(
                "unknown provider: {other} (expected gemini or openai-compatible)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        let provider = ProviderKind::default();
        Self {
            provider,
            base_url: provider.default_base_url().into(),
            model: provider.default_model().into(),
            temperature: 0.4,
            request_timeout_secs: 60,
        }
    }
}

impl SolverSettings {
    /// Switches provider and resets endpoint/model to that provider's defaults.
    pub fn switch_provider(&mut self, provider: ProviderKind) {
        if self.provider == provider {
            return;
        }
        self.provider = provider;
        self.base_url = provider.default_base_url().into();
        self.model = provider.default_model().into();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub capture_jpeg_quality: u8,
    pub edit_jpeg_quality: u8,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            capture_jpeg_quality: 80,
            edit_jpeg_quality: 85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub solver: SolverSettings,
    #[serde(default)]
    pub capture: CaptureSettings,
}
