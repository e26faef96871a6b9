use anyhow::Context;
use studybuddy_core::config::ProviderKind;

/// Keyring service name. Must stay stable or stored keys are orphaned.
const SERVICE: &str = "studybuddy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKey {
    GeminiApiKey,
    OpenAiCompatibleApiKey,
}

impl SecretKey {
    pub fn for_provider(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::Gemini => SecretKey::GeminiApiKey,
            ProviderKind::OpenAiCompatible => SecretKey::OpenAiCompatibleApiKey,
        }
    }

    fn user(self) -> &'static str {
        match self {
            SecretKey::GeminiApiKey => "gemini_api_key",
            SecretKey::OpenAiCompatibleApiKey => "openai_compatible_api_key",
        }
    }

    /// Environment variables checked before the keyring, in order.
    pub fn env_vars(self) -> &'static [&'static str] {
        match self {
            SecretKey::GeminiApiKey => &["GEMINI_API_KEY", "API_KEY"],
            SecretKey::OpenAiCompatibleApiKey => &["OPENAI_API_KEY"],
        }
    }
}

pub fn set_secret(key: SecretKey, value: &str) -> anyhow::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.user()).context("create keyring entry")?;
    entry.set_password(value).context("set secret")
}

pub fn get_secret(key: SecretKey) -> anyhow::Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE, key.user()).context("create keyring entry")?;

    match entry.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)).context("get secret"),
    }
}

pub fn delete_secret(key: SecretKey) -> anyhow::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.user()).context("create keyring entry")?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)).context("delete secret"),
    }
}

/// First non-blank value among `key`'s environment variables.
pub fn env_api_key_with(key: SecretKey, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    key.env_vars()
        .iter()
        .filter_map(|&name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Environment first, then the OS keyring.
///
/// A keyring that cannot be reached (headless CI, no secret service) is logged and treated
/// as "no key" so the caller reports a missing credential instead of failing to start.
pub fn resolve_api_key(key: SecretKey) -> Option<String> {
    if let Some(v) = env_api_key_with(key, |name| std::env::var(name).ok()) {
        return Some(v);
    }

    match get_secret(key) {
        Ok(v) => v.filter(|v| !v.trim().is_empty()),
        Err(e) => {
            log::warn!("keyring unavailable for {}: {e:#}", key.user());
            None
        }
    }
}
