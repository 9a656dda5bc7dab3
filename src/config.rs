use serde::Deserialize;
use std::{env, fs, path::PathBuf, time::Duration};

pub const DEFAULT_OURA_BASE_URL: &str = "https://api.ouraring.com/v2";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Process-wide settings for the provider clients.
///
/// Built once at startup and handed to each client by reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub oura_base_url: String,
    pub oura_token: Option<String>,

    pub weather_base_url: String,
    pub weather_api_key: Option<String>,
    pub default_city: String,
    pub default_country: String,

    pub calendar_base_url: String,
    pub calendar_token_path: PathBuf,

    pub request_timeout_secs: u64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            oura_base_url: DEFAULT_OURA_BASE_URL.to_string(),
            oura_token: None,
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            weather_api_key: None,
            default_city: "London".to_string(),
            default_country: "GB".to_string(),
            calendar_base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
            calendar_token_path: PathBuf::from("calendar_token.json"),
            request_timeout_secs: 30,
        }
    }
}

impl FitnessConfig {
    /// Load the config file (if any), then apply environment overrides.
    pub fn load(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match resolve_config_path(path) {
            Some(path) => {
                tracing::info!("Loading config from {}", path.display());
                let raw = fs::read_to_string(&path)?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config, expanding `${VAR}` references in string values.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(raw)?;
        expand_value(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    fn apply_env(&mut self) {
        if let Some(token) = env_nonempty("OURA_API_KEY").or_else(|| env_nonempty("OURA_TOKEN")) {
            self.oura_token = Some(token);
        }
        if let Some(key) = env_nonempty("OPENWEATHER_API_KEY") {
            self.weather_api_key = Some(key);
        }
        if let Some(city) = env_nonempty("FITNESS_CITY") {
            self.default_city = city;
        }
        if let Some(country) = env_nonempty("FITNESS_COUNTRY") {
            self.default_country = country;
        }
    }

    /// Reject base URLs that do not parse.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (field, value) in [
            ("oura_base_url", &self.oura_base_url),
            ("weather_base_url", &self.weather_base_url),
            ("calendar_base_url", &self.calendar_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| anyhow::anyhow!("`{}` is not a valid URL ({}): {}", field, value, e))?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    if let Ok(p) = env::var("FITNESS_CONFIG") {
        return Some(PathBuf::from(p));
    }

    let candidate = PathBuf::from("fitness.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            match env::var(&name) {
                Ok(val) if closed => out.push_str(&val),
                _ => {
                    out.push_str("${");
                    out.push_str(&name);
                    if closed {
                        out.push('}');
                    }
                }
            }
        } else {
            out.push(ch);
        }
    }

    out
}

fn expand_value(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) => *s = expand_env_vars(s),
        serde_json::Value::Array(items) => items.iter_mut().for_each(expand_value),
        serde_json::Value::Object(map) => map.values_mut().for_each(expand_value),
        _ => {}
    }
}
