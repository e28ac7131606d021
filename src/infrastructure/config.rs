// Settings loaded from config/dashboard.toml
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_initial_city")]
    pub initial_city: String,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            initial_city: default_initial_city(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_initial_city() -> String {
    "Ahmedabad".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Missing file or missing sections fall back to the serde defaults, so the
/// service starts without any config on disk.
pub fn load_settings() -> anyhow::Result<AppSettings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Build a backend URL from the base, a path, and percent-encoded query
/// pairs. City and zone names contain spaces, so encoding is not optional.
pub fn endpoint_url(base: &str, path: &str, query: &[(&str, String)]) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), path);
    for (i, (key, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}
