use serde::{Deserialize, Serialize};

/// Environment variable that overrides `[backend] anon_key`.
pub const API_KEY_ENV: &str = "ISP_LEDGER_ANON_KEY";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub business: BusinessSettings,
    pub backend: BackendSettings,
    pub output: OutputSettings,
    #[serde(default)]
    pub invoice: InvoiceSettings,
    #[serde(default)]
    pub demo: DemoSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BusinessSettings {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "Rp".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Remote,
    #[default]
    Local,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendSettings {
    #[serde(default)]
    pub mode: StoreMode,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    15
}

impl BackendSettings {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.anon_key.clone().filter(|k| !k.is_empty()))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OutputSettings {
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceSettings {
    #[serde(default = "default_merchant")]
    pub qris_merchant: String,
    #[serde(default = "default_city")]
    pub qris_city: String,
}

fn default_merchant() -> String {
    "WiFi Manager Indonesia".to_string()
}

fn default_city() -> String {
    "Jakarta".to_string()
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            qris_merchant: default_merchant(),
            qris_city: default_city(),
        }
    }
}

/// Demo-account login. Off unless explicitly enabled.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct DemoSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
