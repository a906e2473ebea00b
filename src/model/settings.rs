use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UserSettings {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub email_reports_enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SettingsChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_reports_enabled: Option<bool>,
}
