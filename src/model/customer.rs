use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "alamat", default)]
    pub address: Option<String>,
    #[serde(rename = "no_hp")]
    pub phone: String,
    #[serde(rename = "paket")]
    pub package: String,
    #[serde(rename = "tgl_registrasi")]
    pub registered_on: NaiveDate,
    /// Day of month the customer usually pays (1-31).
    #[serde(rename = "tanggal_bayar_biasa", default = "default_payment_day")]
    pub payment_day: u32,
    #[serde(rename = "catatan_pembayaran", default)]
    pub payment_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_payment_day() -> u32 {
    1
}

impl Customer {
    /// Case-insensitive match on name, or substring match on phone.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty()
            || self.name.to_lowercase().contains(&term.to_lowercase())
            || self.phone.contains(term)
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewCustomer {
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "alamat")]
    pub address: String,
    #[serde(rename = "no_hp")]
    pub phone: String,
    #[serde(rename = "paket")]
    pub package: String,
    #[serde(rename = "tgl_registrasi")]
    pub registered_on: NaiveDate,
    #[serde(rename = "tanggal_bayar_biasa")]
    pub payment_day: u32,
    #[serde(rename = "catatan_pembayaran")]
    pub payment_note: String,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct CustomerChanges {
    #[serde(rename = "nama", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "alamat", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "no_hp", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "paket", skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(rename = "tgl_registrasi", skip_serializing_if = "Option::is_none")]
    pub registered_on: Option<NaiveDate>,
    #[serde(rename = "tanggal_bayar_biasa", skip_serializing_if = "Option::is_none")]
    pub payment_day: Option<u32>,
    #[serde(rename = "catatan_pembayaran", skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,
}

impl CustomerChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
