use qrcode::render::svg;
use qrcode::QrCode;

use crate::error::{AppError, Result};

// Merchant account information blocks (tags 26 and 51), category, currency
// and country. Fixed for the operator's static QRIS registration.
const QRIS_HEAD: &str = "00020101021226580014ID.CO.QRIS.WWW0215ID20232912345670303UMI51440014ID.CO.QRIS.WWW02150000000000000000303UMI5204481253033605802ID";
const QRIS_POSTAL: &str = "610512340";
const QRIS_TERMINAL: &str = "62070703A01";

fn tlv(tag: &str, value: &str, max: usize) -> String {
    let value: String = value.chars().take(max).collect();
    format!("{tag}{:02}{value}", value.chars().count())
}

/// Static QRIS payload for `nominal`. The trailing field carries the amount
/// so the payer's app prefills it.
pub fn qris_payload(merchant: &str, city: &str, nominal: i64) -> String {
    format!(
        "{QRIS_HEAD}{}{}{QRIS_POSTAL}{QRIS_TERMINAL}6304{nominal}",
        tlv("59", merchant, 25),
        tlv("60", city, 15),
    )
}

/// Render `payload` as an SVG QR code.
pub fn qr_svg(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes()).map_err(|e| AppError::QrCode(e.to_string()))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .quiet_zone(true)
        .build())
}
