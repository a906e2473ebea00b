mod document;
mod qris;

pub use document::{
    international_phone, invoice_number, whatsapp_link, whatsapp_message, EmailMessage,
    InvoiceData, DUE_DAYS,
};
pub use qris::{qr_svg, qris_payload};

use std::path::{Path, PathBuf};

/// Where the PDF for `invoice` goes inside the output directory.
pub fn invoice_path(output_dir: &Path, invoice: &InvoiceData) -> PathBuf {
    output_dir.join(format!("{}.pdf", invoice.number))
}
