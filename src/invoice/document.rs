use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::{BusinessSettings, Config};
use crate::model::{Customer, Payment, PaymentStatus};
use crate::money::format_money;
use crate::report::Period;

use super::qris::qris_payload;

/// Days between the issue date and the due date.
pub const DUE_DAYS: i64 = 7;

/// Everything an invoice shows. Serialized as the data file the PDF template
/// reads.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InvoiceData {
    pub number: String,
    pub issue_date: String,
    pub due_date: String,
    pub period: String,
    pub business: BusinessSettings,
    pub customer_name: String,
    pub customer_phone: String,
    pub package: String,
    pub paid_on: Option<String>,
    pub status: String,
    pub paid: bool,
    pub nominal: i64,
    pub amount: String,
    pub qris_payload: String,
}

/// `INV` + issue date as `ddMMMyyyy` + the first four characters of the
/// payment id, all upper case. `INV17AUG20243F2A`.
pub fn invoice_number(payment_id: &str, issued: NaiveDate) -> String {
    let prefix: String = payment_id.chars().take(4).collect();
    format!(
        "INV{}{}",
        issued.format("%d%b%Y").to_string().to_uppercase(),
        prefix.to_uppercase()
    )
}

fn long_date(date: NaiveDate) -> String {
    date.format("%d %B %Y").to_string()
}

/// "March 2024"; falls back to the raw numbers for an out-of-range month.
fn period_label(payment: &Payment) -> String {
    match Period::new(payment.year, payment.month) {
        Ok(period) => format!("{} {}", period.label(), payment.year),
        Err(_) => format!("{}/{}", payment.month, payment.year),
    }
}

impl InvoiceData {
    pub fn new(payment: &Payment, customer: &Customer, config: &Config, issued: NaiveDate) -> Self {
        let symbol = &config.business.currency_symbol;
        Self {
            number: invoice_number(&payment.id, issued),
            issue_date: long_date(issued),
            due_date: long_date(issued + Duration::days(DUE_DAYS)),
            period: period_label(payment),
            business: config.business.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            package: customer.package.clone(),
            paid_on: payment.paid_on.map(long_date),
            status: payment.status.to_string(),
            paid: payment.status == PaymentStatus::Paid,
            nominal: payment.nominal,
            amount: format_money(payment.nominal, symbol),
            qris_payload: qris_payload(
                &config.invoice.qris_merchant,
                &config.invoice.qris_city,
                payment.nominal,
            ),
        }
    }
}

/// Local `08xx` numbers become international `628xx`; separators are dropped.
pub fn international_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.strip_prefix('0') {
        Some(rest) => format!("62{rest}"),
        None => digits,
    }
}

pub fn whatsapp_message(invoice: &InvoiceData) -> String {
    format!(
        "Hello {}, here is the invoice for your WiFi payment for {}. Invoice: {}. Total: {}. Thank you!",
        invoice.customer_name, invoice.period, invoice.number, invoice.amount
    )
}

/// `wa.me` link that opens a chat with the customer, message prefilled.
pub fn whatsapp_link(invoice: &InvoiceData) -> String {
    format!(
        "https://wa.me/{}?text={}",
        international_phone(&invoice.customer_phone),
        urlencoding::encode(&whatsapp_message(invoice))
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn for_invoice(invoice: &InvoiceData) -> Self {
        let subject = format!("WiFi Payment Invoice - {}", invoice.number);
        let body = format!(
            "Dear {name},\n\n\
             Here is the invoice for your WiFi service for {period}:\n\n\
             Invoice Number: {number}\n\
             Period: {period}\n\
             Package: {package}\n\
             Total: {amount}\n\
             Status: {status}\n\n\
             Thank you for using our WiFi service.\n\n\
             Regards,\n\
             {business}",
            name = invoice.customer_name,
            period = invoice.period,
            number = invoice.number,
            package = invoice.package,
            amount = invoice.amount,
            status = invoice.status,
            business = invoice.business.name,
        );
        Self { subject, body }
    }

    pub fn mailto_link(&self) -> String {
        format!(
            "mailto:?subject={}&body={}",
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> InvoiceData {
        let config: Config = toml::from_str(crate::config::CONFIG_TEMPLATE).unwrap();
        let customer = Customer {
            id: "c1".into(),
            name: "Budi Santoso".into(),
            address: None,
            phone: "0812-3456-789".into(),
            package: "20 Mbps".into(),
            registered_on: ymd(2024, 1, 2),
            payment_day: 5,
            payment_note: None,
            created_at: None,
        };
        let payment = Payment {
            id: "3f2a9c1e-0000".into(),
            customer_id: "c1".into(),
            month: 8,
            year: 2024,
            paid_on: Some(ymd(2024, 8, 10)),
            nominal: 250_000,
            status: PaymentStatus::Paid,
            created_at: None,
        };
        InvoiceData::new(&payment, &customer, &config, ymd(2024, 8, 17))
    }

    #[test]
    fn number_uses_date_and_id_prefix() {
        assert_eq!(invoice_number("3f2a9c1e", ymd(2024, 8, 17)), "INV17AUG20243F2A");
        assert_eq!(invoice_number("ab", ymd(2024, 1, 5)), "INV05JAN2024AB");
    }

    #[test]
    fn invoice_fields() {
        let invoice = sample();
        assert_eq!(invoice.number, "INV17AUG20243F2A");
        assert_eq!(invoice.due_date, "24 August 2024");
        assert_eq!(invoice.period, "August 2024");
        assert_eq!(invoice.amount, "Rp 250.000");
        assert!(invoice.paid);
        assert!(invoice.qris_payload.ends_with("6304250000"));
    }

    #[test]
    fn whatsapp_link_uses_international_number() {
        let link = whatsapp_link(&sample());
        assert!(link.starts_with("https://wa.me/628123456789?text=Hello%20Budi%20Santoso"));
    }

    #[test]
    fn email_mentions_invoice_number() {
        let email = EmailMessage::for_invoice(&sample());
        assert_eq!(email.subject, "WiFi Payment Invoice - INV17AUG20243F2A");
        assert!(email.body.contains("Package: 20 Mbps"));
        assert!(email.mailto_link().starts_with("mailto:?subject=WiFi%20Payment%20Invoice"));
    }
}
