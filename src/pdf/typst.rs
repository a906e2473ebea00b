use std::path::Path;
use std::process::Command;

use crate::error::{AppError, Result};
use crate::invoice::{qr_svg, InvoiceData};

/// Embedded Typst template for invoices.
/// Reads `data.json` and `qr.svg` from its own directory.
const INVOICE_TEMPLATE: &str = r##"// Invoice Template

#let data = json("data.json")

#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
)

#set text(font: "Helvetica", size: 10pt)

// Header with business info and invoice status
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [
    #text(size: 18pt, weight: "bold")[#data.business.name]
    #v(0.3em)
    Internet Service Provider
    #if data.business.address != none [
      \ #data.business.address
    ]
    #if data.business.phone != none [
      \ Tel: #data.business.phone
    ]
    #if data.business.email != none [
      \ #data.business.email
    ]
  ],
  [
    #text(size: 24pt, weight: "bold")[INVOICE]
    #v(0.5em)
    #if data.paid [
      #text(fill: rgb("#15803d"), weight: "bold")[PAID]
    ] else [
      #text(fill: rgb("#b91c1c"), weight: "bold")[UNPAID]
    ]
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

#grid(
  columns: (1fr, 1fr),
  [
    #text(weight: "bold", size: 11pt)[Invoice Details]
    #v(0.3em)
    #table(
      columns: (auto, auto),
      stroke: none,
      inset: 2pt,
      [*Invoice \#:*], [#data.number],
      [*Issue Date:*], [#data.issue_date],
      [*Due Date:*], [#data.due_date],
      [*Period:*], [#data.period],
    )
  ],
  [
    #text(weight: "bold", size: 11pt)[Bill To]
    #v(0.3em)
    #text(weight: "bold")[#data.customer_name]
    \ #data.customer_phone
    \ Package: #data.package
    #if data.paid_on != none [
      \ Paid on: #data.paid_on
    ]
  ]
)

#v(1.5em)

#table(
  columns: (1fr, auto, auto, auto),
  align: (left, left, center, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  [*Description*], [*Period*], [*Status*], [*Amount*],
  [Internet Service - #data.package], [#data.period], [#data.status], [#data.amount],
)

#v(1em)

#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,
    [Subtotal:], [#data.amount],
    [Tax (0%):], [#data.business.currency_symbol 0],
    table.hline(stroke: 1pt),
    [*Total:*], [*#data.amount*],
  )
]

#v(2em)

#if not data.paid [
  #text(weight: "bold")[PAYMENT METHOD]
  #v(0.5em)
  #grid(
    columns: (auto, 1fr),
    gutter: 1em,
    image("qr.svg", width: 4cm),
    [
      *QRIS* \
      Scan with any QRIS-enabled banking or e-wallet app. \
      The amount is filled in automatically.
    ]
  )
]

#v(1fr)
#align(center)[
  #text(size: 9pt, fill: gray)[Thank you for using #data.business.name.]
]
"##;

/// Render `invoice` to a PDF at `output_path` with the Typst CLI.
pub fn generate_invoice_pdf(invoice: &InvoiceData, output_path: &Path) -> Result<()> {
    // Check if typst is available
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(AppError::TypstNotFound);
    }

    let work_dir = std::env::temp_dir().join("isp-ledger").join(&invoice.number);
    std::fs::create_dir_all(&work_dir)?;

    let json_path = work_dir.join("data.json");
    std::fs::write(&json_path, serde_json::to_string(invoice)?)?;

    let qr_path = work_dir.join("qr.svg");
    std::fs::write(&qr_path, qr_svg(&invoice.qris_payload)?)?;

    let template_path = work_dir.join("invoice.typ");
    std::fs::write(&template_path, INVOICE_TEMPLATE)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&work_dir)
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    let _ = std::fs::remove_dir_all(&work_dir);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::PdfGeneration(stderr.to_string()));
    }

    tracing::info!(number = %invoice.number, path = %output_path.display(), "invoice rendered");
    Ok(())
}
