mod typst;

pub use typst::generate_invoice_pdf;
