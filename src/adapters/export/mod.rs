//! Export bundle adapter
//!
//! Readers for the three source formats of an export bundle: the main XML
//! document, GPX route documents and ECG text dumps. Parsers only return
//! values; persisting them is the cache store's job.

pub mod ecg;
pub mod layout;
pub mod records;
pub mod route;
mod xml;

pub use ecg::EcgParser;
pub use layout::ExportLayout;
pub use records::{ExportDocument, RecordParser};
pub use route::{RouteExtraction, RouteExtractor};
