//! Output formatting: present counts as tables.
//!
//! This module handles the third and final stage of the pipeline -
//! formatting counts for display. It provides:
//!
//! - **StemTable**: Table-ready data structure with headers, rows, and footer
//! - **TableRow**: Individual row with label and formatted values
//!
//! ## Example
//!
//! ```rust,ignore
//! use stemcountlib::output::StemTable;
//!
//! let table = StemTable::from_lexc(&count);
//! // table.headers: ["Lexicon", "Entries", "Pointers"]
//! // table.rows: [TableRow { label: "Nouns", values: ["120", "0"] }]
//! // table.footer: TableRow { label: "Total (3 lexicons)", ... }
//! ```

pub mod table;

pub use table::{StemTable, TableRow};
