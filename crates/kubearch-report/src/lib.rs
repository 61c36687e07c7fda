//! Report views for kubearch
//!
//! Pure, side-effect-free derivations over an [`InspectionReport`]:
//! filtering, sorting, pagination and export to CSV or JSON.

mod export;
mod filter;
mod query;
mod sort;

pub use export::{
    export_file_name, from_structured_text, report_to_delimited_text, to_delimited_text,
    to_structured_text, ExportFormat, DEFAULT_EXPORT_PREFIX,
};
pub use filter::{filter, ResultFilter, StatusFilter};
pub use query::{page_count, paginate, ReportPage, ReportQuery, DEFAULT_PAGE_SIZE};
pub use sort::{sort, SortDirection, SortKey};

// Re-export types used in our public API
pub use kubearch_types::{ArchError, ImageResult, InspectionReport, Summary};
