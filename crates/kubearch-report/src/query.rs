use tracing::debug;

use kubearch_types::{ArchError, ImageResult, InspectionReport};

use crate::filter::{ResultFilter, StatusFilter};
use crate::sort::{sort, SortDirection, SortKey};

/// Rows per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Window `[page * page_size, page * page_size + page_size)` of `results`
///
/// Pages past the end (and a zero page size) yield an empty slice.
pub fn paginate(results: &[ImageResult], page: usize, page_size: usize) -> &[ImageResult] {
    let Some(start) = page.checked_mul(page_size) else {
        return &[];
    };
    if page_size == 0 || start >= results.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(results.len());
    &results[start..end]
}

/// Number of pages needed to show `len` rows
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

/// One page of a filtered, sorted report view
#[derive(Clone, Debug, PartialEq)]
pub struct ReportPage {
    pub items: Vec<ImageResult>,

    /// Rows matching the filter, across all pages
    pub matching: usize,

    pub page: usize,

    pub page_count: usize,
}

/// Everything that shapes a view of a report
#[derive(Clone, Debug)]
pub struct ReportQuery {
    pub status: StatusFilter,
    pub search: String,
    pub sort_key: SortKey,
    pub direction: SortDirection,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            search: String::new(),
            sort_key: SortKey::Image,
            direction: SortDirection::Ascending,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ReportQuery {
    /// Filter and sort the full result set, without paging
    pub fn matching(&self, report: &InspectionReport) -> Result<Vec<ImageResult>, ArchError> {
        let filter = ResultFilter::new(self.status, &self.search)
            .map_err(|e| ArchError::parse("search text", e))?;
        let filtered = filter.apply(report.results());
        Ok(sort(&filtered, self.sort_key, self.direction))
    }

    /// Filter, sort and cut out the requested page
    pub fn apply(&self, report: &InspectionReport) -> Result<ReportPage, ArchError> {
        let matching = self.matching(report)?;
        debug!(
            status = %self.status,
            sort = %self.sort_key,
            matching = matching.len(),
            total = report.results().len(),
            "applied report query"
        );
        Ok(ReportPage {
            items: paginate(&matching, self.page, self.page_size).to_vec(),
            matching: matching.len(),
            page: self.page,
            page_count: page_count(matching.len(), self.page_size),
        })
    }
}
