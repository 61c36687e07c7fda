use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

use kubearch_types::{ArchError, CompatibilityStatus, ImageResult};

/// Which compatibility bucket to show
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    CompatibleOnly,
    IncompatibleOnly,
    ErrorsOnly,
}

impl StatusFilter {
    /// Check whether a result belongs to this bucket
    ///
    /// Compatible, incompatible and errored are mutually exclusive: a
    /// result with an error is only ever shown under `ErrorsOnly`.
    pub fn matches(&self, result: &ImageResult) -> bool {
        match self {
            Self::All => true,
            Self::CompatibleOnly => result.status() == CompatibilityStatus::Compatible,
            Self::IncompatibleOnly => result.status() == CompatibilityStatus::Incompatible,
            Self::ErrorsOnly => result.status() == CompatibilityStatus::Errored,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::CompatibleOnly => "compatible",
            Self::IncompatibleOnly => "incompatible",
            Self::ErrorsOnly => "errors",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "compatible" | "arm64" => Ok(Self::CompatibleOnly),
            "incompatible" | "not-compatible" => Ok(Self::IncompatibleOnly),
            "errors" | "error" => Ok(Self::ErrorsOnly),
            other => Err(ArchError::parse("filter", format!("unknown filter '{}'", other))),
        }
    }
}

/// Compiled filter for inspection results
#[derive(Clone)]
pub struct ResultFilter {
    /// Compatibility bucket
    status: StatusFilter,

    /// Case-insensitive literal search (if any)
    search: Option<Regex>,

    /// Original search text
    pattern: String,
}

impl ResultFilter {
    /// Create a filter; `search` is matched literally, ignoring case
    pub fn new(status: StatusFilter, search: &str) -> Result<Self, regex::Error> {
        let regex = if search.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&regex::escape(search))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self {
            status,
            search: regex,
            pattern: search.to_string(),
        })
    }

    /// Check if a result passes the status bucket and the search text
    pub fn matches(&self, result: &ImageResult) -> bool {
        if !self.status.matches(result) {
            return false;
        }

        match &self.search {
            Some(re) => {
                re.is_match(&result.image)
                    || re.is_match(&result.resource_name)
                    || re.is_match(&result.namespace)
                    || re.is_match(result.resource_kind.as_str())
            }
            None => true,
        }
    }

    /// Keep matching results, preserving order
    pub fn apply(&self, results: &[ImageResult]) -> Vec<ImageResult> {
        results.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    /// Get the original search text
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if filter is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.status == StatusFilter::All && self.search.is_none()
    }
}

impl fmt::Debug for ResultFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultFilter")
            .field("status", &self.status)
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Results in `status` whose image, name, namespace or kind contains
/// `search` (ignoring case)
pub fn filter(
    results: &[ImageResult],
    status: StatusFilter,
    search: &str,
) -> Result<Vec<ImageResult>, ArchError> {
    let filter = ResultFilter::new(status, search).map_err(|e| ArchError::parse("search text", e))?;
    Ok(filter.apply(results))
}
