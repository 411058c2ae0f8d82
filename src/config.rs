use serde::Deserialize;

use crate::errors::GridError;

const DEFAULT_PAGE_SIZE: u64 = 20;

/// Grid-wide paging settings, injected into [`crate::service::GridService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows per page when the request does not say
    pub default_page_size: u64,
    /// Upper bound for the requested page size, `0` disables the cap
    pub max_page_size: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 0,
        }
    }
}

impl GridConfig {
    /// Load settings from the environment (and a `.env` file when one exists).
    ///
    /// Reads `GRID_DEFAULT_PAGE_SIZE` and `GRID_MAX_PAGE_SIZE`. Unset variables keep their
    /// defaults, malformed ones are an error.
    pub fn from_env() -> Result<Self, GridError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GridError> {
        let mut config = Self::default();
        if let Some(value) = lookup("GRID_DEFAULT_PAGE_SIZE") {
            config.default_page_size = parse_size("GRID_DEFAULT_PAGE_SIZE", &value)?;
        }
        if let Some(value) = lookup("GRID_MAX_PAGE_SIZE") {
            config.max_page_size = parse_size("GRID_MAX_PAGE_SIZE", &value)?;
        }
        Ok(config)
    }

    /// Page size to use for a request, after defaults and the cap are applied.
    #[must_use]
    pub fn effective_page_size(&self, requested: Option<u64>) -> u64 {
        let size = requested.unwrap_or(self.default_page_size);
        if self.max_page_size == 0 {
            return size;
        }
        // An unbounded request is still unbounded only when no cap is configured
        if size == 0 {
            self.max_page_size
        } else {
            size.min(self.max_page_size)
        }
    }
}

fn parse_size(key: &str, value: &str) -> Result<u64, GridError> {
    value
        .trim()
        .parse()
        .map_err(|_| GridError::invalid(format!("{key} must be a non-negative integer, got '{value}'")))
}
