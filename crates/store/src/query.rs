/// Page/limit window over a listing.
///
/// Pages are 1-based; a page of `0` is treated as the first page and a limit
/// of `0` as a limit of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    limit: u32,
}

impl Page {
    /// Default page size used when the caller does not specify one.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Creates a page window.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Returns the 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the maximum number of rows on the page.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns how many rows precede this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}
