pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone)]
pub struct CaseFilter {
    /// Case-insensitive match on patient name, species or complaint.
    pub q: Option<String>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub include_deleted: bool,
}

impl Default for CaseFilter {
    fn default() -> Self {
        Self {
            q: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            include_deleted: false,
        }
    }
}

impl CaseFilter {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}
