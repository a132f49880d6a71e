/// Page math over a listing of `total` items, the way the backend pages it.
pub struct Paginator {
    total: u64,
    page_size: u64,
}

impl Paginator {
    pub fn new(total: u64, page_size: u32) -> Self {
        Paginator {
            total,
            page_size: page_size.max(1) as u64,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.total.div_ceil(self.page_size) as u32
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.page_count()
    }

    /// Out of range pages fall back to the first one.
    pub fn clamp(&self, page: u32) -> u32 {
        match self.contains(page) {
            true => page,
            false => 1,
        }
    }
}
