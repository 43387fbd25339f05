//! Page arithmetic for list operations.
//!
//! Pages are 1-based. Page `0` is treated as the first page.

/// Number of pages needed for `total_items` at `limit` per page.
///
/// A `limit` of zero means "no paging" and yields a single page.
#[must_use]
pub const fn total_pages(total_items: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 1;
    }
    total_items.div_ceil(limit)
}

/// Row offset of `page` at `limit` per page.
#[must_use]
pub const fn offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 0), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(1, 10), 0);
        assert_eq!(offset(3, 10), 20);
        assert_eq!(offset(0, 10), 0);
    }
}
