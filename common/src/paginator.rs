//! ページング
//!
//! フィルタ結果のインデックス列を固定サイズのページに切り出す。
//! 現在ページは常に `[1, 総ページ数]` に収める。

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 1ページ分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub items: &'a [usize],
    /// 最低1（0件でも空ページが1つある）
    pub total_pages: usize,
    pub clamped_page: usize,
}

/// 総ページ数（0件でも1）
pub fn total_pages(filtered_count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    filtered_count.div_ceil(page_size).max(1)
}

/// フィルタ結果からページを切り出す
///
/// `current_page` は範囲外でもよく、`[1, total_pages]` に丸められる。
pub fn paginate(filtered: &[usize], page_size: usize, current_page: i64) -> Page<'_> {
    let page_size = page_size.max(1);
    let total = total_pages(filtered.len(), page_size);
    let clamped_page = current_page.clamp(1, total as i64) as usize;

    let start = ((clamped_page - 1) * page_size).min(filtered.len());
    let end = (start + page_size).min(filtered.len());

    Page {
        items: &filtered[start..end],
        total_pages: total,
        clamped_page,
    }
}

/// ページ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// 件数変化後に現在ページを収め直す
    pub fn clamp(&mut self, filtered_count: usize) {
        let total = total_pages(filtered_count, self.page_size);
        self.current_page = self.current_page.clamp(1, total);
    }

    pub fn set_page_size(&mut self, page_size: usize, filtered_count: usize) {
        self.page_size = page_size.max(1);
        self.clamp(filtered_count);
    }

    /// 指定ページへ移動（範囲外は丸める）
    pub fn go_to(&mut self, page: usize, filtered_count: usize) {
        self.current_page = page;
        self.clamp(filtered_count);
    }

    /// 次ページ（最終ページでは何もしない）
    pub fn next(&mut self, filtered_count: usize) {
        let total = total_pages(filtered_count, self.page_size);
        if self.current_page < total {
            self.current_page += 1;
        }
        self.clamp(filtered_count);
    }

    /// 前ページ（1ページ目では何もしない）
    pub fn previous(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// 現在の状態でページを切り出し、丸めた結果を状態に反映する
    pub fn page<'a>(&mut self, filtered: &'a [usize]) -> Page<'a> {
        let page = paginate(filtered, self.page_size, self.current_page as i64);
        self.current_page = page.clamped_page;
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(3, 1), 3);
        assert_eq!(total_pages(3, 0), 3);
    }

    #[test]
    fn test_paginate_slices() {
        let filtered: Vec<usize> = (0..25).collect();
        let page = paginate(&filtered, 10, 3);
        assert_eq!(page.items, &filtered[20..25]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.clamped_page, 3);
    }

    #[test]
    fn test_paginate_clamps() {
        let filtered: Vec<usize> = vec![4, 8, 15];
        let high = paginate(&filtered, 2, 10_000);
        assert_eq!(high.clamped_page, high.total_pages);
        assert_eq!(high.items, &[15]);

        let low = paginate(&filtered, 2, -5);
        assert_eq!(low.clamped_page, 1);
        assert_eq!(low.items, &[4, 8]);
    }

    #[test]
    fn test_paginate_empty_is_single_empty_page() {
        let page = paginate(&[], 10, 4);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.clamped_page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_navigation_is_saturating() {
        let filtered: Vec<usize> = vec![3, 6, 9];
        let mut pager = Paginator::new(1);
        pager.go_to(2, filtered.len());
        assert_eq!(pager.page(&filtered).items, &[6]);

        pager.next(filtered.len());
        assert_eq!(pager.page(&filtered).items, &[9]);

        pager.next(filtered.len());
        assert_eq!(pager.current_page(), 3);
        assert_eq!(pager.page(&filtered).items, &[9]);

        pager.go_to(1, filtered.len());
        pager.previous();
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_shrinking_set_clamps_cursor() {
        let mut pager = Paginator::new(2);
        pager.go_to(3, 6);
        assert_eq!(pager.current_page(), 3);

        // 1件がフィルタから外れて5件 → 3ページのまま
        pager.clamp(5);
        assert_eq!(pager.current_page(), 3);

        pager.clamp(4);
        assert_eq!(pager.current_page(), 2);

        pager.clamp(0);
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_set_page_size_reclamps() {
        let mut pager = Paginator::new(5);
        pager.go_to(4, 20);
        pager.set_page_size(10, 20);
        assert_eq!(pager.page_size(), 10);
        assert_eq!(pager.current_page(), 2);

        pager.set_page_size(0, 20);
        assert_eq!(pager.page_size(), 1);
    }
}
