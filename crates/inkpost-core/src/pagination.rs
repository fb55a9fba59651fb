//! Page resolution for listings.
//!
//! A missing or non-integer page number resolves to the first page; an
//! integer outside `1..=num_pages` resolves to the last page.

use serde::Serialize;

/// Splits `total` items into pages of `per_page`.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total: u64,
    per_page: u64,
}

impl Paginator {
    pub fn new(total: u64, per_page: u64) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages. An empty listing still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw `page` query value into a concrete page.
    pub fn resolve(&self, raw: Option<&str>) -> PageInfo {
        let last = self.num_pages();
        let number = match raw.map(parse_page_number) {
            None | Some(PageNumber::NotAnInteger) => 1,
            Some(PageNumber::Number(n)) if (1..=last as i128).contains(&n) => n as u64,
            Some(PageNumber::Number(_)) | Some(PageNumber::Overflow) => last,
        };
        self.page(number)
    }

    fn page(&self, number: u64) -> PageInfo {
        PageInfo {
            number,
            num_pages: self.num_pages(),
            per_page: self.per_page,
            total: self.total,
        }
    }
}

enum PageNumber {
    Number(i128),
    Overflow,
    NotAnInteger,
}

fn parse_page_number(raw: &str) -> PageNumber {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return PageNumber::NotAnInteger;
    }
    match trimmed.parse::<i128>() {
        Ok(n) => PageNumber::Number(n),
        Err(_) => PageNumber::Overflow,
    }
}

/// A resolved page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PageInfo {
    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_page_is_first() {
        let page = Paginator::new(12, 5).resolve(None);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_non_integer_page_is_first() {
        let paginator = Paginator::new(12, 5);
        for raw in ["abc", "", "2.0", "1e3", " "] {
            assert_eq!(paginator.resolve(Some(raw)).number, 1, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_out_of_range_page_is_last() {
        let paginator = Paginator::new(12, 5);
        for raw in ["4", "999", "0", "-3", "99999999999999999999999999999999999999999"] {
            assert_eq!(paginator.resolve(Some(raw)).number, 3, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_valid_page() {
        let page = Paginator::new(12, 5).resolve(Some(" 2 "));
        assert_eq!(page.number, 2);
        assert_eq!(page.offset(), 5);
        assert_eq!(page.previous(), Some(1));
        assert_eq!(page.next(), Some(3));
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let paginator = Paginator::new(0, 5);
        assert_eq!(paginator.num_pages(), 1);
        let page = paginator.resolve(Some("7"));
        assert_eq!(page.number, 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }
}
