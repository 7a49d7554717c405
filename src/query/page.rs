use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, Violations};
use crate::query::executor::Record;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(format!("Sort direction must be 'asc' or 'desc', got '{}'", s))
        }
    }
}

/// The attributes an entity can be ordered by.
pub trait SortField: Copy + fmt::Debug + Send + Sync + 'static {
    const DEFAULT: Self;

    fn parse(name: &str) -> Option<Self>;

    /// Accepted field names, for error messages.
    fn names() -> &'static [&'static str];
}

pub trait Sortable<F: SortField>: Record {
    fn compare_by(&self, other: &Self, field: F) -> Ordering;
}

/// Raw pagination parameters as they arrive from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    #[serde(alias = "sortDirection")]
    pub sort_dir: Option<String>,
}

/// Normalized pagination and ordering for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan<F> {
    pub page: u64,
    pub size: u64,
    pub sort: F,
    pub direction: SortDirection,
}

impl<F: SortField> FetchPlan<F> {
    /// Validates every parameter and reports all invalid ones together.
    /// Out-of-range values are rejected rather than clamped.
    pub fn resolve(params: &PageParams) -> AppResult<Self> {
        let mut violations = Violations::new();
        let (page, size) = page_and_size(params.page, params.size, &mut violations);

        let sort = match params.sort_by.as_deref().map(str::trim) {
            None | Some("") => Some(F::DEFAULT),
            Some(name) => {
                let field = F::parse(name);
                if field.is_none() {
                    violations.add(
                        "sortBy",
                        format!(
                            "Unknown sort field '{}', expected one of: {}",
                            name,
                            F::names().join(", ")
                        ),
                    );
                }
                field
            }
        };

        let direction = match params.sort_dir.as_deref().map(str::trim) {
            None | Some("") => Some(SortDirection::Asc),
            Some(dir) => match dir.parse::<SortDirection>() {
                Ok(direction) => Some(direction),
                Err(message) => {
                    violations.add("sortDir", message);
                    None
                }
            },
        };

        violations.finish()?;

        Ok(Self {
            page,
            size,
            sort: sort.unwrap_or(F::DEFAULT),
            direction: direction.unwrap_or_default(),
        })
    }

    /// Pagination over a fixed ordering the caller cannot change.
    pub fn fixed(page: Option<i64>, size: Option<i64>, sort: F) -> AppResult<Self> {
        let mut violations = Violations::new();
        let (page, size) = page_and_size(page, size, &mut violations);
        violations.finish()?;

        Ok(Self {
            page,
            size,
            sort,
            direction: SortDirection::Asc,
        })
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    /// Orders by the requested field, then by ascending id so equal keys
    /// always come back in the same order.
    pub fn compare<T: Sortable<F>>(&self, a: &T, b: &T) -> Ordering {
        let primary = a.compare_by(b, self.sort);
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id().cmp(&b.id()))
    }
}

fn page_and_size(page: Option<i64>, size: Option<i64>, violations: &mut Violations) -> (u64, u64) {
    let page = page.unwrap_or(0);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE as i64);

    violations.check(page >= 0, "page", "Page must not be negative");
    violations.check(
        (1..=MAX_PAGE_SIZE as i64).contains(&size),
        "size",
        "Size must be between 1 and 100",
    );

    (page.max(0) as u64, size.max(1) as u64)
}

/// A slice of a larger result set, with the counts needed to navigate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
    pub has_next: bool,
    pub has_previous: bool,
    pub number_of_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: u64, size: u64, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };
        let has_next = page.saturating_add(1) < total_pages;
        let number_of_elements = content.len() as u64;

        Self {
            empty: content.is_empty(),
            content,
            page,
            size,
            total_elements,
            total_pages,
            first: page == 0,
            last: !has_next,
            has_next,
            has_previous: page > 0,
            number_of_elements,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
            empty: self.empty,
            has_next: self.has_next,
            has_previous: self.has_previous,
            number_of_elements: self.number_of_elements,
        }
    }
}
