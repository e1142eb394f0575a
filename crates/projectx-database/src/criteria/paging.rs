//! Page window resolution.
//!
//! A limit on its own never turns paging on. Paging is active only when a
//! page number (1-based) or an offset is given; a page number wins over an
//! offset.

use projectx_core::config::PersistenceConfig;

/// Page size defaults and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingPolicy {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self::from(&PersistenceConfig::default())
    }
}

impl From<&PersistenceConfig> for PagingPolicy {
    fn from(config: &PersistenceConfig) -> Self {
        Self {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }
}

/// Paging inputs as supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    /// 1-based page number; `0` is treated as absent.
    pub page_number: Option<u32>,
    pub offset: Option<u64>,
    pub limit: Option<u32>,
}

/// A resolved `OFFSET`/`LIMIT` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub size: u32,
}

impl Paging {
    /// The limit, or the default when absent or zero, capped at the maximum.
    pub fn page_size(&self, policy: &PagingPolicy) -> u32 {
        match self.limit {
            None | Some(0) => policy.default_page_size,
            Some(limit) => limit.min(policy.max_page_size),
        }
    }

    /// Offset implied by the page number, else the explicit offset.
    pub fn resolve_offset(&self, page_size: u32) -> Option<u64> {
        match self.page_number {
            Some(page) if page > 0 => Some(u64::from(page - 1) * u64::from(page_size)),
            _ => self.offset,
        }
    }

    /// The window to apply, or `None` when paging was not requested.
    pub fn window(&self, policy: &PagingPolicy) -> Option<PageWindow> {
        let size = self.page_size(policy);
        self.resolve_offset(size).map(|offset| PageWindow { offset, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PagingPolicy {
        PagingPolicy::default()
    }

    #[test]
    fn test_page_size_defaults_and_caps() {
        assert_eq!(Paging::default().page_size(&policy()), 20);
        let zero = Paging {
            limit: Some(0),
            ..Paging::default()
        };
        assert_eq!(zero.page_size(&policy()), 20);
        let large = Paging {
            limit: Some(500),
            ..Paging::default()
        };
        assert_eq!(large.page_size(&policy()), 100);
    }

    #[test]
    fn test_limit_alone_does_not_page() {
        let paging = Paging {
            limit: Some(10),
            ..Paging::default()
        };
        assert_eq!(paging.window(&policy()), None);
    }

    #[test]
    fn test_page_number_drives_offset() {
        let paging = Paging {
            page_number: Some(3),
            limit: Some(10),
            offset: Some(7),
        };
        assert_eq!(paging.window(&policy()), Some(PageWindow { offset: 20, size: 10 }));
    }

    #[test]
    fn test_page_zero_falls_back_to_offset() {
        let paging = Paging {
            page_number: Some(0),
            offset: Some(15),
            limit: None,
        };
        assert_eq!(paging.window(&policy()), Some(PageWindow { offset: 15, size: 20 }));

        let neither = Paging {
            page_number: Some(0),
            ..Paging::default()
        };
        assert_eq!(neither.window(&policy()), None);
    }
}
