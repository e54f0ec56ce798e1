use serde::{Deserialize, Serialize};

/// All backend identifiers are UUIDs.
pub type EntityId = uuid::Uuid;

/// Identifier of a tenant (a barbershop business).
pub type TenantId = EntityId;

/// Identifier of a unit (branch) belonging to a tenant.
pub type UnitId = EntityId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts are integer centavos.
pub type Cents = i64;

/// Default page size requested when a list filter does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Paginated list envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Wrap a full result set as a single page.
    pub fn single(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self {
            data,
            total,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Number of pages given the total and page size.
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}

/// Pagination and free-text search shared by every list filter.
///
/// Unset fields are omitted from the query string so backend defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl PageParams {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    /// Clamp the requested page size to the backend maximum.
    pub fn normalized(mut self) -> Self {
        if let Some(size) = self.page_size {
            self.page_size = Some(size.clamp(1, MAX_PAGE_SIZE));
        }
        if let Some(page) = self.page {
            self.page = Some(page.max(1));
        }
        self
    }
}

fn first_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page = Page {
            data: vec![1, 2, 3],
            total: 41,
            page: 1,
            page_size: 20,
        };
        assert_eq!(page.page_count(), 3);
    }

    #[test]
    fn page_envelope_defaults_missing_fields() {
        let page: Page<i32> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn normalized_clamps_page_size() {
        let params = PageParams {
            page: Some(0),
            page_size: Some(500),
            search: None,
        }
        .normalized();
        assert_eq!(params.page, Some(1));
        assert_eq!(params.page_size, Some(MAX_PAGE_SIZE));
    }

    #[test]
    fn unset_params_are_not_serialized() {
        let json = serde_json::to_value(PageParams::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
