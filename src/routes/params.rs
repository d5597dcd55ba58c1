use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    /// Defaults to offset 0, limit 100; the limit is clamped to 1..=100.
    pub fn normalize(&self) -> (i64, i64) {
        let offset = self.offset.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(100).clamp(1, 100);
        (offset, limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Restrict the listing to a single user's orders.
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero_and_one_hundred() {
        let p = Pagination::default();
        assert_eq!(p.normalize(), (0, 100));
    }

    #[test]
    fn limit_is_clamped_and_offset_floored() {
        let p = Pagination {
            offset: Some(-5),
            limit: Some(1000),
        };
        assert_eq!(p.normalize(), (0, 100));

        let p = Pagination {
            offset: Some(40),
            limit: Some(0),
        };
        assert_eq!(p.normalize(), (40, 1));
    }
}
