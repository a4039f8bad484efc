//! Query predicates for opportunities.
//!
//! Each function returns a plain [`Condition`] so callers can combine them
//! with their own filters before running the query.

use entity::{AssetKind, opportunity, permission};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};

/// Rows that have not been soft-deleted.
pub fn active() -> Condition {
    Condition::all().add(opportunity::Column::DeletedAt.is_null())
}

/// Rows the user created, is assigned to, or has been granted.
pub fn visible_to(user_id: i32) -> Condition {
    let granted = Query::select()
        .column(permission::Column::AssetId)
        .from(permission::Entity)
        .and_where(permission::Column::AssetType.eq(AssetKind::Opportunity))
        .and_where(permission::Column::UserId.eq(user_id))
        .to_owned();
    Condition::any()
        .add(opportunity::Column::UserId.eq(user_id))
        .add(opportunity::Column::AssignedTo.eq(user_id))
        .add(opportunity::Column::Id.in_subquery(granted))
}

/// Live rows with this exact name under the same owner.
pub fn same_name(user_id: Option<i32>, name: &str) -> Condition {
    let owner = match user_id {
        Some(id) => opportunity::Column::UserId.eq(id),
        None => opportunity::Column::UserId.is_null(),
    };
    active()
        .add(owner)
        .add(opportunity::Column::Name.eq(name))
}

/// The "my opportunities" listing: visible to the user, not deleted, newest
/// id first.
pub fn my(user_id: i32) -> Select<opportunity::Entity> {
    opportunity::Entity::find()
        .filter(active())
        .filter(visible_to(user_id))
        .order_by_desc(opportunity::Column::Id)
}
