use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grant of access on one asset to one user.
///
/// Assets are polymorphic: `asset_type` names the table, `asset_id` the row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub asset_type: AssetKind,
    #[sea_orm(indexed)]
    pub asset_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[derive(
    Copy, Clone, Debug, Hash, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum AssetKind {
    #[sea_orm(string_value = "Account")]
    Account,
    #[sea_orm(string_value = "Campaign")]
    Campaign,
    #[sea_orm(string_value = "Contact")]
    Contact,
    #[sea_orm(string_value = "Lead")]
    Lead,
    #[sea_orm(string_value = "Opportunity")]
    Opportunity,
}

impl ActiveModelBehavior for ActiveModel {}
