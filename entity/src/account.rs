use sea_orm::entity::prelude::*;

use crate::access::Access;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub name: String,
    pub access: Access,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_opportunity::Entity")]
    AccountOpportunity,
}

impl Related<super::account_opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountOpportunity.def()
    }
}

impl Related<super::opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_opportunity::Relation::Opportunity.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_opportunity::Relation::Account.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
