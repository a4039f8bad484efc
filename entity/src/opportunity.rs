use sea_orm::entity::prelude::*;

use crate::access::Access;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "opportunities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    #[sea_orm(indexed)]
    pub user_id: Option<i32>,
    pub campaign_id: Option<i32>,
    #[sea_orm(indexed)]
    pub assigned_to: Option<i32>,
    pub name: String,
    pub access: Access,
    pub source: Option<String>,
    pub stage: Option<String>,
    pub probability: Option<i32>,
    pub amount_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub closes_on: Option<Date>,
    pub notes: Option<String>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssignedTo",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Assignee,
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id",
        on_delete = "SetNull"
    )]
    Campaign,
    #[sea_orm(has_one = "super::account_opportunity::Entity")]
    AccountOpportunity,
    #[sea_orm(has_many = "super::contact_opportunity::Entity")]
    ContactOpportunity,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::account_opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountOpportunity.def()
    }
}

impl Related<super::contact_opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContactOpportunity.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_opportunity::Relation::Account.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_opportunity::Relation::Opportunity.def().rev())
    }
}

impl Related<super::contact::Entity> for Entity {
    fn to() -> RelationDef {
        super::contact_opportunity::Relation::Contact.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::contact_opportunity::Relation::Opportunity.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
