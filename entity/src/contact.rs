use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contact_opportunity::Entity")]
    ContactOpportunity,
}

impl Related<super::contact_opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContactOpportunity.def()
    }
}

impl Related<super::opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        super::contact_opportunity::Relation::Opportunity.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::contact_opportunity::Relation::Contact.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
