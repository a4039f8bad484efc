use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visibility of a CRM record.
///
/// `Lead` only appears on records converted from a lead: it asks the save
/// path to inherit the lead's access and grants. When no lead is supplied the
/// value is stored unchanged.
#[derive(
    Copy, Clone, Debug, Default, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
pub enum Access {
    #[default]
    #[sea_orm(string_value = "Private")]
    Private,
    #[sea_orm(string_value = "Public")]
    Public,
    #[sea_orm(string_value = "Shared")]
    Shared,
    #[sea_orm(string_value = "Lead")]
    Lead,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Private => "Private",
            Access::Public => "Public",
            Access::Shared => "Shared",
            Access::Lead => "Lead",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Private" => Some(Access::Private),
            "Public" => Some(Access::Public),
            "Shared" => Some(Access::Shared),
            "Lead" => Some(Access::Lead),
            _ => None,
        }
    }
}
