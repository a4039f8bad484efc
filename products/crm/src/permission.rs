//! Shared-access grants.
//!
//! A grant names one user and one asset. Grants are only ever appended; an
//! asset's grant list is read back in creation order.

use chrono::Utc;
use entity::{Access, AssetKind, account, lead, permission};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use tracing::debug;

use crate::error::CrmResult;

/// Typed reference to any record that can carry grants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub id: i32,
}

impl AssetRef {
    pub fn new(kind: AssetKind, id: i32) -> Self {
        Self { kind, id }
    }

    pub fn opportunity(id: i32) -> Self {
        Self::new(AssetKind::Opportunity, id)
    }

    pub fn account(id: i32) -> Self {
        Self::new(AssetKind::Account, id)
    }

    pub fn lead(id: i32) -> Self {
        Self::new(AssetKind::Lead, id)
    }
}

/// A record whose access setting and grants can be inherited by another.
pub trait PermissionSource {
    fn access(&self) -> Access;
    fn asset(&self) -> AssetRef;
}

impl PermissionSource for lead::Model {
    fn access(&self) -> Access {
        self.access
    }

    fn asset(&self) -> AssetRef {
        AssetRef::lead(self.id)
    }
}

impl PermissionSource for account::Model {
    fn access(&self) -> Access {
        self.access
    }

    fn asset(&self) -> AssetRef {
        AssetRef::account(self.id)
    }
}

pub async fn grant<C>(conn: &C, user_id: i32, asset: AssetRef) -> CrmResult<permission::Model>
where
    C: ConnectionTrait,
{
    let now: DateTimeWithTimeZone = Utc::now().into();
    let row = permission::ActiveModel {
        user_id: Set(user_id),
        asset_type: Set(asset.kind),
        asset_id: Set(asset.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(row.insert(conn).await?)
}

/// One grant per user id, in the order given.
pub async fn grant_all<C>(
    conn: &C,
    user_ids: &[i32],
    asset: AssetRef,
) -> CrmResult<Vec<permission::Model>>
where
    C: ConnectionTrait,
{
    let mut created = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        created.push(grant(conn, *user_id, asset).await?);
    }
    debug!(
        asset_kind = ?asset.kind,
        asset_id = asset.id,
        grants = created.len(),
        "permissions granted"
    );
    Ok(created)
}

pub async fn for_asset<C>(conn: &C, asset: AssetRef) -> CrmResult<Vec<permission::Model>>
where
    C: ConnectionTrait,
{
    let rows = permission::Entity::find()
        .filter(permission::Column::AssetType.eq(asset.kind))
        .filter(permission::Column::AssetId.eq(asset.id))
        .order_by_asc(permission::Column::Id)
        .all(conn)
        .await?;
    Ok(rows)
}

/// Grants for several assets of one kind, e.g. a listing page.
pub async fn for_assets<C>(
    conn: &C,
    kind: AssetKind,
    ids: &[i32],
) -> CrmResult<Vec<permission::Model>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let rows = permission::Entity::find()
        .filter(permission::Column::AssetType.eq(kind))
        .filter(permission::Column::AssetId.is_in(ids.iter().copied()))
        .order_by_asc(permission::Column::Id)
        .all(conn)
        .await?;
    Ok(rows)
}
