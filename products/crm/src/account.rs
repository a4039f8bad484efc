//! Account resolution for opportunities.

use async_trait::async_trait;
use chrono::Utc;
use entity::{Access, account};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter,
};
use tracing::{debug, instrument};

use crate::error::CrmResult;
use crate::opportunity::Opportunity;
use crate::params::{AccountParams, optional_text, parse_access};
use crate::permission::{self, AssetRef};
use crate::validation::{ErrorCode, Field, ValidationErrors};

/// Outcome of resolving an account reference. Carries either an account id,
/// validation errors, or neither when no account was requested.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountCandidate {
    pub id: Option<i32>,
    errors: ValidationErrors,
}

impl AccountCandidate {
    /// No account selected.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn resolved(id: i32) -> Self {
        Self {
            id: Some(id),
            errors: ValidationErrors::new(),
        }
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Self { id: None, errors }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Finds or creates the account an opportunity should be linked to.
///
/// Implementations report bad input through [`AccountCandidate::errors`];
/// `Err` is reserved for storage failures.
#[async_trait]
pub trait AccountLinkResolver: Send + Sync {
    async fn create_or_select_for(
        &self,
        txn: &DatabaseTransaction,
        subject: &Opportunity,
        account_ref: &AccountParams,
        user_ids: &[i32],
    ) -> CrmResult<AccountCandidate>;
}

/// Resolver backed by the `accounts` table.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountResolver;

#[async_trait]
impl AccountLinkResolver for AccountResolver {
    #[instrument(name = "crm.account.resolve", skip_all, fields(account_id = ?account_ref.id))]
    async fn create_or_select_for(
        &self,
        txn: &DatabaseTransaction,
        subject: &Opportunity,
        account_ref: &AccountParams,
        user_ids: &[i32],
    ) -> CrmResult<AccountCandidate> {
        if let Some(id) = account_ref.id {
            let found = account::Entity::find_by_id(id)
                .filter(account::Column::DeletedAt.is_null())
                .one(txn)
                .await?;
            return Ok(match found {
                Some(model) => AccountCandidate::resolved(model.id),
                None => {
                    let mut errors = ValidationErrors::new();
                    errors.add(Field::Account, ErrorCode::NotFound);
                    AccountCandidate::invalid(errors)
                }
            });
        }

        if account_ref.name.is_none() {
            return Ok(AccountCandidate::none());
        }
        let mut errors = ValidationErrors::new();
        let Some(name) = optional_text(account_ref.name.clone()) else {
            errors.add_with_message(
                Field::Account,
                ErrorCode::Blank,
                "Please specify the account name.",
            );
            return Ok(AccountCandidate::invalid(errors));
        };

        let mut access = account_ref
            .access
            .as_deref()
            .map(|raw| parse_access(raw, &mut errors))
            .unwrap_or(Some(Access::Private));
        let mut grantees = user_ids.to_vec();
        if access == Some(Access::Lead) {
            // Inherit from the opportunity being saved.
            access = Some(subject.access);
            grantees = subject.permissions().iter().map(|g| g.user_id).collect();
        }
        let owner = account_ref.user_id.or(subject.user_id);

        let mut duplicate = account::Entity::find()
            .filter(account::Column::DeletedAt.is_null())
            .filter(account::Column::Name.eq(name.as_str()));
        duplicate = match owner {
            Some(user_id) => duplicate.filter(account::Column::UserId.eq(user_id)),
            None => duplicate.filter(account::Column::UserId.is_null()),
        };
        if duplicate.count(txn).await? > 0 {
            errors.add(Field::Account, ErrorCode::Taken);
        }

        let Some(access) = access else {
            return Ok(AccountCandidate::invalid(errors));
        };
        if access == Access::Shared && grantees.is_empty() {
            errors.add_with_message(
                Field::Account,
                ErrorCode::SharedWithoutUsers,
                "Please specify users to share the account with.",
            );
        }
        if !errors.is_empty() {
            return Ok(AccountCandidate::invalid(errors));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let created = account::ActiveModel {
            user_id: Set(owner),
            assigned_to: Set(account_ref.assigned_to),
            name: Set(name),
            access: Set(access),
            website: Set(optional_text(account_ref.website.clone())),
            phone: Set(optional_text(account_ref.phone.clone())),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        if access == Access::Shared {
            permission::grant_all(txn, &grantees, AssetRef::account(created.id)).await?;
        }
        debug!(account_id = created.id, "account created for opportunity");
        Ok(AccountCandidate::resolved(created.id))
    }
}
