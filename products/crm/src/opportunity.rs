//! The sales opportunity record: validation, weighted amount, sharing and
//! soft delete.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use entity::{
    Access, AssetKind, account, account_opportunity, campaign, contact, contact_opportunity,
    opportunity, permission as permission_entity, users,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::account::{AccountCandidate, AccountLinkResolver};
use crate::error::{CrmError, CrmResult};
use crate::params::{
    AccountParams, OpportunityParams, optional_text, parse_access, parse_cents, parse_probability,
};
use crate::permission::{self, AssetRef, PermissionSource};
use crate::scope;
use crate::validation::{ErrorCode, Field, ValidationErrors};

const NAME_BLANK_MESSAGE: &str = "Please specify the opportunity name.";
const SHARED_WITHOUT_USERS_MESSAGE: &str = "Please specify users to share the opportunity with.";

/// A permission grant attached to an opportunity. `id` is `None` until the
/// grant has been written.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Grant {
    pub id: Option<i32>,
    pub user_id: i32,
}

impl Grant {
    fn pending(user_id: i32) -> Self {
        Self { id: None, user_id }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl From<&permission_entity::Model> for Grant {
    fn from(model: &permission_entity::Model) -> Self {
        Self {
            id: Some(model.id),
            user_id: model.user_id,
        }
    }
}

/// In-memory opportunity, persisted or not.
///
/// Fields may be assigned directly. Nothing reaches the database until one
/// of the save methods runs, and those report validation problems through
/// [`Opportunity::errors`] instead of failing.
#[derive(Clone, Debug)]
pub struct Opportunity {
    pub id: Option<i32>,
    pub uuid: Uuid,
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub campaign_id: Option<i32>,
    pub name: String,
    pub access: Access,
    pub source: Option<String>,
    pub stage: Option<String>,
    pub probability: Option<i32>,
    pub amount_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub closes_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub updated_at: Option<DateTimeWithTimeZone>,
    permissions: Vec<Grant>,
    account_id: Option<i32>,
    pending_account: Option<i32>,
    input_errors: ValidationErrors,
    errors: ValidationErrors,
}

impl Opportunity {
    /// Unsaved opportunity built from submitted fields.
    pub fn new(params: OpportunityParams) -> Self {
        let mut opportunity = Self {
            id: None,
            uuid: Uuid::new_v4(),
            user_id: None,
            assigned_to: None,
            campaign_id: None,
            name: String::new(),
            access: Access::default(),
            source: None,
            stage: None,
            probability: None,
            amount_cents: None,
            discount_cents: None,
            closes_on: None,
            notes: None,
            deleted_at: None,
            created_at: None,
            updated_at: None,
            permissions: Vec::new(),
            account_id: None,
            pending_account: None,
            input_errors: ValidationErrors::new(),
            errors: ValidationErrors::new(),
        };
        opportunity.apply(params);
        opportunity
    }

    fn from_model(
        model: opportunity::Model,
        grants: Vec<Grant>,
        account_id: Option<i32>,
    ) -> Self {
        Self {
            id: Some(model.id),
            uuid: model.uuid,
            user_id: model.user_id,
            assigned_to: model.assigned_to,
            campaign_id: model.campaign_id,
            name: model.name,
            access: model.access,
            source: model.source,
            stage: model.stage,
            probability: model.probability,
            amount_cents: model.amount_cents,
            discount_cents: model.discount_cents,
            closes_on: model.closes_on,
            notes: model.notes,
            deleted_at: model.deleted_at,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
            permissions: grants,
            account_id,
            pending_account: None,
            input_errors: ValidationErrors::new(),
            errors: ValidationErrors::new(),
        }
    }

    /// Field updates from a form. Absent params leave fields untouched;
    /// blank text clears optional fields.
    pub fn apply(&mut self, params: OpportunityParams) {
        if let Some(name) = params.name {
            self.name = name.trim().to_string();
        }
        if params.user_id.is_some() {
            self.user_id = params.user_id;
        }
        if params.assigned_to.is_some() {
            self.assigned_to = params.assigned_to;
        }
        if params.campaign_id.is_some() {
            self.campaign_id = params.campaign_id;
        }
        if let Some(raw) = params.access {
            self.input_errors.clear_field(Field::Access);
            if let Some(access) = parse_access(&raw, &mut self.input_errors) {
                self.access = access;
            }
        }
        if params.source.is_some() {
            self.source = optional_text(params.source);
        }
        if params.stage.is_some() {
            self.stage = optional_text(params.stage);
        }
        if let Some(raw) = params.probability {
            self.input_errors.clear_field(Field::Probability);
            match parse_probability(&raw) {
                Ok(value) => self.probability = value,
                Err(code) => self.input_errors.add(Field::Probability, code),
            }
        }
        if let Some(raw) = params.amount {
            self.input_errors.clear_field(Field::Amount);
            match parse_cents(&raw) {
                Ok(value) => self.amount_cents = value,
                Err(code) => self.input_errors.add(Field::Amount, code),
            }
        }
        if let Some(raw) = params.discount {
            self.input_errors.clear_field(Field::Discount);
            match parse_cents(&raw) {
                Ok(value) => self.discount_cents = value,
                Err(code) => self.input_errors.add(Field::Discount, code),
            }
        }
        if params.closes_on.is_some() {
            self.closes_on = params.closes_on;
        }
        if params.notes.is_some() {
            self.notes = optional_text(params.notes);
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Persisted and pending grants.
    pub fn permissions(&self) -> &[Grant] {
        &self.permissions
    }

    /// Linked account, including one queued for the next save.
    pub fn account_id(&self) -> Option<i32> {
        self.pending_account.or(self.account_id)
    }

    /// Queue a grant for `user_id`; written on the next save.
    pub fn add_permission(&mut self, user_id: i32) {
        self.permissions.push(Grant::pending(user_id));
    }

    /// Queue the account link; replaces any existing link on the next save.
    pub fn link_account(&mut self, account_id: i32) {
        self.pending_account = Some(account_id);
    }

    /// `amount * probability / 100`, with a missing value counting as zero.
    pub fn weighted_amount(&self) -> f64 {
        let amount = self.amount_cents.unwrap_or(0) as f64 / 100.0;
        let probability = f64::from(self.probability.unwrap_or(0));
        amount * probability / 100.0
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount_cents.map(|cents| cents as f64 / 100.0)
    }

    pub fn discount(&self) -> Option<f64> {
        self.discount_cents.map(|cents| cents as f64 / 100.0)
    }

    /// Checks that need no database: input parsing, name presence and the
    /// shared-access rule. Replaces the current error list.
    pub fn validate_fields(&mut self) -> bool {
        self.errors = self.input_errors.clone();
        if !self.has_name() {
            self.errors
                .add_with_message(Field::Name, ErrorCode::Blank, NAME_BLANK_MESSAGE);
        }
        self.users_for_shared_access();
        self.errors.is_empty()
    }

    /// A shared opportunity needs at least one grant attached before saving.
    fn users_for_shared_access(&mut self) {
        if self.access == Access::Shared && self.permissions.is_empty() {
            self.errors.add_with_message(
                Field::Access,
                ErrorCode::SharedWithoutUsers,
                SHARED_WITHOUT_USERS_MESSAGE,
            );
        }
    }

    /// All validations, including name uniqueness per owner and checks
    /// that referenced users, campaign and account exist.
    pub async fn validate<C>(&mut self, conn: &C) -> CrmResult<bool>
    where
        C: ConnectionTrait,
    {
        self.validate_fields();
        if self.has_name() {
            let mut duplicates =
                opportunity::Entity::find().filter(scope::same_name(self.user_id, &self.name));
            if let Some(id) = self.id {
                duplicates = duplicates.filter(opportunity::Column::Id.ne(id));
            }
            if duplicates.count(conn).await? > 0 {
                self.errors.add(Field::Name, ErrorCode::Taken);
            }
        }
        self.validate_references(conn).await?;
        Ok(self.errors.is_empty())
    }

    async fn validate_references<C>(&mut self, conn: &C) -> CrmResult<()>
    where
        C: ConnectionTrait,
    {
        let pending: Vec<i32> = self
            .permissions
            .iter()
            .filter(|g| !g.is_persisted())
            .map(|g| g.user_id)
            .collect();
        let mut wanted: Vec<i32> = self
            .user_id
            .into_iter()
            .chain(self.assigned_to)
            .chain(pending.iter().copied())
            .collect();
        wanted.sort_unstable();
        wanted.dedup();
        let known: HashSet<i32> = if wanted.is_empty() {
            HashSet::new()
        } else {
            users::Entity::find()
                .filter(users::Column::Id.is_in(wanted.iter().copied()))
                .all(conn)
                .await?
                .into_iter()
                .map(|user| user.id)
                .collect()
        };

        if self.user_id.is_some_and(|id| !known.contains(&id)) {
            self.errors.add(Field::Owner, ErrorCode::NotFound);
        }
        if self.assigned_to.is_some_and(|id| !known.contains(&id)) {
            self.errors.add(Field::AssignedTo, ErrorCode::NotFound);
        }
        let mut unknown: Vec<i32> = pending.into_iter().filter(|id| !known.contains(id)).collect();
        unknown.sort_unstable();
        unknown.dedup();
        if !unknown.is_empty() {
            let ids: Vec<String> = unknown.iter().map(i32::to_string).collect();
            self.errors.add_with_message(
                Field::Users,
                ErrorCode::NotFound,
                format!("Unknown users: {}", ids.join(", ")),
            );
        }

        if let Some(campaign_id) = self.campaign_id {
            let live = campaign::Entity::find_by_id(campaign_id)
                .filter(campaign::Column::DeletedAt.is_null())
                .count(conn)
                .await?;
            if live == 0 {
                self.errors.add(Field::Campaign, ErrorCode::NotFound);
            }
        }
        if let Some(account_id) = self.pending_account {
            let live = account::Entity::find_by_id(account_id)
                .filter(account::Column::DeletedAt.is_null())
                .count(conn)
                .await?;
            if live == 0 {
                self.errors.add(Field::Account, ErrorCode::NotFound);
            }
        }
        Ok(())
    }

    /// Validate and write the row, its account link and pending grants in
    /// one transaction. Returns `Ok(false)` with errors attached when the
    /// record is invalid; nothing is written in that case. Saving a record
    /// that has been deleted meanwhile fails with [`CrmError::NotFound`].
    #[instrument(name = "crm.opportunity.save", skip_all, fields(opportunity_id = ?self.id))]
    pub async fn save<C>(&mut self, conn: &C) -> CrmResult<bool>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let draft = self.clone();
        self.save_draft(conn, draft).await
    }

    async fn save_draft<C>(&mut self, conn: &C, mut draft: Opportunity) -> CrmResult<bool>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = conn.begin().await?;
        let saved = draft.persist(&txn).await?;
        self.settle(txn, draft, saved).await
    }

    /// Commit and adopt the draft, or roll back and keep only its errors.
    async fn settle(
        &mut self,
        txn: DatabaseTransaction,
        draft: Opportunity,
        saved: bool,
    ) -> CrmResult<bool> {
        if saved {
            txn.commit().await?;
            *self = draft;
        } else {
            txn.rollback().await?;
            self.errors = draft.errors;
        }
        Ok(saved)
    }

    async fn persist<C>(&mut self, conn: &C) -> CrmResult<bool>
    where
        C: ConnectionTrait,
    {
        if !self.validate(conn).await? {
            warn!(errors = %self.errors, "opportunity rejected");
            return Ok(false);
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let written = match self.id {
            None => {
                let row = opportunity::ActiveModel {
                    uuid: Set(self.uuid),
                    created_at: Set(now),
                    ..self.active_fields(now)
                };
                match row.insert(conn).await {
                    Ok(model) => model,
                    Err(err) => return self.reject_write(err),
                }
            }
            Some(id) => {
                let updated = opportunity::Entity::update_many()
                    .set(self.active_fields(now))
                    .filter(opportunity::Column::Id.eq(id))
                    .filter(scope::active())
                    .exec(conn)
                    .await;
                match updated {
                    Ok(result) if result.rows_affected == 0 => {
                        return Err(CrmError::NotFound("opportunity"));
                    }
                    Ok(_) => {}
                    Err(err) => return self.reject_write(err),
                }
                opportunity::Entity::find_by_id(id)
                    .one(conn)
                    .await?
                    .ok_or(CrmError::NotFound("opportunity"))?
            }
        };
        let id = written.id;

        if let Some(account_id) = self.pending_account.take() {
            account_opportunity::Entity::delete_many()
                .filter(account_opportunity::Column::OpportunityId.eq(id))
                .exec(conn)
                .await?;
            let link = account_opportunity::ActiveModel {
                account_id: Set(account_id),
                opportunity_id: Set(id),
                created_at: Set(now),
                ..Default::default()
            };
            if let Err(err) = link.insert(conn).await {
                if is_foreign_key_violation(&err) {
                    self.errors.add(Field::Account, ErrorCode::NotFound);
                    return Ok(false);
                }
                return Err(err.into());
            }
            self.account_id = Some(account_id);
        }

        let mut granted = 0usize;
        for grant in self.permissions.iter_mut().filter(|g| !g.is_persisted()) {
            match permission::grant(conn, grant.user_id, AssetRef::opportunity(id)).await {
                Ok(row) => grant.id = Some(row.id),
                Err(CrmError::Db(err)) if is_foreign_key_violation(&err) => {
                    self.errors.add(Field::Users, ErrorCode::NotFound);
                    return Ok(false);
                }
                Err(err) => return Err(err),
            }
            granted += 1;
        }

        self.id = Some(id);
        self.created_at = Some(written.created_at);
        self.updated_at = Some(written.updated_at);
        self.errors.clear();
        info!(
            opportunity_id = id,
            access = self.access.as_str(),
            grants = granted,
            "opportunity saved"
        );
        Ok(true)
    }

    /// Constraint failures on the row itself become field errors.
    fn reject_write(&mut self, err: DbErr) -> CrmResult<bool> {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                self.errors.add(Field::Name, ErrorCode::Taken);
                Ok(false)
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                self.errors.add(Field::Base, ErrorCode::NotFound);
                Ok(false)
            }
            _ => Err(err.into()),
        }
    }

    fn active_fields(&self, now: DateTimeWithTimeZone) -> opportunity::ActiveModel {
        opportunity::ActiveModel {
            user_id: Set(self.user_id),
            campaign_id: Set(self.campaign_id),
            assigned_to: Set(self.assigned_to),
            name: Set(self.name.clone()),
            access: Set(self.access),
            source: Set(self.source.clone()),
            stage: Set(self.stage.clone()),
            probability: Set(self.probability),
            amount_cents: Set(self.amount_cents),
            discount_cents: Set(self.discount_cents),
            closes_on: Set(self.closes_on),
            notes: Set(self.notes.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    /// Grant each user access when the opportunity is shared, then save.
    /// Grants are only attached to this instance once the save succeeds.
    #[instrument(name = "crm.opportunity.save_with_permissions", skip_all, fields(users = users.len()))]
    pub async fn save_with_permissions<C>(&mut self, conn: &C, users: &[i32]) -> CrmResult<bool>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let mut draft = self.clone();
        draft.queue_user_grants(users);
        self.save_draft(conn, draft).await
    }

    fn queue_user_grants(&mut self, users: &[i32]) {
        if !users.is_empty() && self.access == Access::Shared {
            for user_id in users {
                self.add_permission(*user_id);
            }
            debug!(grants = users.len(), "queued per-user grants");
        }
    }

    /// Take access and grants from the record this opportunity came from,
    /// then save. Copied grants target this opportunity.
    #[instrument(
        name = "crm.opportunity.save_with_model_permissions",
        skip_all,
        fields(source_kind = ?model.asset().kind, source_id = model.asset().id)
    )]
    pub async fn save_with_model_permissions<C, S>(&mut self, conn: &C, model: &S) -> CrmResult<bool>
    where
        C: ConnectionTrait + TransactionTrait,
        S: PermissionSource + ?Sized,
    {
        let mut draft = self.clone();
        draft.access = model.access();
        if draft.access == Access::Shared {
            let inherited = permission::for_asset(conn, model.asset()).await?;
            for grant in &inherited {
                draft.add_permission(grant.user_id);
            }
            debug!(grants = inherited.len(), "copied grants from source record");
        }
        self.save_draft(conn, draft).await
    }

    /// Resolve the submitted account, link it, grant the listed users and
    /// save, all in one transaction. Account problems are reported on
    /// [`Field::Account`] and block the save. An account created here is
    /// rolled back if the opportunity turns out to be invalid.
    #[instrument(name = "crm.opportunity.save_with_account", skip_all, fields(users = users.len()))]
    pub async fn save_with_account_and_permissions<C, R>(
        &mut self,
        conn: &C,
        resolver: &R,
        account: &AccountParams,
        users: &[i32],
    ) -> CrmResult<bool>
    where
        C: ConnectionTrait + TransactionTrait,
        R: AccountLinkResolver + ?Sized,
    {
        let txn = conn.begin().await?;
        let mut draft = self.clone();
        draft.queue_user_grants(users);
        let candidate = resolver
            .create_or_select_for(&txn, &draft, account, users)
            .await?;
        let saved = if candidate.is_valid() {
            if let Some(account_id) = candidate.id {
                draft.link_account(account_id);
            }
            draft.persist(&txn).await?
        } else {
            draft.validate(&txn).await?;
            draft.errors.merge(candidate.errors());
            warn!(errors = %draft.errors, "account rejected");
            false
        };
        self.settle(txn, draft, saved).await
    }

    /// Build an opportunity and save it when it has a name and the account
    /// is valid. With a source record and `Lead` access the source's sharing
    /// is inherited; otherwise `users` are granted. Always returns the
    /// instance; check [`Opportunity::is_persisted`] and
    /// [`Opportunity::errors`].
    #[instrument(name = "crm.opportunity.create_for", skip_all, fields(account_id = ?account.id))]
    pub async fn create_for<C, S>(
        conn: &C,
        model: Option<&S>,
        account: &AccountCandidate,
        params: OpportunityParams,
        users: &[i32],
    ) -> CrmResult<Opportunity>
    where
        C: ConnectionTrait + TransactionTrait,
        S: PermissionSource + ?Sized,
    {
        let mut opportunity = Opportunity::new(params);
        if !opportunity.has_name() || !account.is_valid() {
            opportunity.validate_fields();
            opportunity.errors.merge(account.errors());
            debug!(errors = %opportunity.errors, "opportunity not saved");
            return Ok(opportunity);
        }

        if let Some(account_id) = account.id {
            opportunity.link_account(account_id);
        }
        match model {
            Some(source) if opportunity.access == Access::Lead => {
                opportunity.save_with_model_permissions(conn, source).await?;
            }
            _ => {
                opportunity.save_with_permissions(conn, users).await?;
            }
        }
        Ok(opportunity)
    }

    /// Live opportunity by id.
    pub async fn find<C>(conn: &C, id: i32) -> CrmResult<Option<Opportunity>>
    where
        C: ConnectionTrait,
    {
        let model = opportunity::Entity::find_by_id(id)
            .filter(scope::active())
            .one(conn)
            .await?;
        match model {
            Some(model) => Ok(Some(Self::load(conn, model).await?)),
            None => Ok(None),
        }
    }

    /// Opportunity by id, soft-deleted or not.
    pub async fn find_with_deleted<C>(conn: &C, id: i32) -> CrmResult<Option<Opportunity>>
    where
        C: ConnectionTrait,
    {
        match opportunity::Entity::find_by_id(id).one(conn).await? {
            Some(model) => Ok(Some(Self::load(conn, model).await?)),
            None => Ok(None),
        }
    }

    async fn load<C>(conn: &C, model: opportunity::Model) -> CrmResult<Opportunity>
    where
        C: ConnectionTrait,
    {
        let grants = permission::for_asset(conn, AssetRef::opportunity(model.id))
            .await?
            .iter()
            .map(Grant::from)
            .collect();
        let link = account_opportunity::Entity::find()
            .filter(account_opportunity::Column::OpportunityId.eq(model.id))
            .one(conn)
            .await?;
        Ok(Self::from_model(model, grants, link.map(|l| l.account_id)))
    }

    /// Opportunities the user owns, is assigned, or was granted; newest id
    /// first, deleted rows excluded.
    #[instrument(name = "crm.opportunity.my", skip(conn))]
    pub async fn my_opportunities<C>(conn: &C, user_id: i32) -> CrmResult<Vec<Opportunity>>
    where
        C: ConnectionTrait,
    {
        let models = scope::my(user_id).all(conn).await?;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();

        let mut grants: HashMap<i32, Vec<Grant>> = HashMap::new();
        for row in permission::for_assets(conn, AssetKind::Opportunity, &ids).await? {
            grants.entry(row.asset_id).or_default().push(Grant::from(&row));
        }
        let links: HashMap<i32, i32> = if ids.is_empty() {
            HashMap::new()
        } else {
            account_opportunity::Entity::find()
                .filter(account_opportunity::Column::OpportunityId.is_in(ids.iter().copied()))
                .all(conn)
                .await?
                .into_iter()
                .map(|link| (link.opportunity_id, link.account_id))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|model| {
                let id = model.id;
                Self::from_model(
                    model,
                    grants.remove(&id).unwrap_or_default(),
                    links.get(&id).copied(),
                )
            })
            .collect())
    }

    /// Soft delete: drops the account link and contact links, then stamps
    /// `deleted_at`. The row stays reachable through
    /// [`Opportunity::find_with_deleted`].
    #[instrument(name = "crm.opportunity.destroy", skip_all, fields(opportunity_id = ?self.id))]
    pub async fn destroy<C>(&mut self, conn: &C) -> CrmResult<()>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let id = self.id.ok_or(CrmError::NotPersisted)?;
        if self.is_deleted() {
            return Ok(());
        }
        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = conn.begin().await?;
        account_opportunity::Entity::delete_many()
            .filter(account_opportunity::Column::OpportunityId.eq(id))
            .exec(&txn)
            .await?;
        let unlinked = contact_opportunity::Entity::delete_many()
            .filter(contact_opportunity::Column::OpportunityId.eq(id))
            .exec(&txn)
            .await?;
        opportunity::Entity::update_many()
            .col_expr(opportunity::Column::DeletedAt, Expr::value(now))
            .col_expr(opportunity::Column::UpdatedAt, Expr::value(now))
            .filter(opportunity::Column::Id.eq(id))
            .filter(scope::active())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        self.deleted_at = Some(now);
        self.updated_at = Some(now);
        self.account_id = None;
        self.pending_account = None;
        info!(
            opportunity_id = id,
            contacts_unlinked = unlinked.rows_affected,
            "opportunity deleted"
        );
        Ok(())
    }

    /// Linked account, if any and not deleted.
    pub async fn account<C>(&self, conn: &C) -> CrmResult<Option<account::Model>>
    where
        C: ConnectionTrait,
    {
        let Some(account_id) = self.account_id else {
            return Ok(None);
        };
        Ok(account::Entity::find_by_id(account_id)
            .filter(account::Column::DeletedAt.is_null())
            .one(conn)
            .await?)
    }

    /// Link a contact. Linking the same contact twice is a no-op.
    pub async fn link_contact<C>(&self, conn: &C, contact_id: i32) -> CrmResult<()>
    where
        C: ConnectionTrait,
    {
        let id = self.id.ok_or(CrmError::NotPersisted)?;
        let existing = contact_opportunity::Entity::find()
            .filter(contact_opportunity::Column::OpportunityId.eq(id))
            .filter(contact_opportunity::Column::ContactId.eq(contact_id))
            .count(conn)
            .await?;
        if existing > 0 {
            return Ok(());
        }
        contact_opportunity::ActiveModel {
            contact_id: Set(contact_id),
            opportunity_id: Set(id),
            role: Set(None),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    /// Linked contacts, each listed once, deleted contacts excluded.
    pub async fn contacts<C>(&self, conn: &C) -> CrmResult<Vec<contact::Model>>
    where
        C: ConnectionTrait,
    {
        let Some(id) = self.id else {
            return Ok(vec![]);
        };
        let linked = Query::select()
            .column(contact_opportunity::Column::ContactId)
            .from(contact_opportunity::Entity)
            .and_where(contact_opportunity::Column::OpportunityId.eq(id))
            .to_owned();
        Ok(contact::Entity::find()
            .filter(contact::Column::Id.in_subquery(linked))
            .filter(contact::Column::DeletedAt.is_null())
            .order_by_asc(contact::Column::Id)
            .all(conn)
            .await?)
    }
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
