mod common;

use common::TestDb;
use entity::{Access, account, account_opportunity, contact, contact_opportunity, lead, opportunity};
use products_crm::permission::{self, AssetRef};
use products_crm::{
    AccountCandidate, AccountParams, AccountResolver, CrmError, ErrorCode, Field, Opportunity,
    OpportunityParams, ValidationErrors,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    SqlErr,
};

fn owned(name: &str, owner: i32) -> OpportunityParams {
    OpportunityParams {
        user_id: Some(owner),
        ..OpportunityParams::named(name)
    }
}

fn shared(name: &str, owner: i32) -> OpportunityParams {
    OpportunityParams {
        access: Some("Shared".into()),
        ..owned(name, owner)
    }
}

async fn opportunity_count(ctx: &TestDb) -> u64 {
    opportunity::Entity::find().count(&ctx.db).await.unwrap()
}

async fn granted_users(ctx: &TestDb, asset: AssetRef) -> Vec<i32> {
    let mut users: Vec<i32> = permission::for_asset(&ctx.db, asset)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.user_id)
        .collect();
    users.sort_unstable();
    users
}

#[tokio::test]
async fn duplicate_name_for_same_owner_is_rejected() {
    let ctx = TestDb::new().await;

    let mut first = Opportunity::new(owned("Renewal", ctx.alice));
    assert!(first.save(&ctx.db).await.unwrap());
    assert!(first.is_persisted());

    let mut second = Opportunity::new(owned("Renewal", ctx.alice));
    assert!(!second.save(&ctx.db).await.unwrap());
    assert!(second.errors().has(Field::Name, ErrorCode::Taken));
    assert!(!second.is_persisted());

    let mut other_owner = Opportunity::new(owned("Renewal", ctx.bob));
    assert!(other_owner.save(&ctx.db).await.unwrap());
    assert_eq!(opportunity_count(&ctx).await, 2);
}

#[tokio::test]
async fn storage_rejects_duplicate_live_names() {
    let ctx = TestDb::new().await;
    let mut first = Opportunity::new(owned("Renewal", ctx.alice));
    assert!(first.save(&ctx.db).await.unwrap());

    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    let err = opportunity::ActiveModel {
        uuid: Set(uuid::Uuid::new_v4()),
        user_id: Set(Some(ctx.alice)),
        name: Set("Renewal".into()),
        access: Set(Access::Private),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await
    .unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn name_is_reusable_after_soft_delete() {
    let ctx = TestDb::new().await;
    let mut first = Opportunity::new(owned("Renewal", ctx.alice));
    assert!(first.save(&ctx.db).await.unwrap());
    first.destroy(&ctx.db).await.unwrap();

    let mut again = Opportunity::new(owned("Renewal", ctx.alice));
    assert!(again.save(&ctx.db).await.unwrap());
    assert_ne!(again.id, first.id);
}

#[tokio::test]
async fn shared_access_requires_a_grant() {
    let ctx = TestDb::new().await;

    let mut opportunity = Opportunity::new(shared("Expansion", ctx.alice));
    assert!(!opportunity.save(&ctx.db).await.unwrap());
    assert!(opportunity
        .errors()
        .has(Field::Access, ErrorCode::SharedWithoutUsers));
    assert_eq!(opportunity_count(&ctx).await, 0);

    assert!(opportunity
        .save_with_permissions(&ctx.db, &[ctx.bob])
        .await
        .unwrap());
    assert!(opportunity.errors().is_empty());
    let id = opportunity.id.unwrap();
    assert_eq!(granted_users(&ctx, AssetRef::opportunity(id)).await, vec![ctx.bob]);
    assert!(opportunity.permissions().iter().all(|g| g.is_persisted()));
}

#[tokio::test]
async fn per_user_grants_are_skipped_unless_shared() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(owned("Quiet", ctx.alice));
    assert!(opportunity
        .save_with_permissions(&ctx.db, &[ctx.bob, ctx.carol])
        .await
        .unwrap());
    let id = opportunity.id.unwrap();
    assert!(granted_users(&ctx, AssetRef::opportunity(id)).await.is_empty());
}

#[tokio::test]
async fn non_numeric_amount_blocks_save() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(OpportunityParams {
        amount: Some("ten grand".into()),
        ..owned("Upsell", ctx.alice)
    });
    assert!(!opportunity.save(&ctx.db).await.unwrap());
    assert!(opportunity.errors().has(Field::Amount, ErrorCode::NotANumber));
    assert_eq!(opportunity_count(&ctx).await, 0);
}

#[tokio::test]
async fn create_for_with_blank_name_writes_nothing() {
    let ctx = TestDb::new().await;
    let opportunity = Opportunity::create_for(
        &ctx.db,
        None::<&lead::Model>,
        &AccountCandidate::none(),
        owned("", ctx.alice),
        &[ctx.bob],
    )
    .await
    .unwrap();

    assert!(!opportunity.is_persisted());
    assert!(opportunity.errors().has(Field::Name, ErrorCode::Blank));
    assert_eq!(opportunity_count(&ctx).await, 0);
}

#[tokio::test]
async fn create_for_skips_save_when_account_is_invalid() {
    let ctx = TestDb::new().await;
    let mut account_errors = ValidationErrors::new();
    account_errors.add(Field::Account, ErrorCode::Blank);

    let opportunity = Opportunity::create_for(
        &ctx.db,
        None::<&lead::Model>,
        &AccountCandidate::invalid(account_errors),
        owned("Pilot", ctx.alice),
        &[],
    )
    .await
    .unwrap();

    assert!(!opportunity.is_persisted());
    assert_eq!(opportunity_count(&ctx).await, 0);
}

#[tokio::test]
async fn create_for_links_account_and_fans_out_to_users() {
    let ctx = TestDb::new().await;
    let acme = ctx.account("Acme", ctx.alice).await;

    let opportunity = Opportunity::create_for(
        &ctx.db,
        None::<&lead::Model>,
        &AccountCandidate::resolved(acme.id),
        OpportunityParams {
            amount: Some("1000".into()),
            probability: Some("50".into()),
            ..shared("Acme rollout", ctx.alice)
        },
        &[ctx.bob, ctx.carol],
    )
    .await
    .unwrap();

    assert!(opportunity.is_persisted(), "{}", opportunity.errors());
    assert_eq!(opportunity.weighted_amount(), 500.0);
    assert_eq!(opportunity.account_id(), Some(acme.id));
    let linked = opportunity.account(&ctx.db).await.unwrap().unwrap();
    assert_eq!(linked.name, "Acme");

    let id = opportunity.id.unwrap();
    assert_eq!(
        granted_users(&ctx, AssetRef::opportunity(id)).await,
        vec![ctx.bob, ctx.carol]
    );
}

#[tokio::test]
async fn converting_a_shared_lead_copies_its_grants() {
    let ctx = TestDb::new().await;
    let lead = ctx.lead("Wanda", ctx.alice, Access::Shared).await;
    permission::grant(&ctx.db, ctx.bob, AssetRef::lead(lead.id))
        .await
        .unwrap();
    permission::grant(&ctx.db, ctx.carol, AssetRef::lead(lead.id))
        .await
        .unwrap();

    let opportunity = Opportunity::create_for(
        &ctx.db,
        Some(&lead),
        &AccountCandidate::none(),
        OpportunityParams {
            access: Some("Lead".into()),
            ..owned("Wanda's order", ctx.alice)
        },
        &[ctx.alice],
    )
    .await
    .unwrap();

    assert!(opportunity.is_persisted(), "{}", opportunity.errors());
    assert_eq!(opportunity.access, Access::Shared);
    let id = opportunity.id.unwrap();
    assert_eq!(
        granted_users(&ctx, AssetRef::opportunity(id)).await,
        vec![ctx.bob, ctx.carol]
    );
    assert_eq!(
        granted_users(&ctx, AssetRef::lead(lead.id)).await,
        vec![ctx.bob, ctx.carol]
    );
}

#[tokio::test]
async fn converting_a_private_lead_inherits_private_access() {
    let ctx = TestDb::new().await;
    let lead = ctx.lead("Pat", ctx.alice, Access::Private).await;
    let mut opportunity = Opportunity::new(owned("Pat's order", ctx.alice));
    assert!(opportunity
        .save_with_model_permissions(&ctx.db, &lead)
        .await
        .unwrap());
    assert_eq!(opportunity.access, Access::Private);
    assert!(opportunity.permissions().is_empty());
}

#[tokio::test]
async fn lead_access_without_source_falls_back_to_user_fanout() {
    let ctx = TestDb::new().await;
    let opportunity = Opportunity::create_for(
        &ctx.db,
        None::<&lead::Model>,
        &AccountCandidate::none(),
        OpportunityParams {
            access: Some("Lead".into()),
            ..owned("Orphan", ctx.alice)
        },
        &[ctx.bob],
    )
    .await
    .unwrap();

    assert!(opportunity.is_persisted());
    assert_eq!(opportunity.access, Access::Lead);
    assert!(opportunity.permissions().is_empty());
}

#[tokio::test]
async fn save_with_account_creates_and_links_a_new_account() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(shared("Globex pilot", ctx.alice));
    let saved = opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams::new_named("Globex"),
            &[ctx.carol],
        )
        .await
        .unwrap();

    assert!(saved, "{}", opportunity.errors());
    let account = opportunity.account(&ctx.db).await.unwrap().unwrap();
    assert_eq!(account.name, "Globex");
    assert_eq!(account.user_id, Some(ctx.alice));
    let id = opportunity.id.unwrap();
    assert_eq!(granted_users(&ctx, AssetRef::opportunity(id)).await, vec![ctx.carol]);
}

#[tokio::test]
async fn save_with_account_selects_an_existing_account() {
    let ctx = TestDb::new().await;
    let acme = ctx.account("Acme", ctx.bob).await;
    let mut opportunity = Opportunity::new(owned("Acme support", ctx.alice));
    assert!(opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams::existing(acme.id),
            &[],
        )
        .await
        .unwrap());
    assert_eq!(opportunity.account_id(), Some(acme.id));
    assert_eq!(account::Entity::find().count(&ctx.db).await.unwrap(), 1);
}

#[tokio::test]
async fn invalid_opportunity_rolls_back_the_new_account() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(owned("  ", ctx.alice));
    let saved = opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams::new_named("Initrode"),
            &[],
        )
        .await
        .unwrap();

    assert!(!saved);
    assert!(opportunity.errors().has(Field::Name, ErrorCode::Blank));
    let accounts = account::Entity::find()
        .filter(account::Column::Name.eq("Initrode"))
        .count(&ctx.db)
        .await
        .unwrap();
    assert_eq!(accounts, 0);
}

#[tokio::test]
async fn updates_revalidate_and_bump_timestamps() {
    let ctx = TestDb::new().await;
    let mut taken = Opportunity::new(owned("Taken", ctx.alice));
    assert!(taken.save(&ctx.db).await.unwrap());
    let mut opportunity = Opportunity::new(owned("Draft", ctx.alice));
    assert!(opportunity.save(&ctx.db).await.unwrap());
    let id = opportunity.id.unwrap();

    let mut loaded = Opportunity::find(&ctx.db, id).await.unwrap().unwrap();
    let created_at = loaded.created_at;
    loaded.apply(OpportunityParams {
        stage: Some("negotiation".into()),
        probability: Some("75".into()),
        ..OpportunityParams::default()
    });
    assert!(loaded.save(&ctx.db).await.unwrap());
    assert_eq!(loaded.created_at, created_at);

    let reloaded = Opportunity::find(&ctx.db, id).await.unwrap().unwrap();
    assert_eq!(reloaded.stage.as_deref(), Some("negotiation"));
    assert_eq!(reloaded.probability, Some(75));
    assert_eq!(reloaded.uuid, opportunity.uuid);

    loaded.apply(OpportunityParams::named("Taken"));
    assert!(!loaded.save(&ctx.db).await.unwrap());
    assert!(loaded.errors().has(Field::Name, ErrorCode::Taken));
}

#[tokio::test]
async fn my_opportunities_covers_owner_assignee_and_grantee() {
    let ctx = TestDb::new().await;

    let mut owned_by_alice = Opportunity::new(owned("Alice's own", ctx.alice));
    assert!(owned_by_alice.save(&ctx.db).await.unwrap());

    let mut assigned = Opportunity::new(OpportunityParams {
        assigned_to: Some(ctx.alice),
        ..owned("Bob's, assigned to Alice", ctx.bob)
    });
    assert!(assigned.save(&ctx.db).await.unwrap());

    let mut granted = Opportunity::new(shared("Carol's, shared with Alice", ctx.carol));
    assert!(granted
        .save_with_permissions(&ctx.db, &[ctx.alice])
        .await
        .unwrap());

    let mut hidden = Opportunity::new(owned("Carol's private", ctx.carol));
    assert!(hidden.save(&ctx.db).await.unwrap());

    let mine = Opportunity::my_opportunities(&ctx.db, ctx.alice)
        .await
        .unwrap();
    let names: Vec<&str> = mine.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Carol's, shared with Alice",
            "Bob's, assigned to Alice",
            "Alice's own"
        ]
    );
    assert_eq!(mine[0].permissions().len(), 1);

    let bobs = Opportunity::my_opportunities(&ctx.db, ctx.bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].name, "Bob's, assigned to Alice");
}

#[tokio::test]
async fn contacts_are_listed_once() {
    let ctx = TestDb::new().await;
    let ann = ctx.contact("Ann", "Lee", ctx.alice).await;
    let ben = ctx.contact("Ben", "Ode", ctx.alice).await;
    let mut opportunity = Opportunity::new(owned("Contacts", ctx.alice));
    assert!(opportunity.save(&ctx.db).await.unwrap());

    opportunity.link_contact(&ctx.db, ann.id).await.unwrap();
    opportunity.link_contact(&ctx.db, ben.id).await.unwrap();
    opportunity.link_contact(&ctx.db, ann.id).await.unwrap();

    let contacts = opportunity.contacts(&ctx.db).await.unwrap();
    let ids: Vec<i32> = contacts.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![ann.id, ben.id]);
}

#[tokio::test]
async fn soft_delete_hides_the_row_and_drops_join_rows() {
    let ctx = TestDb::new().await;
    let acme = ctx.account("Acme", ctx.alice).await;
    let ann = ctx.contact("Ann", "Lee", ctx.alice).await;

    let mut opportunity = Opportunity::create_for(
        &ctx.db,
        None::<&lead::Model>,
        &AccountCandidate::resolved(acme.id),
        owned("Doomed", ctx.alice),
        &[],
    )
    .await
    .unwrap();
    let id = opportunity.id.unwrap();
    opportunity.link_contact(&ctx.db, ann.id).await.unwrap();

    opportunity.destroy(&ctx.db).await.unwrap();
    assert!(opportunity.is_deleted());

    assert!(Opportunity::find(&ctx.db, id).await.unwrap().is_none());
    let archived = Opportunity::find_with_deleted(&ctx.db, id)
        .await
        .unwrap()
        .unwrap();
    assert!(archived.deleted_at.is_some());
    assert_eq!(archived.name, "Doomed");

    let mine = Opportunity::my_opportunities(&ctx.db, ctx.alice)
        .await
        .unwrap();
    assert!(mine.iter().all(|o| o.id != Some(id)));

    let links = account_opportunity::Entity::find()
        .filter(account_opportunity::Column::OpportunityId.eq(id))
        .count(&ctx.db)
        .await
        .unwrap();
    assert_eq!(links, 0);
    let contact_links = contact_opportunity::Entity::find()
        .filter(contact_opportunity::Column::OpportunityId.eq(id))
        .count(&ctx.db)
        .await
        .unwrap();
    assert_eq!(contact_links, 0);

    assert!(account::Entity::find_by_id(acme.id).one(&ctx.db).await.unwrap().is_some());
    assert!(contact::Entity::find_by_id(ann.id).one(&ctx.db).await.unwrap().is_some());
}

#[tokio::test]
async fn destroy_requires_a_saved_record() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(owned("Unsaved", ctx.alice));
    let err = opportunity.destroy(&ctx.db).await.unwrap_err();
    assert!(matches!(err, CrmError::NotPersisted));
}

async fn grant_rows(ctx: &TestDb) -> u64 {
    entity::permission::Entity::find()
        .count(&ctx.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn stale_copy_cannot_revive_a_deleted_opportunity() {
    let ctx = TestDb::new().await;
    let mut current = Opportunity::new(owned("Renewal", ctx.alice));
    assert!(current.save(&ctx.db).await.unwrap());
    let id = current.id.unwrap();

    let mut stale = Opportunity::find(&ctx.db, id).await.unwrap().unwrap();
    current.destroy(&ctx.db).await.unwrap();

    stale.apply(OpportunityParams {
        notes: Some("late edit".into()),
        ..OpportunityParams::default()
    });
    let err = stale.save(&ctx.db).await.unwrap_err();
    assert!(matches!(err, CrmError::NotFound(_)));

    let archived = Opportunity::find_with_deleted(&ctx.db, id)
        .await
        .unwrap()
        .unwrap();
    assert!(archived.deleted_at.is_some());
    assert_eq!(archived.notes, None);
    assert!(Opportunity::find(&ctx.db, id).await.unwrap().is_none());
    assert!(Opportunity::my_opportunities(&ctx.db, ctx.alice)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn unknown_grantee_is_reported_on_the_record() {
    let ctx = TestDb::new().await;
    let opportunity = Opportunity::create_for(
        &ctx.db,
        None::<&lead::Model>,
        &AccountCandidate::none(),
        shared("Ghost share", ctx.alice),
        &[ctx.bob, 9999],
    )
    .await
    .unwrap();

    assert!(!opportunity.is_persisted());
    assert!(opportunity.errors().has(Field::Users, ErrorCode::NotFound));
    assert_eq!(opportunity_count(&ctx).await, 0);
    assert_eq!(grant_rows(&ctx).await, 0);
}

#[tokio::test]
async fn unknown_campaign_assignee_and_account_are_reported() {
    let ctx = TestDb::new().await;
    let opportunity = Opportunity::create_for(
        &ctx.db,
        None::<&lead::Model>,
        &AccountCandidate::resolved(777),
        OpportunityParams {
            campaign_id: Some(4242),
            assigned_to: Some(31337),
            ..owned("Dangling", ctx.alice)
        },
        &[],
    )
    .await
    .unwrap();

    assert!(!opportunity.is_persisted());
    let errors = opportunity.errors();
    assert!(errors.has(Field::Campaign, ErrorCode::NotFound));
    assert!(errors.has(Field::AssignedTo, ErrorCode::NotFound));
    assert!(errors.has(Field::Account, ErrorCode::NotFound));
    assert_eq!(opportunity_count(&ctx).await, 0);
}

#[tokio::test]
async fn out_of_range_amounts_block_save() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(OpportunityParams {
        amount: Some("1e30".into()),
        probability: Some("1e12".into()),
        ..owned("Moonshot", ctx.alice)
    });
    assert!(!opportunity.save(&ctx.db).await.unwrap());
    assert!(opportunity.errors().has(Field::Amount, ErrorCode::OutOfRange));
    assert!(opportunity
        .errors()
        .has(Field::Probability, ErrorCode::OutOfRange));
    assert_eq!(opportunity_count(&ctx).await, 0);
}

#[tokio::test]
async fn rejected_shared_save_writes_no_grants_and_retries_cleanly() {
    let ctx = TestDb::new().await;
    let mut taken = Opportunity::new(owned("Renewal", ctx.alice));
    assert!(taken.save(&ctx.db).await.unwrap());

    let mut opportunity = Opportunity::new(shared("Renewal", ctx.alice));
    assert!(!opportunity
        .save_with_permissions(&ctx.db, &[ctx.bob])
        .await
        .unwrap());
    assert!(opportunity.errors().has(Field::Name, ErrorCode::Taken));
    assert!(opportunity.permissions().is_empty());
    assert_eq!(grant_rows(&ctx).await, 0);

    opportunity.apply(OpportunityParams::named("Renewal, take two"));
    assert!(opportunity
        .save_with_permissions(&ctx.db, &[ctx.bob])
        .await
        .unwrap());
    let id = opportunity.id.unwrap();
    assert_eq!(granted_users(&ctx, AssetRef::opportunity(id)).await, vec![ctx.bob]);
    assert_eq!(opportunity.permissions().len(), 1);
}

#[tokio::test]
async fn unknown_account_id_blocks_save() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(owned("Orphaned", ctx.alice));
    let saved = opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams::existing(9999),
            &[],
        )
        .await
        .unwrap();

    assert!(!saved);
    assert!(opportunity.errors().has(Field::Account, ErrorCode::NotFound));
    assert_eq!(opportunity_count(&ctx).await, 0);
}

#[tokio::test]
async fn duplicate_account_name_blocks_save() {
    let ctx = TestDb::new().await;
    ctx.account("Acme", ctx.alice).await;
    let mut opportunity = Opportunity::new(owned("Acme again", ctx.alice));
    let saved = opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams::new_named("Acme"),
            &[],
        )
        .await
        .unwrap();

    assert!(!saved);
    assert!(opportunity.errors().has(Field::Account, ErrorCode::Taken));
    assert_eq!(opportunity_count(&ctx).await, 0);
    assert_eq!(account::Entity::find().count(&ctx.db).await.unwrap(), 1);
}

#[tokio::test]
async fn shared_account_without_users_blocks_save() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(owned("Globex pilot", ctx.alice));
    let saved = opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams {
                access: Some("Shared".into()),
                ..AccountParams::new_named("Globex")
            },
            &[],
        )
        .await
        .unwrap();

    assert!(!saved);
    assert!(opportunity
        .errors()
        .has(Field::Account, ErrorCode::SharedWithoutUsers));
    assert_eq!(account::Entity::find().count(&ctx.db).await.unwrap(), 0);
}

#[tokio::test]
async fn lead_access_account_inherits_opportunity_sharing() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(shared("Hooli deal", ctx.alice));
    let saved = opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams {
                access: Some("Lead".into()),
                ..AccountParams::new_named("Hooli")
            },
            &[ctx.carol],
        )
        .await
        .unwrap();

    assert!(saved, "{}", opportunity.errors());
    let account = opportunity.account(&ctx.db).await.unwrap().unwrap();
    assert_eq!(account.access, Access::Shared);
    assert_eq!(
        granted_users(&ctx, AssetRef::account(account.id)).await,
        vec![ctx.carol]
    );
}

#[tokio::test]
async fn missing_account_reference_saves_without_a_link() {
    let ctx = TestDb::new().await;
    let mut opportunity = Opportunity::new(owned("Standalone", ctx.alice));
    assert!(opportunity
        .save_with_account_and_permissions(
            &ctx.db,
            &AccountResolver,
            &AccountParams::default(),
            &[],
        )
        .await
        .unwrap());
    assert_eq!(opportunity.account_id(), None);
    assert_eq!(account::Entity::find().count(&ctx.db).await.unwrap(), 0);
}
