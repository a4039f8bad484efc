#![allow(dead_code)]

use chrono::Utc;
use entity::{Access, account, contact, lead, users};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};

pub struct TestDb {
    pub db: DbPool,
    pub alice: i32,
    pub bob: i32,
    pub carol: i32,
}

impl TestDb {
    /// Fresh in-memory database with the schema applied and three users.
    pub async fn new() -> Self {
        let db = connect(&DatabaseSettings::with_url("sqlite::memory:").max_connections(1))
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();
        let alice = insert_user(&db, "alice").await.id;
        let bob = insert_user(&db, "bob").await.id;
        let carol = insert_user(&db, "carol").await.id;
        Self {
            db,
            alice,
            bob,
            carol,
        }
    }

    pub async fn account(&self, name: &str, owner: i32) -> account::Model {
        let now = now();
        account::ActiveModel {
            user_id: Set(Some(owner)),
            assigned_to: Set(None),
            name: Set(name.to_string()),
            access: Set(Access::Public),
            website: Set(None),
            phone: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn contact(&self, first: &str, last: &str, owner: i32) -> contact::Model {
        let now = now();
        contact::ActiveModel {
            user_id: Set(Some(owner)),
            first_name: Set(first.to_string()),
            last_name: Set(last.to_string()),
            email: Set(Some(format!("{}@example.com", first.to_lowercase()))),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn lead(&self, first: &str, owner: i32, access: Access) -> lead::Model {
        let now = now();
        lead::ActiveModel {
            user_id: Set(Some(owner)),
            first_name: Set(first.to_string()),
            last_name: Set("Prospect".to_string()),
            company: Set(Some("Initech".to_string())),
            access: Set(access),
            status: Set(Some("contacted".to_string())),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }
}

async fn insert_user(db: &DbPool, username: &str) -> users::Model {
    let now = now();
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}
