//! Table accessors over Postgres or the in-memory store.

pub mod memory;

use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::{
    auth::repo::UserRepo, favorites::repo::FavoriteRepo, meal_plans::repo::MealPlanRepo,
    pantry::repo::PantryRepo, profiles::repo::ProfileRepo, ratings::repo::RatingRepo,
    recipes::repo::RecipeRepo,
};

pub use memory::MemoryStore;

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Every repository the services need, behind one handle.
#[derive(Clone)]
pub struct Db {
    users: Arc<dyn UserRepo>,
    profiles: Arc<dyn ProfileRepo>,
    recipes: Arc<dyn RecipeRepo>,
    pantry: Arc<dyn PantryRepo>,
    meal_plans: Arc<dyn MealPlanRepo>,
    favorites: Arc<dyn FavoriteRepo>,
    ratings: Arc<dyn RatingRepo>,
    pool: Option<PgPool>,
}

impl Db {
    fn from_store<S>(store: Arc<S>, pool: Option<PgPool>) -> Self
    where
        S: UserRepo
            + ProfileRepo
            + RecipeRepo
            + PantryRepo
            + MealPlanRepo
            + FavoriteRepo
            + RatingRepo
            + 'static,
    {
        Self {
            users: store.clone(),
            profiles: store.clone(),
            recipes: store.clone(),
            pantry: store.clone(),
            meal_plans: store.clone(),
            favorites: store.clone(),
            ratings: store,
            pool,
        }
    }

    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .context("connect to database")?;
        info!("connected to postgres");
        Ok(Self::postgres(pool))
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool.clone())), Some(pool))
    }

    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::default()), None)
    }

    pub fn users(&self) -> &dyn UserRepo {
        self.users.as_ref()
    }

    pub fn profiles(&self) -> &dyn ProfileRepo {
        self.profiles.as_ref()
    }

    pub fn recipes(&self) -> &dyn RecipeRepo {
        self.recipes.as_ref()
    }

    pub fn pantry(&self) -> &dyn PantryRepo {
        self.pantry.as_ref()
    }

    pub fn meal_plans(&self) -> &dyn MealPlanRepo {
        self.meal_plans.as_ref()
    }

    pub fn favorites(&self) -> &dyn FavoriteRepo {
        self.favorites.as_ref()
    }

    pub fn ratings(&self) -> &dyn RatingRepo {
        self.ratings.as_ref()
    }

    /// The Postgres pool, `None` for the in-memory store.
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
