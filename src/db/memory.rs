//! In-process store used by tests and when no `DATABASE_URL` is configured.
//! Mirrors the constraints and cascades of the Postgres schema.

use std::collections::HashMap;

use anyhow::bail;
use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{repo::UserRepo, repo_types::User},
    favorites::repo::FavoriteRepo,
    meal_plans::{
        repo::MealPlanRepo,
        repo_types::{MealPlanMeal, MealPlanRecord, MealType},
    },
    pantry::{
        repo::PantryRepo,
        repo_types::{pantry_order, PantryItem},
    },
    profiles::{repo::ProfileRepo, Profile, Role},
    ratings::{repo::RatingRepo, Rating},
    recipes::{repo::RecipeRepo, Recipe, RecipeFilters},
};

#[derive(Debug, Clone)]
struct StoredMeal {
    id: Uuid,
    meal_plan_id: Uuid,
    recipe_id: Uuid,
    meal_type: MealType,
    meal_time: Option<String>,
    created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
struct StoredFavorite {
    user_id: Uuid,
    recipe_id: Uuid,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    recipes: HashMap<Uuid, Recipe>,
    pantry: HashMap<Uuid, PantryItem>,
    plans: HashMap<Uuid, MealPlanRecord>,
    meals: Vec<StoredMeal>,
    // insertion order doubles as favorited-at order
    favorites: Vec<StoredFavorite>,
    ratings: HashMap<(Uuid, Uuid), Rating>,
}

impl Tables {
    fn drop_recipe(&mut self, recipe_id: Uuid) -> bool {
        if self.recipes.remove(&recipe_id).is_none() {
            return false;
        }
        self.meals.retain(|m| m.recipe_id != recipe_id);
        self.favorites.retain(|f| f.recipe_id != recipe_id);
        self.ratings.retain(|(_, r), _| *r != recipe_id);
        true
    }

    fn join_meal(&self, m: &StoredMeal) -> anyhow::Result<MealPlanMeal> {
        let Some(recipe) = self.recipes.get(&m.recipe_id) else {
            bail!("planned meal {} references missing recipe", m.id);
        };
        Ok(MealPlanMeal {
            id: m.id,
            meal_plan_id: m.meal_plan_id,
            recipe_id: m.recipe_id,
            recipe_title: recipe.title.clone(),
            recipe_image_url: recipe.image_url.clone(),
            meal_type: m.meal_type,
            scheduled_time: m.meal_time.clone(),
            created_at: m.created_at,
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == email) {
            bail!("duplicate key value violates unique constraint \"users_email_key\"");
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        t.profiles.remove(&id);
        t.pantry.retain(|_, item| item.user_id != id);

        let plan_ids: Vec<Uuid> = t
            .plans
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        t.plans.retain(|_, p| p.user_id != id);
        t.meals.retain(|m| !plan_ids.contains(&m.meal_plan_id));
        t.favorites.retain(|f| f.user_id != id);
        t.ratings.retain(|(user, _), _| *user != id);

        let authored: Vec<Uuid> = t
            .recipes
            .values()
            .filter(|r| r.author_id == id)
            .map(|r| r.id)
            .collect();
        for recipe_id in authored {
            t.drop_recipe(recipe_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn create(&self, user_id: Uuid, display_name: Option<String>) -> anyhow::Result<Profile> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            bail!("profile references unknown user {user_id}");
        }
        if t.profiles.contains_key(&user_id) {
            bail!("profile for {user_id} already exists");
        }
        let profile = Profile::new(user_id, display_name);
        t.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn update(&self, profile: &Profile) -> anyhow::Result<Option<Profile>> {
        let mut t = self.tables.write().await;
        let Some(stored) = t.profiles.get_mut(&profile.id) else {
            return Ok(None);
        };
        stored.display_name = profile.display_name.clone();
        stored.avatar_url = profile.avatar_url.clone();
        stored.dietary_preferences = profile.dietary_preferences.clone();
        stored.cuisine_preferences = profile.cuisine_preferences.clone();
        stored.allergies = profile.allergies.clone();
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(Some(stored.clone()))
    }

    async fn role(&self, user_id: Uuid) -> anyhow::Result<Option<Role>> {
        Ok(self.tables.read().await.profiles.get(&user_id).map(|p| p.role))
    }
}

#[async_trait]
impl RecipeRepo for MemoryStore {
    async fn list(&self, filters: &RecipeFilters) -> anyhow::Result<Vec<Recipe>> {
        let t = self.tables.read().await;
        let mut found: Vec<Recipe> = t
            .recipes
            .values()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| filters.sort.compare(a, b));
        Ok(found
            .into_iter()
            .skip(filters.offset() as usize)
            .take(filters.limit() as usize)
            .collect())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        Ok(self.tables.read().await.recipes.get(&id).cloned())
    }

    async fn exists(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.tables.read().await.recipes.contains_key(&id))
    }

    async fn insert(&self, recipe: &Recipe) -> anyhow::Result<Recipe> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&recipe.author_id) {
            bail!("recipe references unknown author {}", recipe.author_id);
        }
        if t.recipes.contains_key(&recipe.id) {
            bail!("recipe {} already exists", recipe.id);
        }
        t.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe.clone())
    }

    async fn update(&self, recipe: &Recipe) -> anyhow::Result<Option<Recipe>> {
        let mut t = self.tables.write().await;
        let Some(stored) = t.recipes.get_mut(&recipe.id) else {
            return Ok(None);
        };
        let (author_id, created_at) = (stored.author_id, stored.created_at);
        *stored = Recipe {
            author_id,
            created_at,
            updated_at: OffsetDateTime::now_utc(),
            ..recipe.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.tables.write().await.drop_recipe(id))
    }
}

#[async_trait]
impl PantryRepo for MemoryStore {
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<PantryItem>> {
        let t = self.tables.read().await;
        let mut items: Vec<PantryItem> = t
            .pantry
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(pantry_order);
        Ok(items)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<PantryItem>> {
        let t = self.tables.read().await;
        Ok(t.pantry.get(&id).filter(|i| i.user_id == user_id).cloned())
    }

    async fn insert(&self, item: &PantryItem) -> anyhow::Result<PantryItem> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&item.user_id) {
            bail!("pantry item references unknown user {}", item.user_id);
        }
        t.pantry.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn update(&self, item: &PantryItem) -> anyhow::Result<Option<PantryItem>> {
        let mut t = self.tables.write().await;
        let Some(stored) = t.pantry.get_mut(&item.id).filter(|i| i.user_id == item.user_id) else {
            return Ok(None);
        };
        stored.name = item.name.clone();
        stored.quantity = item.quantity;
        stored.unit = item.unit.clone();
        stored.category = item.category.clone();
        stored.expiry_date = item.expiry_date;
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        if t.pantry.get(&id).is_some_and(|i| i.user_id == user_id) {
            t.pantry.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn expiring(&self, user_id: Uuid, until: Date) -> anyhow::Result<Vec<PantryItem>> {
        let t = self.tables.read().await;
        let mut items: Vec<PantryItem> = t
            .pantry
            .values()
            .filter(|i| i.user_id == user_id && i.expires_by(until))
            .cloned()
            .collect();
        items.sort_by(pantry_order);
        Ok(items)
    }
}

#[async_trait]
impl MealPlanRepo for MemoryStore {
    async fn find_plan(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<MealPlanRecord>> {
        let t = self.tables.read().await;
        Ok(t.plans
            .values()
            .find(|p| p.user_id == user_id && p.plan_date == date)
            .cloned())
    }

    async fn list_plans(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<MealPlanRecord>> {
        let t = self.tables.read().await;
        let mut plans: Vec<MealPlanRecord> = t
            .plans
            .values()
            .filter(|p| p.user_id == user_id && p.plan_date >= from && p.plan_date <= to)
            .cloned()
            .collect();
        plans.sort_by_key(|p| p.plan_date);
        Ok(plans)
    }

    async fn ensure_plan(&self, user_id: Uuid, date: Date) -> anyhow::Result<MealPlanRecord> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t
            .plans
            .values()
            .find(|p| p.user_id == user_id && p.plan_date == date)
        {
            return Ok(existing.clone());
        }
        if !t.users.contains_key(&user_id) {
            bail!("meal plan references unknown user {user_id}");
        }
        let plan = MealPlanRecord {
            id: Uuid::new_v4(),
            user_id,
            plan_date: date,
        };
        t.plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn list_meals(&self, plan_ids: &[Uuid]) -> anyhow::Result<Vec<MealPlanMeal>> {
        let t = self.tables.read().await;
        t.meals
            .iter()
            .filter(|m| plan_ids.contains(&m.meal_plan_id))
            .map(|m| t.join_meal(m))
            .collect()
    }

    async fn insert_meal(
        &self,
        plan_id: Uuid,
        recipe_id: Uuid,
        meal_type: MealType,
        time: Option<&str>,
    ) -> anyhow::Result<MealPlanMeal> {
        let mut t = self.tables.write().await;
        if !t.plans.contains_key(&plan_id) {
            bail!("planned meal references unknown plan {plan_id}");
        }
        let meal = StoredMeal {
            id: Uuid::new_v4(),
            meal_plan_id: plan_id,
            recipe_id,
            meal_type,
            meal_time: time.map(str::to_string),
            created_at: OffsetDateTime::now_utc(),
        };
        let joined = t.join_meal(&meal)?;
        t.meals.push(meal);
        Ok(joined)
    }

    async fn delete_meal(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let owned = t.meals.iter().position(|m| {
            m.id == meal_id
                && t.plans
                    .get(&m.meal_plan_id)
                    .is_some_and(|p| p.user_id == user_id)
        });
        match owned {
            Some(idx) => {
                t.meals.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl FavoriteRepo for MemoryStore {
    async fn add(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<()> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            bail!("favorite references unknown user {user_id}");
        }
        if !t.recipes.contains_key(&recipe_id) {
            bail!("favorite references unknown recipe {recipe_id}");
        }
        if !t
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.recipe_id == recipe_id)
        {
            t.favorites.push(StoredFavorite { user_id, recipe_id });
        }
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.favorites.len();
        t.favorites
            .retain(|f| !(f.user_id == user_id && f.recipe_id == recipe_id));
        Ok(t.favorites.len() != before)
    }

    async fn exists(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
        let t = self.tables.read().await;
        Ok(t.favorites
            .iter()
            .any(|f| f.user_id == user_id && f.recipe_id == recipe_id))
    }

    async fn toggle(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.favorites.len();
        t.favorites
            .retain(|f| !(f.user_id == user_id && f.recipe_id == recipe_id));
        if t.favorites.len() != before {
            return Ok(false);
        }
        if !t.users.contains_key(&user_id) {
            bail!("favorite references unknown user {user_id}");
        }
        if !t.recipes.contains_key(&recipe_id) {
            bail!("favorite references unknown recipe {recipe_id}");
        }
        t.favorites.push(StoredFavorite { user_id, recipe_id });
        Ok(true)
    }

    async fn list_recipes(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let t = self.tables.read().await;
        Ok(t.favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| t.recipes.get(&f.recipe_id).cloned())
            .collect())
    }
}

#[async_trait]
impl RatingRepo for MemoryStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        rating: i32,
        review: Option<&str>,
    ) -> anyhow::Result<Rating> {
        if !(1..=5).contains(&rating) {
            bail!("rating {rating} violates check constraint");
        }
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            bail!("rating references unknown user {user_id}");
        }
        if !t.recipes.contains_key(&recipe_id) {
            bail!("rating references unknown recipe {recipe_id}");
        }
        let now = OffsetDateTime::now_utc();
        let entry = t
            .ratings
            .entry((user_id, recipe_id))
            .and_modify(|r| {
                r.rating = rating;
                r.review = review.map(str::to_string);
                r.updated_at = now;
            })
            .or_insert_with(|| Rating {
                id: Uuid::new_v4(),
                user_id,
                recipe_id,
                rating,
                review: review.map(str::to_string),
                created_at: now,
                updated_at: now,
            });
        Ok(entry.clone())
    }

    async fn get(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<Option<Rating>> {
        Ok(self
            .tables
            .read()
            .await
            .ratings
            .get(&(user_id, recipe_id))
            .cloned())
    }

    async fn list_for_recipe(&self, recipe_id: Uuid) -> anyhow::Result<Vec<Rating>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Rating> = t
            .ratings
            .values()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }
}
