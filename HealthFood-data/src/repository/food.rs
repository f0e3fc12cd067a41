use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::{json, Value};

use super::columns::{encode, json_list, json_object, now};
use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{FoodChanges, FoodRecord, NewFood};

const DUPLICATE_FOOD: &str = "A food with this name already exists";

/// Repository trait for the food database
#[async_trait]
pub trait FoodRepositoryTrait: Send + Sync {
    /// Foods whose name or category contains the term, by name
    async fn search_by_name(&self, term: &str, limit: u32) -> Result<Vec<FoodRecord>, RepositoryError>;

    /// Page through foods, optionally filtered by name, category or subcategory
    async fn list(&self, query: Option<&str>, limit: u32, offset: u32) -> Result<Vec<FoodRecord>, RepositoryError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<FoodRecord>, RepositoryError>;

    async fn create(&self, food: NewFood) -> Result<FoodRecord, RepositoryError>;

    /// Apply a partial update; `None` when the food does not exist
    async fn update(&self, id: i64, changes: FoodChanges) -> Result<Option<FoodRecord>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite-backed food repository
#[derive(Debug, Clone)]
pub struct FoodRepository {
    pool: DatabasePool,
}

impl FoodRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const FOOD_COLUMNS: &str = "id, name, category, subcategory, nutrients_json, contraindications_json, \
     benefits_json, recommended_portions_json, preparation_notes, source_reliability, created_by, \
     created_at, updated_at";

fn map_food(row: &Row<'_>) -> rusqlite::Result<FoodRecord> {
    Ok(FoodRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        subcategory: row.get(3)?,
        nutrients: json_object(row.get(4)?),
        contraindications: json_list(row.get(5)?),
        benefits: json_list(row.get(6)?),
        recommended_portions: json_object(row.get(7)?),
        preparation_notes: row.get(8)?,
        source_reliability: row.get(9)?,
        created_by: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn fetch(conn: &Connection, id: i64) -> rusqlite::Result<Option<FoodRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM foods WHERE id = ?1", FOOD_COLUMNS),
        [id],
        map_food,
    )
    .optional()
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

#[async_trait]
impl FoodRepositoryTrait for FoodRepository {
    async fn search_by_name(&self, term: &str, limit: u32) -> Result<Vec<FoodRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM foods WHERE name LIKE ?1 OR category LIKE ?1 ORDER BY name LIMIT ?2",
            FOOD_COLUMNS
        ))?;
        let rows = stmt.query_map(params![like_pattern(term), limit], map_food)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn list(&self, query: Option<&str>, limit: u32, offset: u32) -> Result<Vec<FoodRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let foods = match query {
            Some(q) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM foods
                     WHERE name LIKE ?1 OR category LIKE ?1 OR subcategory LIKE ?1
                     ORDER BY name LIMIT ?2 OFFSET ?3",
                    FOOD_COLUMNS
                ))?;
                let rows = stmt.query_map(params![like_pattern(q), limit, offset], map_food)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM foods ORDER BY name LIMIT ?1 OFFSET ?2",
                    FOOD_COLUMNS
                ))?;
                let rows = stmt.query_map(params![limit, offset], map_food)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(foods)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<FoodRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        Ok(fetch(&conn, id)?)
    }

    async fn create(&self, food: NewFood) -> Result<FoodRecord, RepositoryError> {
        let conn = self.pool.get()?;
        let ts = now();
        let nutrients = encode(&food.nutrients.unwrap_or_else(|| json!({})))?;
        let contraindications = encode(&food.contraindications.unwrap_or_else(|| json!([])))?;
        let benefits = encode(&food.benefits.unwrap_or_else(|| json!([])))?;
        let portions = encode(&food.recommended_portions.unwrap_or_else(|| json!({})))?;
        let reliability = food.source_reliability.unwrap_or_else(|| "verified".to_string());

        conn.execute(
            "INSERT INTO foods
                (name, category, subcategory, nutrients_json, contraindications_json, benefits_json,
                 recommended_portions_json, preparation_notes, source_reliability, created_by,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                food.name.trim(),
                food.category,
                food.subcategory,
                nutrients,
                contraindications,
                benefits,
                portions,
                food.preparation_notes,
                reliability,
                food.created_by,
                ts
            ],
        )
        .map_err(|e| RepositoryError::from_insert(e, DUPLICATE_FOOD))?;

        let id = conn.last_insert_rowid();
        fetch(&conn, id)?.ok_or_else(|| RepositoryError::NotFound(format!("food {}", id)))
    }

    async fn update(&self, id: i64, changes: FoodChanges) -> Result<Option<FoodRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        if fetch(&conn, id)?.is_none() {
            return Ok(None);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        let text_fields = [
            ("name = ?", changes.name.map(|n| n.trim().to_string())),
            ("category = ?", changes.category),
            ("subcategory = ?", changes.subcategory),
            ("preparation_notes = ?", changes.preparation_notes),
            ("source_reliability = ?", changes.source_reliability),
        ];
        for (set, value) in text_fields {
            if let Some(value) = value {
                sets.push(set);
                values.push(SqlValue::Text(value));
            }
        }

        let json_fields: [(&str, Option<Value>); 4] = [
            ("nutrients_json = ?", changes.nutrients),
            ("contraindications_json = ?", changes.contraindications),
            ("benefits_json = ?", changes.benefits),
            ("recommended_portions_json = ?", changes.recommended_portions),
        ];
        for (set, value) in json_fields {
            if let Some(value) = value {
                sets.push(set);
                values.push(SqlValue::Text(encode(&value)?));
            }
        }

        if !sets.is_empty() {
            sets.push("updated_at = ?");
            values.push(SqlValue::Text(now()));
            values.push(SqlValue::Integer(id));
            let sql = format!("UPDATE foods SET {} WHERE id = ?", sets.join(", "));
            conn.execute(&sql, params_from_iter(values))
                .map_err(|e| RepositoryError::from_insert(e, DUPLICATE_FOOD))?;
        }

        Ok(fetch(&conn, id)?)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM foods WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::test_pool;

    fn food(name: &str, category: &str, subcategory: Option<&str>) -> NewFood {
        NewFood {
            name: name.to_string(),
            category: Some(category.to_string()),
            subcategory: subcategory.map(str::to_string),
            ..Default::default()
        }
    }

    async fn seeded() -> FoodRepository {
        let repo = FoodRepository::new(test_pool());
        repo.create(food("Oatmeal", "Grains", Some("Whole grain"))).await.unwrap();
        repo.create(food("Brown rice", "Grains", Some("Whole grain"))).await.unwrap();
        repo.create(food("Salmon", "Fish", Some("Oily fish"))).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn created_food_gets_empty_json_defaults() {
        let repo = FoodRepository::new(test_pool());
        let created = repo.create(food("Tofu", "Legumes", None)).await.unwrap();

        assert_eq!(created.nutrients, json!({}));
        assert_eq!(created.contraindications, json!([]));
        assert_eq!(created.benefits, json!([]));
        assert_eq!(created.recommended_portions, json!({}));
        assert_eq!(created.source_reliability, "verified");
    }

    #[tokio::test]
    async fn search_matches_name_or_category() {
        let repo = seeded().await;

        let by_category = repo.search_by_name("grain", 10).await.unwrap();
        let names: Vec<_> = by_category.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Brown rice", "Oatmeal"]);

        let by_name = repo.search_by_name("salm", 10).await.unwrap();
        assert_eq!(by_name.len(), 1);
    }

    #[tokio::test]
    async fn list_filters_subcategory_and_pages() {
        let repo = seeded().await;

        let oily = repo.list(Some("oily"), 50, 0).await.unwrap();
        assert_eq!(oily.len(), 1);
        assert_eq!(oily[0].name, "Salmon");

        let page = repo.list(None, 2, 1).await.unwrap();
        let names: Vec<_> = page.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Oatmeal", "Salmon"]);
    }

    #[tokio::test]
    async fn update_touches_only_provided_fields() {
        let repo = seeded().await;
        let salmon = repo.search_by_name("Salmon", 1).await.unwrap().remove(0);

        let updated = repo
            .update(
                salmon.id,
                FoodChanges {
                    nutrients: Some(json!({"protein_g": 20})),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.nutrients, json!({"protein_g": 20}));
        assert_eq!(updated.category.as_deref(), Some("Fish"));

        assert!(repo.update(999, FoodChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_names_conflict_and_delete_reports_missing() {
        let repo = seeded().await;
        let err = repo.create(food("Salmon", "Fish", None)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let salmon = repo.search_by_name("Salmon", 1).await.unwrap().remove(0);
        assert!(repo.delete(salmon.id).await.unwrap());
        assert!(!repo.delete(salmon.id).await.unwrap());
    }
}
