//! Food seed data loaded from CSV.
//!
//! Expected header: `name, category, subcategory, nutrients_json,
//! contraindications, benefits, recommended_portion, notes`. Every column but
//! `name` may be missing. List columns are `;`-separated.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use rusqlite::params;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::connection::{DatabaseError, DatabasePool};

/// Load foods from a CSV file; returns the number of new rows.
///
/// A missing file is not an error. Rows whose name already exists are skipped.
pub fn seed_foods_from_csv(pool: &DatabasePool, path: impl AsRef<Path>) -> Result<usize, DatabaseError> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No food seed file at {:?}, skipping", path);
        return Ok(0);
    }

    let file = std::fs::File::open(path)?;
    let inserted = seed_foods_from_reader(pool, file)?;
    info!("Seeded {} foods from {:?}", inserted, path);
    Ok(inserted)
}

/// Load foods from any CSV source
pub fn seed_foods_from_reader<R: Read>(pool: &DatabasePool, source: R) -> Result<usize, DatabaseError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    let ts = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let mut inserted = 0;

    for (line, record) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping malformed seed row {}: {}", line + 2, e);
                continue;
            }
        };

        let Some(food) = SeedFood::from_row(&row) else {
            continue;
        };

        inserted += tx.execute(
            "INSERT OR IGNORE INTO foods
                (name, category, subcategory, nutrients_json, contraindications_json, benefits_json,
                 recommended_portions_json, preparation_notes, source_reliability, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'verified', ?9, ?9)",
            params![
                food.name,
                food.category,
                food.subcategory,
                food.nutrients.to_string(),
                food.contraindications.to_string(),
                food.benefits.to_string(),
                food.portions.to_string(),
                food.notes,
                ts
            ],
        )?;
    }

    tx.commit()?;
    Ok(inserted)
}

struct SeedFood {
    name: String,
    category: Option<String>,
    subcategory: Option<String>,
    nutrients: Value,
    contraindications: Value,
    benefits: Value,
    portions: Value,
    notes: Option<String>,
}

impl SeedFood {
    fn from_row(row: &HashMap<String, String>) -> Option<Self> {
        let field = |key: &str| {
            row.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let name = field("name")?;

        let nutrients = field("nutrients_json")
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));

        let portions = match field("recommended_portion") {
            Some(portion) => json!({ "default": portion }),
            None => json!({}),
        };

        Some(Self {
            name,
            category: field("category"),
            subcategory: field("subcategory"),
            nutrients,
            contraindications: split_list(field("contraindications")),
            benefits: split_list(field("benefits")),
            portions,
            notes: field("notes"),
        })
    }
}

fn split_list(raw: Option<String>) -> Value {
    let items: Vec<String> = raw
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    json!(items)
}
