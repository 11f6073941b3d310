use larder_shared::{IngredientCategory, Shortfall};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};
use std::str::FromStr;
use temp_dir::TempDir;

pub struct TestState {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn setup() -> anyhow::Result<TestState> {
    let dir = TempDir::new()?;
    let path = dir.child("larder.db");
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let mut conn = pool.acquire().await?;
    larder_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;
    drop(conn);

    Ok(TestState { pool, _dir: dir })
}

#[allow(dead_code)]
pub fn shortfall(name: &str, quantity: f64) -> Shortfall {
    Shortfall {
        name: name.to_owned(),
        quantity,
        unit: "piece".to_owned(),
        category: Some(IngredientCategory::Other),
    }
}
