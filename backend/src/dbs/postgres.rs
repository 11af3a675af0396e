use async_trait::async_trait;
use shared::StoreSyncError;
use shared::models::Character;
use shared::persistence::{CharacterPersistence, SyncResult};
use sqlx::{Pool, Postgres, Row, postgres::PgPoolOptions};

/// Character list kept in a PostgreSQL (or CockroachDB) table.
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: Pool<Postgres>,
}

impl PostgresPersistence {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().connect(database_url).await?;
        let db = Self { pool };
        db.init().await?;
        tracing::info!("Connected to character table");
        Ok(db)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS characters (
                id BIGINT PRIMARY KEY,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                personality TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_all(&self, characters: &[Character]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM characters")
            .execute(&mut *tx)
            .await?;

        for (position, character) in characters.iter().enumerate() {
            sqlx::query(
                "INSERT INTO characters (id, position, name, description, personality) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(character.id)
            .bind(row_position(position)?)
            .bind(&character.name)
            .bind(&character.description)
            .bind(&character.personality)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}

/// `position` column value for the character at `index`.
fn row_position(index: usize) -> Result<i32, sqlx::Error> {
    i32::try_from(index).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

#[async_trait]
impl CharacterPersistence for PostgresPersistence {
    async fn load(&self) -> SyncResult<Vec<Character>> {
        let rows = sqlx::query(
            "SELECT id, name, description, personality FROM characters ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreSyncError::Read(e.to_string()))?;

        rows.into_iter()
            .map(|row| -> Result<Character, sqlx::Error> {
                Ok(Character {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    personality: row.try_get("personality")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreSyncError::Corrupt(e.to_string()))
    }

    async fn save(&self, characters: &[Character]) -> SyncResult<()> {
        self.replace_all(characters)
            .await
            .map_err(|e| StoreSyncError::Write(e.to_string()))
    }
}
