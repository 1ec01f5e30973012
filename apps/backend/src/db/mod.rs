//! PostgreSQL database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::models::*;
use crate::store::{Store, StoreResult};

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for Database {
    // === User Repository ===

    async fn create_user(&self, name: Option<&str>) -> StoreResult<User> {
        let user = User::new(name);
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, token, name, created_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(user.id)
        .bind(&user.token)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.last_seen_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn touch_user(&self, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Deck Repository ===

    async fn insert_deck(&self, deck: &Deck) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO decks (id, owner_id, name, description, subject, tags, created_at, last_studied)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(deck.id)
        .bind(deck.owner_id)
        .bind(&deck.name)
        .bind(&deck.description)
        .bind(&deck.subject)
        .bind(&deck.tags)
        .bind(deck.created_at)
        .bind(deck.last_studied)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_deck(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Option<Deck>> {
        let deck = sqlx::query_as::<_, DbDeck>(
            r#"
            SELECT id, owner_id, name, description, subject, tags, created_at, last_studied
            FROM decks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(deck_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deck.map(Deck::from))
    }

    async fn list_decks(&self, owner_id: Uuid) -> StoreResult<Vec<DeckSummary>> {
        let decks = sqlx::query_as::<_, DbDeckWithCount>(
            r#"
            SELECT d.id, d.owner_id, d.name, d.description, d.subject, d.tags,
                   d.created_at, d.last_studied,
                   COUNT(f.id) as card_count
            FROM decks d
            LEFT JOIN flashcards f ON f.deck_id = d.id
            WHERE d.owner_id = $1
            GROUP BY d.id
            ORDER BY d.last_studied DESC NULLS LAST, d.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(decks.into_iter().map(DeckSummary::from).collect())
    }

    async fn count_cards(&self, deck_id: Uuid) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flashcards WHERE deck_id = $1")
            .bind(deck_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn touch_deck_studied(&self, deck_id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE decks
            SET last_studied = $2
            WHERE id = $1
            "#,
        )
        .bind(deck_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM decks WHERE id = $1 AND owner_id = $2")
            .bind(deck_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_cards_by_deck(&self, deck_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM flashcards WHERE deck_id = $1")
            .bind(deck_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deck and card deletion in one transaction.
    async fn delete_deck_cascade(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let deck = sqlx::query("DELETE FROM decks WHERE id = $1 AND owner_id = $2")
            .bind(deck_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        if deck.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let cards = sqlx::query("DELETE FROM flashcards WHERE deck_id = $1")
            .bind(deck_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(cards.rows_affected()))
    }

    // === Flashcard Repository ===

    async fn insert_card(&self, card: &Flashcard) -> StoreResult<()> {
        let row = DbFlashcard::from_card(card)?;

        sqlx::query(
            r#"
            INSERT INTO flashcards (id, owner_id, deck_id, front, back, tags, created_at,
                                    interval_days, ease_factor, repetitions, next_review, last_reviewed,
                                    total_reviews, correct_reviews, streak, last_review_quality)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(row.id)
        .bind(row.owner_id)
        .bind(row.deck_id)
        .bind(&row.front)
        .bind(&row.back)
        .bind(&row.tags)
        .bind(row.created_at)
        .bind(row.interval_days)
        .bind(row.ease_factor)
        .bind(row.repetitions)
        .bind(row.next_review)
        .bind(row.last_reviewed)
        .bind(row.total_reviews)
        .bind(row.correct_reviews)
        .bind(row.streak)
        .bind(row.last_review_quality)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_card(&self, card: &Flashcard) -> StoreResult<bool> {
        let row = DbFlashcard::from_card(card)?;

        let result = sqlx::query(
            r#"
            UPDATE flashcards SET
                front = $3,
                back = $4,
                tags = $5,
                interval_days = $6,
                ease_factor = $7,
                repetitions = $8,
                next_review = $9,
                last_reviewed = $10,
                total_reviews = $11,
                correct_reviews = $12,
                streak = $13,
                last_review_quality = $14
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(row.id)
        .bind(row.owner_id)
        .bind(&row.front)
        .bind(&row.back)
        .bind(&row.tags)
        .bind(row.interval_days)
        .bind(row.ease_factor)
        .bind(row.repetitions)
        .bind(row.next_review)
        .bind(row.last_reviewed)
        .bind(row.total_reviews)
        .bind(row.correct_reviews)
        .bind(row.streak)
        .bind(row.last_review_quality)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_card(&self, owner_id: Uuid, card_id: Uuid) -> StoreResult<Option<Flashcard>> {
        let row = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, owner_id, deck_id, front, back, tags, created_at,
                   interval_days, ease_factor, repetitions, next_review, last_reviewed,
                   total_reviews, correct_reviews, streak, last_review_quality
            FROM flashcards
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(card_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DbFlashcard::into_card).transpose()
    }

    async fn list_cards(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Vec<Flashcard>> {
        let rows = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, owner_id, deck_id, front, back, tags, created_at,
                   interval_days, ease_factor, repetitions, next_review, last_reviewed,
                   total_reviews, correct_reviews, streak, last_review_quality
            FROM flashcards
            WHERE owner_id = $1 AND deck_id = $2
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbFlashcard::into_card).collect()
    }

    async fn due_cards(
        &self,
        owner_id: Uuid,
        deck_id: Option<Uuid>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<Flashcard>> {
        let rows = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, owner_id, deck_id, front, back, tags, created_at,
                   interval_days, ease_factor, repetitions, next_review, last_reviewed,
                   total_reviews, correct_reviews, streak, last_review_quality
            FROM flashcards
            WHERE owner_id = $1
              AND ($2::UUID IS NULL OR deck_id = $2)
              AND next_review <= $3
            ORDER BY next_review
            LIMIT $4
            "#,
        )
        .bind(owner_id)
        .bind(deck_id)
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbFlashcard::into_card).collect()
    }

    async fn delete_card(&self, owner_id: Uuid, card_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1 AND owner_id = $2")
            .bind(card_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
