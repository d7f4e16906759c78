//! Repository layer for database operations
//!
//! Categories and cards are created and deleted here; study feedback is
//! append-only and has no update or delete statement. Feedback rows only
//! disappear through the cascade from a deleted category.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for lifecycle management
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a new category
    pub async fn create_category(
        &self,
        name: &str,
        source_deck_id: Option<&str>,
    ) -> Result<Category> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, source_deck_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(source_deck_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created category: {}", id);
        Ok(category)
    }

    /// Get a category by ID
    pub async fn get_category(&self, id: &str) -> Result<Category> {
        let mut conn = self.pool.acquire().await?;
        fetch_category(&mut conn, id).await
    }

    /// List all categories with their card counts, newest first
    pub async fn list_categories(&self) -> Result<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT
                c.id,
                c.name,
                c.source_deck_id,
                c.created_at,
                COUNT(k.id) AS card_count
            FROM categories c
            LEFT JOIN cards k ON k.category_id = c.id
            GROUP BY c.id
            ORDER BY c.created_at DESC, c.rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Delete a category together with its cards and their feedback
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::CategoryNotFound(id.to_string()));
        }

        tracing::debug!("Deleted category: {}", id);
        Ok(())
    }

    /// Create a category and its cards in one transaction
    pub async fn create_category_with_cards(
        &self,
        name: &str,
        source_deck_id: Option<&str>,
        cards: &[NewCard],
    ) -> Result<(Category, Vec<Card>)> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, source_deck_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(source_deck_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let created = insert_cards(&mut tx, &id, cards).await?;

        tx.commit().await?;

        tracing::debug!("Created category {} with {} cards", id, created.len());
        Ok((category, created))
    }

    /// Insert cards into a category. Either every card is written or none is.
    pub async fn create_cards(&self, category_id: &str, cards: &[NewCard]) -> Result<Vec<Card>> {
        if cards.is_empty() {
            self.get_category(category_id).await?;
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;

        let created = insert_cards(&mut tx, category_id, cards)
            .await
            .map_err(|e| missing_parent(e, || AppError::CategoryNotFound(category_id.to_string())))?;

        tx.commit().await?;

        tracing::debug!("Created {} cards in category: {}", created.len(), category_id);
        Ok(created)
    }

    /// List the cards of a category in insertion order
    pub async fn list_cards(&self, category_id: &str) -> Result<Vec<Card>> {
        let mut conn = self.pool.acquire().await?;
        fetch_cards(&mut conn, category_id).await
    }

    /// Get a card by ID
    pub async fn get_card(&self, id: &str) -> Result<Card> {
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::CardNotFound(id.to_string()))
    }

    /// Append one feedback record.
    ///
    /// The ownership check and the insert are one statement, so a record is
    /// never written for a card that is not in `category_id`.
    pub async fn append_feedback(
        &self,
        category_id: &str,
        card_id: &str,
        feedback: Feedback,
        answered_at: DateTime<Utc>,
        next_review_at: DateTime<Utc>,
    ) -> Result<FeedbackRecord> {
        let id = Uuid::new_v4().to_string();

        let record = sqlx::query_as::<_, FeedbackRecord>(
            r#"
            INSERT INTO study_feedback (id, category_id, card_id, feedback, answered_at, next_review_at)
            SELECT ?, category_id, id, ?, ?, ?
            FROM cards
            WHERE id = ? AND category_id = ?
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(feedback)
        .bind(answered_at)
        .bind(next_review_at)
        .bind(card_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => {
                tracing::debug!("Appended feedback {} ({}) for card: {}", id, feedback, card_id);
                Ok(record)
            }
            None => {
                // Report the category first when it is the missing piece
                self.get_category(category_id).await?;
                Err(AppError::CardNotFound(card_id.to_string()))
            }
        }
    }

    /// All feedback records of a category in insertion order
    pub async fn list_feedback(&self, category_id: &str) -> Result<Vec<FeedbackRecord>> {
        let mut conn = self.pool.acquire().await?;
        fetch_feedback(&mut conn, category_id).await
    }

    /// A category with its cards and feedback, read from one snapshot.
    ///
    /// All three reads run in a single transaction, so a concurrent delete
    /// either happened before (`CategoryNotFound`) or is not seen at all.
    pub async fn load_category_snapshot(
        &self,
        category_id: &str,
    ) -> Result<(Category, Vec<Card>, Vec<FeedbackRecord>)> {
        let mut tx = self.pool.begin().await?;

        let category = fetch_category(&mut tx, category_id).await?;
        let cards = fetch_cards(&mut tx, category_id).await?;
        let records = fetch_feedback(&mut tx, category_id).await?;

        tx.commit().await?;
        Ok((category, cards, records))
    }

    /// Full answer history of one card, newest first
    pub async fn list_card_feedback(&self, card_id: &str) -> Result<Vec<FeedbackRecord>> {
        let records = sqlx::query_as::<_, FeedbackRecord>(
            r#"
            SELECT * FROM study_feedback
            WHERE card_id = ?
            ORDER BY answered_at DESC, rowid DESC
            "#,
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

async fn fetch_category(conn: &mut SqliteConnection, id: &str) -> Result<Category> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::CategoryNotFound(id.to_string()))
}

async fn fetch_cards(conn: &mut SqliteConnection, category_id: &str) -> Result<Vec<Card>> {
    let cards = sqlx::query_as::<_, Card>(
        r#"
        SELECT * FROM cards WHERE category_id = ? ORDER BY rowid ASC
        "#,
    )
    .bind(category_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(cards)
}

async fn fetch_feedback(
    conn: &mut SqliteConnection,
    category_id: &str,
) -> Result<Vec<FeedbackRecord>> {
    let records = sqlx::query_as::<_, FeedbackRecord>(
        r#"
        SELECT * FROM study_feedback WHERE category_id = ? ORDER BY rowid ASC
        "#,
    )
    .bind(category_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(records)
}

async fn insert_cards(
    tx: &mut Transaction<'_, Sqlite>,
    category_id: &str,
    cards: &[NewCard],
) -> Result<Vec<Card>> {
    let now = Utc::now();
    let mut created = Vec::with_capacity(cards.len());

    for card in cards {
        let row = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (id, category_id, front, back, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(category_id)
        .bind(&card.front)
        .bind(&card.back)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        created.push(row);
    }

    Ok(created)
}

/// Map a foreign key violation to the not-found error of the missing parent row
fn missing_parent(err: AppError, not_found: impl FnOnce() -> AppError) -> AppError {
    let is_fk_violation = matches!(
        &err,
        AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation()
    );

    if is_fk_violation {
        not_found()
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::initialize_database;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_repo() -> Repository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        Repository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let repo = create_test_repo().await;

        let category = repo.create_category("Spanish", Some("deck-7")).await.unwrap();
        assert_eq!(category.name, "Spanish");

        let fetched = repo.get_category(&category.id).await.unwrap();
        assert_eq!(fetched, category);
        assert_eq!(fetched.source_deck_id.as_deref(), Some("deck-7"));
    }

    #[tokio::test]
    async fn test_get_missing_category() {
        let repo = create_test_repo().await;

        let err = repo.get_category("nope").await.unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_categories_with_counts() {
        let repo = create_test_repo().await;

        let first = repo.create_category("First", None).await.unwrap();
        let second = repo.create_category("Second", None).await.unwrap();
        repo.create_cards(
            &first.id,
            &[NewCard::new("a", "1"), NewCard::new("b", "2")],
        )
        .await
        .unwrap();

        let categories = repo.list_categories().await.unwrap();
        assert_eq!(categories.len(), 2);

        // Newest first
        assert_eq!(categories[0].id, second.id);
        assert_eq!(categories[0].card_count, 0);
        assert_eq!(categories[1].id, first.id);
        assert_eq!(categories[1].card_count, 2);
    }

    #[tokio::test]
    async fn test_cards_keep_insertion_order() {
        let repo = create_test_repo().await;
        let category = repo.create_category("Deck", None).await.unwrap();

        let fronts = ["uno", "dos", "tres", "cuatro"];
        let new_cards: Vec<NewCard> = fronts.iter().map(|f| NewCard::new(*f, "x")).collect();
        repo.create_cards(&category.id, &new_cards).await.unwrap();

        let cards = repo.list_cards(&category.id).await.unwrap();
        let listed: Vec<&str> = cards.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(listed, fronts);
    }

    #[tokio::test]
    async fn test_create_category_with_cards() {
        let repo = create_test_repo().await;

        let (category, cards) = repo
            .create_category_with_cards(
                "Verbs",
                None,
                &[NewCard::new("ser", "to be"), NewCard::new("tener", "to have")],
            )
            .await
            .unwrap();

        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.category_id == category.id));
        assert_eq!(repo.list_cards(&category.id).await.unwrap(), cards);
    }

    #[tokio::test]
    async fn test_create_cards_in_missing_category() {
        let repo = create_test_repo().await;

        let err = repo
            .create_cards("ghost", &[NewCard::new("a", "b")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_append_and_list_feedback() {
        let repo = create_test_repo().await;
        let category = repo.create_category("Deck", None).await.unwrap();
        let cards = repo
            .create_cards(&category.id, &[NewCard::new("q", "a")])
            .await
            .unwrap();

        let answered = Utc::now();
        let record = repo
            .append_feedback(
                &category.id,
                &cards[0].id,
                Feedback::Hard,
                answered,
                answered + Duration::days(1),
            )
            .await
            .unwrap();

        assert_eq!(record.feedback, Feedback::Hard);
        assert_eq!(record.card_id, cards[0].id);

        let records = repo.list_feedback(&category.id).await.unwrap();
        assert_eq!(records, vec![record]);
    }

    #[tokio::test]
    async fn test_append_feedback_rejects_foreign_card() {
        let repo = create_test_repo().await;
        let home = repo.create_category("Home", None).await.unwrap();
        let other = repo.create_category("Other", None).await.unwrap();
        let cards = repo
            .create_cards(&home.id, &[NewCard::new("q", "a")])
            .await
            .unwrap();

        let now = Utc::now();
        let err = repo
            .append_feedback(&other.id, &cards[0].id, Feedback::Wrong, now, now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CardNotFound(_)));

        let err = repo
            .append_feedback("ghost", &cards[0].id, Feedback::Wrong, now, now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound(_)));

        assert!(repo.list_feedback(&home.id).await.unwrap().is_empty());
        assert!(repo.list_feedback(&other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_card_history_newest_first() {
        let repo = create_test_repo().await;
        let category = repo.create_category("Deck", None).await.unwrap();
        let card = repo
            .create_cards(&category.id, &[NewCard::new("q", "a")])
            .await
            .unwrap()
            .remove(0);

        let t0 = Utc::now() - Duration::hours(5);
        for (offset, feedback) in [(0, Feedback::Wrong), (1, Feedback::Hard), (2, Feedback::Correct)] {
            let at = t0 + Duration::hours(offset);
            repo.append_feedback(&category.id, &card.id, feedback, at, at)
                .await
                .unwrap();
        }

        let history = repo.list_card_feedback(&card.id).await.unwrap();
        let order: Vec<Feedback> = history.iter().map(|r| r.feedback).collect();
        assert_eq!(order, vec![Feedback::Correct, Feedback::Hard, Feedback::Wrong]);
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let repo = create_test_repo().await;
        let category = repo.create_category("Doomed", None).await.unwrap();
        let cards = repo
            .create_cards(&category.id, &[NewCard::new("q1", "a1"), NewCard::new("q2", "a2")])
            .await
            .unwrap();

        let now = Utc::now();
        for card in &cards {
            repo.append_feedback(&category.id, &card.id, Feedback::Wrong, now, now)
                .await
                .unwrap();
        }

        repo.delete_category(&category.id).await.unwrap();

        let remaining_cards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        let remaining_feedback: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_feedback")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(remaining_cards, 0);
        assert_eq!(remaining_feedback, 0);

        let err = repo.delete_category(&category.id).await.unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_load_category_snapshot() {
        let repo = create_test_repo().await;
        let category = repo.create_category("Snapshot", None).await.unwrap();
        let cards = repo
            .create_cards(&category.id, &[NewCard::new("q1", "a1"), NewCard::new("q2", "a2")])
            .await
            .unwrap();
        let now = Utc::now();
        repo.append_feedback(&category.id, &cards[1].id, Feedback::Hard, now, now)
            .await
            .unwrap();

        let (loaded, loaded_cards, records) =
            repo.load_category_snapshot(&category.id).await.unwrap();
        assert_eq!(loaded, category);
        assert_eq!(loaded_cards, cards);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].card_id, cards[1].id);

        repo.delete_category(&category.id).await.unwrap();
        let err = repo.load_category_snapshot(&category.id).await.unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_snapshot_does_not_see_concurrent_delete() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let pool = crate::database::create_pool(&temp_dir.path().join("snapshot.db"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let category = repo.create_category("Racing", None).await.unwrap();
        let cards = repo
            .create_cards(&category.id, &[NewCard::new("q1", "a1"), NewCard::new("q2", "a2")])
            .await
            .unwrap();

        let mut tx = repo.pool().begin().await.unwrap();
        fetch_category(&mut tx, &category.id).await.unwrap();

        // Committed on another connection while the read transaction is open
        repo.delete_category(&category.id).await.unwrap();

        let seen = fetch_cards(&mut tx, &category.id).await.unwrap();
        assert_eq!(seen, cards);
        tx.commit().await.unwrap();

        let err = repo.load_category_snapshot(&category.id).await.unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound(_)));
        repo.pool().close().await;
    }
}
