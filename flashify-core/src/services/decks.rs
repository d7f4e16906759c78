//! Deck service
//!
//! Creation and removal of categories and their cards. Input is validated
//! here so the repository only ever sees well-formed rows.

use crate::config::{MAX_CARD_SIDE_LENGTH, MAX_DECK_NAME_LENGTH};
use crate::database::{Card, Category, CategoryWithCount, NewCard, Repository};
use crate::error::{AppError, Result};

/// Service for managing decks
#[derive(Clone)]
pub struct DeckService {
    repo: Repository,
}

impl DeckService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a deck with its initial cards
    pub async fn create_deck(
        &self,
        name: &str,
        source_deck_id: Option<&str>,
        cards: Vec<NewCard>,
    ) -> Result<(Category, Vec<Card>)> {
        let name = validate_name(name)?;
        let cards = validate_cards(cards)?;

        tracing::info!("Creating deck '{}' with {} cards", name, cards.len());

        let (category, created) = self
            .repo
            .create_category_with_cards(&name, source_deck_id, &cards)
            .await?;

        tracing::info!("Deck created successfully: {}", category.id);

        Ok((category, created))
    }

    /// Add cards to an existing deck
    pub async fn add_cards(&self, category_id: &str, cards: Vec<NewCard>) -> Result<Vec<Card>> {
        let cards = validate_cards(cards)?;
        self.repo.create_cards(category_id, &cards).await
    }

    /// List all decks with card counts, newest first
    pub async fn list_decks(&self) -> Result<Vec<CategoryWithCount>> {
        self.repo.list_categories().await
    }

    /// Get a deck by ID
    pub async fn get_deck(&self, category_id: &str) -> Result<Category> {
        self.repo.get_category(category_id).await
    }

    /// Cards of a deck in creation order
    pub async fn list_cards(&self, category_id: &str) -> Result<Vec<Card>> {
        self.repo.get_category(category_id).await?;
        self.repo.list_cards(category_id).await
    }

    /// Delete a deck, its cards and their whole study history
    pub async fn delete_deck(&self, category_id: &str) -> Result<()> {
        tracing::info!("Deleting deck: {}", category_id);

        self.repo.delete_category(category_id).await?;

        tracing::info!("Deck deleted successfully: {}", category_id);

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(AppError::Validation("deck name is required".to_string()));
    }
    if name.chars().count() > MAX_DECK_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "deck name exceeds {} characters",
            MAX_DECK_NAME_LENGTH
        )));
    }

    Ok(name.to_string())
}

fn validate_cards(cards: Vec<NewCard>) -> Result<Vec<NewCard>> {
    cards
        .into_iter()
        .enumerate()
        .map(|(index, card)| -> Result<NewCard> {
            Ok(NewCard {
                front: validate_side(&card.front, "front", index)?,
                back: validate_side(&card.back, "back", index)?,
            })
        })
        .collect()
}

fn validate_side(text: &str, side: &str, index: usize) -> Result<String> {
    let text = text.trim();

    if text.is_empty() {
        return Err(AppError::Validation(format!(
            "card {}: {} is required",
            index + 1,
            side
        )));
    }
    if text.chars().count() > MAX_CARD_SIDE_LENGTH {
        return Err(AppError::Validation(format!(
            "card {}: {} exceeds {} characters",
            index + 1,
            side,
            MAX_CARD_SIDE_LENGTH
        )));
    }

    Ok(text.to_string())
}
