use std::collections::BTreeMap;
use std::sync::Arc;

use super::models::{Book, BookField};
use super::store::{BookStore, StoreError};

/// Stateless facade between the HTTP handlers and the record store.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn get_all_books(&self) -> Result<Vec<Book>, StoreError> {
        self.store.find_all().await
    }

    pub async fn add_book(&self, book: Book) -> Result<Book, StoreError> {
        self.store.save(book).await
    }

    pub async fn find_books(&self, field: BookField, value: &str) -> Result<Vec<Book>, StoreError> {
        self.store.find_by_field(field, value).await
    }

    pub async fn count_books(&self) -> Result<usize, StoreError> {
        Ok(self.store.find_all().await?.len())
    }

    /// Distinct non-empty categories, sorted.
    pub async fn categories(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.category_distribution().await?.into_keys().collect())
    }

    /// Number of books per category. Books without a category are skipped.
    pub async fn category_distribution(&self) -> Result<BTreeMap<String, usize>, StoreError> {
        let books = self.store.find_all().await?;
        Ok(tally_categories(&books))
    }
}

fn tally_categories(books: &[Book]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for category in books
        .iter()
        .filter_map(|book| book.category.as_deref())
        .filter(|category| !category.is_empty())
    {
        *counts.entry(category.to_string()).or_insert(0) += 1;
    }
    counts
}
