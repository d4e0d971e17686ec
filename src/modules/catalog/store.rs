//! Record store for book documents.
//!
//! [`BookStore`] is the seam the catalog service depends on. Production runs
//! against SurrealDB; [`MemoryBookStore`] backs local runs and tests.

use async_trait::async_trait;
use biblio_db::Database;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Book, BookField};

/// Collection holding every book record.
pub const COLLECTION: &str = "books";

/// Columns read back from the collection; the record key becomes `id`.
const PROJECTION: &str = "meta::id(id) AS id, title, author, category, coverImage";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book store query failed")]
    Query(#[from] surrealdb::Error),

    #[error("book store did not return record '{0}' after writing it")]
    NotPersisted(String),
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every stored record, in store-native order.
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    /// Insert `book`, or replace the record with the same identifier.
    /// A missing identifier is generated.
    async fn save(&self, book: Book) -> Result<Book, StoreError>;

    /// Records whose `field` equals `value` exactly.
    async fn find_by_field(&self, field: BookField, value: &str) -> Result<Vec<Book>, StoreError>;
}

/// Fresh identifier for a new record.
pub fn new_book_id() -> String {
    Uuid::now_v7().to_string()
}

/// The record's identifier, generating one when it is absent or blank.
fn ensure_id(book: &mut Book) -> String {
    match book.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            let id = new_book_id();
            book.id = Some(id.clone());
            id
        }
    }
}

/// Document body written to SurrealDB; the identifier lives in the record key.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    title: Option<String>,
    author: Option<String>,
    category: Option<String>,
    cover_image: Option<String>,
}

impl From<Book> for BookDocument {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            category: book.category,
            cover_image: book.cover_image,
        }
    }
}

pub struct SurrealBookStore {
    db: Database,
}

impl SurrealBookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookStore for SurrealBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let mut response = self
            .db
            .query(format!("SELECT {PROJECTION} FROM type::table($table)"))
            .bind(("table", COLLECTION))
            .await?;

        Ok(response.take(0)?)
    }

    async fn save(&self, mut book: Book) -> Result<Book, StoreError> {
        let id = ensure_id(&mut book);

        let mut response = self
            .db
            .query(format!(
                "UPSERT type::thing($table, $id) CONTENT $content RETURN {PROJECTION}"
            ))
            .bind(("table", COLLECTION))
            .bind(("id", id.clone()))
            .bind(("content", BookDocument::from(book)))
            .await?
            .check()?;

        let saved: Option<Book> = response.take(0)?;
        tracing::debug!(book_id = %id, "book saved");
        saved.ok_or(StoreError::NotPersisted(id))
    }

    async fn find_by_field(&self, field: BookField, value: &str) -> Result<Vec<Book>, StoreError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {PROJECTION} FROM type::table($table) WHERE {} = $value",
                field.column()
            ))
            .bind(("table", COLLECTION))
            .bind(("value", value.to_string()))
            .await?;

        Ok(response.take(0)?)
    }
}

/// In-process store keeping records in insertion order.
#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.read().await.clone())
    }

    async fn save(&self, mut book: Book) -> Result<Book, StoreError> {
        let id = ensure_id(&mut book);
        let mut books = self.books.write().await;

        match books.iter_mut().find(|stored| stored.id.as_deref() == Some(id.as_str())) {
            Some(stored) => *stored = book.clone(),
            None => books.push(book.clone()),
        }

        Ok(book)
    }

    async fn find_by_field(&self, field: BookField, value: &str) -> Result<Vec<Book>, StoreError> {
        Ok(self
            .books
            .read()
            .await
            .iter()
            .filter(|book| book.matches(field, value))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_kernel::settings::DatabaseSettings;
    use std::sync::Arc;

    fn book(title: &str, category: &str) -> Book {
        Book {
            title: Some(title.to_string()),
            author: Some("Herbert".to_string()),
            category: Some(category.to_string()),
            ..Book::default()
        }
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = MemoryBookStore::new();
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_assigns_identifier() {
        let store = MemoryBookStore::new();
        let saved = store.save(book("Dune", "SciFi")).await.unwrap();

        let id = saved.id.clone().unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.find_all().await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn blank_identifier_is_replaced() {
        let store = MemoryBookStore::new();
        let saved = store
            .save(Book {
                id: Some(String::new()),
                ..book("Dune", "SciFi")
            })
            .await
            .unwrap();
        assert!(!saved.id.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_with_existing_identifier_rewrites_record() {
        let store = MemoryBookStore::new();
        let first = store.save(book("Dune", "SciFi")).await.unwrap();
        store.save(book("Emma", "Classic")).await.unwrap();

        let rewritten = store
            .save(Book {
                id: first.id.clone(),
                ..book("Dune Messiah", "SciFi")
            })
            .await
            .unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], rewritten);
        assert_eq!(all[0].title.as_deref(), Some("Dune Messiah"));
    }

    #[tokio::test]
    async fn identical_content_gets_distinct_identifiers() {
        let store = MemoryBookStore::new();
        let a = store.save(book("Dune", "SciFi")).await.unwrap();
        let b = store.save(book("Dune", "SciFi")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn find_by_field_matches_exactly() {
        let store = MemoryBookStore::new();
        store.save(book("Dune", "SciFi")).await.unwrap();
        store.save(book("Emma", "Classic")).await.unwrap();
        store.save(book("Solaris", "SciFi")).await.unwrap();

        let scifi = store
            .find_by_field(BookField::Category, "SciFi")
            .await
            .unwrap();
        let titles: Vec<_> = scifi.iter().filter_map(|b| b.title.as_deref()).collect();
        assert_eq!(titles, vec!["Dune", "Solaris"]);

        assert!(store
            .find_by_field(BookField::Category, "Sci")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn concurrent_saves_all_persist() {
        let store = Arc::new(MemoryBookStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save(book(&format!("Vol {i}"), "Series")).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.find_all().await.unwrap().len(), 16);
    }

    #[test]
    fn document_omits_identifier() {
        let document = BookDocument::from(Book {
            id: Some("abc".to_string()),
            cover_image: Some("https://covers.example/dune.jpg".to_string()),
            ..book("Dune", "SciFi")
        });
        let json = serde_json::to_value(document).unwrap();

        assert!(json.get("id").is_none());
        assert_eq!(json["coverImage"], "https://covers.example/dune.jpg");
    }

    async fn surreal_store() -> SurrealBookStore {
        let db = biblio_db::connect(&DatabaseSettings {
            endpoint: "mem://".to_string(),
            ..DatabaseSettings::default()
        })
        .await
        .unwrap();

        let module = crate::modules::catalog::create_module(Arc::new(MemoryBookStore::new()));
        let migrations: Vec<_> = module
            .migrations()
            .into_iter()
            .map(|migration| (module.name().to_string(), migration))
            .collect();
        biblio_db::migrate::apply(&db, &migrations).await.unwrap();

        SurrealBookStore::new(db)
    }

    fn sorted_by_id(mut books: Vec<Book>) -> Vec<Book> {
        books.sort_by(|a, b| a.id.cmp(&b.id));
        books
    }

    #[tokio::test]
    async fn surreal_empty_collection_lists_nothing() {
        let store = surreal_store().await;
        assert_eq!(store.find_all().await.unwrap(), Vec::<Book>::new());
    }

    #[tokio::test]
    async fn surreal_save_returns_record_with_identifier() {
        let store = surreal_store().await;
        let saved = store.save(book("Dune", "SciFi")).await.unwrap();

        let id = saved.id.clone().unwrap();
        assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 7);
        assert_eq!(saved.title.as_deref(), Some("Dune"));
        assert_eq!(saved.cover_image, None);
        assert_eq!(store.find_all().await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn surreal_identical_content_gets_distinct_identifiers() {
        let store = surreal_store().await;
        let a = store.save(book("Dune", "SciFi")).await.unwrap();
        let b = store.save(book("Dune", "SciFi")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(
            sorted_by_id(store.find_all().await.unwrap()),
            sorted_by_id(vec![a, b])
        );
    }

    #[tokio::test]
    async fn surreal_save_with_existing_identifier_rewrites_record() {
        let store = surreal_store().await;
        store
            .save(Book {
                id: Some("dune".to_string()),
                cover_image: Some("https://covers.example/dune.jpg".to_string()),
                ..book("Dune", "SciFi")
            })
            .await
            .unwrap();
        store.save(book("Emma", "Classic")).await.unwrap();

        let rewritten = store
            .save(Book {
                id: Some("dune".to_string()),
                ..book("Dune Messiah", "SciFi")
            })
            .await
            .unwrap();
        assert_eq!(rewritten.id.as_deref(), Some("dune"));

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        let stored = all
            .iter()
            .find(|b| b.id.as_deref() == Some("dune"))
            .unwrap();
        assert_eq!(stored, &rewritten);
        assert_eq!(stored.title.as_deref(), Some("Dune Messiah"));
        assert_eq!(stored.cover_image, None);
    }

    #[tokio::test]
    async fn surreal_find_by_field_matches_exactly() {
        let store = surreal_store().await;
        let dune = store.save(book("Dune", "SciFi")).await.unwrap();
        store.save(book("Emma", "Classic")).await.unwrap();
        let solaris = store.save(book("Solaris", "SciFi")).await.unwrap();

        let scifi = store
            .find_by_field(BookField::Category, "SciFi")
            .await
            .unwrap();
        assert_eq!(sorted_by_id(scifi), sorted_by_id(vec![dune, solaris]));

        assert!(store
            .find_by_field(BookField::Category, "Sci")
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .find_by_field(BookField::Title, "dune")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn surreal_find_by_cover_image_uses_stored_column() {
        let store = surreal_store().await;
        let url = "https://covers.example/emma.jpg";
        let emma = store
            .save(Book {
                cover_image: Some(url.to_string()),
                ..book("Emma", "Classic")
            })
            .await
            .unwrap();
        store.save(book("Dune", "SciFi")).await.unwrap();

        let hits = store.find_by_field(BookField::CoverImage, url).await.unwrap();
        assert_eq!(hits, vec![emma]);
    }
}
