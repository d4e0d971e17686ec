//! HTTP handlers for the catalog endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use biblio_http::error::AppError;
use serde::Deserialize;
use serde_json::json;

use super::models::{Book, BookField};
use super::service::CatalogService;
use super::store::StoreError;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

pub fn router(service: CatalogService) -> Router {
    Router::new()
        .route("/books", get(list_books))
        .route("/addBook", post(add_book))
        .route("/books/search", get(search_books))
        .route("/books/total", get(total_books))
        .route("/books/categories", get(list_categories))
        .route("/books/category-distribution", get(category_distribution))
        .with_state(service)
}

async fn list_books(State(service): State<CatalogService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.get_all_books().await?))
}

async fn add_book(
    State(service): State<CatalogService>,
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(mut book) = payload?;
    // The store owns identifiers
    book.id = None;

    let saved = service.add_book(book).await?;
    tracing::info!(book_id = saved.id.as_deref().unwrap_or_default(), "book added");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Query string for `/books/search`; exactly one field must be given.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<String>,
}

impl SearchParams {
    /// The single field/value pair to match on.
    pub fn criterion(self) -> Result<(BookField, String), AppError> {
        let mut given: Vec<(BookField, String)> = [
            (BookField::Title, self.title),
            (BookField::Author, self.author),
            (BookField::Category, self.category),
            (BookField::CoverImage, self.cover_image),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect();

        if given.len() != 1 {
            let supported: Vec<&str> = BookField::ALL.iter().map(|f| f.column()).collect();
            return Err(AppError::bad_request_with(
                vec![json!({ "supported": supported, "given": given.len() })],
                "search requires exactly one field parameter",
            ));
        }

        Ok(given.remove(0))
    }
}

async fn search_books(
    State(service): State<CatalogService>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(params) = params?;
    let (field, value) = params.criterion()?;

    Ok(Json(service.find_books(field, &value).await?))
}

async fn total_books(State(service): State<CatalogService>) -> Result<Json<usize>, AppError> {
    Ok(Json(service.count_books().await?))
}

async fn list_categories(
    State(service): State<CatalogService>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(service.categories().await?))
}

async fn category_distribution(
    State(service): State<CatalogService>,
) -> Result<Json<BTreeMap<String, usize>>, AppError> {
    Ok(Json(service.category_distribution().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_picks_the_single_field() {
        let params = SearchParams {
            category: Some("SciFi".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(
            params.criterion().unwrap(),
            (BookField::Category, "SciFi".to_string())
        );
    }

    #[test]
    fn criterion_rejects_none_or_many() {
        assert!(SearchParams::default().criterion().is_err());

        let params = SearchParams {
            title: Some("Dune".to_string()),
            author: Some("Herbert".to_string()),
            ..SearchParams::default()
        };
        assert!(matches!(
            params.criterion(),
            Err(AppError::BadRequest { .. })
        ));
    }
}
