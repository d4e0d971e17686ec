pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use biblio_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use service::CatalogService;
use store::BookStore;

/// Catalog module: book listing and creation over a [`BookStore`]
pub struct CatalogModule {
    service: CatalogService,
}

impl CatalogModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            service: CatalogService::new(store),
        }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    /// Catalog routes live at the server root (`/books`, `/addBook`).
    fn base_path(&self) -> String {
        String::new()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "description": "Error",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let book_list = json!({
            "description": "List of books",
            "content": {
                "application/json": {
                    "schema": {
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/Book" }
                    }
                }
            }
        });
        let string_field = |description: &str| {
            json!({ "type": ["string", "null"], "description": description })
        };
        let search_param = |name: &str| {
            json!({
                "name": name,
                "in": "query",
                "required": false,
                "schema": { "type": "string" }
            })
        };

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List every book",
                        "tags": ["Catalog"],
                        "responses": { "200": book_list, "500": error }
                    }
                },
                "/addBook": {
                    "post": {
                        "summary": "Add a book; the identifier is assigned by the store",
                        "tags": ["Catalog"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Persisted book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": error,
                            "500": error
                        }
                    }
                },
                "/books/search": {
                    "get": {
                        "summary": "Books whose field equals the given value",
                        "tags": ["Catalog"],
                        "parameters": [
                            search_param("title"),
                            search_param("author"),
                            search_param("category"),
                            search_param("coverImage")
                        ],
                        "responses": { "200": book_list, "400": error, "500": error }
                    }
                },
                "/books/total": {
                    "get": {
                        "summary": "Number of books",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": {
                                "description": "Book count",
                                "content": {
                                    "application/json": { "schema": { "type": "integer" } }
                                }
                            },
                            "500": error
                        }
                    }
                },
                "/books/categories": {
                    "get": {
                        "summary": "Distinct categories",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": {
                                "description": "Sorted category names",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "type": "string" } }
                                    }
                                }
                            },
                            "500": error
                        }
                    }
                },
                "/books/category-distribution": {
                    "get": {
                        "summary": "Book count per category",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": {
                                "description": "Category to count",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "additionalProperties": { "type": "integer" }
                                        }
                                    }
                                }
                            },
                            "500": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": string_field("Store-assigned identifier"),
                            "title": string_field("Title of the book"),
                            "author": string_field("Author of the book"),
                            "category": string_field("Catalog category"),
                            "coverImage": string_field("Cover image URL")
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                DEFINE TABLE IF NOT EXISTS books SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS books_category ON books FIELDS category;
                DEFINE INDEX IF NOT EXISTS books_author ON books FIELDS author;
                "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Create the catalog module backed by `store`
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(store))
}
