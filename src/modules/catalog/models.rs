use serde::{Deserialize, Serialize};

/// A catalog entry as persisted in the `books` collection.
///
/// Every field is optional free text. Absent fields serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    /// URL of the cover image
    pub cover_image: Option<String>,
}

impl Book {
    /// Value of `field` on this record, if set.
    pub fn field(&self, field: BookField) -> Option<&str> {
        match field {
            BookField::Title => self.title.as_deref(),
            BookField::Author => self.author.as_deref(),
            BookField::Category => self.category.as_deref(),
            BookField::CoverImage => self.cover_image.as_deref(),
        }
    }

    /// Exact, case-sensitive equality on one field.
    pub fn matches(&self, field: BookField, value: &str) -> bool {
        self.field(field) == Some(value)
    }
}

/// Queryable book fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    Title,
    Author,
    Category,
    CoverImage,
}

impl BookField {
    pub const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Author,
        BookField::Category,
        BookField::CoverImage,
    ];

    /// Field name in the stored document and in JSON.
    pub fn column(self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Category => "category",
            BookField::CoverImage => "coverImage",
        }
    }
}

impl std::fmt::Display for BookField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}
