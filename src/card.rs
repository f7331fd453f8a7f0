use crate::normalize::BookRecord;
use serde::Serialize;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNKNOWN_YEAR: &str = "Unknown Year";
pub const NO_COVER_TEXT: &str = "No cover available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CoverState {
    Image { url: String },
    Placeholder { text: String },
}

/// Display model for one result card. Built from a record at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCard {
    pub title: String,
    pub authors_line: String,
    pub year_line: String,
    pub isbn_line: Option<String>,
    pub subjects_line: Option<String>,
    pub cover: CoverState,
}

impl BookCard {
    pub fn from_record(record: &BookRecord) -> Self {
        let cover = match &record.cover_image_url {
            Some(url) => CoverState::Image { url: url.clone() },
            None => placeholder(),
        };

        Self {
            title: record.title.clone(),
            authors_line: authors_display(&record.authors),
            year_line: match record.first_publish_year {
                Some(year) => format!("Published: {}", year),
                None => format!("Published: {}", UNKNOWN_YEAR),
            },
            isbn_line: record.isbn.as_ref().map(|isbn| format!("ISBN: {}", isbn)),
            subjects_line: if record.subjects.is_empty() {
                None
            } else {
                Some(format!("Subjects: {}", record.subjects.join(", ")))
            },
            cover,
        }
    }

    pub fn has_valid_cover(&self) -> bool {
        matches!(self.cover, CoverState::Image { .. })
    }

    /// Image load error handler: the card drops to the placeholder for good.
    pub fn cover_failed(&mut self) {
        if self.has_valid_cover() {
            log::warn!("cover failed to load for \"{}\"", self.title);
            self.cover = placeholder();
        }
    }
}

fn placeholder() -> CoverState {
    CoverState::Placeholder {
        text: NO_COVER_TEXT.to_string(),
    }
}

pub fn authors_display(authors: &[String]) -> String {
    if authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        authors.join(", ")
    }
}

/// "Found 1 Book" / "Found 12 Books".
pub fn results_heading(count: usize) -> String {
    format!("Found {} Book{}", count, if count == 1 { "" } else { "s" })
}

pub fn cards_for(records: &[BookRecord]) -> Vec<BookCard> {
    records.iter().map(BookCard::from_record).collect()
}
