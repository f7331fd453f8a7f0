use crate::config::DEFAULT_COVERS_URL;
use serde::Serialize;
use serde_json::Value;

/// Maximum number of records shown for one search.
pub const DISPLAY_CAP: usize = 12;
pub const SUBJECT_CAP: usize = 3;
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub first_publish_year: Option<i64>,
    pub isbn: Option<String>,
    pub cover_image_url: Option<String>,
    pub subjects: Vec<String>,
}

impl BookRecord {
    pub fn has_cover(&self) -> bool {
        self.cover_image_url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SearchOutcome {
    Success(Vec<BookRecord>),
    Empty,
    Failure(String),
}

pub fn normalize(payload: &Value) -> SearchOutcome {
    normalize_with(DEFAULT_COVERS_URL, payload)
}

/// Turns a raw search payload into at most [`DISPLAY_CAP`] records, keeping API order.
pub fn normalize_with(covers_url: &str, payload: &Value) -> SearchOutcome {
    let docs = match payload.get("docs").and_then(|value| value.as_array()) {
        Some(docs) if !docs.is_empty() => docs,
        _ => return SearchOutcome::Empty,
    };

    let records = docs
        .iter()
        .take(DISPLAY_CAP)
        .map(|doc| normalize_doc(covers_url, doc))
        .collect();

    SearchOutcome::Success(records)
}

fn normalize_doc(covers_url: &str, doc: &Value) -> BookRecord {
    let title = doc
        .get("title")
        .and_then(|value| value.as_str())
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    let authors = string_list(doc.get("author_name"), usize::MAX);

    // Open Library sometimes ships years as floats or numeric strings.
    let first_publish_year = doc.get("first_publish_year").and_then(|value| {
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|year| year.fract() == 0.0).map(|year| year as i64))
            .or_else(|| value.as_str().and_then(|text| text.trim().parse::<i64>().ok()))
    });

    let isbn = doc
        .get("isbn")
        .and_then(|value| value.as_array())
        .and_then(|values| values.first())
        .and_then(|value| value.as_str())
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string());

    let cover_id = doc.get("cover_i").and_then(|value| value.as_i64()).filter(|id| *id > 0);

    let cover_image_url = match (&isbn, cover_id) {
        (Some(isbn), _) => Some(format!(
            "{}/isbn/{}-M.jpg",
            covers_url,
            urlencoding::encode(isbn)
        )),
        (None, Some(id)) => Some(format!("{}/id/{}-M.jpg", covers_url, id)),
        (None, None) => None,
    };

    let subjects = string_list(doc.get("subject"), SUBJECT_CAP);

    BookRecord {
        title,
        authors,
        first_publish_year,
        isbn,
        cover_image_url,
        subjects,
    }
}

fn string_list(value: Option<&Value>, max_items: usize) -> Vec<String> {
    value
        .and_then(|value| value.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|value| value.as_str())
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .take(max_items)
                .map(|value| value.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{normalize, normalize_with, BookRecord, SearchOutcome, DISPLAY_CAP};
    use serde_json::{json, Value};

    fn records(outcome: SearchOutcome) -> Vec<BookRecord> {
        match outcome {
            SearchOutcome::Success(records) => records,
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn absent_or_empty_docs_are_empty() {
        assert_eq!(normalize(&json!({})), SearchOutcome::Empty);
        assert_eq!(normalize(&json!({ "docs": [] })), SearchOutcome::Empty);
        assert_eq!(normalize(&json!({ "docs": "nope" })), SearchOutcome::Empty);
        assert_eq!(normalize(&json!({ "docs": null })), SearchOutcome::Empty);
        assert_eq!(normalize(&json!([1, 2, 3])), SearchOutcome::Empty);
        assert_eq!(normalize(&Value::Null), SearchOutcome::Empty);
    }

    #[test]
    fn keeps_api_order() {
        let payload = json!({
            "docs": [
                { "title": "Dune" },
                { "title": "Dune Messiah" },
                { "title": "Children of Dune" }
            ]
        });
        let titles = records(normalize(&payload))
            .into_iter()
            .map(|record| record.title)
            .collect::<Vec<_>>();

        assert_eq!(titles, vec!["Dune", "Dune Messiah", "Children of Dune"]);
    }

    #[test]
    fn caps_at_display_limit() {
        let docs = (0..40)
            .map(|index| json!({ "title": format!("Book {}", index) }))
            .collect::<Vec<_>>();
        let result = records(normalize(&json!({ "docs": docs })));

        assert_eq!(result.len(), DISPLAY_CAP);
        assert_eq!(result[0].title, "Book 0");
        assert_eq!(result[DISPLAY_CAP - 1].title, "Book 11");
    }

    #[test]
    fn sparse_entries_get_defaults() {
        let payload = json!({ "docs": [{}, { "title": "  " }, { "title": 42, "author_name": null }] });
        let result = records(normalize(&payload));

        assert_eq!(result.len(), 3);
        for record in &result {
            assert_eq!(record.title, "Untitled");
            assert!(record.authors.is_empty());
            assert_eq!(record.first_publish_year, None);
            assert_eq!(record.isbn, None);
            assert_eq!(record.cover_image_url, None);
            assert!(record.subjects.is_empty());
            assert!(!record.has_cover());
        }
    }

    #[test]
    fn full_entry_is_mapped() {
        let payload = json!({
            "docs": [{
                "title": "Dune",
                "author_name": ["Frank Herbert", 7, ""],
                "first_publish_year": 1965,
                "isbn": ["9780441013593", "0441013597"],
                "cover_i": 11481354,
                "subject": ["Science fiction", "Desert", "Ecology", "Politics"]
            }]
        });
        let record = records(normalize(&payload)).remove(0);

        assert_eq!(record.title, "Dune");
        assert_eq!(record.authors, vec!["Frank Herbert"]);
        assert_eq!(record.first_publish_year, Some(1965));
        assert_eq!(record.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(
            record.cover_image_url.as_deref(),
            Some("https://covers.openlibrary.org/b/isbn/9780441013593-M.jpg")
        );
        assert_eq!(record.subjects, vec!["Science fiction", "Desert", "Ecology"]);
    }

    #[test]
    fn cover_falls_back_to_cover_id() {
        let payload = json!({ "docs": [
            { "title": "A", "isbn": [], "cover_i": 240727 },
            { "title": "B", "cover_i": "240727" },
            { "title": "C", "cover_i": -1 }
        ] });
        let result = records(normalize(&payload));

        assert_eq!(
            result[0].cover_image_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/240727-M.jpg")
        );
        assert_eq!(result[1].cover_image_url, None);
        assert_eq!(result[2].cover_image_url, None);
    }

    #[test]
    fn publish_year_accepts_loose_numbers() {
        let payload = json!({ "docs": [
            { "first_publish_year": 1965.0 },
            { "first_publish_year": " 1970 " },
            { "first_publish_year": "unknown" }
        ] });
        let years = records(normalize(&payload))
            .into_iter()
            .map(|record| record.first_publish_year)
            .collect::<Vec<_>>();

        assert_eq!(years, vec![Some(1965), Some(1970), None]);
    }

    #[test]
    fn uses_configured_cover_base() {
        let payload = json!({ "docs": [{ "cover_i": 5 }] });
        let record = records(normalize_with("http://localhost/covers", &payload)).remove(0);

        assert_eq!(
            record.cover_image_url.as_deref(),
            Some("http://localhost/covers/id/5-M.jpg")
        );
    }

    #[test]
    fn normalizing_twice_gives_equal_outcomes() {
        let payload = json!({ "docs": [
            { "title": "Dune", "author_name": ["Frank Herbert"], "isbn": ["1"] },
            { "cover_i": 3 }
        ] });

        assert_eq!(normalize(&payload), normalize(&payload));
        assert_eq!(normalize(&json!({})), normalize(&json!({})));
    }
}
