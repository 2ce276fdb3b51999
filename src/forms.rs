use std::collections::BTreeMap;

use serde::Deserialize;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;
pub const MIN_REVIEW_CHARS: usize = 4;

/// Rating and review as typed into the edit form.
///
/// Every field arrives as text so that bad input turns into a field message
/// instead of an extractor rejection. `title` is only sent by the form shown
/// right after a movie is added.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidEdit {
    pub rating: f64,
    pub review: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Validation messages keyed by form field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }
}

impl EditForm {
    pub fn validate(&self) -> Result<ValidEdit, FieldErrors> {
        let mut errors = FieldErrors::default();

        let rating = self.rating.trim();
        let parsed = if rating.is_empty() {
            errors.add("rating", "Rating is required.");
            None
        } else {
            match rating.parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => {
                    errors.add("rating", "Rating must be a number.");
                    None
                },
            }
        };
        if let Some(value) = parsed {
            if !(MIN_RATING..=MAX_RATING).contains(&value) {
                errors.add("rating", "Rating must be between 0 and 10.");
            }
        }

        let review = self.review.trim();
        if review.is_empty() {
            errors.add("review", "Review is required.");
        } else if review.chars().count() < MIN_REVIEW_CHARS {
            errors.add("review", format!("Review must be at least {MIN_REVIEW_CHARS} characters."));
        }

        match parsed {
            Some(rating) if errors.is_empty() => {
                Ok(ValidEdit { rating, review: review.to_string() })
            },
            _ => Err(errors),
        }
    }
}

impl AddForm {
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let title = self.title.trim();
        if title.is_empty() {
            let mut errors = FieldErrors::default();
            errors.add("title", "Movie title is required.");
            return Err(errors);
        }
        Ok(title.to_string())
    }
}
