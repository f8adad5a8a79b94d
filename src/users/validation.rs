use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::models::{DraftForm, Field};

pub const NAME_TOO_SHORT: &str = "Name must be at least 3 characters long";
pub const PHONE_INVALID: &str = "Phone number is not valid";

const MIN_NAME_LEN: usize = 3;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));

/// Field errors from the last submit attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

/// Check a draft before it is sent.
///
/// Name and phone are checked independently so both messages can be
/// reported at once. Email, street and city are not checked.
pub fn validate(draft: &DraftForm) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if draft.name.chars().count() < MIN_NAME_LEN {
        errors.insert(Field::Name, NAME_TOO_SHORT);
    }

    if !PHONE_RE.is_match(&draft.phone) {
        errors.insert(Field::Phone, PHONE_INVALID);
    }

    errors
}
