//! Form input and validation for the public pages.
//!
//! Validation failures are values, not errors: handlers re-render the form
//! with the collected [`FormErrors`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::domain::NewComment;

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages for one field; empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// "field: message" lines, for logs.
    pub fn messages(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{field}: {m}")))
            .collect()
    }
}

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form = FormErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                form.add(field.to_string(), describe(err));
            }
        }
        form
    }
}

fn describe(err: &ValidationError) -> String {
    match err.code.as_ref() {
        "required" => REQUIRED.to_string(),
        "email" => INVALID_EMAIL.to_string(),
        "length" => {
            let max = err.params.get("max").and_then(|v| v.as_u64()).unwrap_or_default();
            match err.params.get("value").and_then(|v| v.as_str()) {
                Some(value) => format!(
                    "Ensure this value has at most {max} characters (it has {}).",
                    value.chars().count()
                ),
                None => format!("Ensure this value has at most {max} characters."),
            }
        }
        _ => err
            .message
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("Invalid value ({}).", err.code)),
    }
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Address check in the manner of Django's `EmailField`.
///
/// Dot-atom local parts, IDN and IP-literal domains are checked by
/// `validator`; a quoted local part is accepted when its domain is valid.
fn email_address(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    if value.validate_email() || quoted_local_part(value) {
        return Ok(());
    }
    Err(ValidationError::new("email"))
}

fn quoted_local_part(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    let Some(inner) = local
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };

    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if !chars.next().is_some_and(|escaped| escaped.is_ascii() && escaped != '\n') {
                    return false;
                }
            }
            '"' | '\r' | '\n' => return false,
            c if !c.is_ascii() || (c.is_ascii_control() && c != '\t') => return false,
            _ => {}
        }
    }

    format!("quoted@{domain}").validate_email()
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Comment submitted on a post detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "required"), length(max = 80))]
    pub name: String,
    #[validate(custom(function = "email_address"))]
    pub email: String,
    #[validate(custom(function = "required"))]
    pub body: String,
}

impl CommentForm {
    /// The form with surrounding whitespace stripped, or the validation errors.
    pub fn clean(&self) -> Result<Self, FormErrors> {
        let cleaned = Self {
            name: trimmed(&self.name),
            email: trimmed(&self.email),
            body: trimmed(&self.body),
        };
        Validate::validate(&cleaned)?;
        Ok(cleaned)
    }

    /// Comment for `post_id` from a cleaned form.
    pub fn into_new_comment(self, post_id: i64) -> NewComment {
        NewComment::new(post_id, self.name, self.email, self.body)
    }
}

/// "Recommend this post" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EmailPostForm {
    #[validate(custom(function = "required"), length(max = 25))]
    pub name: String,
    #[validate(custom(function = "email_address"))]
    pub email: String,
    #[validate(custom(function = "email_address"))]
    pub to: String,
    pub comments: String,
}

impl EmailPostForm {
    pub fn clean(&self) -> Result<Self, FormErrors> {
        let cleaned = Self {
            name: trimmed(&self.name),
            email: trimmed(&self.email),
            to: trimmed(&self.to),
            comments: trimmed(&self.comments),
        };
        Validate::validate(&cleaned)?;
        Ok(cleaned)
    }
}

/// Title search form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SearchForm {
    #[validate(custom(function = "required"))]
    pub query: String,
}

impl SearchForm {
    /// The trimmed query, or the validation errors.
    pub fn cleaned_query(&self) -> Result<String, FormErrors> {
        let cleaned = Self {
            query: trimmed(&self.query),
        };
        Validate::validate(&cleaned)?;
        Ok(cleaned.query)
    }
}
