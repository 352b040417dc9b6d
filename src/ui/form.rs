//! Add panel: the four-field product form
//!
//! Submission never fails: it reports the entry and resets every field.
//! Nothing is persisted by default.

use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::types::{AgriChainError, Result};

/// The four form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Origin,
    Date,
    Details,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormField::Name => "name",
            FormField::Origin => "origin",
            FormField::Date => "date",
            FormField::Details => "details",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for FormField {
    type Err = AgriChainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(FormField::Name),
            "origin" => Ok(FormField::Origin),
            "date" => Ok(FormField::Date),
            "details" => Ok(FormField::Details),
            other => Err(AgriChainError::Config(format!("unknown form field: {other}"))),
        }
    }
}

/// Snapshot of a submitted form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub origin: String,
    pub production_date: String,
    pub details: String,
}

/// Add-product form state
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: String,
    pub origin: String,
    pub production_date: String,
    pub details: String,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field
    pub fn set(&mut self, field: FormField, value: &str) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Origin => &mut self.origin,
            FormField::Date => &mut self.production_date,
            FormField::Details => &mut self.details,
        };
        *slot = value.to_string();
    }

    /// Submit the form: report the entry and reset all four fields to
    /// empty strings, whatever their prior values. Never fails.
    pub fn submit(&mut self) -> Submission {
        let submission = Submission {
            name: std::mem::take(&mut self.name),
            origin: std::mem::take(&mut self.origin),
            production_date: std::mem::take(&mut self.production_date),
            details: std::mem::take(&mut self.details),
        };

        info!(
            name = %submission.name,
            origin = %submission.origin,
            production_date = %submission.production_date,
            "product form submitted"
        );

        submission
    }
}

/// Render the form with its current field values
pub fn render_form(form: &ProductForm) -> String {
    format!(
        "Add Product Details\n  name:    {}\n  origin:  {}\n  date:    {}\n  details: {}\n",
        form.name, form.origin, form.production_date, form.details
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_resets_all_fields() {
        let mut form = ProductForm::new();
        form.set(FormField::Name, "Organic Tomatoes");
        form.set(FormField::Origin, "Green Valley Farms");
        form.set(FormField::Date, "2024-02-15");
        form.set(FormField::Details, "First harvest");

        let submission = form.submit();
        assert_eq!(submission.name, "Organic Tomatoes");
        assert_eq!(submission.production_date, "2024-02-15");

        assert_eq!(form.name, "");
        assert_eq!(form.origin, "");
        assert_eq!(form.production_date, "");
        assert_eq!(form.details, "");
    }

    #[test]
    fn test_submit_of_empty_form_succeeds() {
        let mut form = ProductForm::new();
        let submission = form.submit();
        assert_eq!(submission.name, "");
        assert_eq!(form.details, "");
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("Name".parse::<FormField>().unwrap(), FormField::Name);
        assert_eq!("details".parse::<FormField>().unwrap(), FormField::Details);
        assert!("price".parse::<FormField>().is_err());
    }
}
