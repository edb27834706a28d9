//! Invoice data model
//!
//! The document is sent verbatim to the rendering service, so field names and
//! enum spellings follow the service's JSON format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency the invoice is issued in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// US dollar
    #[serde(rename = "USD")]
    Usd,
    /// Japanese yen
    #[serde(rename = "JPY")]
    Jpy,
    /// Pound sterling
    #[serde(rename = "GBP")]
    Gbp,
}

/// Payment status printed on the invoice
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentTerms {
    /// Payment outstanding
    #[default]
    #[serde(rename = "Due for payment")]
    Due,
    /// Already settled
    #[serde(rename = "Paid in full")]
    Paid,
}

/// A single billable line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Description shown on the invoice
    pub name: String,
    /// Number of units
    pub quantity: u32,
    /// Price per unit
    pub unit_cost: f64,
}

impl LineItem {
    /// Create a line item
    pub fn new(name: impl Into<String>, quantity: u32, unit_cost: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_cost,
        }
    }

    /// Quantity times unit cost
    pub fn amount(&self) -> f64 {
        f64::from(self.quantity) * self.unit_cost
    }
}

/// Value of an auxiliary invoice field
///
/// Serialized as the bare JSON primitive, e.g. `{"tax": "%"}` or `{"discounts": 10}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// String value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean toggle
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Invoice as understood by the rendering service
///
/// Built once and never mutated afterwards; a [`DeliveryJob`](crate::DeliveryJob)
/// takes ownership of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    /// URL of the logo printed in the header
    pub logo: String,
    /// Biller identity (multi-line address allowed)
    pub from: String,
    /// Recipient identity
    pub to: String,
    /// Invoice currency
    pub currency: Currency,
    /// Invoice number, e.g. "INV-0001"
    pub number: String,
    /// Payment status
    pub payment_terms: PaymentTerms,
    /// Billable lines, in print order
    pub items: Vec<LineItem>,
    /// Auxiliary named fields; ordered so the serialized body is deterministic
    pub fields: BTreeMap<String, FieldValue>,
    /// Tax value (interpreted by the service according to `fields["tax"]`)
    pub tax: f64,
    /// Free-text notes
    pub notes: String,
    /// Free-text terms
    pub terms: String,
}

impl InvoiceDocument {
    /// Sum of all line amounts before tax
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::amount).sum()
    }

    /// Path of the first number that is NaN or infinite, if any
    ///
    /// serde_json writes such values as `null`, which the rendering service
    /// would not read back as a number.
    pub fn non_finite_field(&self) -> Option<String> {
        if !self.tax.is_finite() {
            return Some("tax".to_string());
        }
        if let Some(i) = self.items.iter().position(|item| !item.unit_cost.is_finite()) {
            return Some(format!("items[{i}].unit_cost"));
        }
        self.fields.iter().find_map(|(key, value)| match value {
            FieldValue::Number(n) if !n.is_finite() => Some(format!("fields.{key}")),
            _ => None,
        })
    }

    /// The sample weekly invoice
    pub fn sample() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("tax".to_string(), FieldValue::from("%"));

        Self {
            logo: "http://invoiced.com/img/logo-invoice.png".to_string(),
            from: "Invoiced\n701 Brazos St\nAustin, TX 78748".to_string(),
            to: "Awesome Company / Client".to_string(),
            currency: Currency::Usd,
            number: "INV-0001".to_string(),
            payment_terms: PaymentTerms::Due,
            items: vec![
                LineItem::new("Weekly technical content", 1, 500.0),
                LineItem::new("Employee Portal Management", 1, 1000.0),
            ],
            fields,
            tax: 5.0,
            notes: "Thanks for being an awesome customer!".to_string(),
            terms: "Looking forward to the payments".to_string(),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_wire_spellings() {
        assert_eq!(serde_json::to_value(Currency::Jpy).unwrap(), json!("JPY"));
        assert_eq!(serde_json::to_value(Currency::Gbp).unwrap(), json!("GBP"));
        assert_eq!(
            serde_json::to_value(PaymentTerms::Due).unwrap(),
            json!("Due for payment")
        );
        assert_eq!(
            serde_json::to_value(PaymentTerms::Paid).unwrap(),
            json!("Paid in full")
        );
    }

    #[test]
    fn test_field_values_serialize_untagged() {
        let mut fields = BTreeMap::new();
        fields.insert("tax".to_string(), FieldValue::from("%"));
        fields.insert("discounts".to_string(), FieldValue::from(10.0));
        fields.insert("shipping".to_string(), FieldValue::from(false));

        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            value,
            json!({"discounts": 10.0, "shipping": false, "tax": "%"})
        );

        let back: BTreeMap<String, FieldValue> = serde_json::from_value(value).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn test_sample_subtotal() {
        let invoice = InvoiceDocument::sample();
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.subtotal(), 1500.0);
        assert_eq!(invoice.tax, 5.0);
    }

    #[test]
    fn test_line_amount_multiplies_quantity() {
        assert_eq!(LineItem::new("Hosting", 3, 12.5).amount(), 37.5);
        assert_eq!(LineItem::new("Nothing", 0, 99.0).amount(), 0.0);
    }

    #[test]
    fn test_sample_serializes_every_field() {
        let value = serde_json::to_value(InvoiceDocument::sample()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "logo",
            "from",
            "to",
            "currency",
            "number",
            "payment_terms",
            "items",
            "fields",
            "tax",
            "notes",
            "terms",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), 11);
        assert_eq!(value["items"][1]["unit_cost"], json!(1000.0));
        assert_eq!(value["fields"]["tax"], json!("%"));
    }

    #[test]
    fn test_sample_has_only_finite_numbers() {
        assert_eq!(InvoiceDocument::sample().non_finite_field(), None);
    }

    #[test]
    fn test_non_finite_numbers_are_located() {
        let mut invoice = InvoiceDocument::sample();
        invoice.tax = f64::NAN;
        assert_eq!(invoice.non_finite_field().as_deref(), Some("tax"));

        let mut invoice = InvoiceDocument::sample();
        invoice.items[1].unit_cost = f64::INFINITY;
        assert_eq!(
            invoice.non_finite_field().as_deref(),
            Some("items[1].unit_cost")
        );

        let mut invoice = InvoiceDocument::sample();
        invoice
            .fields
            .insert("discounts".into(), FieldValue::from(f64::NEG_INFINITY));
        assert_eq!(
            invoice.non_finite_field().as_deref(),
            Some("fields.discounts")
        );
    }
}
