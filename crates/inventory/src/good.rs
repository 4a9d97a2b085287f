use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockpile_core::validation::{
    self, Document, FieldErrors, REQUIRED_FIELD, UNKNOWN_FIELD,
};
use stockpile_core::{DomainError, DomainResult};

pub const NAME_MAX_LEN: usize = 100;
pub const CATEGORY_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const MIN_PRICE: f64 = 0.01;

/// Fields a caller may set on a good, in document order.
pub const FIELDS: [&str; 5] = ["name", "category", "price_per_item", "description", "stock_count"];

/// A single inventory record. `name` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    pub name: String,
    pub category: String,
    pub price_per_item: f64,
    pub description: String,
    pub stock_count: i64,
}

impl Good {
    /// Validate a create payload.
    ///
    /// Every field is required, unknown fields are rejected, and all failures
    /// are reported together under the `Invalid data` message.
    pub fn from_document(value: &Value) -> DomainResult<Self> {
        let Some(doc) = validation::as_document(value) else {
            let mut details = FieldErrors::new();
            details.add("document", "must be a JSON object");
            return Err(DomainError::validation("Invalid data", details));
        };

        let mut errors = FieldErrors::new();
        for key in doc.keys() {
            if !FIELDS.contains(&key.as_str()) {
                errors.add(key.clone(), UNKNOWN_FIELD);
            }
        }

        let name = field(doc, "name", &mut errors, |v| {
            validation::string_within(v, 1, NAME_MAX_LEN)
        });
        let category = field(doc, "category", &mut errors, |v| {
            validation::string_within(v, 1, CATEGORY_MAX_LEN)
        });
        let price_per_item = field(doc, "price_per_item", &mut errors, |v| {
            validation::number_at_least(v, MIN_PRICE)
        });
        let description = field(doc, "description", &mut errors, |v| {
            validation::string_within(v, 0, DESCRIPTION_MAX_LEN)
        });
        let stock_count = field(doc, "stock_count", &mut errors, |v| {
            validation::integer_at_least(v, 0)
        });

        match (name, category, price_per_item, description, stock_count) {
            (Some(name), Some(category), Some(price_per_item), Some(description), Some(stock_count))
                if errors.is_empty() =>
            {
                Ok(Self {
                    name,
                    category,
                    price_per_item,
                    description,
                    stock_count,
                })
            }
            _ => Err(DomainError::validation("Invalid data", errors)),
        }
    }

    pub fn can_supply(&self, quantity: Quantity) -> bool {
        self.stock_count >= quantity.get()
    }

    /// Conditional decrement: removes `quantity` only if enough stock remains.
    ///
    /// Returns `false` (and leaves the count untouched) otherwise.
    pub fn take_stock(&mut self, quantity: Quantity) -> bool {
        if !self.can_supply(quantity) {
            return false;
        }
        self.stock_count -= quantity.get();
        true
    }

    /// Merge the present fields of `patch` into this good.
    pub fn apply(&mut self, patch: &GoodPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(price) = patch.price_per_item {
            self.price_per_item = price;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(stock) = patch.stock_count {
            self.stock_count = stock;
        }
    }
}

fn field<T>(
    doc: &Document,
    key: &str,
    errors: &mut FieldErrors,
    rule: impl FnOnce(&Value) -> Result<T, String>,
) -> Option<T> {
    let Some(value) = doc.get(key) else {
        errors.add(key, REQUIRED_FIELD);
        return None;
    };
    match rule(value) {
        Ok(v) => Some(v),
        Err(msg) => {
            errors.add(key, msg);
            None
        }
    }
}

/// Partial update of a good. Absent fields are left unchanged.
///
/// Serializes to exactly the fields that are set, which is what the update
/// endpoint echoes back as `updated_fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoodPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_item: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_count: Option<i64>,
}

impl GoodPatch {
    /// Build a patch from an update body.
    ///
    /// Unknown fields are dropped silently. Only `price_per_item` (positive
    /// number) and `stock_count` (non-negative integer) carry value rules; the
    /// string fields only need to be strings.
    pub fn from_document(value: &Value) -> DomainResult<Self> {
        let Some(doc) = validation::as_document(value) else {
            let mut details = FieldErrors::new();
            details.add("document", "must be a JSON object");
            return Err(DomainError::validation("request body must be a JSON object", details));
        };

        let mut patch = Self::default();
        let mut errors = FieldErrors::new();

        for (key, value) in doc {
            match key.as_str() {
                "name" => patch.name = string_field(key, value, &mut errors),
                "category" => patch.category = string_field(key, value, &mut errors),
                "description" => patch.description = string_field(key, value, &mut errors),
                "price_per_item" => match value.as_f64() {
                    Some(p) if p > 0.0 => patch.price_per_item = Some(p),
                    _ => errors.add(key.clone(), "must be a positive number"),
                },
                "stock_count" => match value.as_i64() {
                    Some(n) if n >= 0 => patch.stock_count = Some(n),
                    _ => errors.add(key.clone(), "must be a non-negative integer"),
                },
                _ => {}
            }
        }

        if let Some((field, msg)) = errors.first() {
            let message = format!("'{field}' {msg}");
            return Err(DomainError::validation(message, errors));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price_per_item.is_none()
            && self.description.is_none()
            && self.stock_count.is_none()
    }
}

fn string_field(key: &str, value: &Value, errors: &mut FieldErrors) -> Option<String> {
    match validation::any_string(value) {
        Ok(s) => Some(s),
        Err(msg) => {
            errors.add(key, msg);
            None
        }
    }
}

/// Number of items to deduct; always > 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Quantity(i64);

impl Quantity {
    pub const DEFAULT: Quantity = Quantity(1);

    pub fn new(n: i64) -> DomainResult<Self> {
        if n <= 0 {
            return Err(DomainError::invalid_field("quantity", "must be a positive integer"));
        }
        Ok(Self(n))
    }

    /// Read `quantity` from a deduct body, defaulting to 1 when absent.
    ///
    /// A `null` body counts as an empty object.
    pub fn from_body(body: &Value) -> DomainResult<Self> {
        let raw = match body {
            Value::Null => None,
            Value::Object(doc) => doc.get("quantity"),
            _ => {
                return Err(DomainError::validation(
                    "request body must be a JSON object",
                    FieldErrors::new(),
                ));
            }
        };
        match raw {
            None => Ok(Self::DEFAULT),
            Some(v) => match v.as_i64() {
                Some(n) => Self::new(n),
                None => Err(DomainError::invalid_field("quantity", "must be a positive integer")),
            },
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget_doc() -> Value {
        json!({
            "name": "Widget",
            "category": "Tools",
            "price_per_item": 2.5,
            "description": "",
            "stock_count": 100
        })
    }

    fn widget() -> Good {
        Good::from_document(&widget_doc()).unwrap()
    }

    fn validation_details(err: DomainError) -> FieldErrors {
        match err {
            DomainError::Validation { details, .. } => details,
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_accepts_valid_payload_verbatim() {
        let good = widget();
        assert_eq!(good.name, "Widget");
        assert_eq!(good.category, "Tools");
        assert_eq!(good.price_per_item, 2.5);
        assert_eq!(good.description, "");
        assert_eq!(good.stock_count, 100);
    }

    #[test]
    fn create_price_boundary() {
        let mut doc = widget_doc();
        doc["price_per_item"] = json!(0);
        let details = validation_details(Good::from_document(&doc).unwrap_err());
        assert_eq!(details.get("price_per_item"), Some(&["min value is 0.01".to_string()][..]));

        doc["price_per_item"] = json!(0.01);
        assert!(Good::from_document(&doc).is_ok());
    }

    #[test]
    fn create_stock_boundary() {
        let mut doc = widget_doc();
        doc["stock_count"] = json!(-1);
        assert!(Good::from_document(&doc).is_err());

        doc["stock_count"] = json!(0);
        assert_eq!(Good::from_document(&doc).unwrap().stock_count, 0);
    }

    #[test]
    fn create_accepts_integer_price() {
        let mut doc = widget_doc();
        doc["price_per_item"] = json!(3);
        assert_eq!(Good::from_document(&doc).unwrap().price_per_item, 3.0);
    }

    #[test]
    fn create_reports_every_failing_field() {
        let doc = json!({
            "name": "",
            "category": "c".repeat(101),
            "price_per_item": "free",
            "stock_count": 1.5,
            "colour": "red"
        });
        let err = Good::from_document(&doc).unwrap_err();
        assert_eq!(err.to_string(), "Invalid data");

        let details = validation_details(err);
        assert_eq!(details.get("name"), Some(&["min length is 1".to_string()][..]));
        assert_eq!(details.get("category"), Some(&["max length is 100".to_string()][..]));
        assert_eq!(details.get("price_per_item"), Some(&["must be of float type".to_string()][..]));
        assert_eq!(details.get("description"), Some(&[REQUIRED_FIELD.to_string()][..]));
        assert_eq!(details.get("stock_count"), Some(&["must be of integer type".to_string()][..]));
        assert_eq!(details.get("colour"), Some(&[UNKNOWN_FIELD.to_string()][..]));
    }

    #[test]
    fn create_rejects_long_description() {
        let mut doc = widget_doc();
        doc["description"] = json!("d".repeat(501));
        let details = validation_details(Good::from_document(&doc).unwrap_err());
        assert_eq!(details.get("description"), Some(&["max length is 500".to_string()][..]));
    }

    #[test]
    fn create_rejects_non_object() {
        assert!(Good::from_document(&json!([1, 2])).is_err());
        assert!(Good::from_document(&Value::Null).is_err());
    }

    #[test]
    fn patch_drops_unknown_fields() {
        let patch = GoodPatch::from_document(&json!({"colour": "red", "id": 4})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn patch_skips_length_rules_on_strings() {
        let patch = GoodPatch::from_document(&json!({
            "name": "",
            "description": "d".repeat(600)
        }))
        .unwrap();
        assert_eq!(patch.name.as_deref(), Some(""));
        assert_eq!(patch.description.as_ref().map(|d| d.len()), Some(600));
    }

    #[test]
    fn patch_rejects_non_positive_price() {
        let err = GoodPatch::from_document(&json!({"price_per_item": 0})).unwrap_err();
        assert_eq!(err.to_string(), "'price_per_item' must be a positive number");

        let err = GoodPatch::from_document(&json!({"price_per_item": "3"})).unwrap_err();
        assert_eq!(err.to_string(), "'price_per_item' must be a positive number");
    }

    #[test]
    fn patch_rejects_negative_or_fractional_stock() {
        let err = GoodPatch::from_document(&json!({"stock_count": -1})).unwrap_err();
        assert_eq!(err.to_string(), "'stock_count' must be a non-negative integer");
        assert!(GoodPatch::from_document(&json!({"stock_count": 2.5})).is_err());
    }

    #[test]
    fn patch_rejects_non_string_name() {
        let err = GoodPatch::from_document(&json!({"name": 7})).unwrap_err();
        assert_eq!(err.to_string(), "'name' must be of string type");
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = GoodPatch::from_document(&json!({"price_per_item": 3.0, "bogus": 1})).unwrap();
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"price_per_item": 3.0}));
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut good = widget();
        good.stock_count = 10;
        let patch = GoodPatch {
            stock_count: Some(50),
            ..GoodPatch::default()
        };
        good.apply(&patch);

        let mut expected = widget();
        expected.stock_count = 50;
        assert_eq!(good, expected);
    }

    #[test]
    fn quantity_defaults_to_one() {
        assert_eq!(Quantity::from_body(&json!({})).unwrap().get(), 1);
        assert_eq!(Quantity::from_body(&Value::Null).unwrap().get(), 1);
        assert_eq!(Quantity::from_body(&json!({"quantity": 4})).unwrap().get(), 4);
    }

    #[test]
    fn quantity_must_be_positive_integer() {
        for bad in [json!(0), json!(-3), json!(2.0), json!("2"), json!(null), json!(true)] {
            let err = Quantity::from_body(&json!({ "quantity": bad })).unwrap_err();
            assert_eq!(err.to_string(), "'quantity' must be a positive integer");
        }
        assert!(Quantity::from_body(&json!([1])).is_err());
    }

    #[test]
    fn take_stock_refuses_to_go_negative() {
        let mut good = widget();
        good.stock_count = 3;
        assert!(!good.take_stock(Quantity::new(4).unwrap()));
        assert_eq!(good.stock_count, 3);
        assert!(good.take_stock(Quantity::new(3).unwrap()));
        assert_eq!(good.stock_count, 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: a deduction either removes exactly `q` or changes nothing.
            #[test]
            fn take_stock_is_exact_or_noop(stock in 0i64..10_000, q in 1i64..10_000) {
                let mut good = widget();
                good.stock_count = stock;
                let taken = good.take_stock(Quantity::new(q).unwrap());

                prop_assert_eq!(taken, q <= stock);
                if taken {
                    prop_assert_eq!(good.stock_count, stock - q);
                } else {
                    prop_assert_eq!(good.stock_count, stock);
                }
                prop_assert!(good.stock_count >= 0);
            }

            /// Property: valid create payloads round-trip field values unchanged.
            #[test]
            fn create_keeps_submitted_values(
                name in "[A-Za-z][A-Za-z0-9 ]{0,99}",
                category in "[a-z]{1,100}",
                price in 0.01f64..1_000_000.0,
                description in "[ -~]{0,500}",
                stock in 0i64..1_000_000
            ) {
                let doc = json!({
                    "name": name.clone(),
                    "category": category.clone(),
                    "price_per_item": price,
                    "description": description.clone(),
                    "stock_count": stock
                });
                let good = Good::from_document(&doc).unwrap();
                prop_assert_eq!(good, Good {
                    name,
                    category,
                    price_per_item: price,
                    description,
                    stock_count: stock,
                });
            }
        }
    }
}
