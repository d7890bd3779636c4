// Field binding layer for create/edit forms
//
// A form is a list of registered fields, each with its own validation rules.
// Values are kept as the raw strings the user typed; `validate` fills a
// per-field error map and `to_json` builds the request body only from a form
// that validated cleanly.

use crate::i18n::Labels;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

fn email_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Numeric,
    /// Numeric lower bound (inclusive)
    Min(f64),
    /// Maximum length in characters
    MaxLen(usize),
    Email,
}

impl Rule {
    /// Check one value. Empty optional values pass every rule but `Required`.
    fn check(&self, value: &str, labels: &Labels) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return (*self == Rule::Required).then(|| labels.field_required.to_string());
        }
        match self {
            Rule::Required => None,
            Rule::Numeric => trimmed
                .parse::<f64>()
                .is_err()
                .then(|| labels.field_numeric.to_string()),
            Rule::Min(min) => match trimmed.parse::<f64>() {
                Ok(n) if n < *min => Some(format!("{} (≥ {})", labels.field_min, min)),
                _ => None,
            },
            Rule::MaxLen(max) => (trimmed.chars().count() > *max)
                .then(|| format!("{} (≤ {})", labels.field_too_long, max)),
            Rule::Email => (!email_regex().is_some_and(|re| re.is_match(trimmed)))
                .then(|| labels.field_email.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Serialized as a JSON number
    Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: Vec<Rule>,
    /// Dotted path read from an existing entity when editing; defaults to `name`
    pub source: Option<&'static str>,
}

impl FieldSpec {
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            rules: Vec::new(),
            source: None,
        }
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Number,
            ..Self::text(name, label)
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn prefill_from(mut self, path: &'static str) -> Self {
        self.source = Some(path);
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }
}

/// Values and errors of one open form
#[derive(Debug, Clone)]
pub struct FormState {
    fields: Vec<FieldSpec>,
    values: Vec<String>,
    errors: HashMap<&'static str, String>,
    labels: &'static Labels,
}

impl FormState {
    pub fn new(fields: Vec<FieldSpec>, labels: &'static Labels) -> Self {
        let values = vec![String::new(); fields.len()];
        Self {
            fields,
            values,
            errors: HashMap::new(),
            labels,
        }
    }

    /// Add a field after construction. Re-registering a name replaces its spec.
    pub fn register(&mut self, spec: FieldSpec) {
        match self.index_of(spec.name) {
            Some(i) => self.fields[i] = spec,
            None => {
                self.fields.push(spec);
                self.values.push(String::new());
            }
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.index_of(name).map(|i| self.values[i].as_str())
    }

    pub fn value_at(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    /// Set a value and clear that field's error. Unknown names are ignored.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.index_of(name) {
            Some(i) => {
                self.values[i] = value.into();
                self.errors.remove(self.fields[i].name);
                true
            }
            None => false,
        }
    }

    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut String> {
        let name = self.fields.get(index)?.name;
        self.errors.remove(name);
        self.values.get_mut(index)
    }

    /// Fill values from an existing entity (edit mode)
    pub fn prefill(&mut self, entity: &Value) {
        for (i, field) in self.fields.iter().enumerate() {
            let path = field.source.unwrap_or(field.name);
            self.values[i] = match crate::table::resolve_path(entity, path) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
        }
        self.errors.clear();
    }

    /// Run every rule; the first failing rule per field is reported
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        for (field, value) in self.fields.iter().zip(&self.values) {
            if let Some(message) = field.rules.iter().find_map(|r| r.check(value, self.labels)) {
                self.errors.insert(field.name, message);
            }
        }
        self.errors.is_empty()
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &HashMap<&'static str, String> {
        &self.errors
    }

    /// Request body, or `None` if validation fails (submission is blocked)
    pub fn to_json(&mut self) -> Option<Value> {
        if !self.validate() {
            tracing::debug!(errors = self.errors.len(), "Form submission blocked");
            return None;
        }

        let mut body = Map::new();
        for (field, value) in self.fields.iter().zip(&self.values) {
            let trimmed = value.trim();
            let json = match field.kind {
                _ if trimmed.is_empty() => Value::Null,
                FieldKind::Text => Value::String(trimmed.to_string()),
                FieldKind::Number => trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(number_value)
                    .unwrap_or(Value::Null),
            };
            body.insert(field.name.to_string(), json);
        }
        Some(Value::Object(body))
    }
}

/// Whole numbers serialize without a fractional part
fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use serde_json::json;

    fn product_form() -> FormState {
        FormState::new(
            vec![
                FieldSpec::text("name", "Name").rule(Rule::Required),
                FieldSpec::number("sellingPrice", "Price")
                    .rule(Rule::Required)
                    .rule(Rule::Numeric)
                    .rule(Rule::Min(0.0)),
                FieldSpec::text("categoryId", "Category").prefill_from("category.id"),
            ],
            Locale::En.labels(),
        )
    }

    #[test]
    fn empty_required_fields_block_submission() {
        let mut form = product_form();
        assert!(form.to_json().is_none());
        assert_eq!(form.error("name"), Some("This field is required"));
        assert_eq!(form.error("sellingPrice"), Some("This field is required"));
        assert_eq!(form.error("categoryId"), None);
    }

    #[test]
    fn first_failing_rule_wins() {
        let mut form = product_form();
        form.set_value("name", "Tea");
        form.set_value("sellingPrice", "abc");
        assert!(!form.validate());
        assert_eq!(form.error("sellingPrice"), Some("Must be a number"));

        form.set_value("sellingPrice", "-5");
        assert!(!form.validate());
        assert_eq!(form.error("sellingPrice"), Some("Value is too small (≥ 0)"));
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let mut form = product_form();
        form.validate();
        assert!(form.error("name").is_some());
        form.set_value("name", "x");
        assert!(form.error("name").is_none());
        assert!(form.error("sellingPrice").is_some());
    }

    #[test]
    fn valid_form_serializes_typed_body() {
        let mut form = product_form();
        form.set_value("name", "  Trà xanh ");
        form.set_value("sellingPrice", "15000");
        let body = form.to_json().unwrap();
        assert_eq!(
            body,
            json!({"name": "Trà xanh", "sellingPrice": 15000, "categoryId": null})
        );
    }

    #[test]
    fn prefill_reads_nested_source() {
        let mut form = product_form();
        form.prefill(&json!({
            "name": "Sữa",
            "sellingPrice": 12000.5,
            "category": {"id": "c-9"}
        }));
        assert_eq!(form.value("name"), Some("Sữa"));
        assert_eq!(form.value("sellingPrice"), Some("12000.5"));
        assert_eq!(form.value("categoryId"), Some("c-9"));
    }

    #[test]
    fn email_and_length_rules() {
        let labels = Locale::En.labels();
        assert!(Rule::Email.check("a@b.vn", labels).is_none());
        assert_eq!(
            Rule::Email.check("not-an-email", labels).as_deref(),
            Some("Invalid email address")
        );
        assert!(Rule::Email.check("", labels).is_none());
        assert!(Rule::MaxLen(3).check("ừừừ", labels).is_none());
        assert!(Rule::MaxLen(3).check("ừừừừ", labels).is_some());
    }

    #[test]
    fn register_adds_or_replaces() {
        let mut form = product_form();
        form.register(FieldSpec::text("email", "Email").rule(Rule::Email));
        assert_eq!(form.fields().len(), 4);
        form.register(FieldSpec::text("name", "Name"));
        assert_eq!(form.fields().len(), 4);
        assert!(!form.fields()[0].is_required());

        form.set_value("email", "bad");
        form.set_value("sellingPrice", "1");
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 1);
    }
}
