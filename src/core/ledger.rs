//! Cost line ledger - the FOB (free on board) cost components of a product

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Names seeded into a fresh product's ledger
pub const DEFAULT_LINE_NAMES: [&str; 3] = ["Materials", "Labor", "Packaging"];

fn new_line_id() -> String {
    Ulid::new().to_string()
}

/// A single named cost component, valued in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    /// Unique within one product's ledger
    #[serde(default = "new_line_id")]
    pub id: String,

    /// Display label (e.g. "Materials")
    #[serde(default)]
    pub name: String,

    /// Amount in USD, never negative
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub value: f64,
}

impl CostLine {
    /// Create a line with a fresh id
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            id: new_line_id(),
            name: name.into(),
            value: coerce_amount(value),
        }
    }

    /// A line with no name and a zero value
    pub fn blank() -> Self {
        Self::new("", 0.0)
    }
}

/// Which field of a line an edit replaces
#[derive(Debug, Clone, PartialEq)]
pub enum LineField {
    Name(String),
    Value(f64),
}

/// Clamp an amount to a finite, non-negative number (anything else becomes 0)
pub fn coerce_amount(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Parse form input into an amount, substituting 0 for anything unusable
pub fn parse_amount(raw: &str) -> f64 {
    leading_number(raw).map(coerce_amount).unwrap_or(0.0)
}

/// The finite number at the start of `raw`, ignoring leading whitespace and
/// any trailing text ("12.5kg" reads as 12.5). `None` when there is none.
pub fn leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            digits += frac_end - (end + 1);
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Deserialize an amount, coercing it like [`coerce_amount`]
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(coerce_amount(value))
}

/// Ordered collection of cost lines owning the FOB subtotal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostLineLedger {
    lines: Vec<CostLine>,
}

impl CostLineLedger {
    /// An empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger seeded with the standard zero-valued components
    pub fn with_default_lines() -> Self {
        Self {
            lines: DEFAULT_LINE_NAMES
                .iter()
                .map(|name| CostLine::new(*name, 0.0))
                .collect(),
        }
    }

    /// Wrap existing lines, coercing any invalid values
    pub fn from_lines(lines: Vec<CostLine>) -> Self {
        let lines = lines
            .into_iter()
            .map(|mut line| {
                line.value = coerce_amount(line.value);
                line
            })
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[CostLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CostLine> {
        self.lines.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CostLine> {
        self.lines.get(index)
    }

    /// Append a blank line, returning its index
    pub fn add_line(&mut self) -> usize {
        self.lines.push(CostLine::blank());
        self.lines.len() - 1
    }

    /// Append a named line, returning its index
    pub fn push(&mut self, name: impl Into<String>, value: f64) -> usize {
        self.lines.push(CostLine::new(name, value));
        self.lines.len() - 1
    }

    /// Delete one line. The ledger may become empty.
    pub fn remove_line(&mut self, index: usize) -> Option<CostLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    /// Delete a line unless it is the last one, which is blanked instead.
    ///
    /// This is the form-level behavior: a product always keeps at least one line.
    /// Returns false when the index is out of range.
    pub fn retire_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            return false;
        }

        if self.lines.len() == 1 {
            let line = &mut self.lines[0];
            line.name.clear();
            line.value = 0.0;
        } else {
            self.lines.remove(index);
        }
        true
    }

    /// Replace the name or value of a line. Returns false when the index is out of range.
    pub fn update_line(&mut self, index: usize, field: LineField) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };

        match field {
            LineField::Name(name) => line.name = name,
            LineField::Value(value) => line.value = coerce_amount(value),
        }
        true
    }

    /// Replace a line's value from raw text input
    pub fn update_line_raw(&mut self, index: usize, raw: &str) -> bool {
        self.update_line(index, LineField::Value(parse_amount(raw)))
    }

    /// Sum of all line values (the FOB subtotal)
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(|line| line.value).sum()
    }
}

impl FromIterator<CostLine> for CostLineLedger {
    fn from_iter<I: IntoIterator<Item = CostLine>>(iter: I) -> Self {
        Self::from_lines(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(values: &[(&str, f64)]) -> CostLineLedger {
        values
            .iter()
            .map(|(name, value)| CostLine::new(*name, *value))
            .collect()
    }

    #[test]
    fn test_subtotal_sums_values() {
        let ledger = ledger(&[("Materials", 5.0), ("Labor", 3.0), ("Packaging", 0.5)]);
        assert!((ledger.subtotal() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_ledger_subtotal_is_zero() {
        assert_eq!(CostLineLedger::new().subtotal(), 0.0);
    }

    #[test]
    fn test_default_lines_are_seeded_at_zero() {
        let ledger = CostLineLedger::with_default_lines();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get(0).unwrap().name, "Materials");
        assert_eq!(ledger.subtotal(), 0.0);
    }

    #[test]
    fn test_add_line_appends_blank() {
        let mut ledger = ledger(&[("Materials", 5.0)]);
        let index = ledger.add_line();
        assert_eq!(index, 1);
        let line = ledger.get(1).unwrap();
        assert!(line.name.is_empty());
        assert_eq!(line.value, 0.0);
    }

    #[test]
    fn test_line_ids_are_unique() {
        let mut ledger = CostLineLedger::new();
        ledger.add_line();
        ledger.add_line();
        assert_ne!(ledger.get(0).unwrap().id, ledger.get(1).unwrap().id);
    }

    #[test]
    fn test_remove_line_can_empty_ledger() {
        let mut ledger = ledger(&[("Materials", 5.0)]);
        let removed = ledger.remove_line(0).unwrap();
        assert_eq!(removed.name, "Materials");
        assert!(ledger.is_empty());
        assert!(ledger.remove_line(0).is_none());
    }

    #[test]
    fn test_retire_last_line_blanks_it() {
        let mut ledger = ledger(&[("Materials", 5.0)]);
        assert!(ledger.retire_line(0));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(0).unwrap().name.is_empty());
        assert_eq!(ledger.subtotal(), 0.0);
    }

    #[test]
    fn test_retire_line_removes_when_others_remain() {
        let mut ledger = ledger(&[("Materials", 5.0), ("Labor", 3.0)]);
        assert!(ledger.retire_line(0));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0).unwrap().name, "Labor");
        assert!(!ledger.retire_line(5));
    }

    #[test]
    fn test_update_line_name_and_value() {
        let mut ledger = ledger(&[("Materials", 5.0)]);
        assert!(ledger.update_line(0, LineField::Name("Fabric".to_string())));
        assert!(ledger.update_line(0, LineField::Value(7.25)));
        let line = ledger.get(0).unwrap();
        assert_eq!(line.name, "Fabric");
        assert_eq!(line.value, 7.25);
        assert!(!ledger.update_line(3, LineField::Value(1.0)));
    }

    #[test]
    fn test_invalid_values_coerce_to_zero() {
        let mut ledger = ledger(&[("Materials", 5.0)]);
        ledger.update_line(0, LineField::Value(-4.0));
        assert_eq!(ledger.subtotal(), 0.0);

        ledger.update_line(0, LineField::Value(f64::NAN));
        assert_eq!(ledger.subtotal(), 0.0);

        ledger.update_line(0, LineField::Value(f64::INFINITY));
        assert_eq!(ledger.subtotal(), 0.0);
    }

    #[test]
    fn test_update_line_raw_parses_input() {
        let mut ledger = ledger(&[("Materials", 5.0)]);
        ledger.update_line_raw(0, " 12.5 ");
        assert_eq!(ledger.subtotal(), 12.5);

        ledger.update_line_raw(0, "abc");
        assert_eq!(ledger.subtotal(), 0.0);

        ledger.update_line_raw(0, "-3");
        assert_eq!(ledger.subtotal(), 0.0);

        ledger.update_line_raw(0, "7.25 USD");
        assert_eq!(ledger.subtotal(), 7.25);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("0.2abc"), Some(0.2));
        assert_eq!(leading_number("  20%"), Some(20.0));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("5."), Some(5.0));
        assert_eq!(leading_number("-1.5e2x"), Some(-150.0));
        assert_eq!(leading_number("3e"), Some(3.0));
        assert_eq!(leading_number("1e999"), None);
        assert_eq!(leading_number("inf"), None);
        assert_eq!(leading_number("-."), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn test_deserialize_coerces_negative_values() {
        let lines: Vec<CostLine> =
            serde_json::from_str(r#"[{"name": "Labor", "value": -2.0}]"#).unwrap();
        assert_eq!(lines[0].value, 0.0);
        assert!(!lines[0].id.is_empty());
    }
}
