use std::cmp::Ordering;

/// Make a free-text description safe for naive CSV consumers:
/// commas become dashes and double quotes are removed.
pub fn sanitize_description(raw: &str) -> String {
    raw.replace(',', "-").replace('"', "")
}

/// Ordering key for identifier columns that are usually numeric.
/// Numbers sort numerically and ahead of any non-numeric label.
#[derive(Debug, Clone)]
pub enum NaturalKey {
    Number(f64),
    Text(String),
}

impl NaturalKey {
    pub fn new(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => NaturalKey::Number(n),
            _ => NaturalKey::Text(raw.to_string()),
        }
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (NaturalKey::Number(a), NaturalKey::Number(b)) => a.total_cmp(b),
            (NaturalKey::Number(_), NaturalKey::Text(_)) => Ordering::Less,
            (NaturalKey::Text(_), NaturalKey::Number(_)) => Ordering::Greater,
            (NaturalKey::Text(a), NaturalKey::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NaturalKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NaturalKey {}
