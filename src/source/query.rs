//! WQL query description

use super::Record;

/// A `SELECT * FROM <class>` query with equality filters joined by AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    class: String,
    filters: Vec<(String, String)>,
}

impl Query {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            filters: Vec::new(),
        }
    }

    /// Require `property = value`
    pub fn filter(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((property.into(), value.into()));
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Render as WQL
    pub fn to_wql(&self) -> String {
        let mut wql = format!("SELECT * FROM {}", self.class);
        for (i, (property, value)) in self.filters.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            wql.push_str(&format!(" {} {} = '{}'", keyword, property, escape(value)));
        }
        wql
    }

    /// Whether a record satisfies every filter (exact, case-sensitive)
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|(property, value)| {
            record
                .get(property)
                .and_then(|v| v.as_str())
                .is_some_and(|v| v == value)
        })
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_wql_without_filters() {
        assert_eq!(Query::new("Hardware").to_wql(), "SELECT * FROM Hardware");
    }

    #[test]
    fn test_wql_with_filters() {
        let query = Query::new("Sensor")
            .filter("SensorType", "Control")
            .filter("Parent", "/lpc/nct6798d");
        assert_eq!(
            query.to_wql(),
            "SELECT * FROM Sensor WHERE SensorType = 'Control' AND Parent = '/lpc/nct6798d'"
        );
    }

    #[test]
    fn test_wql_escapes_quotes_and_backslashes() {
        let query = Query::new("Sensor").filter("Name", r"it's C:\fan");
        assert_eq!(
            query.to_wql(),
            r"SELECT * FROM Sensor WHERE Name = 'it\'s C:\\fan'"
        );
    }

    #[test]
    fn test_matches() {
        let query = Query::new("Sensor").filter("SensorType", "Control");

        assert!(query.matches(&record(&[("SensorType", json!("Control"))])));
        assert!(!query.matches(&record(&[("SensorType", json!("Temperature"))])));
        assert!(!query.matches(&record(&[("SensorType", json!("control"))])));
        assert!(!query.matches(&record(&[("SensorType", serde_json::Value::Null)])));
        assert!(!query.matches(&record(&[("Name", json!("Fan #1"))])));
    }

    #[test]
    fn test_matches_without_filters() {
        assert!(Query::new("Sensor").matches(&Record::new()));
    }
}
