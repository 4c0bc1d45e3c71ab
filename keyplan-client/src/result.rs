use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Main page and child pages proposed for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPlan {
    pub main_page: String,
    pub child_pages: Vec<String>,
}

impl TopicPlan {
    /// Validate the JSON object returned by the model.
    ///
    /// A missing or null `main_page` falls back to `topic`. A missing
    /// `child_pages` means no children. Non-string and blank children are
    /// skipped, and the list is cut to `max_children`.
    pub fn from_content(content: &str, topic: &str, max_children: usize) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ClientError::ParseError(format!("Response is not valid JSON: {}", e)))?;

        let Value::Object(object) = value else {
            return Err(ClientError::ParseError(
                "Response is not a JSON object".to_string(),
            ));
        };

        let main_page = match object.get("main_page") {
            None | Some(Value::Null) => topic.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(ClientError::ParseError(format!(
                    "'main_page' must be a string, got {}",
                    json_type_name(other)
                )));
            }
        };

        let mut child_pages: Vec<String> = match object.get("child_pages") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                    other => {
                        debug!("Skipping child page entry {}", other);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                return Err(ClientError::ParseError(format!(
                    "'child_pages' must be an array, got {}",
                    json_type_name(other)
                )));
            }
        };

        if child_pages.len() > max_children {
            debug!(
                "Model returned {} child pages, keeping {}",
                child_pages.len(),
                max_children
            );
            child_pages.truncate(max_children);
        }

        Ok(Self {
            main_page,
            child_pages,
        })
    }
}

/// Keyword rows returned for one page.
///
/// Row shape belongs to the keyword data source; `columns` is the union of
/// row keys in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl KeywordTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Build a table from a record-oriented (array of objects) or
    /// column-oriented (object of arrays or of index-keyed objects) body.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let mut rows = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Object(row) => rows.push(row),
                        other => {
                            return Err(ClientError::ParseError(format!(
                                "Row {} is {}, expected an object",
                                idx,
                                json_type_name(&other)
                            )));
                        }
                    }
                }
                Ok(Self::from_rows(rows))
            }
            Value::Object(columns) => Self::from_columns(columns),
            other => Err(ClientError::ParseError(format!(
                "Expected an array or object body, got {}",
                json_type_name(&other)
            ))),
        }
    }

    fn from_columns(columns: Map<String, Value>) -> Result<Self> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Map<String, Value>> = Vec::new();
        let mut names = Vec::with_capacity(columns.len());

        for (name, cells) in columns {
            let cells: Vec<(String, Value)> = match cells {
                Value::Array(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect(),
                Value::Object(items) => items.into_iter().collect(),
                other => {
                    return Err(ClientError::ParseError(format!(
                        "Column '{}' is {}, expected an array or object",
                        name,
                        json_type_name(&other)
                    )));
                }
            };

            for (label, cell) in cells {
                let pos = *positions.entry(label).or_insert_with(|| {
                    rows.push(Map::new());
                    rows.len() - 1
                });
                rows[pos].insert(name.clone(), cell);
            }
            names.push(name);
        }

        Ok(Self {
            columns: names,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell values of one column, `None` where a row lacks the key.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> {
        self.rows.iter().map(move |row| row.get(name))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_parses_main_and_children() {
        let content = r#"{"main_page": "Running Shoes", "child_pages": ["Trail", "Road"]}"#;
        let plan = TopicPlan::from_content(content, "shoes", 10).unwrap();
        assert_eq!(plan.main_page, "Running Shoes");
        assert_eq!(plan.child_pages, vec!["Trail", "Road"]);
    }

    #[test]
    fn test_plan_missing_main_page_falls_back_to_topic() {
        let plan = TopicPlan::from_content(r#"{"child_pages": []}"#, "coffee", 5).unwrap();
        assert_eq!(plan.main_page, "coffee");
        assert!(plan.child_pages.is_empty());
    }

    #[test]
    fn test_plan_skips_non_string_children() {
        let content = r#"{"main_page": "x", "child_pages": ["a", null, 3, "  ", "b"]}"#;
        let plan = TopicPlan::from_content(content, "x", 10).unwrap();
        assert_eq!(plan.child_pages, vec!["a", "b"]);
    }

    #[test]
    fn test_plan_truncates_to_limit() {
        let content = r#"{"child_pages": ["a", "b", "c", "d"]}"#;
        let plan = TopicPlan::from_content(content, "x", 2).unwrap();
        assert_eq!(plan.child_pages, vec!["a", "b"]);
    }

    #[test]
    fn test_plan_rejects_invalid_shapes() {
        assert!(TopicPlan::from_content("not json", "x", 10).is_err());
        assert!(TopicPlan::from_content("[1, 2]", "x", 10).is_err());
        assert!(TopicPlan::from_content(r#"{"main_page": 4}"#, "x", 10).is_err());
        assert!(TopicPlan::from_content(r#"{"child_pages": "a, b"}"#, "x", 10).is_err());
    }

    #[test]
    fn test_table_from_records() {
        let table = KeywordTable::from_json(json!([
            {"keyword": "trail shoes", "volume": 1200},
            {"keyword": "road shoes", "volume": 800, "cpc": 1.5}
        ]))
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, vec!["keyword", "volume", "cpc"]);
        assert!(table.has_column("cpc"));
    }

    #[test]
    fn test_table_from_index_keyed_columns() {
        let table = KeywordTable::from_json(json!({
            "keyword": {"0": "a", "1": "b"},
            "volume": {"0": 10, "1": 20}
        }))
        .unwrap();

        assert_eq!(table.columns, vec!["keyword", "volume"]);
        assert_eq!(table.rows[1]["keyword"], json!("b"));
        assert_eq!(table.rows[1]["volume"], json!(20));
    }

    #[test]
    fn test_table_from_positional_columns_with_ragged_lengths() {
        let table = KeywordTable::from_json(json!({
            "keyword": ["a", "b", "c"],
            "volume": [1, 2]
        }))
        .unwrap();

        assert_eq!(table.len(), 3);
        let volumes: Vec<_> = table.column_values("volume").collect();
        assert_eq!(volumes, vec![Some(&json!(1)), Some(&json!(2)), None]);
    }

    #[test]
    fn test_table_rejects_scalars() {
        assert!(KeywordTable::from_json(json!("nope")).is_err());
        assert!(KeywordTable::from_json(json!({"volume": 3})).is_err());
        assert!(KeywordTable::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_empty_object_is_empty_table() {
        let table = KeywordTable::from_json(json!({})).unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
