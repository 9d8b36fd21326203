use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    Single,
    Multi,
}

/// One chart panel on the custom dashboard. UI state only, never written back
/// to the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub graph_type: GraphType,
    pub test_names: Vec<String>,
    #[serde(default)]
    pub expanded: bool,
}

impl GraphConfig {
    /// Panel heading: the test name for single charts, a count for combined ones.
    pub fn title(&self) -> String {
        match self.graph_type {
            GraphType::Single => self.test_names.first().cloned().unwrap_or_default(),
            GraphType::Multi => format!("Multiple Tests ({})", self.test_names.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graph_config_wire_shape() {
        let config: GraphConfig = serde_json::from_value(json!({
            "id": "1718000000000abc",
            "type": "multi",
            "testNames": ["Glucose, Fasting", "Hemoglobin A1c"]
        }))
        .unwrap();
        assert_eq!(config.graph_type, GraphType::Multi);
        assert!(!config.expanded);
        assert_eq!(config.title(), "Multiple Tests (2)");
    }
}
