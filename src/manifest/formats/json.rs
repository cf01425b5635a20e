//! JSON output of the tree snapshot

use super::registry::{FormatError, Formatter};
use crate::manifest::ast::{snapshot_from_ast, Ast};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, ast: &Ast) -> Result<String, FormatError> {
        serde_json::to_string_pretty(&snapshot_from_ast(ast))
            .map_err(|e| FormatError::Serialization(e.to_string()))
    }

    fn description(&self) -> &str {
        "Tree snapshot as pretty-printed JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::config::PupfmtConfig;
    use crate::manifest::parse_source;

    #[test]
    fn test_json_has_node_types() {
        let ast = parse_source("include apache\n", &PupfmtConfig::default()).expect("parse");
        let json = JsonFormatter.serialize(&ast).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["node_type"], "Manifest");
        assert_eq!(value["children"][0]["node_type"], "Include");
        assert_eq!(value["children"][0]["label"], "include");
        assert_eq!(value["children"][0]["line"], 1);
    }
}
