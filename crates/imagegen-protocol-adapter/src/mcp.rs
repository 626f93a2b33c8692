//! Helpers to map protocol-agnostic DTOs to the official MCP Rust SDK types.

use crate::dto::{InvokeResult, ProtocolError, ToolSpec};
use rmcp::model as m;
use std::borrow::Cow;
use std::sync::Arc;

fn to_json_object(val: &serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    let mut obj = match val {
        serde_json::Value::Object(map) => map.clone(),
        // Treat anything else as a bare properties map
        other => {
            let mut obj = serde_json::Map::new();
            obj.insert("properties".into(), other.clone());
            obj
        }
    };
    if !obj.contains_key("type") {
        obj.insert("type".into(), serde_json::Value::String("object".into()));
    }
    obj
}

pub fn to_mcp_tool(spec: &ToolSpec) -> m::Tool {
    let output_obj = spec.output_schema.as_ref().and_then(|v| match v {
        serde_json::Value::Object(map) => Some(map.clone()),
        _ => None,
    });

    m::Tool {
        name: Cow::Owned(spec.name.clone()),
        title: spec.title.clone(),
        description: spec.description.as_ref().map(|s| Cow::Owned(s.clone())),
        input_schema: Arc::new(to_json_object(&spec.input_schema)),
        output_schema: output_obj.map(Arc::new),
        annotations: spec
            .annotations
            .as_ref()
            .and_then(|v| serde_json::from_value::<m::ToolAnnotations>(v.clone()).ok()),
        icons: None,
    }
}

pub fn to_mcp_call_result(res: &InvokeResult) -> m::CallToolResult {
    let mut result = m::CallToolResult::success(vec![m::Content::text(res.text.clone())]);
    result.structured_content = res.structured.clone();
    result
}

pub fn to_mcp_error(err: ProtocolError) -> rmcp::ErrorData {
    let mut data = err.data.unwrap_or_else(|| serde_json::json!({}));
    if let Some(obj) = data.as_object_mut() {
        obj.insert("kind".into(), serde_json::Value::String(err.kind.as_str().into()));
    }
    rmcp::ErrorData::new(m::ErrorCode(err.kind.jsonrpc_code()), err.message, Some(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_properties_are_wrapped_into_object_schema() {
        let obj = to_json_object(&json!("weird"));
        assert_eq!(obj.get("type"), Some(&json!("object")));
        assert_eq!(obj.get("properties"), Some(&json!("weird")));
    }

    #[test]
    fn tool_keeps_required_list() {
        let spec = ToolSpec {
            name: "square_image".into(),
            title: None,
            description: Some("Square".into()),
            annotations: None,
            input_schema: json!({
                "type": "object",
                "properties": {"prompt": {"type": "string"}},
                "required": ["prompt"]
            }),
            output_schema: None,
        };
        let tool = to_mcp_tool(&spec);
        assert_eq!(tool.name, "square_image");
        assert_eq!(tool.input_schema.get("required"), Some(&json!(["prompt"])));
    }

    #[test]
    fn error_code_follows_kind() {
        let err = to_mcp_error(ProtocolError::invalid_params("prompt is required"));
        assert_eq!(err.code.0, -32602);
        assert_eq!(err.data.unwrap()["kind"], "INVALID_PARAMS");
    }
}
