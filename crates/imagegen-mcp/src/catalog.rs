//! Static catalog of the image generation tools

use imagegen_protocol_adapter::ToolSpec;
use serde_json::{json, Map, Value};

pub const GENERATE_AI_IMAGE: &str = "generate_ai_image";
pub const SQUARE_IMAGE: &str = "square_image";
pub const LANDSCAPE_IMAGE: &str = "landscape_image";
pub const PORTRAIT_IMAGE: &str = "portrait_image";

pub const DEFAULT_SIZE: &str = "1024x1024";

/// Fixed sizes offered through the shortcut tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Square,
    Landscape,
    Portrait,
}

impl SizePreset {
    pub const ALL: [SizePreset; 3] = [SizePreset::Square, SizePreset::Landscape, SizePreset::Portrait];

    pub fn size(self) -> &'static str {
        match self {
            SizePreset::Square => "1024x1024",
            SizePreset::Landscape => "1536x1024",
            SizePreset::Portrait => "1024x1536",
        }
    }

    pub fn tool_name(self) -> &'static str {
        match self {
            SizePreset::Square => SQUARE_IMAGE,
            SizePreset::Landscape => LANDSCAPE_IMAGE,
            SizePreset::Portrait => PORTRAIT_IMAGE,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SizePreset::Square => "square",
            SizePreset::Landscape => "landscape",
            SizePreset::Portrait => "portrait",
        }
    }
}

/// What a tool name dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Generate,
    Preset(SizePreset),
}

/// Resolve a tool name to its handler
pub fn resolve(name: &str) -> Option<ToolKind> {
    if name == GENERATE_AI_IMAGE {
        return Some(ToolKind::Generate);
    }
    SizePreset::ALL.into_iter().find(|p| p.tool_name() == name).map(ToolKind::Preset)
}

fn common_properties(require_output_dir: bool) -> Map<String, Value> {
    let output_dir_desc = if require_output_dir {
        "Absolute path of the directory the image is written to. Created if missing; must be writable."
    } else {
        "Directory the image is written to"
    };

    let mut props = Map::new();
    props.insert(
        "prompt".into(),
        json!({"type": "string", "description": "Text description of the image to generate"}),
    );
    props.insert(
        "model".into(),
        json!({"type": "string", "description": "Model identifier passed to the generator"}),
    );
    props.insert(
        "output".into(),
        json!({"type": "string", "description": "Output file name or path for the generated image"}),
    );
    props.insert("output_dir".into(), json!({"type": "string", "description": output_dir_desc}));
    props
}

fn required(require_output_dir: bool) -> Value {
    if require_output_dir {
        json!(["prompt", "output_dir"])
    } else {
        json!(["prompt"])
    }
}

fn generate_tool(require_output_dir: bool) -> ToolSpec {
    let mut props = common_properties(require_output_dir);
    props.insert(
        "size".into(),
        json!({
            "type": "string",
            "description": "Image size as WIDTHxHEIGHT (e.g. 1024x1024, 1536x1024, 1024x1536)",
            "default": DEFAULT_SIZE
        }),
    );

    ToolSpec {
        name: GENERATE_AI_IMAGE.to_string(),
        title: Some("Generate AI image".to_string()),
        description: Some(
            "Generate an image from a text prompt using the external image generator".to_string(),
        ),
        annotations: Some(json!({"readOnlyHint": false, "destructiveHint": false, "openWorldHint": true})),
        input_schema: json!({
            "type": "object",
            "properties": Value::Object(props),
            "required": required(require_output_dir)
        }),
        output_schema: None,
    }
}

fn preset_tool(preset: SizePreset, require_output_dir: bool) -> ToolSpec {
    ToolSpec {
        name: preset.tool_name().to_string(),
        title: Some(format!("Generate {} image", preset.label())),
        description: Some(format!(
            "Generate a {} image ({}) from a text prompt",
            preset.label(),
            preset.size()
        )),
        annotations: Some(json!({"readOnlyHint": false, "destructiveHint": false, "openWorldHint": true})),
        input_schema: json!({
            "type": "object",
            "properties": Value::Object(common_properties(require_output_dir)),
            "required": required(require_output_dir)
        }),
        output_schema: None,
    }
}

/// The full catalog, in advertisement order
pub fn tool_catalog(require_output_dir: bool) -> Vec<ToolSpec> {
    let mut tools = vec![generate_tool(require_output_dir)];
    tools.extend(SizePreset::ALL.into_iter().map(|p| preset_tool(p, require_output_dir)));
    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_generic_tool_then_presets() {
        let names: Vec<String> = tool_catalog(true).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec![GENERATE_AI_IMAGE, SQUARE_IMAGE, LANDSCAPE_IMAGE, PORTRAIT_IMAGE]);
    }

    #[test]
    fn presets_do_not_accept_size() {
        for tool in tool_catalog(true).into_iter().skip(1) {
            assert!(tool.input_schema["properties"].get("size").is_none(), "{}", tool.name);
        }
        let generic = &tool_catalog(true)[0];
        assert_eq!(generic.input_schema["properties"]["size"]["default"], DEFAULT_SIZE);
    }

    #[test]
    fn output_dir_requirement_follows_profile() {
        let strict = &tool_catalog(true)[0];
        assert_eq!(strict.required_fields(), vec!["prompt", "output_dir"]);
        let relaxed = &tool_catalog(false)[0];
        assert_eq!(relaxed.required_fields(), vec!["prompt"]);
    }

    #[test]
    fn resolve_known_and_unknown_names() {
        assert_eq!(resolve("generate_ai_image"), Some(ToolKind::Generate));
        assert_eq!(resolve("landscape_image"), Some(ToolKind::Preset(SizePreset::Landscape)));
        assert_eq!(resolve("frobnicate"), None);
    }

    #[test]
    fn preset_sizes() {
        assert_eq!(SizePreset::Square.size(), "1024x1024");
        assert_eq!(SizePreset::Landscape.size(), "1536x1024");
        assert_eq!(SizePreset::Portrait.size(), "1024x1536");
    }
}
