//! Extract tool - pull named fields out of one document

use docex_domain::ExtractionResult;
use docex_orchestrator::{ExtractDocumentInput, Orchestrator};
use serde_json::json;

use crate::protocol::ToolDefinition;

/// Tool name
pub const TOOL_NAME: &str = "extract_document_data";

/// Parameters for extracting document data
pub type ExtractParams = ExtractDocumentInput;

/// Handle extract_document_data tool invocation
///
/// Runs the whole pipeline. Pipeline failures are not protocol errors: they
/// come back inside the result with `success: false`.
pub async fn handle_extract(orchestrator: &Orchestrator, params: ExtractParams) -> ExtractionResult {
    tracing::info!(
        file_type = %params.file_type,
        fields = params.data_elements.len(),
        "extract_document_data called"
    );
    orchestrator.run(params.into_request()).await
}

/// Tool definition for tools/list
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: TOOL_NAME.to_string(),
        description: "Extract named data elements from a PDF, DOCX, PNG or JPG document, with per-field confidence and evidence".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "documentBase64": {"type": "string", "description": "Base64-encoded document content"},
                "fileType": {"type": "string", "enum": ["pdf", "docx", "png", "jpg"], "description": "Declared document type"},
                "dataElements": {
                    "type": "array",
                    "description": "Fields to extract, in order",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "description": "Unique field name"},
                            "description": {"type": "string", "description": "What the field means"},
                            "format": {"type": "string", "description": "string, number, integer, date or boolean", "default": "string"},
                            "required": {"type": "boolean", "default": false}
                        },
                        "required": ["name"]
                    }
                }
            },
            "required": ["documentBase64", "fileType", "dataElements"]
        }),
    }
}
