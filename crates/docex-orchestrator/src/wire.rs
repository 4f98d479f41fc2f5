//! Wire shapes shared by the tool-call and event surfaces

use docex_domain::{DocumentPayload, ExtractionRequest, FieldSpec};
use serde::{Deserialize, Serialize};

/// Input of `extract_document_data` and `document.extraction.requested`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractDocumentInput {
    /// Base64-encoded document
    #[serde(default)]
    pub document_base64: String,

    /// Declared file type
    #[serde(default)]
    pub file_type: String,

    /// Fields to extract, in order
    #[serde(default, alias = "fields")]
    pub data_elements: Vec<FieldSpec>,
}

impl ExtractDocumentInput {
    /// Convert into a pipeline request
    pub fn into_request(self) -> ExtractionRequest {
        ExtractionRequest::new(
            DocumentPayload::Base64(self.document_base64),
            self.file_type,
            self.data_elements,
        )
    }
}

impl From<ExtractDocumentInput> for ExtractionRequest {
    fn from(input: ExtractDocumentInput) -> Self {
        input.into_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tool_input() {
        let input: ExtractDocumentInput = serde_json::from_value(json!({
            "documentBase64": "JVBERi0=",
            "fileType": "PDF",
            "dataElements": [
                {"name": "invoiceNumber", "description": "Invoice id", "required": true},
                {"name": "total", "description": "Amount", "format": "number"}
            ]
        }))
        .unwrap();

        let request = input.into_request();
        assert_eq!(request.file_type, "PDF");
        assert_eq!(request.fields.len(), 2);
        assert!(request.fields[0].required);
        assert_eq!(request.fields[0].format, "string");
        assert!(!request.fields[1].required);
        assert_eq!(request.payload, DocumentPayload::Base64("JVBERi0=".to_string()));
    }

    #[test]
    fn test_missing_members_default_empty() {
        let input: ExtractDocumentInput = serde_json::from_value(json!({})).unwrap();
        let request = ExtractionRequest::from(input);
        assert!(request.payload.is_empty());
        assert!(request.fields.is_empty());
    }
}
