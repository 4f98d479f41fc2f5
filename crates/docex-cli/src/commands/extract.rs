//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docex_domain::{DocumentPayload, ExtractionRequest, FieldSpec};
use docex_orchestrator::{Collaborators, Orchestrator, Settings};
use std::path::Path;

/// Execute the extract command.
///
/// Returns whether the extraction succeeded.
pub async fn execute_extract(args: ExtractArgs, settings: &Settings, formatter: &Formatter) -> Result<bool> {
    let request = build_request(args)?;

    let collaborators = Collaborators::from_settings(settings)?;
    let orchestrator = Orchestrator::new(settings, &collaborators);
    let result = orchestrator.run(request).await;
    collaborators.shutdown();

    println!("{}", formatter.format_result(&result)?);
    Ok(result.success)
}

/// Read the document and assemble the field list.
fn build_request(args: ExtractArgs) -> Result<ExtractionRequest> {
    let file_type = match args.file_type {
        Some(file_type) => file_type,
        None => extension_of(&args.file)?,
    };

    let mut fields = Vec::new();
    if let Some(path) = &args.fields_file {
        let contents = std::fs::read_to_string(path)?;
        let from_file: Vec<FieldSpec> = serde_json::from_str(&contents)?;
        fields.extend(from_file);
    }
    fields.extend(args.fields);

    if fields.is_empty() {
        return Err(CliError::InvalidInput(
            "No fields given (use --field or --fields-file)".to_string(),
        ));
    }

    let bytes = std::fs::read(&args.file)?;
    Ok(ExtractionRequest::new(DocumentPayload::Bytes(bytes), file_type, fields))
}

fn extension_of(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "Cannot infer file type of {} (use --file-type)",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args(file: PathBuf) -> ExtractArgs {
        ExtractArgs {
            file,
            file_type: None,
            fields: vec![FieldSpec::new("total", "Amount due").with_format("number")],
            fields_file: None,
        }
    }

    #[test]
    fn test_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.JPEG");
        std::fs::write(&path, b"\xFF\xD8\xFF").unwrap();

        let request = build_request(args(path)).unwrap();
        assert_eq!(request.file_type, "JPEG");
        assert_eq!(request.payload, DocumentPayload::Bytes(vec![0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_fields_file_comes_first() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("invoice.pdf");
        std::fs::write(&doc, b"%PDF-1.4").unwrap();
        let fields_path = dir.path().join("fields.json");
        let mut file = std::fs::File::create(&fields_path).unwrap();
        write!(file, r#"[{{"name": "invoiceNumber", "required": true}}]"#).unwrap();

        let mut args = args(doc);
        args.fields_file = Some(fields_path);
        let request = build_request(args).unwrap();

        let names: Vec<_> = request.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["invoiceNumber", "total"]);
        assert!(request.fields[0].required);
    }

    #[test]
    fn test_missing_extension_and_fields() {
        let mut no_ext = args(PathBuf::from("README"));
        no_ext.file_type = None;
        assert!(matches!(build_request(no_ext), Err(CliError::InvalidInput(_))));

        let mut no_fields = args(PathBuf::from("a.pdf"));
        no_fields.fields.clear();
        assert!(matches!(build_request(no_fields), Err(CliError::InvalidInput(_))));
    }
}
