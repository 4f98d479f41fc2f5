//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use docex_domain::FieldSpec;
use std::path::PathBuf;

/// docex - Extract named fields from business documents.
#[derive(Debug, Parser)]
#[command(name = "docex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DOCEX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (extracted values only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one extraction on a local file
    Extract(ExtractArgs),

    /// Process JSON-lines events from stdin, replying on stdout
    Events(EventsArgs),

    /// Inspect or create configuration
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document to read
    pub file: PathBuf,

    /// Declared file type (defaults to the file extension)
    #[arg(short = 't', long)]
    pub file_type: Option<String>,

    /// Field to extract: name[:format][!][=description], `!` marks it required
    #[arg(short = 'F', long = "field", value_parser = parse_field_arg)]
    pub fields: Vec<FieldSpec>,

    /// JSON file holding an array of field definitions
    #[arg(long)]
    pub fields_file: Option<PathBuf>,
}

/// Arguments for the events command.
#[derive(Debug, Parser)]
pub struct EventsArgs {
    /// Inbound queue capacity
    #[arg(long, default_value = "16")]
    pub queue: usize,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (file plus environment overrides)
    Show,

    /// Print the default configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse `name[:format][!][=description]`
pub fn parse_field_arg(arg: &str) -> Result<FieldSpec, String> {
    let (head, description) = match arg.split_once('=') {
        Some((head, description)) => (head, description.trim()),
        None => (arg, ""),
    };

    let head = head.trim();
    let (head, required) = match head.strip_suffix('!') {
        Some(head) => (head, true),
        None => (head, false),
    };

    let (name, format) = match head.split_once(':') {
        Some((name, format)) => (name.trim(), Some(format.trim())),
        None => (head.trim(), None),
    };

    if name.is_empty() {
        return Err(format!("field '{}' has no name", arg));
    }

    let mut field = FieldSpec::new(name, description);
    if let Some(format) = format.filter(|f| !f.is_empty()) {
        field = field.with_format(format);
    }
    if required {
        field = field.required();
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from([
            "docex",
            "extract",
            "invoice.pdf",
            "-F",
            "invoiceNumber!=Invoice id",
            "--field",
            "total:number",
        ]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.file, PathBuf::from("invoice.pdf"));
                assert_eq!(args.fields.len(), 2);
                assert!(args.fields[0].required);
                assert_eq!(args.fields[1].format, "number");
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_config_command() {
        let cli = Cli::parse_from(["docex", "--format", "json", "config", "init", "--force"]);
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs { action: ConfigAction::Init { force: true } })
        ));
    }

    #[test]
    fn test_parse_field_arg() {
        let field = parse_field_arg("dueDate:date!=Payment due date").unwrap();
        assert_eq!(field.name, "dueDate");
        assert_eq!(field.format, "date");
        assert!(field.required);
        assert_eq!(field.description, "Payment due date");

        let field = parse_field_arg("vendor").unwrap();
        assert_eq!(field.format, "string");
        assert!(!field.required);
        assert!(field.description.is_empty());

        assert!(parse_field_arg(":number").is_err());
        assert!(parse_field_arg("!").is_err());
    }
}
