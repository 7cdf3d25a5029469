//! Output formatting for result envelopes (plain/JSON).
//!
//! XML is recognized so that callers can ask for it, but rendering it is
//! refused with [`FormatError::Unsupported`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::envelope::{FunctionSchema, Payload, ResultEnvelope};
use crate::core::schema::{ResourceSchemaInfo, SchemaDefinition, SchemaElement, SchemaInfo};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented human output (default)
    #[default]
    Plain,
    /// Machine-readable JSON
    Json,
    /// Accepted on the command line, never rendered
    Xml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing output format option.
#[derive(Debug, Clone)]
pub struct OutputFormatParseError(pub String);

impl std::fmt::Display for OutputFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid output format '{}', valid values: plain, json, xml",
            self.0
        )
    }
}

impl std::error::Error for OutputFormatParseError {}

/// Errors produced while rendering an envelope.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{0} output is not supported")]
    Unsupported(String),

    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rendering options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: OutputFormat,
    /// Pretty-print JSON; nest plain output by indentation instead of dotted paths
    pub indent: bool,
    /// ANSI bold for headers and field names (plain only)
    pub color: bool,
}

impl FormatOptions {
    pub fn new(format: OutputFormat) -> Self {
        FormatOptions {
            format,
            ..FormatOptions::default()
        }
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Color is only ever applied to plain output.
    pub fn use_color(&self) -> bool {
        self.color && self.format == OutputFormat::Plain
    }
}

/// Render an envelope. The result carries no trailing newline.
pub fn render(envelope: &ResultEnvelope, opts: &FormatOptions) -> Result<String, FormatError> {
    match opts.format {
        OutputFormat::Json if opts.indent => Ok(serde_json::to_string_pretty(envelope)?),
        OutputFormat::Json => Ok(serde_json::to_string(envelope)?),
        OutputFormat::Xml => Err(FormatError::Unsupported(OutputFormat::Xml.to_string())),
        OutputFormat::Plain => Ok(PlainWriter::new(opts).envelope(envelope)),
    }
}

struct PlainWriter {
    indent: bool,
    color: bool,
    lines: Vec<String>,
}

impl PlainWriter {
    fn new(opts: &FormatOptions) -> Self {
        PlainWriter {
            indent: opts.indent,
            color: opts.use_color(),
            lines: Vec::new(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn envelope(mut self, envelope: &ResultEnvelope) -> String {
        let header = format!("{} {}", envelope.kind, self.bold(&envelope.name));
        self.lines.push(header);

        match &envelope.payload {
            Payload::Provider(schema) => {
                if let Some(version) = &schema.version {
                    self.lines.push(format!("version {}", version));
                }
                self.section(&[], "provider", &schema.provider);
                if !schema.resources.is_empty() {
                    self.heading(&[], "resources");
                }
                for (name, resource) in &schema.resources {
                    self.resource(&["resources", name.as_str()], resource);
                }
                if !schema.data_sources.is_empty() {
                    self.heading(&[], "data-sources");
                }
                for (name, data_source) in &schema.data_sources {
                    self.resource(&["data-sources", name.as_str()], data_source);
                }
            }
            Payload::Resource { provider, schema } => {
                self.lines.push(format!("provider {}", provider));
                self.timeouts(&[], schema);
                self.fields(&[], &schema.schema);
            }
            Payload::Provisioner(schema) => {
                if let Some(version) = &schema.version {
                    self.lines.push(format!("version {}", version));
                }
                self.section(&[], "provision", &schema.provision);
                self.section(&[], "connection", &schema.connection);
            }
            Payload::Function { schema } => {
                let line = self.signature(schema);
                self.lines.push(line);
            }
            Payload::FunctionCatalog { schema } => {
                for function in schema.values() {
                    let line = self.signature(function);
                    self.lines.push(line);
                }
            }
            Payload::Backend { schema } => self.fields(&[], schema),
            Payload::Names { names } => self.lines.extend(names.iter().cloned()),
            Payload::Error { error } => self.lines.push(format!("Error: {}", error)),
        }

        self.lines.join("\n")
    }

    fn path_line(&self, path: &[&str], text: &str) -> String {
        if self.indent {
            format!("{}{}", "  ".repeat(path.len()), text)
        } else if path.is_empty() {
            text.to_string()
        } else {
            format!("{}.{}", path.join("."), text)
        }
    }

    /// Heading for a group of fields; only shown when indenting, since
    /// dotted paths already carry the group name.
    fn heading(&mut self, path: &[&str], title: &str) {
        if self.indent {
            let line = self.path_line(path, &format!("{}:", title));
            self.lines.push(line);
        }
    }

    fn section(&mut self, path: &[&str], title: &str, info: &SchemaInfo) {
        if info.is_empty() {
            return;
        }
        self.heading(path, title);
        let mut nested = path.to_vec();
        nested.push(title);
        self.fields(&nested, info);
    }

    fn resource(&mut self, path: &[&str], resource: &ResourceSchemaInfo) {
        let (name, parent) = match path.split_last() {
            Some((name, parent)) => (*name, parent),
            None => return,
        };
        self.heading(parent, name);
        self.timeouts(path, resource);
        self.fields(path, &resource.schema);
    }

    fn timeouts(&mut self, path: &[&str], resource: &ResourceSchemaInfo) {
        if !resource.timeouts.is_empty() {
            let line = self.path_line(path, &format!("timeouts {}", resource.timeouts.join(", ")));
            self.lines.push(line);
        }
    }

    fn fields(&mut self, path: &[&str], info: &SchemaInfo) {
        for (name, def) in info {
            let line = format!("{} ({})", self.bold(name), describe(def));
            let line = self.path_line(path, &line);
            self.lines.push(line);

            if let Some(SchemaElement::Block { info }) = &def.elem {
                let mut nested = path.to_vec();
                nested.push(name.as_str());
                self.fields(&nested, info);
            }
        }
    }

    fn signature(&self, function: &FunctionSchema) -> String {
        let mut args = function.arg_types.clone();
        if let Some(variadic) = &function.variadic_type {
            args.push(format!("...{}", variadic));
        }
        format!(
            "{}({}) {}",
            self.bold(&function.name),
            args.join(", "),
            function.return_type
        )
    }
}

/// `list(string), required, computed` style summary of one field.
fn describe(def: &SchemaDefinition) -> String {
    let mut parts = Vec::new();

    match &def.elem {
        Some(SchemaElement::Type { value_type }) => {
            parts.push(format!("{}({})", def.value_type, value_type))
        }
        _ => parts.push(def.value_type.to_string()),
    }

    if def.required {
        parts.push("required".to_string());
    } else if def.optional {
        parts.push("optional".to_string());
    }
    for (set, flag) in [
        (def.computed, "computed"),
        (def.force_new, "forces new resource"),
        (def.sensitive, "sensitive"),
    ] {
        if set {
            parts.push(flag.to_string());
        }
    }
    if let Some(SchemaElement::Value { value }) = &def.default {
        parts.push(format!("default {:?}", value));
    }
    match (def.min_items, def.max_items) {
        (Some(min), Some(max)) if min == max => parts.push(format!("exactly {}", min)),
        (min, max) => {
            if let Some(min) = min {
                parts.push(format!("min {}", min));
            }
            if let Some(max) = max {
                parts.push(format!("max {}", max));
            }
        }
    }
    if let Some(message) = &def.deprecated {
        parts.push(format!("deprecated: {}", message));
    }

    parts.join(", ")
}
