//! Command implementations, independent of argument parsing.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::{ContentArrangement, Table};
use dtt_codec::flatten_with;
use dtt_dictionary::Dictionary;
use dtt_document::{DocumentOptions, from_bson_bytes, from_json_str, to_bson_bytes, to_json_string};
use dtt_model::Dataset;
use dtt_pathway::{Conditional, Pathway};
use dtt_types::{TableTemplate, natural_type_for_tag};
use tracing::{debug, info, info_span};

/// Tree document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Bson,
    Json,
}

impl DocumentFormat {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("bson") => Ok(Self::Bson),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "cannot tell the document format of {}; use a .json or .bson extension",
                path.display()
            ),
        }
    }
}

/// Decode a document held in memory.
pub fn decode(
    dict: &Dictionary,
    format: DocumentFormat,
    bytes: &[u8],
    options: DocumentOptions,
) -> Result<Dataset> {
    let dataset = match format {
        DocumentFormat::Bson => from_bson_bytes(dict, bytes, options)?,
        DocumentFormat::Json => {
            let text = std::str::from_utf8(bytes).context("JSON document is not UTF-8")?;
            from_json_str(dict, text, options)?
        }
    };
    debug!(attributes = dataset.len(), "Decoded document");
    Ok(dataset)
}

/// Encode a dataset as a document.
pub fn encode(
    dict: &Dictionary,
    format: DocumentFormat,
    dataset: &Dataset,
    options: DocumentOptions,
) -> Result<Vec<u8>> {
    let bytes = match format {
        DocumentFormat::Bson => to_bson_bytes(dict, dataset, options)?,
        DocumentFormat::Json => to_json_string(dict, dataset, options)?.into_bytes(),
    };
    Ok(bytes)
}

/// Read and decode a document file, choosing the format by extension.
pub fn read_document(dict: &Dictionary, path: &Path, options: DocumentOptions) -> Result<Dataset> {
    let format = DocumentFormat::from_path(path)?;
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    decode(dict, format, &bytes, options).with_context(|| format!("decode {}", path.display()))
}

/// Decode `input` and re-encode it as `target`.
pub fn run_convert(
    dict: &Dictionary,
    input: &Path,
    target: DocumentFormat,
    options: DocumentOptions,
) -> Result<Vec<u8>> {
    let span = info_span!("convert", input = %input.display());
    let _guard = span.enter();
    let dataset = read_document(dict, input, options)?;
    let bytes = encode(dict, target, &dataset, options)?;
    info!(attributes = dataset.len(), bytes = bytes.len(), "Converted document");
    Ok(bytes)
}

/// Evaluate `pathway` (optionally gated by a conditional pathway and regex)
/// and flatten the result. `None` when nothing matched.
pub fn run_query(
    dict: &Dictionary,
    dataset: &Dataset,
    pathway: &str,
    conditional: Option<(&str, &str)>,
) -> Result<Option<String>> {
    let mut parsed = Pathway::parse(dict, pathway).with_context(|| format!("parse pathway '{pathway}'"))?;
    if let Some((relative, pattern)) = conditional {
        let conditional = Conditional::parse(dict, relative, pattern)
            .with_context(|| format!("parse conditional '{relative}'"))?;
        parsed = parsed.with_conditional(conditional);
    }
    let value = parsed.evaluate(dataset)?;
    Ok(flatten_with(dict, &value))
}

/// One line of `dtt type` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRow {
    pub name: String,
    pub tag: String,
    pub vr: String,
    pub vm: String,
    pub natural: String,
    pub nullable: Option<bool>,
}

/// Natural types of dictionary attributes.
pub fn type_rows(dict: &Dictionary, keywords: &[String]) -> Result<Vec<TypeRow>> {
    keywords
        .iter()
        .map(|keyword| {
            let tag = dict.resolve_token(keyword)?;
            let entry = dict.by_tag(&tag);
            let natural = natural_type_for_tag(dict, &tag)?;
            Ok(TypeRow {
                name: entry.keyword.clone(),
                tag: entry.pattern.to_string(),
                vr: entry
                    .vrs
                    .iter()
                    .map(|vr| vr.code())
                    .collect::<Vec<_>>()
                    .join(" or "),
                vm: entry.vm.to_string(),
                natural: natural.to_string(),
                nullable: None,
            })
        })
        .collect()
}

/// Typed columns of a JSON table template.
pub fn template_rows(dict: &Dictionary, template_json: &str) -> Result<Vec<TypeRow>> {
    let template: TableTemplate = serde_json::from_str(template_json).context("parse table template")?;
    let requests = template.column_requests(dict)?;
    Ok(requests
        .into_iter()
        .map(|request| {
            let entry = dict
                .resolve_token(&request.name)
                .ok()
                .map(|tag| dict.by_tag(&tag));
            TypeRow {
                tag: entry.map(|e| e.pattern.to_string()).unwrap_or_default(),
                vr: entry
                    .map(|e| e.vrs.iter().map(|vr| vr.code()).collect::<Vec<_>>().join(" or "))
                    .unwrap_or_default(),
                vm: entry.map(|e| e.vm.to_string()).unwrap_or_default(),
                natural: request.descriptor.to_string(),
                nullable: Some(request.nullable),
                name: request.name,
            }
        })
        .collect())
}

/// Render type rows as a table.
pub fn type_table(rows: &[TypeRow]) -> Table {
    let mut table = Table::new();
    let with_nulls = rows.iter().any(|row| row.nullable.is_some());
    let mut header = vec!["Name", "Tag", "VR", "VM", "Type"];
    if with_nulls {
        header.push("Nullable");
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for row in rows {
        let mut cells = vec![
            row.name.clone(),
            row.tag.clone(),
            row.vr.clone(),
            row.vm.clone(),
            row.natural.clone(),
        ];
        if with_nulls {
            cells.push(match row.nullable {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => String::new(),
            });
        }
        table.add_row(cells);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}
