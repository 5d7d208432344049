use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::XmlToolError;

use super::io_error;

static AMPERSAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(amp;|lt;|gt;|quot;|apos;|#[0-9]+;|#x[0-9a-fA-F]+;)?")
        .unwrap_or_else(|e| panic!("invalid ampersand pattern: {e}"))
});

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Drops characters XML 1.0 forbids and escapes stray `&`.
pub fn repair_xml(content: &str) -> String {
    let cleaned: String = content.chars().filter(|c| is_xml_char(*c)).collect();
    AMPERSAND
        .replace_all(&cleaned, |caps: &Captures| match caps.get(1) {
            Some(_) => caps[0].to_string(),
            None => "&amp;".to_string(),
        })
        .into_owned()
}

struct Frame {
    tag: String,
    children: Map<String, Value>,
    has_children: bool,
    text: String,
}

impl Frame {
    fn new(tag: String) -> Frame {
        Frame {
            tag,
            children: Map::new(),
            has_children: false,
            text: String::new(),
        }
    }
}

fn parse_error(e: impl std::fmt::Display) -> XmlToolError {
    XmlToolError::Parse(e.to_string())
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, XmlToolError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(parse_error)
}

fn close(stack: &mut Vec<Frame>, root: &mut Option<(String, Value)>, frame: Frame) {
    match stack.last_mut() {
        Some(parent) => {
            let value = if frame.has_children {
                Value::Object(frame.children)
            } else {
                Value::String(frame.text.trim().to_string())
            };
            parent.has_children = true;
            parent.children.insert(frame.tag, value);
        }
        // the root always maps to an object, even when it has no children
        None => *root = Some((frame.tag, Value::Object(frame.children))),
    }
}

/// Parses a document into `{root_tag: {child_tag: ...}}`.
///
/// Elements with child elements become objects keyed by child tag (a repeated
/// tag keeps its last value); leaves become their trimmed text.
pub fn xml_to_json(xml: &str) -> Result<Value, XmlToolError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(e) => stack.push(Frame::new(tag_name(&e)?)),
            Event::Empty(e) => {
                let frame = Frame::new(tag_name(&e)?);
                close(&mut stack, &mut root, frame);
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| parse_error("unexpected closing tag"))?;
                close(&mut stack, &mut root, frame);
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&t.unescape().map_err(parse_error)?);
                }
            }
            Event::CData(c) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(parse_error("unexpected end of document"));
    }
    let (tag, body) = root.ok_or_else(|| parse_error("document has no root element"))?;
    let mut document = Map::new();
    document.insert(tag, body);
    Ok(Value::Object(document))
}

fn to_pretty_json(value: &Value) -> Result<Vec<u8>, XmlToolError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Repairs, parses and writes one file.
pub fn convert_file(xml_path: &Path, json_path: &Path) -> Result<(), XmlToolError> {
    let raw = fs::read_to_string(xml_path).map_err(io_error(xml_path))?;
    let content = raw.trim_start_matches('\u{feff}').trim();
    let value = xml_to_json(&repair_xml(content))?;
    fs::write(json_path, to_pretty_json(&value)?).map_err(io_error(json_path))?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct ConversionSummary {
    pub converted: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// Converts every `*.xml` file in `input_dir` to `<stem>.json` in `output_dir`.
/// A file that fails is recorded and skipped.
pub fn convert_dir(input_dir: &Path, output_dir: &Path) -> Result<ConversionSummary, XmlToolError> {
    fs::create_dir_all(output_dir).map_err(io_error(output_dir))?;

    let mut xml_files: Vec<PathBuf> = fs::read_dir(input_dir)
        .map_err(io_error(input_dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    xml_files.sort();

    if xml_files.is_empty() {
        log::warn!("no xml files found in {}", input_dir.display());
    }

    let mut summary = ConversionSummary::default();
    for xml_file in xml_files {
        let Some(stem) = xml_file.file_stem() else {
            continue;
        };
        let json_file = output_dir.join(format!("{}.json", stem.to_string_lossy()));
        match convert_file(&xml_file, &json_file) {
            Ok(()) => {
                log::info!("converted {}", xml_file.display());
                summary.converted += 1;
            }
            Err(e) => {
                log::error!("error converting {}: {:#}", xml_file.display(), e);
                summary.failed.push((xml_file, e.to_string()));
            }
        }
    }
    Ok(summary)
}
