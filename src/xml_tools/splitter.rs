use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::XmlToolError;

use super::io_error;

const START_TAG: &str = "<data>";
const END_TAG: &str = "</data>";

/// Every `<data>...</data>` section of `content`, in document order.
pub fn data_sections(content: &str) -> Result<Vec<&str>, XmlToolError> {
    let mut sections = Vec::new();
    let mut from = 0;
    while let Some(offset) = content[from..].find(START_TAG) {
        let start = from + offset;
        let end = content[start..]
            .find(END_TAG)
            .map(|i| start + i + END_TAG.len())
            .ok_or(XmlToolError::UnterminatedSection(start))?;
        sections.push(&content[start..end]);
        from = end;
    }
    Ok(sections)
}

/// Splits `input` into `data_1.xml`, `data_2.xml`, ... under `output_dir`.
///
/// The first line of the input must be the XML declaration and the second the
/// root element's opening tag; both are repeated in every output file.
pub fn split_by_data(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, XmlToolError> {
    let content = fs::read_to_string(input).map_err(io_error(input))?;
    let mut lines = content.lines();
    let declaration = lines.next().map(str::trim).unwrap_or_default();
    let root_open = lines
        .next()
        .map(str::trim)
        .filter(|l| l.starts_with('<') && l.len() > 1)
        .ok_or(XmlToolError::MissingRoot)?;
    let root_tag = root_open[1..]
        .split([' ', '>'])
        .next()
        .filter(|t| !t.is_empty())
        .ok_or(XmlToolError::MissingRoot)?;

    let sections = data_sections(&content)?;
    fs::create_dir_all(output_dir).map_err(io_error(output_dir))?;

    let mut written = Vec::with_capacity(sections.len());
    for (i, section) in sections.iter().enumerate() {
        let path = output_dir.join(format!("data_{}.xml", i + 1));
        let body = format!("{declaration}\n{root_open}\n{section}\n</{root_tag}>");
        fs::write(&path, body).map_err(io_error(&path))?;
        log::info!("created {}", path.display());
        written.push(path);
    }
    Ok(written)
}
