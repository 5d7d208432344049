//! Offline batch utilities for the news archive dumps: splitting one large
//! export into per-record files and converting those files to JSON.

use std::path::Path;

use crate::errors::XmlToolError;

pub mod converter;
pub mod splitter;

pub use converter::{ConversionSummary, convert_dir, convert_file, repair_xml, xml_to_json};
pub use splitter::{data_sections, split_by_data};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> XmlToolError + '_ {
    move |source| XmlToolError::Io {
        path: path.display().to_string(),
        source,
    }
}
