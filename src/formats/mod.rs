//! Readers that turn a results file into [`ElectionResults`].

pub mod clarify;
pub mod json;

use crate::model::election::ElectionResults;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Name of the results document inside a Clarify `detail.zip`.
pub const DETAIL_XML: &str = "detail.xml";

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("Zip archive error: {0}")]
    Zip(#[from] ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("<{element}> is missing required attribute {attribute:?}")]
    MissingAttribute { element: String, attribute: String },
    #[error("<{element}> attribute {attribute:?} is not a count: {value:?}")]
    InvalidNumber {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("Not a Clarify results document: {0}")]
    Malformed(String),
    #[error("Archive has no {0} member")]
    MissingMember(String),
    #[error("Unsupported results file {0} (expected .xml, .zip or .json)")]
    UnsupportedFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, FormatError>;

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| FormatError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a results file, choosing the reader by file extension.
pub fn read_election(path: &Path) -> Result<ElectionResults> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("xml") => clarify::read_detail_xml(BufReader::new(open(path)?)),
        Some("zip") => {
            let mut archive = ZipArchive::new(open(path)?)?;
            let member = match archive.by_name(DETAIL_XML) {
                Ok(member) => member,
                Err(ZipError::FileNotFound) => {
                    return Err(FormatError::MissingMember(DETAIL_XML.to_string()))
                }
                Err(e) => return Err(e.into()),
            };
            clarify::read_detail_xml(BufReader::new(member))
        }
        Some("json") => json::read_snapshot(BufReader::new(open(path)?)),
        _ => Err(FormatError::UnsupportedFormat(path.to_path_buf())),
    }
}
