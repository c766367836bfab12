//! Reading export files back as records.

use crate::domain::model::Record;
use crate::utils::error::{KitError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Keys PocketBase manages itself; they are stripped before a record is
/// written to the target instance.
pub const SYSTEM_KEYS: [&str; 9] = [
    "id",
    "created",
    "updated",
    "collectionId",
    "collectionName",
    "expand",
    "@collectionId",
    "@collectionName",
    "@expand",
];

pub const MANIFEST_STEM: &str = "manifest";

pub fn clean_record(mut record: Record) -> Record {
    for key in SYSTEM_KEYS {
        record.remove(key);
    }
    record
}

fn is_ndjson(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ndjson"))
}

pub fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("ndjson"))
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Target collection of a file: its declared `collection`, else the first
/// record's collection name, else the file stem.
pub fn infer_collection(path: &Path, declared: Option<&str>, first: Option<&Record>) -> String {
    if let Some(name) = declared.filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    let from_record = first.and_then(|record| {
        ["@collectionName", "collectionName"]
            .iter()
            .find_map(|key| record.get(*key).and_then(|v| v.as_str()))
            .filter(|name| !name.is_empty())
    });

    match from_record {
        Some(name) => name.to_string(),
        None => file_stem(path),
    }
}

/// The file itself, or the `.json` / `.ndjson` files of a directory sorted by
/// name.
pub async fn discover_files(input: &Path) -> Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(input).await.map_err(|_| KitError::ValidationError {
        message: format!("Input path {} does not exist", input.display()),
    })?;

    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(input).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_data_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(KitError::ValidationError {
            message: format!("No data files found in {}", input.display()),
        });
    }
    Ok(files)
}

enum SourceReader {
    Buffered(std::vec::IntoIter<Record>),
    Lines {
        lines: Lines<BufReader<File>>,
        line_no: usize,
    },
}

/// Records of one export file. JSON files are loaded whole; NDJSON files
/// are streamed line by line.
pub struct RecordSource {
    path: PathBuf,
    declared_collection: Option<String>,
    reader: SourceReader,
    peeked: Option<Record>,
}

impl RecordSource {
    pub async fn open(path: &Path) -> Result<Self> {
        let (declared_collection, reader) = if is_ndjson(path) {
            let file = File::open(path).await?;
            let reader = SourceReader::Lines {
                lines: BufReader::new(file).lines(),
                line_no: 0,
            };
            (None, reader)
        } else {
            let bytes = tokio::fs::read(path).await?;
            let payload: Value = serde_json::from_slice(&bytes)?;
            let (collection, items) = split_payload(path, payload)?;
            (collection, SourceReader::Buffered(items.into_iter()))
        };

        Ok(Self {
            path: path.to_path_buf(),
            declared_collection,
            reader,
            peeked: None,
        })
    }

    pub fn declared_collection(&self) -> Option<&str> {
        self.declared_collection.as_deref()
    }

    pub async fn peek(&mut self) -> Result<Option<&Record>> {
        if self.peeked.is_none() {
            self.peeked = self.read_next().await?;
        }
        Ok(self.peeked.as_ref())
    }

    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        if let Some(record) = self.peeked.take() {
            return Ok(Some(record));
        }
        self.read_next().await
    }

    /// Up to `size` records; empty once the file is exhausted.
    pub async fn next_batch(&mut self, size: usize) -> Result<Vec<Record>> {
        let size = size.max(1);
        let mut batch = Vec::with_capacity(size);
        while batch.len() < size {
            match self.next_record().await? {
                Some(record) => batch.push(record),
                None => break,
            }
        }
        Ok(batch)
    }

    async fn read_next(&mut self) -> Result<Option<Record>> {
        match &mut self.reader {
            SourceReader::Buffered(items) => Ok(items.next()),
            SourceReader::Lines { lines, line_no } => loop {
                let Some(line) = lines.next_line().await? else {
                    return Ok(None);
                };
                *line_no += 1;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let value: Value =
                    serde_json::from_str(line).map_err(|e| KitError::ProcessingError {
                        message: format!(
                            "Invalid JSON on line {} of {}: {}",
                            line_no,
                            self.path.display(),
                            e
                        ),
                    })?;
                return match value {
                    Value::Object(record) => Ok(Some(record)),
                    _ => Err(KitError::ProcessingError {
                        message: format!(
                            "Line {} of {} is not a JSON object",
                            line_no,
                            self.path.display()
                        ),
                    }),
                };
            },
        }
    }
}

fn split_payload(path: &Path, payload: Value) -> Result<(Option<String>, Vec<Record>)> {
    let (collection, items) = match payload {
        Value::Object(mut document) => {
            let collection = document
                .get("collection")
                .and_then(|c| c.as_str())
                .map(str::to_string);
            let items = match document.remove("items") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(KitError::ProcessingError {
                        message: format!("'items' in {} is not an array", path.display()),
                    })
                }
            };
            (collection, items)
        }
        Value::Array(items) => (None, items),
        _ => {
            return Err(KitError::ProcessingError {
                message: format!("Unsupported JSON structure in {}", path.display()),
            })
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(KitError::ProcessingError {
                message: format!(
                    "Item {} in {} is not a JSON object",
                    index,
                    path.display()
                ),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((collection, records))
}
