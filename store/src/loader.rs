//! Loading schema JSON from disk.
//!
//! Schemas are stored either one per `*.json` file or together in a
//! [`SchemaBundle`] file. Both the in-memory store and the CLI read them
//! through these helpers.
//!
//! ```no_run
//! use graveyard_schema_store::loader;
//!
//! let schemas = loader::load_dir("schemas/").unwrap();
//! let bundle = loader::load_bundle("schemas.json").unwrap();
//! println!("{} + {} schemas", schemas.len(), bundle.schema_count());
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use graveyard_schema_core::{Schema, SchemaBundle};
use tracing::debug;

use crate::error::Result;

/// Contents of a schema JSON file.
#[derive(Debug, Clone)]
pub enum SchemaFile {
    /// A single schema.
    Schema(Schema),
    /// A bundle of schemas.
    Bundle(SchemaBundle),
}

impl SchemaFile {
    /// Returns the schemas contained in the file.
    pub fn into_schemas(self) -> Vec<Schema> {
        match self {
            Self::Schema(schema) => vec![schema],
            Self::Bundle(bundle) => bundle.schemas,
        }
    }
}

/// Reads one JSON file, detecting whether it holds a schema or a bundle.
///
/// A top-level `schemas` key marks a bundle.
///
/// # Errors
///
/// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be
/// read, or [`JsonError`](crate::StoreError::JsonError) if it is not a schema
/// or bundle.
pub fn load_file(path: impl AsRef<Path>) -> Result<SchemaFile> {
    let file = std::fs::File::open(path.as_ref())?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    if value.get("schemas").is_some() {
        Ok(SchemaFile::Bundle(serde_json::from_value(value)?))
    } else {
        Ok(SchemaFile::Schema(serde_json::from_value(value)?))
    }
}

/// Reads a [`SchemaBundle`] file.
///
/// # Errors
///
/// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be
/// read, or [`JsonError`](crate::StoreError::JsonError) if parsing fails.
pub fn load_bundle(path: impl AsRef<Path>) -> Result<SchemaBundle> {
    let file = std::fs::File::open(path.as_ref())?;
    let bundle = serde_json::from_reader(BufReader::new(file))?;
    Ok(bundle)
}

/// Reads every `*.json` file in a directory, in file name order.
///
/// Bundle files contribute all of their schemas.
///
/// # Errors
///
/// Returns the first I/O or parse error encountered.
pub fn load_dir(path: impl AsRef<Path>) -> Result<Vec<Schema>> {
    let mut schemas = Vec::new();
    for file_path in json_files(path.as_ref())? {
        debug!(path = %file_path.display(), "loading schema file");
        schemas.extend(load_file(&file_path)?.into_schemas());
    }
    Ok(schemas)
}

/// Expands files and directories into the list of schema JSON files.
///
/// Files are taken as given; directories contribute their `*.json` entries
/// sorted by name. Directories are not searched recursively.
///
/// # Errors
///
/// Returns [`IoError`](crate::StoreError::IoError) if a directory cannot be
/// read.
pub fn collect_json_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(json_files(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let file_path = entry?.path();
        if file_path.is_file() && file_path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(file_path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use graveyard_schema_core::{Field, FieldType, PrimitiveType};

    use super::*;
    use crate::StoreError;

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
        let mut f = std::fs::File::create(path).unwrap();
        serde_json::to_writer_pretty(&mut f, value).unwrap();
        f.flush().unwrap();
    }

    fn schema(name: &str) -> Schema {
        Schema::new(name).with_field("id", Field::new(FieldType::Primitive(PrimitiveType::Number)))
    }

    #[test]
    fn test_load_file_detects_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        let mut bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
        bundle.schemas.push(schema("A"));
        bundle.schemas.push(schema("B"));
        write_json(&path, &bundle);

        match load_file(&path).unwrap() {
            SchemaFile::Bundle(loaded) => assert_eq!(loaded.schema_count(), 2),
            other => panic!("expected bundle, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dir_reads_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        write_json(&dir.path().join("b.json"), &schema("Beta"));
        write_json(&dir.path().join("a.json"), &schema("Alpha"));
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let names: Vec<String> = load_dir(dir.path())
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_load_file_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_file(&path), Err(StoreError::JsonError(_))));
    }

    #[test]
    fn test_collect_json_files_mixes_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        write_json(&nested.join("x.json"), &schema("X"));
        let single = dir.path().join("single.json");
        write_json(&single, &schema("Single"));

        let files = collect_json_files(&[single.clone(), nested.clone()]).unwrap();
        assert_eq!(files, vec![single, nested.join("x.json")]);
    }
}
