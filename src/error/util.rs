//! Utility functions for error handling
//!
//! File-system helpers that attach the offending path and the reason a file
//! was needed to any failure.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(
            Error::io_error(format!("File not found, needed for: {purpose}")).with_path(path),
        );
    }

    if !path.is_file() {
        return Err(
            Error::io_error(format!("Path is not a file, expected a file for: {purpose}"))
                .with_path(path),
        );
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            _ => format!("Failed to open file for: {purpose}"),
        };
        Error::io_error_with_source(context, e).with_path(path)
    })
}

/// Create a file for writing, attaching the path to any failure
pub fn safe_create_file(path: &Path, purpose: &str) -> Result<fs::File> {
    fs::File::create(path).map_err(|e| {
        Error::io_error_with_source(format!("Failed to create file for: {purpose}"), e)
            .with_path(path)
    })
}

/// Make sure a directory exists, creating it (and its parents) when missing
pub fn ensure_directory(path: &Path, purpose: &str) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::io_error(format!(
                "Path is not a directory, expected a directory for: {purpose}"
            ))
            .with_path(path));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check directory permissions".to_string()
            }
            _ => format!("Failed to create directory for: {purpose}"),
        };
        Error::io_error_with_source(context, e).with_path(path)
    })
}
