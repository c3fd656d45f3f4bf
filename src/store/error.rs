// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use crate::table::TableError;
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Table error: {0}")]
    TableError(#[from] TableError),

    #[error("Unsupported file format: '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),
}

/// Result type for persistence operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let store_error: StoreError = io_error.into();

        match store_error {
            StoreError::IoError(_) => {
                assert!(store_error.to_string().contains("IO error"));
            }
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_unsupported_format_message() {
        let error = StoreError::UnsupportedFormat("data.parquet".to_string());
        assert_eq!(
            error.to_string(),
            "Unsupported file format: 'data.parquet' (expected .csv or .json)"
        );
    }

    #[test]
    fn test_table_error_conversion() {
        let table_error = TableError::UnsupportedInput("got a string".to_string());
        let store_error: StoreError = table_error.into();
        assert!(store_error.to_string().contains("Table error"));
    }

    #[test]
    fn test_error_debug() {
        let error = StoreError::UnsupportedFormat("x".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("UnsupportedFormat"));
    }
}
