use std::path::Path;

use textplace::{ExtractOptions, TextPlacementReader};

/// Open and extract a PDF file, printing the failure to stderr.
///
/// Every failure (missing file, unreadable or encrypted PDF) is reported as
/// `failed to extract text from PDF: <description>` and maps to exit code 1.
pub fn open_reader(file: &Path, options: ExtractOptions) -> Result<TextPlacementReader, i32> {
    TextPlacementReader::open_with_options(file, options).map_err(|e| {
        eprintln!("Error: failed to extract text from PDF: {e}");
        1
    })
}

/// Print a JSON value on one line, or pretty-printed.
pub fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), i32> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {e}");
            Err(1)
        }
    }
}

/// Replace tabs and newlines so a value fits in one tab-separated column.
pub fn tsv_field(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_field_flattens_separators() {
        assert_eq!(tsv_field("a\tb\nc"), "a b c");
        assert_eq!(tsv_field("plain"), "plain");
    }

    #[test]
    fn missing_file_maps_to_exit_code_one() {
        let result = open_reader(Path::new("/nonexistent/file.pdf"), ExtractOptions::default());
        assert_eq!(result.err(), Some(1));
    }
}
