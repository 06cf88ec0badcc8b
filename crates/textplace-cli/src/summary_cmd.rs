use std::path::Path;

use textplace::ExtractOptions;

use crate::shared::{open_reader, print_json};

pub fn run(file: &Path, max_depth: usize) -> Result<(), i32> {
    let options = ExtractOptions {
        max_recursion_depth: max_depth,
        ..ExtractOptions::default()
    };
    let reader = open_reader(file, options)?;
    print_json(&reader.summary_json(), true)
}
