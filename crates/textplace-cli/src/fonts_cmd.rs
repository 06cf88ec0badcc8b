use std::path::Path;

use textplace::{ExtractOptions, FontDescription, TextPlacementReader};

use crate::cli::OutputFormat;
use crate::shared::{open_reader, print_json, tsv_field};

pub fn run(file: &Path, format: &OutputFormat) -> Result<(), i32> {
    let reader = open_reader(file, ExtractOptions::default())?;
    match format {
        OutputFormat::Text => {
            write_text(&reader);
            Ok(())
        }
        OutputFormat::Json => {
            let fonts: Vec<&FontDescription> = reader.fonts().values().collect();
            print_json(&serde_json::json!(fonts), false)
        }
    }
}

fn write_text(reader: &TextPlacementReader) {
    println!("font_id\tfont_name\tfamily_name\tweight\tascent\tdescent\tspace_width");
    for font in reader.fonts().values() {
        println!(
            "{}\t{}\t{}\t{}\t{:.0}\t{:.0}\t{:.0}",
            font.font_id,
            tsv_field(&font.font_name),
            tsv_field(&font.family_name),
            font.weight,
            font.ascent,
            font.descent,
            font.space_width,
        );
    }
}
