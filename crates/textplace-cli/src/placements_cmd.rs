use std::path::Path;

use textplace::{ExtractOptions, TextPlacement, TextPlacementReader, UnicodeNorm};

use crate::cli::PlacementFormat;
use crate::page_range::parse_page_range;
use crate::shared::{open_reader, print_json, tsv_field};

pub struct PlacementsArgs<'a> {
    pub file: &'a Path,
    pub pages: Option<&'a str>,
    pub format: &'a PlacementFormat,
    pub unicode_norm: Option<UnicodeNorm>,
    pub max_depth: usize,
    pub warnings: bool,
}

pub fn run(args: PlacementsArgs<'_>) -> Result<(), i32> {
    let options = ExtractOptions {
        max_recursion_depth: args.max_depth,
        unicode_norm: args.unicode_norm.unwrap_or_default(),
        ..ExtractOptions::default()
    };
    let reader = open_reader(args.file, options)?;
    let placements = select(&reader, args.pages)?;

    if args.warnings {
        for warning in reader.warnings() {
            eprintln!("warning: {warning}");
        }
    }

    match args.format {
        PlacementFormat::Text => {
            write_text(placements);
            Ok(())
        }
        PlacementFormat::Json => print_json(&serde_json::json!(placements), false),
        PlacementFormat::Jsonl => {
            for placement in placements {
                print_json(&serde_json::json!(placement), false)?;
            }
            Ok(())
        }
    }
}

fn select<'a>(reader: &'a TextPlacementReader, pages: Option<&str>) -> Result<&'a [TextPlacement], i32> {
    match pages {
        Some(range) => {
            let (start, end) = parse_page_range(range, reader.page_count()).map_err(|e| {
                eprintln!("Error: {e}");
                1
            })?;
            Ok(reader.pages(start, end).as_slice())
        }
        None => Ok(reader.placements()),
    }
}

fn write_text(placements: &[TextPlacement]) {
    println!("page\tfont_id\tx\ty\twidth\theight\ttext");
    for placement in placements {
        println!(
            "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}",
            placement.page,
            placement.font_id,
            placement.bbox.x,
            placement.bbox.y,
            placement.bbox.width,
            placement.bbox.height,
            tsv_field(&placement.text),
        );
    }
}
