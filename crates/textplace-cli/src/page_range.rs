/// Parse a page range string into `(start, end)` for
/// [`TextPlacementReader::pages`](textplace::TextPlacementReader::pages).
///
/// Pages are 0-based and the end is exclusive, matching the library:
/// `"2..5"` is pages 2, 3 and 4, `"3.."` runs to the last page, and a single
/// number `"4"` selects just that page.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<(usize, Option<usize>), String> {
    let input = input.trim();
    let (start, end) = match input.split_once("..") {
        Some((start, end)) => {
            let start = parse_page(start)?;
            let end = match end.trim() {
                "" => None,
                end => Some(parse_page(end)?),
            };
            (start, end)
        }
        None => {
            let page = parse_page(input)?;
            (page, Some(page + 1))
        }
    };

    if start >= page_count {
        return Err(format!(
            "page {start} is out of range (document has {page_count} pages, numbered from 0)"
        ));
    }
    if let Some(end) = end {
        if end <= start {
            return Err(format!("empty page range: {input}"));
        }
    }
    Ok((start, end))
}

fn parse_page(text: &str) -> Result<usize, String> {
    let text = text.trim();
    text.parse()
        .map_err(|_| format!("invalid page number: '{text}'"))
}
