//! Inspect a BID archive: show the selected entry, how each header maps, and the first rows.
//! Usage: cargo run --bin inspect_bid_archive -- path/to/bid_2024.csv.zip

use std::path::Path;

use bid_roster::data::extract::{extract, DEFAULT_ENTRY_EXTENSION};
use bid_roster::data::normalize::{map_headers, normalize_header};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: inspect_bid_archive <path-to.csv.zip>")?;
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let table = extract(path, DEFAULT_ENTRY_EXTENSION)?;
    println!("Entry: {}", table.entry_name);
    println!("Size: {} rows x {} cols", table.rows.len(), table.headers.len());

    let mapping = map_headers(&table.headers);
    println!("\nHeaders:");
    for (i, header) in table.headers.iter().enumerate() {
        let target = match mapping.field_for(i) {
            Some(field) => field.as_str().to_string(),
            None => "(dropped)".to_string(),
        };
        println!("  {i}: {header:?} [{}] -> {target}", normalize_header(header));
    }

    println!("\nFirst 10 rows:");
    for (i, row) in table.rows.iter().take(10).enumerate() {
        println!("  {}: {}", i, row.join(" | "));
    }
    Ok(())
}
