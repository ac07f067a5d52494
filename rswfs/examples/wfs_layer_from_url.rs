use anyhow::Result;
use rswfs::{WfsConfig, WfsLayer};

/// Example: Loading the first layer of a WFS server as a table
///
/// Usage: cargo run --example wfs_layer_from_url -- URL [OUTPUT_DIR]
/// Settings come from RSWFS_* environment variables (RSWFS_AXIS_POLICY, RSWFS_TYPE_NAME, ...)
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        anyhow::bail!("usage: wfs_layer_from_url URL [OUTPUT_DIR]");
    };
    let output = args.next().unwrap_or_else(|| "./output".to_string());

    println!("=== Example: Loading a WFS layer ===\n");

    let config = WfsConfig::default().apply_env()?;
    println!("Endpoint: {}", url);
    println!("  - Version requested: {}", config.version);
    println!("  - Output format: {}", config.output_format);
    println!("  - Axis policy: {:?}\n", config.axis_policy);

    let layer = WfsLayer::with_config(&url, Some(output), config)?.run()?;
    let table = layer.to_table()?;

    println!("Layer {} processed successfully!", layer.type_name().unwrap_or("?"));
    println!("  - Number of features: {}", table.len());
    println!("  - Columns: {:?}", table.columns());
    if let Some(bounds) = table.bounds() {
        println!(
            "  - Extent: ({}, {}) to ({}, {})",
            bounds.min().x,
            bounds.min().y,
            bounds.max().x,
            bounds.max().y
        );
    }
    for (index, row) in table.rows().iter().take(5).enumerate() {
        println!("  - Row {}: {:?} first coord {:?}", index, row.properties, table.first_coord(index));
    }

    println!("\nSaving to GeoJSON and CSV...");
    let geojson_path = layer.to_geojson(None)?;
    let csv_path = layer.to_csv(None)?;

    println!("\nProcessing complete!");
    println!("  - GeoJSON: {:?}", geojson_path);
    println!("  - CSV: {:?}", csv_path);

    Ok(())
}
