use chrono::NaiveDate;
use oisst::{Extent, Oisst, QuerySpec};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=info to watch batches download (or hit the cache).
    env_logger::init();

    let client = Oisst::new().await?;

    // Agulhas current region off South Africa, full OISST record.
    let spec = QuerySpec::builder()
        .variable("sst")
        .latitude(Extent(-40.0, -35.0))
        .longitude(Extent(15.0, 21.0))
        .start(NaiveDate::from_ymd_opt(1982, 1, 1).unwrap())
        .end(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
        .build()?;

    let table = client.fetch_all().spec(&spec).call().await?;

    let df = table.collect()?;
    println!("Fetched {} records:", df.height());
    println!("{}", df.head(Some(5)));

    let destination = Path::new("sst_agulhas.parquet");
    table.save_parquet(destination).await?;
    println!("Saved to {}", destination.display());

    Ok(())
}
