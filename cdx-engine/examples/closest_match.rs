//! Closest-match lookup over an in-memory CDX source.
//!
//! Builds a small index from legacy CDX lines, then lists the captures of
//! one url ordered by distance to a target timestamp:
//!
//!     cargo run -p cdx-engine --example closest_match

use cdx_core::{CaptureTimestamp, CdxFormat, CdxRecord, FieldName};
use cdx_engine::ClosestIterator;
use cdx_index::{MemoryCdxSource, SearchKey};

const CDX_LINES: &[&str] = &[
    "com,example)/ 20160115083000 http://example.com/ text/html 200 \
     G7HRM7BGOKSKMSXZAHMUQTTV53QOFSMK - - 1043 333 crawl-a.warc.gz",
    "com,example)/ 20160301115500 http://example.com/ text/html 200 \
     G7HRM7BGOKSKMSXZAHMUQTTV53QOFSMK - - 1044 21042 crawl-b.warc.gz",
    "com,example)/ 20160301120200 http://example.com/ text/html 200 \
     G7HRM7BGOKSKMSXZAHMUQTTV53QOFSMK - - 1044 40123 crawl-b.warc.gz",
    "com,example)/ 20160520000000 http://example.com/ text/html 404 \
     LNAAN7BGOKSKMSXZAHMUQTTV53QOFAAA - - 488 977 crawl-c.warc.gz",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let format = CdxFormat::cdx11();
    let records = CDX_LINES
        .iter()
        .map(|line| CdxRecord::parse_line(line, &format))
        .collect::<Result<Vec<_>, _>>()?;
    let source = MemoryCdxSource::from_records(records);

    let target = CaptureTimestamp::parse("20160301120000")?;
    let mut iter = ClosestIterator::new(&source, &SearchKey::exact("com,example)/"), target)?;

    println!("captures of com,example)/ closest to {target}:");
    while let Some(record) = iter.take()? {
        let timestamp = record.get(&FieldName::timestamp()).unwrap_or("-");
        let filename = record.get(&FieldName::filename()).unwrap_or("-");
        println!("  {timestamp}  {filename}");
    }

    iter.close()?;
    Ok(())
}
