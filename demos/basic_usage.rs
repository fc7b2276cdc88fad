//! Basic usage example for the secure file client
//!
//! This example demonstrates:
//! - Uploading a local file
//! - Listing secure files under a root path
//! - Downloading a secure file under its server-side name
//!
//! Run with: CERBERUS_URL=... CERBERUS_TOKEN=... cargo run --example basic_usage

use securefile_client::{Config, SecureFileClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let endpoint =
        std::env::var("CERBERUS_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let mut config = Config::new(endpoint);
    if let Ok(token) = std::env::var("CERBERUS_TOKEN") {
        config = config.with_token(token);
    }

    let client = SecureFileClient::new(config)?;

    // Upload
    let workdir = std::env::temp_dir().join("securefile-demo");
    std::fs::create_dir_all(&workdir)?;
    let local = workdir.join("greeting.txt");
    std::fs::write(&local, b"Hello from the secure file demo")?;

    println!("Uploading {} ...", local.display());
    client.put("demo/greeting.txt", &local).await?;

    // List
    println!("Listing demo/ ...");
    let files = client.list("demo").await?;
    for file in files.iter() {
        println!(
            "  {} ({} bytes, updated {} by {})",
            file.path, file.size_in_bytes, file.last_updated_ts, file.last_updated_by
        );
    }
    if files.has_next {
        println!("  ... more results from offset {:?}", files.next_offset);
    }

    // Download
    let downloads = workdir.join("downloads");
    std::fs::create_dir_all(&downloads)?;
    let saved = client.get("demo/greeting.txt", &downloads).await?;
    println!("Downloaded to {}", saved.display());
    println!("Content: {}", std::fs::read_to_string(&saved)?);

    Ok(())
}
