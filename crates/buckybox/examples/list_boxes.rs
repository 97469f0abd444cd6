//! List the boxes of a webstore
//!
//! ```sh
//! BUCKYBOX_API_KEY=... BUCKYBOX_API_SECRET=... cargo run --example list_boxes
//! ```

use buckybox::{Client, ClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::from_config(ClientConfig::from_env()?)?;

    let webstore = client.webstore().await?;
    println!("{} ({})", webstore.get_str("name")?, client.environment());

    for box_ in client.boxes().await? {
        println!("  #{} {} - {}", box_.get_i64("id")?, box_.get_str("name")?, box_.get_money("price")?);
    }

    // Served from the cache: no second request within 60 seconds.
    let again = client.boxes().await?;
    println!("{} boxes (cached)", again.len());

    Ok(())
}
