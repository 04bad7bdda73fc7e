//! Basic TCP Client Example
//!
//! Connects to a PLC speaking the Upper Link protocol and exercises the
//! typed read/write operations.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example read_write -- 192.168.0.10:8501
//! ```
//!
//! Without an argument the example connects to 127.0.0.1:8501.

use std::time::Duration;

use voltage_upperlink::{
    CallbackLogger, ClientConfig, DeviceLimits, PlcValue, UpperLinkClient, UpperLinkResult,
    UpperLinkTcpClient, WordOrder,
};

#[tokio::main]
async fn main() -> UpperLinkResult<()> {
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8501".to_string());

    let config = ClientConfig::from_address(&address)?
        .with_timeout(Duration::from_secs(2))
        .with_word_order(WordOrder::LowWordFirst)
        .with_limits(DeviceLimits::conservative());
    let client = UpperLinkTcpClient::with_logging(config, Some(CallbackLogger::console())).await?;

    println!("Connected to {}", address);

    // =========================================================================
    // Words
    // =========================================================================

    match client.read_words("DM0", 10).await? {
        Some(words) => println!("DM0..DM9: {:?}", words),
        None => println!("DM0..DM9: no response"),
    }

    client.write_words("DM100", &[0x1234]).await?;
    client.write_words("DM200", &[1111, 2222, 3333]).await?;

    // =========================================================================
    // Typed values
    // =========================================================================

    client.write_i32("DM300", -100_000).await?;
    println!("DM300 (i32): {}", client.read_i32("DM300").await?);

    client.write_f32("DM310", 23.5).await?;
    println!("DM310 (f32): {}", client.read_f32("DM310").await?);

    client.write_string("DM320", "LINE-A").await?;
    println!("DM320 (text): {}", client.read_string("DM320", 6).await?);

    client.write_any("DM330.S", PlcValue::I16(-5)).await?;
    for address in ["DM330", "DM330.S", "DM330.H", "DM300.D"] {
        println!("{:>8} = {}", address, client.read_any(address).await?);
    }

    // =========================================================================
    // Batch read
    // =========================================================================

    let block = client.read_block("DM0", 250).await?;
    println!(
        "Read {} words in {} commands",
        block.len(),
        client.config().limits.read_request_count(250)
    );

    // =========================================================================
    // Statistics
    // =========================================================================

    let stats = client.get_stats();
    println!("Requests sent: {}", stats.requests_sent);
    println!("Responses received: {}", stats.responses_received);
    println!("Timeouts: {}", stats.timeouts);

    client.close().await?;
    println!("Connection closed");

    Ok(())
}
