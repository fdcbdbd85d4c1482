use log_follower::{FollowConfig, Follower, follow_lines};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Log Follower Comprehensive Example ===\n");

    let temp_dir = std::env::temp_dir().join("log-follower-demo");
    std::fs::create_dir_all(&temp_dir)?;
    let path = temp_dir.join("demo.log");
    std::fs::write(&path, "2023-01-01 10:00:00 INFO Starting application\n")?;

    // Example 1: Stream of lines
    println!("1. Streaming lines appended after start:");
    stream_usage(&path).await?;

    println!("\n{}\n", "=".repeat(50));

    // Example 2: Callback with resumable offset
    println!("2. Callback follower that remembers where it stopped:");
    let offset = callback_usage(&path).await?;

    println!("\n{}\n", "=".repeat(50));

    // Example 3: Resume from the saved offset
    println!("3. Resuming from offset {}:", offset);
    resume_usage(&path, offset).await?;

    Ok(())
}

fn append(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

async fn stream_usage(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = follow_lines(path, FollowConfig::default()).await?;

    append(path, "2023-01-01 10:00:01 INFO Loading configuration\n")?;
    // Half a line first: nothing is emitted until the newline arrives
    append(path, "2023-01-01 10:00:02 ERROR Failed to process")?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    append(path, " request: timeout\n")?;

    for _ in 0..2 {
        match tokio::time::timeout(Duration::from_secs(1), stream.next()).await {
            Ok(Some(Ok(line))) => print!("  📄 {}", line),
            Ok(Some(Err(e))) => eprintln!("  ❌ Error: {}", e),
            Ok(None) => println!("  ℹ️  Stream ended"),
            Err(_) => println!("  ⏰ Timeout - no new content in file"),
        }
    }

    Ok(())
}

async fn callback_usage(path: &Path) -> Result<u64, Box<dyn std::error::Error>> {
    let mut follower = Follower::open(path, 0, FollowConfig::default()).await?;

    let counts = Arc::new(Mutex::new(HashMap::<&str, u32>::new()));
    let sink = Arc::clone(&counts);
    let handle = follower.handle();
    follower.register_callback(move |line: &str| -> Result<(), std::io::Error> {
        let level = ["INFO", "WARN", "ERROR", "DEBUG"]
            .into_iter()
            .find(|level| line.contains(level))
            .unwrap_or("OTHER");
        let mut counts = sink.lock().unwrap();
        *counts.entry(level).or_insert(0) += 1;
        if counts.values().sum::<u32>() >= 3 {
            handle.stop();
        }
        Ok(())
    });

    append(path, "2023-01-01 10:00:03 DEBUG Cache hit for key=user_data_123\n")?;
    append(path, "2023-01-01 10:00:04 WARN High memory usage detected: 85%\n")?;
    append(path, "2023-01-01 10:00:05 INFO Request processed successfully\n")?;

    follower.follow().await?;

    println!("  📈 Log level statistics:");
    for (level, count) in counts.lock().unwrap().iter() {
        println!("    {}: {} lines", level, count);
    }

    Ok(follower.offset())
}

async fn resume_usage(path: &Path, offset: u64) -> Result<(), Box<dyn std::error::Error>> {
    append(path, "2023-01-01 10:00:06 INFO Written while nobody was following\n")?;

    let mut follower = Follower::open(path, offset, FollowConfig::default()).await?;
    let handle = follower.handle();
    follower.register_callback(move |line: &str| -> Result<(), std::io::Error> {
        print!("  🔁 {}", line);
        handle.stop();
        Ok(())
    });

    tokio::time::timeout(Duration::from_secs(1), follower.follow()).await??;
    Ok(())
}
