use log_follower::{FollowConfig, follow_lines};
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Follow a log file and print each new line as it is completed
    let mut stream = follow_lines("app.log", FollowConfig::default()).await?;

    println!("Following app.log - append lines to see them here...");

    let mut count = 0;
    while let Some(line_result) = stream.next().await {
        match line_result {
            Ok(line) => print!("[{}] {}", count + 1, line),
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }

        count += 1;
        if count >= 10 {
            // Only show the first few lines for demo
            break;
        }
    }

    Ok(())
}
