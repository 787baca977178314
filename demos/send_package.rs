use std::io;

use smslink_bulk::{BulkPackage, Credentials, KnownMessageStatus};

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let connection_id = required_env("SMSLINK_CONNECTION_ID")?;
    let password = required_env("SMSLINK_PASSWORD")?;
    let receiver = required_env("SMSLINK_RECEIVER")?;
    let live = std::env::var("SMSLINK_LIVE").is_ok_and(|value| value == "1");

    let mut package = BulkPackage::new(Credentials::new(connection_id, password)?, !live);
    for id in 1..=3 {
        package.insert_message(id, receiver.as_str(), "numeric", format!("Test SMS {id}"), 0)?;
    }

    if !package.send().await {
        eprintln!(
            "Error transmitting package to SMSLink: {}",
            package.error_message()
        );
        return Ok(());
    }

    println!(
        "Remote Package ID: {}",
        package.remote_package_id().unwrap_or_default()
    );
    for message in package.remote_message_ids() {
        match message.message_status.known() {
            Some(KnownMessageStatus::Accepted) => println!(
                "Success for Local Message ID: {}, Remote Message ID: {}",
                message.local_message_id, message.remote_message_id
            ),
            Some(KnownMessageStatus::SenderFailed) => {
                println!("Error for Local Message ID: {} (Sender Failed)", message.local_message_id)
            }
            Some(KnownMessageStatus::IncorrectNumber) => println!(
                "Error for Local Message ID: {} (Incorrect Number)",
                message.local_message_id
            ),
            Some(KnownMessageStatus::InternalErrorOrBlacklisted) => println!(
                "Error for Local Message ID: {} (Internal Error or Number Blacklisted)",
                message.local_message_id
            ),
            Some(KnownMessageStatus::InsufficientCredit) => println!(
                "Error for Local Message ID: {} (Insufficient Credit)",
                message.local_message_id
            ),
            Some(_) | None => println!(
                "Unknown status {} for Local Message ID: {}",
                message.message_status.as_str(),
                message.local_message_id
            ),
        }
    }

    let counts = package.remote_message_ids().status_counts();
    println!(
        "success: {}, sender: {}, number: {}, internal: {}, credit: {}, total: {}",
        counts.success,
        counts.failed_sender,
        counts.failed_number,
        counts.failed_internal,
        counts.insufficient_credit,
        counts.total
    );

    Ok(())
}
