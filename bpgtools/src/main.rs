use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod gateway;
mod verify;

use crate::{
    gateway::{print_agreement, print_payment, print_token, print_transaction},
    verify::verify_notification_file,
};

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Utilities for the bKash payment gateway")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the signature of an instant payment notification saved to a file. The BPG_IPN_* environment variables
    /// control which certificate hosts are trusted.
    #[clap(name = "verify")]
    Verify {
        /// Path to the raw notification body
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },
    /// Request a new access token from the bKash gateway
    #[clap(name = "token")]
    AccessToken,
    /// Query the status of a payment
    #[clap(name = "payment")]
    Payment {
        /// The paymentID returned when the payment was created
        #[arg(short = 'i', long = "id")]
        id: String,
    },
    /// Query the status of an agreement
    #[clap(name = "agreement")]
    Agreement {
        /// The agreementID returned when the agreement was executed
        #[arg(short = 'i', long = "id")]
        id: String,
    },
    /// Look up a completed transaction by its trxID
    #[clap(name = "search")]
    Search {
        #[arg(short = 't', long = "trx")]
        trx_id: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let result = match cli.command {
        Command::Verify { file } => verify_notification_file(&file).await,
        Command::AccessToken => print_token().await,
        Command::Payment { id } => print_payment(id).await,
        Command::Agreement { id } => print_agreement(id).await,
        Command::Search { trx_id } => print_transaction(trx_id).await,
    };
    if let Err(e) = result {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
