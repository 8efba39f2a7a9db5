//! Scripted demonstration: Alice and Bob generate keypairs, run the hybrid
//! key exchange, and trade messages through a chosen delivery backend.
//! Everything printed under "transport sees" is what the store actually
//! persisted — ciphertext and routing metadata only, unless
//! `--reveal-plaintext` is passed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use sc_session::{ChatClient, OperationLog};
use sc_transport::{MessageStore, TransportConfig};

#[derive(Parser)]
#[command(name = "sealchat-demo")]
#[command(about = "End-to-end encrypted chat simulation between two parties", long_about = None)]
struct Cli {
    /// Delivery backend to run against.
    #[arg(long, value_enum, default_value = "memory")]
    backend: Backend,

    /// History file for the file backend.
    #[arg(long, default_value = "sealchat-messages.json")]
    store_path: PathBuf,

    /// DEMO ONLY: also persist plaintext alongside ciphertext so the stored
    /// records can be inspected. Defeats the encryption; never use outside
    /// demonstrations.
    #[arg(long)]
    reveal_plaintext: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Memory,
    File,
    Live,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.backend {
        Backend::Memory => TransportConfig::Memory,
        Backend::File => TransportConfig::File {
            path: cli.store_path.clone(),
        },
        Backend::Live => TransportConfig::Live,
    };
    tracing::info!(target: "sealchat_demo", event = "startup", backend = ?cli.backend);

    let store = config.build().await?;
    let log = Arc::new(OperationLog::new());

    let alice = Arc::new(
        ChatClient::new("Alice", store.clone(), log.clone())
            .with_reveal_plaintext(cli.reveal_plaintext),
    );
    let bob = Arc::new(
        ChatClient::new("Bob", store.clone(), log.clone())
            .with_reveal_plaintext(cli.reveal_plaintext),
    );

    alice.generate_keys()?;
    bob.generate_keys()?;
    alice.establish_session_with(&bob)?;

    // Bob listens before Alice sends, then replies.
    let bob_listener = {
        let bob = bob.clone();
        tokio::spawn(async move { bob.poll_once(Duration::from_secs(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    alice
        .send("Bob", "hello Bob, the transport only ever sees ciphertext")
        .await?;
    let received = bob_listener.await??;
    if let Some(message) = received {
        println!("Bob received: {}", message.display_text);
    }

    let alice_listener = {
        let alice = alice.clone();
        tokio::spawn(async move { alice.poll_once(Duration::from_secs(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    bob.send("Alice", "hi Alice, decrypted on my side only")
        .await?;
    if let Some(message) = alice_listener.await?? {
        println!("Alice received: {}", message.display_text);
    }

    println!("\n=== What the transport sees ===");
    for stored in store.list_all().await? {
        println!(
            "#{} {} -> {} cipherText={}... iv={} plainText={:?}",
            stored.id,
            stored.sender,
            stored.recipient,
            stored.cipher_text.chars().take(24).collect::<String>(),
            stored.nonce,
            stored.plain_text,
        );
    }

    println!("\n=== Operation log ===");
    for entry in log.entries() {
        println!("{:>3}. {}", entry.seq, entry.entry);
    }

    Ok(())
}
