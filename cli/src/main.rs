//! wseth CLI: talk to an Ethereum node over WebSocket from the terminal.
//!
//! Usage:
//! ```bash
//! # Send a JSON-RPC call
//! wseth call --url wss://eth.example.org --method eth_getBalance \
//!     --params '["0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae"]' --block latest
//!
//! # Print the next 5 new block headers
//! wseth watch --url wss://eth.example.org --count 5
//!
//! # Submit a signed transaction and wait for its receipt
//! wseth send-raw --url wss://eth.example.org --tx 0xf86c... --wait
//!
//! # Sign a transaction offline
//! wseth sign --tx '{"nonce": 0, "gas": 21000, "to": "0x..."}' --key 4646...
//! ```

use std::env;
use std::process;

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use wseth_signer::{ChainParams, LocalSigner, TransactionSigner, TxData};
use wseth_ws::{ClientConfig, TxEvent, WsEthClient, NEW_HEADS};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "call" => cmd_call(&args[2..]).await,
        "watch" => cmd_watch(&args[2..]).await,
        "send-raw" => cmd_send_raw(&args[2..]).await,
        "sign" => cmd_sign(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("wseth {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("wseth {}", env!("CARGO_PKG_VERSION"));
    println!("Talk to an Ethereum node over WebSocket\n");
    println!("USAGE:");
    println!("    wseth <COMMAND>\n");
    println!("COMMANDS:");
    println!("    call       Send a JSON-RPC call");
    println!("    watch      Subscribe to a channel and print pushes");
    println!("    send-raw   Submit a signed transaction");
    println!("    sign       Sign a transaction offline");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>        ws:// or wss:// endpoint  [call, watch, send-raw]");
    println!("    --method <NAME>    RPC method                [call]");
    println!("    --params <JSON>    Params array or value     [call]");
    println!("    --block <TAG>      Trailing block tag        [call]");
    println!("    --channel <NAME>   Channel (default newHeads) [watch]");
    println!("    --count <N>        Stop after N pushes       [watch]");
    println!("    --tx <HEX|JSON>    Raw tx / tx fields        [send-raw, sign]");
    println!("    --wait             Wait for the receipt      [send-raw]");
    println!("    --key <HEX>        Private key               [sign]");
    println!("    --chain <JSON>     Chain params              [sign]\n");
    println!("Set RUST_LOG=wseth_ws=debug for connection logs.");
}

async fn open(args: &[String]) -> Result<WsEthClient, String> {
    let url = parse_flag(args, "--url").ok_or("--url is required")?;
    let client = WsEthClient::connect(url, ClientConfig::default())
        .await
        .map_err(|e| e.to_string())?;
    client.wait_open().await.map_err(|e| e.to_string())?;
    Ok(client)
}

async fn cmd_call(args: &[String]) -> Result<(), String> {
    let method = parse_flag(args, "--method").ok_or("--method is required")?;
    let params = match parse_flag(args, "--params") {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| format!("--params: {e}"))?,
        None => Value::Array(Vec::new()),
    };
    let block = parse_flag(args, "--block").map(Value::String);

    let client = open(args).await?;
    let result = client
        .call(method, params, block)
        .await
        .map_err(|e| e.to_string())?;

    println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
    Ok(())
}

async fn cmd_watch(args: &[String]) -> Result<(), String> {
    let channel = parse_flag(args, "--channel").unwrap_or_else(|| NEW_HEADS.to_string());
    let count = match parse_flag(args, "--count") {
        Some(n) => Some(n.parse::<u64>().map_err(|e| format!("--count: {e}"))?),
        None => None,
    };

    let client = open(args).await?;
    let mut pushes = client.channel(channel.as_str());
    let id = client
        .subscribe_channel(channel.as_str())
        .await
        .map_err(|e| e.to_string())?;
    eprintln!("Subscribed to {channel} ({id})");

    let mut seen = 0u64;
    while let Some(payload) = pushes.recv().await {
        println!("{payload}");
        seen += 1;
        if count.is_some_and(|n| seen >= n) {
            break;
        }
    }
    Ok(())
}

async fn cmd_send_raw(args: &[String]) -> Result<(), String> {
    let raw = parse_flag(args, "--tx").ok_or("--tx is required")?;
    let wait = args.iter().any(|a| a == "--wait");

    let client = open(args).await?;
    if wait {
        client.subscribe(NEW_HEADS, |outcome| {
            if let Err(e) = outcome {
                tracing::warn!(error = %e, "newHeads subscription failed");
            }
        });
    }

    let (response, mut events) = client.call("eth_sendRawTransaction", raw, None).split();
    let hash = response.await.map_err(|e| e.to_string())?;
    println!("Tx hash: {hash}");
    if !wait {
        return Ok(());
    }

    while let Some(event) = events.recv().await {
        if let TxEvent::Receipt(outcome) = event {
            let receipt = outcome.map_err(|e| e.to_string())?;
            println!(
                "Mined in block {} after {} block(s), status {}",
                receipt.block_number.as_deref().unwrap_or("?"),
                receipt.blocks_since,
                receipt.status.as_deref().unwrap_or("?"),
            );
            return Ok(());
        }
    }
    Err("connection closed before a receipt arrived".into())
}

fn cmd_sign(args: &[String]) -> Result<(), String> {
    let tx = parse_flag(args, "--tx").ok_or("--tx is required")?;
    let key = parse_flag(args, "--key").ok_or("--key is required")?;
    let tx: TxData = serde_json::from_str(&tx).map_err(|e| format!("--tx: {e}"))?;
    let chain = parse_flag(args, "--chain")
        .map(|raw| ChainParams::from_json(&raw))
        .transpose()
        .map_err(|e| e.to_string())?;

    let raw = LocalSigner
        .sign(&tx, &key, chain.as_ref())
        .map_err(|e| e.to_string())?;
    println!("{raw}");
    Ok(())
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
