use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use foxcomm_client::{Client, ClientConfig, ClientEvent, LinkState, RtcConnector};
use foxcomm_core::utils::{DEFAULT_RELAY_PORT, DEFAULT_STUN_ADDR};
use foxcomm_core::{IceServerConfig, PeerId, RoomId};
use foxcomm_server::RelayConfig;
use std::io::IsTerminal;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "foxcomm")]
#[command(about = "Room-based signaling relay and peer client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(short, long, env = "FOXCOMM_PORT", default_value_t = DEFAULT_RELAY_PORT)]
        port: u16,

        #[arg(short, long, env = "FOXCOMM_BIND", default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Messages buffered per connection before new ones are dropped
        #[arg(long, default_value_t = 64)]
        queue: usize,

        /// Seconds a single socket write may take
        #[arg(long, default_value_t = 5)]
        send_timeout: u64,
    },

    /// Join a room and negotiate with everyone in it.
    Join {
        /// Relay address, e.g. ws://host:3000 or just host:3000
        #[arg(short, long, env = "FOXCOMM_URL", default_value_t = format!("ws://127.0.0.1:{}", DEFAULT_RELAY_PORT))]
        url: String,

        #[arg(short, long, env = "FOXCOMM_ROOM")]
        room: Option<String>,

        #[arg(long, env = "FOXCOMM_PEER_ID")]
        peer_id: Option<String>,

        #[arg(long, env = "FOXCOMM_STUN", value_delimiter = ',', default_value = DEFAULT_STUN_ADDR)]
        stun: Vec<String>,

        /// Ask peers for audio and video in our offers
        #[arg(long)]
        receive_media: bool,

        /// Peers to send an offer to right after joining
        #[arg(long = "connect")]
        connect: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve {
            port,
            bind,
            queue,
            send_timeout,
        } => {
            let config = RelayConfig {
                bind,
                port,
                outbound_capacity: queue,
                send_timeout: Duration::from_secs(send_timeout),
                ..RelayConfig::default()
            };
            run_relay(config).await
        }
        Commands::Join {
            url,
            room,
            peer_id,
            stun,
            receive_media,
            connect,
        } => {
            let room = match room {
                Some(room) => room,
                None => prompt_room()?,
            };
            let config = ClientConfig {
                url,
                room: RoomId::from(room),
                peer_id: peer_id.map(PeerId::from).unwrap_or_else(PeerId::generate),
                ice_servers: stun.into_iter().map(IceServerConfig::stun).collect(),
            };
            let connect = connect.into_iter().map(PeerId::from).collect();
            run_client(config, receive_media, connect).await
        }
    }
}

async fn run_relay(config: RelayConfig) -> Result<()> {
    println!(
        "{} {}",
        "🦊 Relay listening on".green().bold(),
        config.socket_addr().to_string().cyan()
    );

    foxcomm_server::serve(config, shutdown_signal()).await?;

    println!("{}", "👋 Relay stopped".yellow());
    Ok(())
}

async fn run_client(config: ClientConfig, receive_media: bool, connect: Vec<PeerId>) -> Result<()> {
    let connector = RtcConnector::new(config.ice_servers.clone()).with_media_receive(receive_media);

    let mut client = Client::connect(config, Arc::new(connector))
        .await
        .context("Could not reach the relay")?;

    println!(
        "{} {} {} {}",
        "🦊 Joined".green().bold(),
        client.room().to_string().cyan(),
        "as".green(),
        client.peer_id().to_string().cyan()
    );

    for peer in connect {
        client.connect_to(peer);
    }

    loop {
        tokio::select! {
            event = client.next_event() => match event {
                Some(ClientEvent::SignalingClosed) | None => {
                    println!("{}", "⚠️  Relay connection lost".red().bold());
                    break;
                }
                Some(event) => print_event(&event),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, leaving room");
                if let Err(e) = client.leave().await {
                    info!("Leave was not delivered: {}", e);
                }
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}

fn print_event(event: &ClientEvent) {
    match event {
        ClientEvent::PeerJoined { peer } => println!(
            "{} {}",
            "➕ Peer joined:".green(),
            describe(peer.as_ref())
        ),
        ClientEvent::PeerLeft { peer } => {
            println!("{} {}", "➖ Peer left:".yellow(), describe(peer.as_ref()))
        }
        ClientEvent::LinkState { peer, state } => {
            let label = format!("{:?}", state);
            let label = match state {
                LinkState::Connected => label.green().bold(),
                _ => label.cyan(),
            };
            println!("🔗 {} {}", peer.to_string().bold(), label);
        }
        ClientEvent::LinkClosed { peer } => {
            println!("{} {}", "✖ Link closed:".yellow(), peer)
        }
        ClientEvent::NegotiationFailed { peer, reason } => println!(
            "{} {}: {}",
            "❌ Negotiation failed with".red().bold(),
            peer,
            reason
        ),
        ClientEvent::RemoteTrack {
            peer,
            track_id,
            kind,
        } => println!("🎞️  {} track {} from {}", kind.cyan(), track_id, peer),
        ClientEvent::SignalingClosed => {}
    }
}

fn describe(peer: Option<&PeerId>) -> String {
    peer.map(|p| p.to_string())
        .unwrap_or_else(|| "(anonymous)".to_string())
}

fn prompt_room() -> Result<String> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("No room given; pass --room or set FOXCOMM_ROOM");
    }
    let room: String = dialoguer::Input::new()
        .with_prompt("Room")
        .interact_text()
        .context("Failed to read room name")?;
    Ok(room.trim().to_owned())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
