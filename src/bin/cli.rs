use anyhow::{bail, Context};
use roomview::adaptation::{
    select_layers, AdaptationDriver, AdaptationRequest, ChannelTransport, LayerSelection,
    ViewportSource,
};
use roomview::consumers::{Consumer, ConsumerUpdate};
use roomview::room::{RoomAction, RoomContext, RoomSession};
use roomview::types::{ConsumerId, ViewportSize};
use roomview::RoomViewConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_VIEWPORT: ViewportSize = ViewportSize {
    width: 1280,
    height: 720,
};

/// One line of a replay script.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Step {
    AddConsumer { consumer: Consumer },
    RemoveConsumer { id: ConsumerId },
    UpdateConsumer { id: ConsumerId, update: ConsumerUpdate },
    Dispatch { action: RoomAction },
    Resize { width: u32, height: u32 },
    Wait { ms: u64 },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Script {
    #[serde(default)]
    room: Option<String>,
    #[serde(default)]
    viewport: Option<ViewportSize>,
    steps: Vec<Step>,
}

#[derive(Debug, Serialize)]
struct IssuedRequest {
    #[serde(flatten)]
    request: AdaptationRequest,
    selection: Option<LayerSelection>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayReport {
    requests: Vec<IssuedRequest>,
    events: u64,
    session: RoomSession,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    roomview::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: roomview-cli <replay|defaults> [args]");
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "replay" => cmd_replay(&args).await,
        "defaults" => cmd_defaults(),
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

fn cmd_defaults() -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(&RoomViewConfig::default())?);
    Ok(())
}

async fn cmd_replay(args: &[String]) -> anyhow::Result<()> {
    // Parse args: replay <script.json> [--json] [--config <path>]
    let mut script_path = None;
    let mut config_path: Option<PathBuf> = None;
    let mut json = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => json = true,
            "--config" => {
                i += 1;
                let path = args.get(i).context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            other => {
                if script_path.is_some() {
                    bail!("Unexpected argument: {}", other);
                }
                script_path = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    let script_path = script_path.context("Usage: roomview-cli replay <script.json> [--json] [--config <path>]")?;
    let config = match config_path {
        Some(path) => RoomViewConfig::load_layered(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RoomViewConfig::load_or_default(),
    };

    let contents = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&contents).context("Invalid replay script")?;

    let report = replay(script, &config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for issued in &report.requests {
            match issued.selection {
                Some(pick) => println!(
                    "adapt {} to {} (spatial {}, temporal {})",
                    issued.request.consumer_id,
                    issued.request.viewport(),
                    pick.spatial,
                    pick.temporal
                ),
                None => println!(
                    "adapt {} to {}",
                    issued.request.consumer_id,
                    issued.request.viewport()
                ),
            }
        }
        println!("{} adaptation request(s), {} room event(s)", report.requests.len(), report.events);
        println!("lifecycle: {}", report.session.lifecycle());
        match report.session.full_screen_consumer_id() {
            Some(id) => println!("fullscreen: {}", id),
            None => println!("fullscreen: none"),
        }
    }

    Ok(())
}

async fn replay(script: Script, config: &RoomViewConfig) -> anyhow::Result<ReplayReport> {
    let name = script.room.unwrap_or_else(|| "replay".to_string());
    let room = RoomContext::new(name, config).into_shared();
    let viewport = ViewportSource::new(
        script.viewport.unwrap_or(DEFAULT_VIEWPORT),
        config.adaptation.settle_window(),
    );

    let (transport, mut requests) = ChannelTransport::new();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport, &config.adaptation)
        .await
        .spawn();

    for step in script.steps {
        match step {
            Step::AddConsumer { consumer } => {
                room.write().await.add_consumer(consumer);
            }
            Step::RemoveConsumer { id } => {
                room.write().await.remove_consumer(&id);
            }
            Step::UpdateConsumer { id, update } => {
                room.write().await.update_consumer(&id, update);
            }
            Step::Dispatch { action } => {
                room.write().await.dispatch(action);
            }
            Step::Resize { width, height } => viewport.resize(ViewportSize::new(width, height)),
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
    }

    // Let the last resize settle before stopping.
    tokio::time::sleep(config.adaptation.settle_window() + Duration::from_millis(50)).await;
    task.shutdown().await;

    let mut room = room.write().await;
    let mut issued = Vec::new();
    while let Ok(request) = requests.try_recv() {
        let selection = room
            .consumers()
            .get(&request.consumer_id)
            .and_then(|consumer| consumer.layers())
            .map(|layers| select_layers(layers, request.viewport()));
        issued.push(IssuedRequest { request, selection });
    }

    let events = room.last_sequence();
    let session = room.session().clone();
    room.teardown();

    Ok(ReplayReport {
        requests: issued,
        events,
        session,
    })
}
