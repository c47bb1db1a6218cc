use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};

use chatshelf_core::constants::attrs;
use chatshelf_core::host::sim::SimDom;
use chatshelf_core::host::{HostDom, HostSignal};
use chatshelf_core::menu::MenuAction;
use chatshelf_core::{
    ApplyMode, Assignment, EngineConfig, FolderStore, JsonFileBackend, SettingsStore, SyncEngine,
};

/// Drives the reconciliation engine against a simulated host: a chat-select
/// popup whose items, visibility and active character the "host" keeps
/// changing while the engine keeps the folder overlay in sync.
#[derive(Parser)]
#[command(name = "chatshelf")]
#[command(about = "Folder-overlay engine demo against a simulated chat host")]
struct Cli {
    /// Where the settings blob lives (defaults to the user data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// How the overlay is applied to the host DOM
    #[arg(long, value_enum, default_value = "reparent")]
    strategy: Strategy,

    /// Milliseconds per driver tick
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Reparent,
    Proxy,
}

impl From<Strategy> for ApplyMode {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Reparent => ApplyMode::Reparent,
            Strategy::Proxy => ApplyMode::ProxyMirror,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    chatshelf_core::tracing_setup::init_tracing();
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatshelf"),
    };
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!(data_dir = %data_dir.display(), "starting");

    let config = EngineConfig {
        apply_mode: cli.strategy.into(),
        ..EngineConfig::default()
    };
    let store = FolderStore::new(SettingsStore::load(
        Box::new(JsonFileBackend::new(&data_dir)),
        config.settings_flush,
    ));

    let mut dom = SimDom::new();
    let list = dom.add_chat_popup();
    dom.add_chat_item(list, "chat_001.jsonl", "First meeting");
    dom.add_chat_item(list, "chat_002.jsonl", "The cave incident");
    dom.add_chat_item(list, "chat_003.jsonl", "Market day");
    dom.add_chat_item(list, "chat_004.jsonl", "Old letters");
    dom.set_active_context(Some("alice"));

    let engine = SyncEngine::new(dom, store, &config, Instant::now());

    run_session(engine, Duration::from_millis(cli.tick_ms)).await
}

/// Pump the engine for a handful of ticks, the way the extension's event
/// loop would between user gestures.
async fn pump(engine: &mut SyncEngine<SimDom>, interval: &mut tokio::time::Interval, ticks: u32) {
    for _ in 0..ticks {
        interval.tick().await;
        engine.tick(Instant::now());
    }
}

async fn run_session(mut engine: SyncEngine<SimDom>, tick: Duration) -> Result<()> {
    let mut interval = tokio::time::interval(tick);

    pump(&mut engine, &mut interval, 4).await;
    print_view(&engine, "popup opened for alice");

    let lore = engine
        .create_folder("Lore")
        .ok()
        .flatten()
        .expect("active scope was just set");
    engine
        .move_item("chat_002.jsonl", &Assignment::Folder(lore.clone()))
        .ok();
    engine
        .move_item("chat_004.jsonl", &Assignment::Folder(lore.clone()))
        .ok();
    pump(&mut engine, &mut interval, 4).await;
    print_view(&engine, "created \"Lore\" and moved two chats in");

    print_menu(&engine, "chat_002.jsonl");

    engine.toggle_collapsed(&lore).ok();
    pump(&mut engine, &mut interval, 4).await;
    print_view(&engine, "collapsed \"Lore\"");

    // The host adds a chat behind the engine's back.
    {
        let dom = engine.host_mut();
        if let Some(list) = dom.find_by_id("select_chat_div").first().copied() {
            dom.add_chat_item(list, "chat_005.jsonl", "Fresh chat");
        }
    }
    pump(&mut engine, &mut interval, 4).await;
    print_view(&engine, "host added chat_005.jsonl");

    engine.host_mut().set_active_context(Some("bob"));
    engine.notify(HostSignal::ScopeChanged, Instant::now());
    pump(&mut engine, &mut interval, 4).await;
    print_view(&engine, "switched to bob (folders stay with alice)");

    engine.host_mut().set_active_context(Some("alice"));
    engine.notify(HostSignal::ScopeChanged, Instant::now());
    pump(&mut engine, &mut interval, 4).await;
    print_view(&engine, "back to alice");

    engine.delete_folder(&lore).ok();
    pump(&mut engine, &mut interval, 12).await;
    print_view(&engine, "deleted \"Lore\" (chats fall back to Unassigned)");

    engine.shutdown();
    print_diagnostics(&engine);
    Ok(())
}

/// Render the overlay the way it currently stands in the simulated DOM.
fn print_view(engine: &SyncEngine<SimDom>, caption: &str) {
    let dom = engine.host();
    let scope = engine.current_scope().unwrap_or_else(|| "-".to_string());
    println!("\n== {caption} [scope: {scope}] ==");

    let groups = dom.find_with_attr(attrs::GROUP);
    if groups.is_empty() {
        println!("  (no overlay rendered)");
        return;
    }
    for group in groups {
        let collapsed = dom.attr(group, attrs::COLLAPSED).is_some();
        for part in dom.children(group) {
            if dom.attr(part, attrs::GROUP_HEADER).is_some() {
                let header = dom.text(part);
                println!("  {} {}", if collapsed { "+" } else { "-" }, header);
            }
            if dom.attr(part, attrs::GROUP_BODY).is_some() && !collapsed {
                for item in dom.children(part) {
                    let key = dom
                        .attr(item, "file_name")
                        .or_else(|| dom.attr(item, attrs::PROXY_FOR))
                        .unwrap_or_default();
                    println!("      {key}");
                }
            }
        }
    }
}

fn print_menu(engine: &SyncEngine<SimDom>, item_key: &str) {
    println!("\n== context menu for {item_key} ==");
    for entry in engine.menu_for_item(item_key) {
        let marker = if entry.current { "*" } else { " " };
        let kind = match entry.action {
            MenuAction::Assign(_) => "move",
            MenuAction::NewFolder => "create",
        };
        println!("  [{marker}] {} ({kind})", entry.label);
    }
}

fn print_diagnostics(engine: &SyncEngine<SimDom>) {
    let d = engine.diagnostics();
    println!(
        "\ntriggers={} passes={} aborted={} heartbeat_resyncs={} settings_flushes={}",
        d.triggers, d.passes, d.aborted_passes, d.heartbeat_resyncs, d.settings_flushes
    );
}
