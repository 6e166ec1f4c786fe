use anyhow::{Context, Result};
use colored::Colorize;
use futures::StreamExt;

use crate::cli::LiveCommands;
use crate::head::{Head, LiveHead, RoomId};
use crate::store::{LiveHeadStore, StoreEvent};

pub fn run(command: LiveCommands, store: &dyn LiveHeadStore, room: &RoomId) -> Result<()> {
    match command {
        LiveCommands::Show => show(store, room),
        LiveCommands::Set { slide, display } => {
            let head = Head::new(slide.map(Into::into), display.map(Into::into));
            set(store, room, &head)
        }
        LiveCommands::Follow => follow(store, room),
    }
}

fn show(store: &dyn LiveHeadStore, room: &RoomId) -> Result<()> {
    match store.current(room)? {
        Some(live) => println!("{}", describe(room, &live)),
        None => println!("{}", format!("Room {room} has no live head yet.").yellow()),
    }
    Ok(())
}

fn set(store: &dyn LiveHeadStore, room: &RoomId, head: &Head) -> Result<()> {
    let live = store.publish(room, head)?;
    println!("{} {}", "Published".green().bold(), describe(room, &live));
    Ok(())
}

fn follow(store: &dyn LiveHeadStore, room: &RoomId) -> Result<()> {
    let mut subscription = store.subscribe(room)?;
    eprintln!(
        "{}",
        format!("Following room {room}, press Ctrl+C to stop").dimmed()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(async {
        while let Some(event) = subscription.next().await {
            match event {
                StoreEvent::Snapshot(live) => println!("{}", describe(room, &live)),
                StoreEvent::Unavailable(reason) => {
                    eprintln!("{} {reason}", "warning:".yellow().bold())
                }
            }
        }
    });
    Ok(())
}

fn describe(room: &RoomId, live: &LiveHead) -> String {
    let slide = live
        .head
        .slide
        .as_ref()
        .map_or_else(|| "(overview)".to_string(), |s| s.to_string());
    let display = live
        .head
        .display
        .as_ref()
        .map_or_else(|| "(any)".to_string(), |d| d.to_string());
    format!(
        "{room}: slide {} on {} (v{})",
        slide.cyan(),
        display.cyan(),
        live.version
    )
}
