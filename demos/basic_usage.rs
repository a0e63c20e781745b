// Basic usage example for stowage
//
// Run with: cargo run --example basic_usage

use serde::{Deserialize, Serialize};
use stowage::{Format, Storage};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Session {
    user: String,
    visits: u32,
    recent: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let storage = Storage::builder("my-app")
        .base_dir("./example_storage")
        .build()?;

    // Entries: XML by default
    let session = Session {
        user: "ada".into(),
        visits: 3,
        recent: vec!["inbox".into(), "settings".into()],
    };
    println!("saved xml: {}", storage.save_entry("session.xml", &session).await);
    println!("saved json: {}", storage.save_entry_as("session.json", &session, Format::Json).await);

    let loaded: Session = storage.load_entry("session.xml").await;
    println!("loaded: {loaded:?}");

    // Loading with the wrong format falls back to the default value
    let mismatched: Session = storage.load_entry_as("session.xml", Format::Json).await;
    println!("mismatched: {mismatched:?}");

    // Settings
    storage.save_setting("theme", "dark");
    println!("theme = {}", storage.load_setting::<String>("theme"));
    println!("theme as number = {}", storage.load_setting::<i32>("theme"));

    println!("entries: {:?}", storage.list_entries().await);

    storage.delete_entry("session.xml").await;
    storage.delete_entry("session.json").await;
    storage.delete_setting("theme");

    Ok(())
}
