use owo_colors::OwoColorize;
use std::error::Error;
use std::fs;
use tapeloop::config::Config;
use tapeloop::storage::ensure_dir;

pub fn handle_init(documents_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    // Check if already initialized
    if Config::exists()? {
        return Err("tapeloop is already initialized. Use 'tapeloop config set documents_dir <path>' to move app storage.".into());
    }

    let mut config = Config::new();
    if let Some(dir) = documents_dir {
        config.documents_dir = dir.to_string();
    }

    let documents_path = config.documents_path();
    if documents_path.exists() && !documents_path.is_dir() {
        return Err(format!("{} exists but is not a directory", documents_path.display()).into());
    }
    if !documents_path.exists() {
        println!("Creating documents directory: {}", documents_path.display());
        fs::create_dir_all(&documents_path)?;
    }
    ensure_dir(&config.inbox_path())?;

    config.save()?;

    println!("{} tapeloop initialized", "✓".green().bold());
    println!("Documents directory: {}", documents_path.display());
    println!("Recordings go to: {}", config.recording_path().display());
    println!(
        "Configuration saved to: {}",
        Config::config_path()?.display()
    );

    Ok(())
}
