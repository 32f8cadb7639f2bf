use std::error::Error;

pub fn handle_play(file: Option<&str>) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "player")]
    {
        crate::player::run(file)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = file;
        use owo_colors::OwoColorize;
        println!("{} {}", "🎙".cyan(), "Play and Record".bold());
        println!();
        println!(
            "{} Playback and recording require the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, install with:");
        println!("  {}", "cargo install tapeloop --features player".cyan());
        println!();
        println!("Or if building from source:");
        println!("  {}", "cargo build --release --features player".cyan());

        Ok(())
    }
}
