use spotctl::Config;

/// Handle removing the stored Spotify token
pub fn handle_logout(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = config.token_store();
    if !store.exists() {
        println!("No stored token at {}", store.path().display());
        return Ok(());
    }

    store.remove()?;
    println!("🔓 Removed stored token {}", store.path().display());
    Ok(())
}
