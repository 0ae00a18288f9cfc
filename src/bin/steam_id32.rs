use anyhow::{Context, Result, bail};

use winr8te_terminal::steam::steam_id64_to_steam_id32;

fn main() -> Result<()> {
    let ids: Vec<String> = std::env::args().skip(1).collect();
    if ids.is_empty() {
        bail!("usage: steam_id32 <steam-id64>...");
    }
    for raw in ids {
        let id32 = steam_id64_to_steam_id32(raw.trim())
            .with_context(|| format!("convert {raw}"))?;
        println!("{raw} -> {id32}");
    }
    Ok(())
}
