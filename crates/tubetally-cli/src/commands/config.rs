//! `tubetally config`: inspect and change stored settings.

use tubetally_core::Result;

use super::AppContext;
use crate::cli::ConfigAction;

/// Run a config action, returning the text to print.
pub fn run(ctx: &mut AppContext, action: ConfigAction) -> Result<String> {
    match action {
        ConfigAction::Show => {
            let mut shown = ctx.config.clone();
            shown.api_key = shown.api_key.as_deref().map(mask_key);
            Ok(format!("{}\n", serde_json::to_string_pretty(&shown)?))
        }
        ConfigAction::SetKey { key } => {
            ctx.config.set_api_key(&key);
            ctx.config.save_to(&ctx.config_path)?;
            Ok(if ctx.config.api_key.is_some() {
                "API key saved.\n".to_string()
            } else {
                "API key cleared.\n".to_string()
            })
        }
        ConfigAction::SetSpeed { speed } => {
            ctx.config.set_playback_speed(speed)?;
            ctx.config.save_to(&ctx.config_path)?;
            Ok(format!(
                "Default playback speed set to {}.\n",
                ctx.config.playback_speed
            ))
        }
        ConfigAction::Path => {
            let history = ctx.open_history()?;
            Ok(format!(
                "config:  {}\nhistory: {}\n",
                ctx.config_path.display(),
                history.path().display()
            ))
        }
    }
}

/// Keep the last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}
