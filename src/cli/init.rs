//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Existing settings in the config file are kept; only the site and base path
/// are written. The site is prompted for when `--site` was not given.
pub fn run(opts: &GlobalOptions, base_path: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to Daybook!".bold().green());
    println!("Let's point Daybook at your published diary.\n");

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();

    let site = match opts.site_ref() {
        Some(site) => site.to_string(),
        None => {
            let theme = ColorfulTheme::default();
            let mut prompt = Input::<String>::with_theme(&theme)
                .with_prompt("Site origin (e.g. https://user.github.io)");
            if let Some(ref current) = config.site {
                prompt = prompt.default(current.clone());
            }
            prompt.interact_text()?
        }
    };

    config.site = Some(site.trim().to_string());
    if let Some(base_path) = base_path {
        config.base_path = base_path.to_string();
    }
    config.validate()?;
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    println!(
        "  Site: {}{}",
        config.site_origin().unwrap_or_default().bold(),
        config.base()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "daybook status".cyan());
    println!("  {} - Browse the timeline", "daybook list".cyan());
    println!("  {} - Dashboard numbers", "daybook stats".cyan());

    Ok(())
}
