// Startup module - displays banner and router status
//
// Shows the version, where configuration came from, and what the router is
// about to serve: registered components, message commands, hook expiry.

use inline_nav::config::{Config, VERSION};
use inline_nav::demo::DemoApp;

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// One line of the status list
pub struct ModuleStatus {
    pub name: String,
    pub enabled: bool,
    pub description: String,
}

/// Print the startup banner and router status
pub fn print_startup(config: &Config, app: &DemoApp) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}inline-nav{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Callback routing for inline buttons{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}+{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    println!("  {DIM}Components...{RESET}");
    for module in get_module_status(config, app) {
        print_module_status(&module);
    }
    println!();

    println!(
        "  {MAGENTA}>{RESET} Commands: {BOLD}{}{RESET}",
        app.messages
            .commands()
            .iter()
            .map(|c| format!("/{c}"))
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!();
}

fn get_module_status(config: &Config, app: &DemoApp) -> Vec<ModuleStatus> {
    let mut modules: Vec<ModuleStatus> = app
        .dispatcher
        .components()
        .names()
        .into_iter()
        .map(|name| ModuleStatus {
            name: name.to_string(),
            enabled: true,
            description: "component".to_string(),
        })
        .collect();

    modules.push(ModuleStatus {
        name: "hook-ttl".to_string(),
        enabled: config.hooks.ttl().is_some(),
        description: match config.hooks.ttl() {
            Some(ttl) => format!("evict after {}s", ttl.as_secs()),
            None => "hooks live until their view closes".to_string(),
        },
    });
    modules
}

fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}+{RESET}"), "")
    } else {
        (format!("{DIM}-{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<12}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}
