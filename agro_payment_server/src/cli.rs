use std::{env, env::VarError};

/// The server takes no arguments. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 15] = [
        "RUST_LOG",
        "AGRO_HOST",
        "AGRO_PORT",
        "AGRO_DATABASE_URL",
        "AGRO_TELEGRAM_API_URL",
        "AGRO_ADMIN_ID",
        "AGRO_MINI_APP_URL",
        "AGRO_KASPI_PAY_URL",
        "AGRO_KASPI_CARD_NUMBER",
        "AGRO_KASPI_CARD_HOLDER",
        "AGRO_SUBSCRIPTION_FEE",
        "AGRO_DELIVERY_PRICE",
        "AGRO_SESSION_TTL",
        "AGRO_SWEEP_INTERVAL",
        "AGRO_SHUTDOWN_GRACE",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
