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
    // Secrets are deliberately absent from this list
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "BPG_HOST",
        "BPG_PORT",
        "BPG_IPN_TRUSTED_CERT_DOMAINS",
        "BPG_IPN_CERT_HOST_PATTERN",
        "BPG_IPN_CERT_FETCH_TIMEOUT",
        "BPG_IPN_CERT_CACHE_TTL",
        "BPG_IPN_AUTO_CONFIRM",
        "BPG_CORROBORATE_PAYMENTS",
        "BPG_BKASH_USERNAME",
        "BPG_BKASH_APP_KEY",
        "BPG_BKASH_LIVE",
        "BPG_BKASH_BASE_URL",
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
