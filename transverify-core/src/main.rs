#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;

use transverify_core::{logging, protocol, AppConfig, Runtime};

fn main() {
    let config_path = AppConfig::config_path();
    let (config, config_error) = match AppConfig::load(&config_path) {
        Ok(c) => (c, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    logging::init(&config.logging);
    match config_error {
        Some(e) => tracing::warn!("ignoring {}: {e}", config_path.display()),
        None => tracing::info!("starting with config {}", config_path.display()),
    }

    let mut runtime = Runtime::new(config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("unreadable request line: {e}");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            protocol::handle(&line, &mut runtime, &mut |event: String| {
                let _ = writeln!(stdout, "{event}");
                let _ = stdout.flush();
            })
        }));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!("request handler panicked");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
}
