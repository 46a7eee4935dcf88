mod backup;
mod config;
mod db;
mod export;
mod ipc;
mod roster;
mod state;

use std::io::{self, BufRead, Write};

fn main() {
    let cfg = config::Config::from_env();
    config::init_logging(&cfg.log_level);
    log::info!(
        "event=app_start module=main status=ok version={}",
        env!("CARGO_PKG_VERSION")
    );

    let mut state = ipc::AppState::new();
    if let Some(path) = cfg.workspace.as_ref() {
        // A bad startup workspace is not fatal; the UI can still select one.
        if let Err(e) = ipc::open_workspace(&mut state, path) {
            log::error!("event=workspace_open module=main status=error error={e:#}");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            // Can't reply without id.
            Err(e) => ipc::bad_json(e.to_string()),
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    log::info!("event=app_stop module=main status=ok");
}
