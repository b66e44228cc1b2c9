// Shared primitives for one-time server bootstrapping across integration tests.
#![allow(dead_code)]

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use boat_arena_server::ServerSettings;

// Base URL published once the server has bound its port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// Guards the bootstrap so it runs once per test binary.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);

        // The server gets its own OS thread and runtime so it outlives each `#[tokio::test]`.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{addr}"));

                // Keep test rankings out of the working tree.
                let settings = ServerSettings {
                    leaderboard_path: std::env::temp_dir()
                        .join(format!("boat-arena-it-{}", uuid::Uuid::new_v4()))
                        .join("ranking.json"),
                    ..ServerSettings::from_env()
                };
                boat_arena_server::run(listener, settings)
                    .await
                    .expect("server failed");
            });
        });

        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// WebSocket endpoint of the shared test server.
pub fn ws_url() -> String {
    let base = ensure_server();
    format!("{}/ws", base.replacen("http://", "ws://", 1))
}

// Room names are capped at 24 characters; keep test names well inside that.
pub fn unique_room(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &id[..12])
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    // Retry briefly to avoid racing the bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
