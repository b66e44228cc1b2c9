#[tokio::main]
async fn main() -> std::io::Result<()> {
    boat_arena_server::frameworks::server::run_with_config().await
}
