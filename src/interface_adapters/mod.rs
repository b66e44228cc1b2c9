// Interface adapters: wire protocol, network handling and storage adapters.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
