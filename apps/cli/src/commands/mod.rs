//! 命令定义和实现

pub mod addrs;
pub mod config;
pub mod serve;
pub mod sim_peer;

pub use config::ConfigCommand;
pub use serve::ServeCommand;
pub use sim_peer::SimPeerCommand;
