pub mod act;
pub mod app;
pub mod cache;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod locate;
pub mod output;
pub mod runtime;

pub use act::{cmd_act, ActArgs};
pub use cache::{cmd_cache, CacheArgs};
pub use locate::{cmd_locate, LocateArgs};
