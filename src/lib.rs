//! flati — 基于 flatpak 命令行的软件包管理前端

pub mod config;
pub mod flatpak;

pub use config::Config;
pub use flatpak::{Field, Flatpak, FlatpakError, Listing, OriginPolicy, Package, Remote, Scope};
