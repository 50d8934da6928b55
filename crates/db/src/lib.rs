pub mod config;
pub mod error;
pub mod nfts;
pub mod order_store;
pub mod pool;

pub use config::DbConfig;
pub use error::{Error, Result};
pub use nfts::{NewNft, NftRow};
pub use order_store::{Order, OrderNft, OrderStatus, OrderStore, SweepStats};
pub use pool::{Connection, DbPool};
