use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

pub mod upload;

pub mod mint;
pub mod transfer;
pub mod update_royalty;

pub mod get_nft;

pub mod backend_wallet;
pub mod payment_qr;
pub mod verify_payment;

pub mod pinata_jwt;

pub mod orders;

pub(crate) fn parse_address(address: &str) -> Result<Pubkey, crate::error::Error> {
    Pubkey::from_str(address)
        .map_err(|_| solana_nft::Error::InvalidAddress(address.to_owned()).into())
}

pub mod prelude {
    pub use crate::{Config, SolanaContext, error::Error};
    pub use actix_web::{dev::HttpServiceFactory, http::StatusCode, web};
    pub use db::{DbPool, OrderStatus, OrderStore};
    pub use serde::{Deserialize, Serialize};

    pub struct Success;

    impl Serialize for Success {
        fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            use serde::ser::SerializeStruct;
            let mut s = s.serialize_struct("Success", 1)?;
            s.serialize_field("success", &true)?;
            s.end()
        }
    }
}
