use std::result::Result as StdResult;
use thiserror::Error as ThisError;

pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Any(#[from] anyhow::Error),
    #[error("{}", crate::utils::verbose_solana_error(.0))]
    SolanaClient(#[from] solana_client::client_error::ClientError),
    #[error(transparent)]
    SolanaProgram(#[from] solana_sdk::program_error::ProgramError),
    #[error(transparent)]
    Signer(#[from] solana_sdk::signer::SignerError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("royalty must be between 0 and 10000 basis points, got {0}")]
    RoyaltyOutOfRange(u16),
    #[error("creator shares must add up to 100, got {0}")]
    InvalidCreatorShares(u32),
    #[error("no metadata account found for mint {0}")]
    MetadataNotFound(solana_sdk::pubkey::Pubkey),
    #[error("insufficient solana balance, needed={needed}; have={balance};")]
    InsufficientSolanaBalance { needed: u64, balance: u64 },
}

impl Error {
    pub fn custom<E: Into<anyhow::Error>>(e: E) -> Self {
        Error::Any(e.into())
    }
}
