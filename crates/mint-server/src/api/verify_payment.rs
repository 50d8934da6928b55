use super::prelude::*;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use solana_nft::{payment, utils};
use solana_sdk::signature::Signature;

pub const DEFAULT_WINDOW_MINUTES: i64 = 10;

#[derive(Deserialize)]
pub struct Params {
    pub from_address: String,
    pub to_address: String,
    /// Expected amount in SOL.
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_amount: Decimal,
    pub time_window_minutes: Option<i64>,
}

#[derive(Serialize)]
pub struct Output {
    pub verified: bool,
    #[serde(with = "solana_nft::signature::opt")]
    pub signature: Option<Signature>,
    pub lamports: Option<u64>,
    pub block_time: Option<i64>,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/verify")
        .wrap(config.cors())
        .route(web::post().to(verify_payment))
}

async fn verify_payment(
    params: web::Json<Params>,
    sol: web::Data<SolanaContext>,
) -> Result<web::Json<Output>, Error> {
    let from = super::parse_address(&params.from_address)?;
    let to = super::parse_address(&params.to_address)?;
    let min_lamports = utils::sol_to_lamports(params.expected_amount)?;
    let window = Duration::minutes(
        params
            .time_window_minutes
            .unwrap_or(DEFAULT_WINDOW_MINUTES),
    );

    let receipt =
        payment::verify_payment(&sol.client, &from, &to, min_lamports, Utc::now() - window)
            .await?;

    Ok(web::Json(match receipt {
        Some(receipt) => Output {
            verified: true,
            signature: Some(receipt.signature),
            lamports: Some(receipt.lamports),
            block_time: receipt.block_time,
        },
        None => Output {
            verified: false,
            signature: None,
            lamports: None,
            block_time: None,
        },
    }))
}
