use super::prelude::*;
use rust_decimal::Decimal;
use solana_nft::solana_pay;
use solana_sdk::pubkey::Pubkey;

#[derive(Deserialize)]
pub struct Params {
    /// Amount in SOL.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub label: Option<String>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct Output {
    /// Solana Pay transfer request URL; clients render it as a QR code.
    pub solana_pay_url: String,
    #[serde(with = "solana_nft::pubkey")]
    pub recipient: Pubkey,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/qr")
        .wrap(config.cors())
        .route(web::post().to(payment_qr))
}

async fn payment_qr(
    params: web::Json<Params>,
    sol: web::Data<SolanaContext>,
) -> Result<web::Json<Output>, Error> {
    if params.amount <= Decimal::ZERO {
        return Err(solana_nft::Error::InvalidAmount(params.amount.to_string()).into());
    }
    let recipient = sol.backend_wallet()?;

    let label = params.label.as_deref().unwrap_or("NFT mint");
    let message = params.message.as_deref().unwrap_or("NFT mint fee");
    let solana_pay_url = solana_pay::payment_url(&recipient, params.amount, label, message, None);

    Ok(web::Json(Output {
        solana_pay_url,
        recipient,
    }))
}
