use crate::api::prelude::*;
use rust_decimal::Decimal;
use solana_nft::solana_pay;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct Params {
    /// Amount in SOL.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub recipient: Option<String>,
}

#[derive(Serialize)]
pub struct Output {
    pub phantom_deeplink: String,
    pub solana_pay_url: String,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/{order_id}/phantom-deeplink")
        .wrap(config.cors())
        .route(web::post().to(phantom_deeplink))
}

/// Universal link that opens the order's payment page inside Phantom's
/// in-app browser, for payers on mobile without the extension.
async fn phantom_deeplink(
    path: web::Path<Uuid>,
    params: web::Json<Params>,
    sol: web::Data<SolanaContext>,
    store: web::Data<OrderStore>,
    config: web::Data<Config>,
) -> Result<web::Json<Output>, Error> {
    let id = path.into_inner();
    let order = store.get(&id)?.ok_or(Error::NotFound)?;

    if params.amount <= Decimal::ZERO {
        return Err(solana_nft::Error::InvalidAmount(params.amount.to_string()).into());
    }
    let recipient = match &params.recipient {
        Some(address) => crate::api::parse_address(address)?,
        None => sol.backend_wallet()?,
    };

    let solana_pay_url = solana_pay::payment_url(
        &recipient,
        params.amount,
        &order.nft.name,
        "NFT mint fee",
        None,
    );
    let phantom_deeplink = solana_pay::phantom_deeplink(&solana_pay_url, &config.frontend_origin());

    Ok(web::Json(Output {
        phantom_deeplink,
        solana_pay_url,
    }))
}
