use crate::api::prelude::*;
use chrono::{DateTime, Utc};
use db::{Order, OrderNft};
use rust_decimal::Decimal;
use solana_nft::{metadata, solana_pay, utils};
use solana_sdk::pubkey::Pubkey;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct Params {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    pub royalty_basis_points: u16,
    pub creator_address: String,
}

#[derive(Serialize)]
pub struct Output {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub qr_payload: String,
    #[serde(with = "solana_nft::pubkey")]
    pub backend_wallet: Pubkey,
    /// Mint fee in SOL the order must pay.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("")
        .wrap(config.cors())
        .route(web::post().to(create_order))
}

/// Open a mint order: the NFT details come in now, the media file only after
/// the mint fee is paid.
async fn create_order(
    params: web::Json<Params>,
    sol: web::Data<SolanaContext>,
    store: web::Data<OrderStore>,
    config: web::Data<Config>,
) -> Result<web::Json<Output>, Error> {
    if params.name.is_empty() || params.symbol.is_empty() {
        return Err(Error::custom(
            StatusCode::BAD_REQUEST,
            "name and symbol must not be empty",
        ));
    }
    metadata::check_royalty_basis_points(params.royalty_basis_points)?;
    let creator = crate::api::parse_address(&params.creator_address)?;
    let backend_wallet = sol.backend_wallet()?;

    let amount = config.orders.mint_fee_sol;
    let amount_lamports = utils::sol_to_lamports(amount)?;

    let mut order = Order::new(
        OrderNft {
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            description: params.description.clone(),
            royalty_basis_points: params.royalty_basis_points,
            ipfs_url: None,
            content_type: None,
        },
        creator.to_string(),
        amount_lamports,
        config.order_ttl(),
    );
    let qr_payload = solana_pay::payment_url(
        &backend_wallet,
        amount,
        &params.name,
        "NFT mint fee",
        None,
    );
    order.qr_payload = Some(qr_payload.clone());
    store.put(&order)?;

    tracing::info!(order_id = %order.id, creator = %creator, "created mint order");

    Ok(web::Json(Output {
        order_id: order.id,
        status: order.status,
        qr_payload,
        backend_wallet,
        amount,
        expires_at: order.expires_at,
    }))
}
