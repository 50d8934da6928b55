use super::prelude::*;
use solana_nft::{solana_pay, transfer::transfer_nft};
use solana_sdk::signature::Signature;

#[derive(Deserialize)]
pub struct Params {
    pub mint_address: String,
    pub to_address: String,
}

#[derive(Serialize)]
pub struct Output {
    #[serde(with = "solana_nft::signature")]
    pub signature: Signature,
    pub funded_recipient: bool,
    pub explorer_url: String,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/transfer")
        .wrap(config.cors())
        .route(web::post().to(transfer))
}

/// Move the NFT out of the creator wallet. When a database is configured the
/// recorded owner follows along with an audit row.
async fn transfer(
    params: web::Json<Params>,
    sol: web::Data<SolanaContext>,
    db: web::Data<Option<DbPool>>,
) -> Result<web::Json<Output>, Error> {
    let mint = super::parse_address(&params.mint_address)?;
    let to = super::parse_address(&params.to_address)?;

    let transferred = transfer_nft(&sol.client, &sol.creator, &mint, &to).await?;

    if let Some(db) = db.as_ref() {
        match db
            .transfer_nft_ownership(
                &params.mint_address,
                &params.to_address,
                &transferred.signature.to_string(),
            )
            .await
        {
            Ok(0) => tracing::warn!(
                mint = %params.mint_address,
                "nft is not recorded, ownership not updated"
            ),
            Ok(_) => {}
            Err(error) => tracing::warn!("failed to update nft ownership: {}", error),
        }
    }

    Ok(web::Json(Output {
        signature: transferred.signature,
        funded_recipient: transferred.funded_recipient,
        explorer_url: solana_pay::explorer_url(&mint, &sol.cluster),
    }))
}
