use super::prelude::*;
use solana_nft::royalty;
use solana_sdk::signature::Signature;

#[derive(Deserialize)]
pub struct Params {
    pub mint_address: String,
    pub royalty_basis_points: u16,
}

#[derive(Serialize)]
pub struct Output {
    #[serde(with = "solana_nft::signature")]
    pub signature: Signature,
    pub royalty_basis_points: u16,
    pub previous_basis_points: u16,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/update-royalty")
        .wrap(config.cors())
        .route(web::post().to(update_royalty))
}

async fn update_royalty(
    params: web::Json<Params>,
    sol: web::Data<SolanaContext>,
    db: web::Data<Option<DbPool>>,
) -> Result<web::Json<Output>, Error> {
    let mint = super::parse_address(&params.mint_address)?;

    let updated =
        royalty::update_royalty(&sol.client, &sol.creator, &mint, params.royalty_basis_points)
            .await?;

    if let Some(db) = db.as_ref() {
        match db
            .update_nft_royalty(&params.mint_address, params.royalty_basis_points as i32)
            .await
        {
            Ok(0) => tracing::warn!(
                mint = %params.mint_address,
                "nft is not recorded, royalty row not updated"
            ),
            Ok(_) => {}
            Err(error) => tracing::warn!("failed to update nft royalty row: {}", error),
        }
    }

    Ok(web::Json(Output {
        signature: updated.signature,
        royalty_basis_points: updated.royalty_basis_points,
        previous_basis_points: updated.previous_basis_points,
    }))
}
