use super::prelude::*;
use crate::api::upload;
use actix_multipart::Multipart;
use db::NewNft;
use solana_nft::{
    metadata,
    mint::{MintParams, mint_nft},
    solana_pay,
};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

#[derive(Serialize)]
pub struct Output {
    #[serde(with = "solana_nft::pubkey")]
    pub mint_address: Pubkey,
    pub metadata_url: String,
    pub media_url: String,
    #[serde(with = "solana_nft::signature")]
    pub signature: Signature,
    pub explorer_url: String,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/mint")
        .wrap(config.cors())
        .route(web::post().to(mint))
}

/// Pin the uploaded media and its metadata document, then mint a one-of-one
/// NFT crediting the submitted creator wallet.
async fn mint(
    payload: Multipart,
    sol: web::Data<SolanaContext>,
    pinata: web::Data<pinata_api::Pinata>,
    db: web::Data<Option<DbPool>>,
) -> Result<web::Json<Output>, Error> {
    let (file, fields) = upload::read_multipart(payload).await?;
    let file = file.ok_or_else(|| Error::custom(StatusCode::BAD_REQUEST, "missing file part"))?;
    upload::check_media_type(&file.content_type)?;

    let name = upload::require_field(&fields, "name")?.to_owned();
    let symbol = upload::require_field(&fields, "symbol")?.to_owned();
    let description = upload::require_field(&fields, "description")?.to_owned();
    let royalty_basis_points = upload::require_field(&fields, "royalty_basis_points")?
        .parse::<u16>()
        .map_err(|_| {
            Error::custom(
                StatusCode::BAD_REQUEST,
                "royalty_basis_points must be an integer between 0 and 10000",
            )
        })?;
    let creator = super::parse_address(upload::require_field(&fields, "creator")?)?;
    metadata::check_royalty_basis_points(royalty_basis_points)?;

    let payer = sol.creator_pubkey();
    let creators = metadata::single_creator(creator, &payer);

    let media = pinata
        .pin_file(&file.file_name, &file.content_type, file.bytes)
        .await?;
    let media_url = pinata.gateway_url(&media.ipfs_hash);

    let document = metadata::media_metadata(
        &name,
        &symbol,
        &description,
        royalty_basis_points,
        &media_url,
        &file.content_type,
        &creators,
    );
    let pinned = pinata.pin_json(&document).await?;
    let metadata_url = pinata.gateway_url(&pinned.ipfs_hash);

    let minted = mint_nft(
        &sol.client,
        &sol.creator,
        &MintParams {
            name: name.clone(),
            symbol,
            metadata_uri: metadata_url.clone(),
            royalty_basis_points,
            creators,
        },
        sol.priority_fee_micro_lamports,
    )
    .await?;

    if let Some(db) = db.as_ref() {
        let new_nft = NewNft {
            title: name,
            description,
            royalty_basis_points: royalty_basis_points as i32,
            author: creator.to_string(),
            owner: creator.to_string(),
            metadata_url: metadata_url.clone(),
            media_url: Some(media_url.clone()),
            mint_address: minted.mint.to_string(),
        };
        if let Err(error) = db.insert_nft(&new_nft).await {
            tracing::warn!(mint = %minted.mint, "failed to record minted nft: {}", error);
        }
    }

    Ok(web::Json(Output {
        explorer_url: solana_pay::explorer_url(&minted.mint, &sol.cluster),
        mint_address: minted.mint,
        metadata_url,
        media_url,
        signature: minted.signature,
    }))
}
