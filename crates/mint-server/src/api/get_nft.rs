use super::prelude::*;
use db::NftRow;

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/{mint_address}")
        .wrap(config.cors())
        .route(web::get().to(get_nft))
}

async fn get_nft(
    path: web::Path<String>,
    db: web::Data<Option<DbPool>>,
) -> Result<web::Json<NftRow>, Error> {
    let Some(db) = db.as_ref() else {
        return Err(Error::not_configured("db"));
    };
    let row = db.get_nft_by_mint(&path).await?;
    Ok(web::Json(row))
}
