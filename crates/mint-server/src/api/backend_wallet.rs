use super::prelude::*;
use solana_sdk::pubkey::Pubkey;

#[derive(Serialize)]
pub struct Output {
    #[serde(with = "solana_nft::pubkey")]
    pub address: Pubkey,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/backend-wallet")
        .wrap(config.cors())
        .route(web::get().to(backend_wallet))
}

async fn backend_wallet(sol: web::Data<SolanaContext>) -> Result<web::Json<Output>, Error> {
    Ok(web::Json(Output {
        address: sol.backend_wallet()?,
    }))
}
