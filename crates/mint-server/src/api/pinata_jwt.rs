use super::prelude::*;

#[derive(Serialize)]
pub struct Output {
    pub token: String,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/jwt")
        .wrap(config.cors())
        .route(web::get().to(pinata_jwt))
}

/// Hand the configured Pinata JWT to clients that upload straight to IPFS.
async fn pinata_jwt(config: web::Data<Config>) -> Result<web::Json<Output>, Error> {
    match &config.pinata.jwt {
        Some(token) => Ok(web::Json(Output {
            token: token.clone(),
        })),
        None => Err(Error::not_configured("pinata.jwt")),
    }
}
