use crate::api::prelude::*;
use uuid::Uuid;

#[derive(Serialize)]
pub struct Output {
    pub order_id: Uuid,
    pub qr_payload: String,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/{order_id}/qr")
        .wrap(config.cors())
        .route(web::get().to(order_qr))
}

async fn order_qr(
    path: web::Path<Uuid>,
    store: web::Data<OrderStore>,
) -> Result<web::Json<Output>, Error> {
    let id = path.into_inner();
    let order = store.get(&id)?.ok_or(Error::NotFound)?;
    let qr_payload = order.qr_payload.ok_or(Error::NotFound)?;
    Ok(web::Json(Output { order_id: id, qr_payload }))
}
