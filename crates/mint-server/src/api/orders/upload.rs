use crate::api::prelude::*;
use crate::api::upload;
use crate::mint_worker::{MintJob, MintQueue};
use actix_multipart::Multipart;
use uuid::Uuid;

#[derive(Serialize)]
pub struct Output {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub ipfs_url: String,
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/{order_id}/upload")
        .wrap(config.cors())
        .route(web::post().to(upload_media))
}

/// Attach the media file to a paid order. The file is pinned first, then the
/// order moves paid -> minting and a mint job is queued.
async fn upload_media(
    path: web::Path<Uuid>,
    payload: Multipart,
    pinata: web::Data<pinata_api::Pinata>,
    store: web::Data<OrderStore>,
    queue: web::Data<MintQueue>,
) -> Result<web::Json<Output>, Error> {
    let id = path.into_inner();
    let order = store.get(&id)?.ok_or(Error::NotFound)?;
    if order.status != OrderStatus::Paid {
        return Err(db::Error::StatusConflict {
            expected: OrderStatus::Paid,
            actual: order.status,
        }
        .into());
    }

    let (file, _fields) = upload::read_multipart(payload).await?;
    let file = file.ok_or_else(|| Error::custom(StatusCode::BAD_REQUEST, "missing file part"))?;
    upload::check_media_type(&file.content_type)?;

    let pinned = pinata
        .pin_file(&file.file_name, &file.content_type, file.bytes)
        .await?;
    let ipfs_url = pinata.gateway_url(&pinned.ipfs_hash);

    let content_type = file.content_type.clone();
    let url = ipfs_url.clone();
    let order = store.transition(&id, OrderStatus::Paid, OrderStatus::Minting, move |o| {
        o.nft.ipfs_url = Some(url.clone());
        o.nft.content_type = Some(content_type.clone());
    })?;
    queue.enqueue(MintJob { order_id: id });

    tracing::info!(order_id = %id, "media pinned, mint queued");

    Ok(web::Json(Output {
        order_id: id,
        status: order.status,
        ipfs_url,
    }))
}
