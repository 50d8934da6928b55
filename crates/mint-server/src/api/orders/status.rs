use crate::api::prelude::*;
use chrono::{DateTime, Utc};
use db::Order;
use solana_nft::{payment, solana_pay};
use uuid::Uuid;

#[derive(Serialize)]
pub struct Output {
    pub order_id: Uuid,
    pub status: OrderStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    pub payment_signature: Option<String>,
    pub mint_address: Option<String>,
    pub explorer_url: Option<String>,
    pub error: Option<String>,
}

impl Output {
    fn from_order(order: Order, cluster: &str) -> Self {
        let explorer_url = order
            .mint_address
            .as_deref()
            .and_then(|m| m.parse().ok())
            .map(|m| solana_pay::explorer_url(&m, cluster));
        Self {
            order_id: order.id,
            status: order.status,
            expires_at: order.expires_at,
            payment_signature: order.payment_signature,
            mint_address: order.mint_address,
            explorer_url,
            error: order.error,
        }
    }
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/{order_id}/status")
        .wrap(config.cors())
        .route(web::get().to(order_status))
}

/// Poll an order. While the order is pending this also runs the payment
/// scan, using the order's creation time as the window start, and moves it
/// to paid on a match.
async fn order_status(
    path: web::Path<Uuid>,
    sol: web::Data<SolanaContext>,
    store: web::Data<OrderStore>,
) -> Result<web::Json<Output>, Error> {
    let id = path.into_inner();
    let mut order = store.get(&id)?.ok_or(Error::NotFound)?;

    if order.status == OrderStatus::Pending {
        let from = crate::api::parse_address(&order.creator)?;
        let to = sol.backend_wallet()?;
        let receipt = payment::verify_payment(
            &sol.client,
            &from,
            &to,
            order.amount_lamports,
            order.created_at,
        )
        .await?;

        if let Some(receipt) = receipt {
            let signature = receipt.signature.to_string();
            match store.transition(&id, OrderStatus::Pending, OrderStatus::Paid, |o| {
                o.payment_signature = Some(signature.clone());
            }) {
                Ok(updated) => {
                    tracing::info!(order_id = %id, signature = %receipt.signature, "order paid");
                    order = updated;
                }
                // raced with another poll or the sweeper; report the current state
                Err(db::Error::StatusConflict { .. }) => {
                    order = store.get(&id)?.ok_or(Error::NotFound)?;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    Ok(web::Json(Output::from_order(order, &sol.cluster)))
}
