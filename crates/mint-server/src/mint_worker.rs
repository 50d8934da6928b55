use std::sync::Arc;

use db::{DbPool, NewNft, Order, OrderStatus, OrderStore};
use pinata_api::Pinata;
use solana_nft::{
    metadata,
    mint::{MintParams, MintedNft, mint_nft},
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::SolanaContext;

#[derive(Debug, Clone, Copy)]
pub struct MintJob {
    pub order_id: Uuid,
}

/// Handle for submitting mint jobs to the worker task.
#[derive(Clone)]
pub struct MintQueue {
    tx: mpsc::UnboundedSender<MintJob>,
}

impl MintQueue {
    pub fn enqueue(&self, job: MintJob) {
        if self.tx.send(job).is_err() {
            tracing::error!(order_id = %job.order_id, "mint worker is gone, job dropped");
        }
    }
}

struct MintWorker {
    sol: Arc<SolanaContext>,
    pinata: Pinata,
    store: OrderStore,
    db: Option<DbPool>,
}

/// Spawn the dedicated mint task and hand back its queue. Jobs run one at a
/// time; a failed mint marks its order failed and the worker moves on.
pub fn start(
    sol: Arc<SolanaContext>,
    pinata: Pinata,
    store: OrderStore,
    db: Option<DbPool>,
) -> MintQueue {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = MintWorker {
        sol,
        pinata,
        store,
        db,
    };
    tokio::spawn(worker.run(rx));
    MintQueue { tx }
}

impl MintWorker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<MintJob>) {
        tracing::info!("mint worker started");
        while let Some(job) = rx.recv().await {
            if let Err(error) = self.process(job).await {
                tracing::error!(order_id = %job.order_id, "mint job failed: {}", error);
            }
        }
        tracing::info!("mint worker stopped");
    }

    async fn process(&self, job: MintJob) -> crate::error::Result<()> {
        let Some(order) = self.store.get(&job.order_id)? else {
            tracing::warn!(order_id = %job.order_id, "order disappeared before minting");
            return Ok(());
        };
        if order.status != OrderStatus::Minting {
            tracing::warn!(
                order_id = %job.order_id,
                status = %order.status,
                "order is not queued for minting, skipping"
            );
            return Ok(());
        }

        let (minted, metadata_url) = match self.mint_order(&order).await {
            Ok(ok) => ok,
            Err(error) => {
                let message = error.to_string();
                self.store.transition(
                    &job.order_id,
                    OrderStatus::Minting,
                    OrderStatus::Failed,
                    |o| o.error = Some(message.clone()),
                )?;
                tracing::error!(order_id = %job.order_id, "mint failed: {}", message);
                return Ok(());
            }
        };
        let mint_address = minted.mint.to_string();
        self.store.transition(
            &job.order_id,
            OrderStatus::Minting,
            OrderStatus::Completed,
            |o| o.mint_address = Some(mint_address.clone()),
        )?;
        tracing::info!(order_id = %job.order_id, mint = %minted.mint, "order completed");
        self.record(&order, &minted, &metadata_url).await;
        Ok(())
    }

    /// Pin the metadata document for the order's already-pinned media, then
    /// mint.
    async fn mint_order(&self, order: &Order) -> crate::error::Result<(MintedNft, String)> {
        let media_url = order.nft.ipfs_url.as_deref().ok_or_else(|| {
            crate::error::Error::custom(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "order has no pinned media",
            )
        })?;
        let content_type = order.nft.content_type.as_deref().unwrap_or("video/mp4");

        let creator = crate::api::parse_address(&order.creator)?;
        let payer = self.sol.creator_pubkey();
        let creators = metadata::single_creator(creator, &payer);

        let document = metadata::media_metadata(
            &order.nft.name,
            &order.nft.symbol,
            &order.nft.description,
            order.nft.royalty_basis_points,
            media_url,
            content_type,
            &creators,
        );
        let pinned = self.pinata.pin_json(&document).await?;
        let metadata_url = self.pinata.gateway_url(&pinned.ipfs_hash);

        let minted = mint_nft(
            &self.sol.client,
            &self.sol.creator,
            &MintParams {
                name: order.nft.name.clone(),
                symbol: order.nft.symbol.clone(),
                metadata_uri: metadata_url.clone(),
                royalty_basis_points: order.nft.royalty_basis_points,
                creators,
            },
            self.sol.priority_fee_micro_lamports,
        )
        .await?;
        Ok((minted, metadata_url))
    }

    async fn record(&self, order: &Order, minted: &MintedNft, metadata_url: &str) {
        let Some(db) = self.db.as_ref() else {
            return;
        };
        let new_nft = NewNft {
            title: order.nft.name.clone(),
            description: order.nft.description.clone(),
            royalty_basis_points: order.nft.royalty_basis_points as i32,
            author: order.creator.clone(),
            owner: order.creator.clone(),
            metadata_url: metadata_url.to_owned(),
            media_url: order.nft.ipfs_url.clone(),
            mint_address: minted.mint.to_string(),
        };
        if let Err(error) = db.insert_nft(&new_nft).await {
            tracing::warn!(mint = %minted.mint, "failed to record minted nft: {}", error);
        }
    }
}
