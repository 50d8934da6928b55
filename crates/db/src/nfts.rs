use crate::{pool::DbPool, Error};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;
use uuid::Uuid;

#[derive(Serialize, Debug, Clone)]
pub struct NftRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub royalty_basis_points: i32,
    pub author: String,
    pub owner: String,
    pub metadata_url: String,
    pub media_url: Option<String>,
    pub mint_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Row> for NftRow {
    type Error = crate::Error;

    fn try_from(row: Row) -> crate::Result<Self> {
        Ok(Self {
            id: row.try_get("id").map_err(Error::data("nfts.id"))?,
            title: row.try_get("title").map_err(Error::data("nfts.title"))?,
            description: row
                .try_get("description")
                .map_err(Error::data("nfts.description"))?,
            royalty_basis_points: row
                .try_get("royalty_basis_points")
                .map_err(Error::data("nfts.royalty_basis_points"))?,
            author: row.try_get("author").map_err(Error::data("nfts.author"))?,
            owner: row.try_get("owner").map_err(Error::data("nfts.owner"))?,
            metadata_url: row
                .try_get("metadata_url")
                .map_err(Error::data("nfts.metadata_url"))?,
            media_url: row
                .try_get("media_url")
                .map_err(Error::data("nfts.media_url"))?,
            mint_address: row
                .try_get("mint_address")
                .map_err(Error::data("nfts.mint_address"))?,
            created_at: row
                .try_get("created_at")
                .map_err(Error::data("nfts.created_at"))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(Error::data("nfts.updated_at"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewNft {
    pub title: String,
    pub description: String,
    pub royalty_basis_points: i32,
    pub author: String,
    pub owner: String,
    pub metadata_url: String,
    pub media_url: Option<String>,
    pub mint_address: String,
}

impl DbPool {
    pub async fn insert_nft(&self, nft: &NewNft) -> crate::Result<NftRow> {
        let conn = self.get_conn().await?;
        conn.query_one(
            "INSERT INTO nfts
                (title, description, royalty_basis_points, author, owner,
                 metadata_url, media_url, mint_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
            &[
                &nft.title,
                &nft.description,
                &nft.royalty_basis_points,
                &nft.author,
                &nft.owner,
                &nft.metadata_url,
                &nft.media_url,
                &nft.mint_address,
            ],
        )
        .await
        .map_err(Error::exec("insert nfts"))?
        .try_into()
    }

    pub async fn get_nft_by_mint(&self, mint_address: &str) -> crate::Result<NftRow> {
        let conn = self.get_conn().await?;
        conn.query_opt(
            "SELECT * FROM nfts WHERE mint_address = $1",
            &[&mint_address],
        )
        .await
        .map_err(Error::exec("query nfts"))?
        .ok_or_else(|| Error::not_found("nft", mint_address))?
        .try_into()
    }

    /// Returns the number of rows touched, 0 when the mint was never recorded.
    pub async fn update_nft_royalty(
        &self,
        mint_address: &str,
        royalty_basis_points: i32,
    ) -> crate::Result<u64> {
        let conn = self.get_conn().await?;
        conn.execute(
            "UPDATE nfts
             SET royalty_basis_points = $2, updated_at = now()
             WHERE mint_address = $1",
            &[&mint_address, &royalty_basis_points],
        )
        .await
        .map_err(Error::exec("update nfts royalty"))
    }

    /// Move ownership of a recorded NFT and append an audit row, atomically.
    /// Returns 0 without writing anything when the mint was never recorded.
    pub async fn transfer_nft_ownership(
        &self,
        mint_address: &str,
        to_address: &str,
        signature: &str,
    ) -> crate::Result<u64> {
        let mut conn = self.get_conn().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(Error::exec("start transfer"))?;

        let row = tx
            .query_opt(
                "SELECT owner FROM nfts WHERE mint_address = $1 FOR UPDATE",
                &[&mint_address],
            )
            .await
            .map_err(Error::exec("lock nfts row"))?;
        let Some(row) = row else {
            return Ok(0);
        };
        let from_address: String = row.try_get(0).map_err(Error::data("nfts.owner"))?;

        tx.execute(
            "UPDATE nfts SET owner = $2, updated_at = now() WHERE mint_address = $1",
            &[&mint_address, &to_address],
        )
        .await
        .map_err(Error::exec("update nfts owner"))?;
        tx.execute(
            "INSERT INTO nft_transfers (mint_address, from_address, to_address, signature)
             VALUES ($1, $2, $3, $4)",
            &[&mint_address, &from_address, &to_address, &signature],
        )
        .await
        .map_err(Error::exec("insert nft_transfers"))?;

        tx.commit().await.map_err(Error::exec("commit transfer"))?;
        Ok(1)
    }
}
