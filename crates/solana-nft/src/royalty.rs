use mpl_token_metadata::{
    accounts::Metadata, instructions::UpdateMetadataAccountV2Builder, types::DataV2,
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};

use crate::metadata;
use crate::utils;

#[derive(Debug, Clone)]
pub struct UpdatedRoyalty {
    pub mint: Pubkey,
    pub metadata_account: Pubkey,
    pub previous_basis_points: u16,
    pub royalty_basis_points: u16,
    pub signature: Signature,
}

/// Read the metadata account belonging to `mint`.
pub async fn fetch_metadata(client: &RpcClient, mint: &Pubkey) -> crate::Result<Metadata> {
    let (metadata_account, _) = Metadata::find_pda(mint);
    let account = client
        .get_account_with_commitment(&metadata_account, client.commitment())
        .await?
        .value
        .ok_or(crate::Error::MetadataNotFound(*mint))?;
    Metadata::from_bytes(&account.data).map_err(crate::Error::custom)
}

// On-chain strings are stored in fixed-size fields, NUL padded.
fn trim_padding(s: &str) -> &str {
    s.trim_end_matches('\0')
}

/// Current on-chain data as an update payload, padding stripped.
pub fn current_data(meta: &Metadata) -> DataV2 {
    DataV2 {
        name: trim_padding(&meta.name).to_owned(),
        symbol: trim_padding(&meta.symbol).to_owned(),
        uri: trim_padding(&meta.uri).to_owned(),
        seller_fee_basis_points: meta.seller_fee_basis_points,
        creators: meta.creators.clone(),
        collection: meta.collection.clone(),
        uses: meta.uses.clone(),
    }
}

/// Change the royalty on an existing mint. The rest of the metadata is read
/// back from chain and resubmitted as-is, so the update touches nothing but
/// `seller_fee_basis_points`. The signer must be the update authority, on-chain
/// validation rejects anyone else.
pub async fn update_royalty(
    client: &RpcClient,
    update_authority: &Keypair,
    mint: &Pubkey,
    royalty_basis_points: u16,
) -> crate::Result<UpdatedRoyalty> {
    metadata::check_royalty_basis_points(royalty_basis_points)?;

    let meta = fetch_metadata(client, mint).await?;
    let previous_basis_points = meta.seller_fee_basis_points;
    let data = metadata::merge_royalty(current_data(&meta), royalty_basis_points);

    let (metadata_account, _) = Metadata::find_pda(mint);
    let mut builder = UpdateMetadataAccountV2Builder::new();
    builder
        .metadata(metadata_account)
        .update_authority(update_authority.pubkey())
        .data(data);
    let instruction = builder.instruction();

    let (mut tx, recent_blockhash) =
        utils::execute(client, &update_authority.pubkey(), &[instruction], 0).await?;
    tx.try_sign(&[update_authority], recent_blockhash)?;

    let signature = utils::submit_transaction(client, tx).await?;

    tracing::info!(
        %mint,
        previous_basis_points,
        royalty_basis_points,
        %signature,
        "updated NFT royalty"
    );

    Ok(UpdatedRoyalty {
        mint: *mint,
        metadata_account,
        previous_basis_points,
        royalty_basis_points,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_padding() {
        assert_eq!(trim_padding("Clip #1\0\0\0\0"), "Clip #1");
        assert_eq!(trim_padding("CLIP"), "CLIP");
        assert_eq!(trim_padding(""), "");
    }

    #[tokio::test]
    async fn test_out_of_range_royalty_rejected_before_rpc() {
        let client = RpcClient::new("http://invalid.localhost".to_owned());
        let authority = Keypair::new();
        let mint = Pubkey::new_unique();
        let result = update_royalty(&client, &authority, &mint, 10001).await;
        assert!(matches!(result, Err(crate::Error::RoyaltyOutOfRange(10001))));
    }
}
