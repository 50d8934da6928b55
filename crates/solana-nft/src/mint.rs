use mpl_token_metadata::{
    accounts::{MasterEdition, Metadata},
    instructions::{
        CreateMasterEditionV3, CreateMasterEditionV3InstructionArgs, CreateMetadataAccountV3,
        CreateMetadataAccountV3InstructionArgs,
    },
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::{system_instruction, system_program};
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use spl_token::state::Mint;

use crate::metadata::{self, NftCreator};
use crate::utils;

#[derive(Debug, Clone)]
pub struct MintParams {
    pub name: String,
    pub symbol: String,
    /// URI of the pinned metadata document.
    pub metadata_uri: String,
    pub royalty_basis_points: u16,
    pub creators: Vec<NftCreator>,
}

#[derive(Debug, Clone)]
pub struct MintedNft {
    pub mint: Pubkey,
    pub token_account: Pubkey,
    pub metadata_account: Pubkey,
    pub master_edition_account: Pubkey,
    pub signature: Signature,
}

/// Full instruction list for minting a one-of-one NFT, in submission order:
/// priority fee, mint account, initialize mint, payer's associated token
/// account, mint one token, metadata account, master edition. All of it goes
/// into a single transaction so a failure anywhere leaves no partial state.
pub fn mint_nft_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    params: &MintParams,
    minimum_balance_for_rent_exemption: u64,
    priority_fee_micro_lamports: u64,
) -> crate::Result<Vec<Instruction>> {
    metadata::check_royalty_basis_points(params.royalty_basis_points)?;
    metadata::check_creator_shares(&params.creators)?;

    let token_account = get_associated_token_address(payer, mint);
    let (metadata_account, _) = Metadata::find_pda(mint);
    let (master_edition_account, _) = MasterEdition::find_pda(mint);

    let create_metadata_ix = CreateMetadataAccountV3 {
        metadata: metadata_account,
        mint: *mint,
        mint_authority: *payer,
        payer: *payer,
        update_authority: (*payer, true),
        system_program: system_program::id(),
        rent: None,
    }
    .instruction(CreateMetadataAccountV3InstructionArgs {
        data: metadata::nft_data(
            &params.name,
            &params.symbol,
            &params.metadata_uri,
            params.royalty_basis_points,
            &params.creators,
        ),
        is_mutable: true,
        collection_details: None,
    });

    let create_master_edition_ix = CreateMasterEditionV3 {
        edition: master_edition_account,
        mint: *mint,
        update_authority: *payer,
        mint_authority: *payer,
        payer: *payer,
        metadata: metadata_account,
        token_program: spl_token::id(),
        system_program: system_program::id(),
        rent: None,
    }
    .instruction(CreateMasterEditionV3InstructionArgs { max_supply: None });

    Ok(vec![
        ComputeBudgetInstruction::set_compute_unit_price(priority_fee_micro_lamports),
        system_instruction::create_account(
            payer,
            mint,
            minimum_balance_for_rent_exemption,
            Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint2(
            &spl_token::id(),
            mint,
            payer,
            Some(payer),
            0,
        )?,
        create_associated_token_account(payer, payer, mint, &spl_token::id()),
        spl_token::instruction::mint_to_checked(
            &spl_token::id(),
            mint,
            &token_account,
            payer,
            &[],
            1,
            0,
        )?,
        create_metadata_ix,
        create_master_edition_ix,
    ])
}

/// Mint a fresh NFT with `payer` as mint, freeze and update authority.
/// Generates the mint keypair here; both keys sign the one transaction.
pub async fn mint_nft(
    client: &RpcClient,
    payer: &Keypair,
    params: &MintParams,
    priority_fee_micro_lamports: u64,
) -> crate::Result<MintedNft> {
    let mint_keypair = Keypair::new();
    let mint = mint_keypair.pubkey();

    let minimum_balance_for_rent_exemption = client
        .get_minimum_balance_for_rent_exemption(Mint::LEN)
        .await?;

    let instructions = mint_nft_instructions(
        &payer.pubkey(),
        &mint,
        params,
        minimum_balance_for_rent_exemption,
        priority_fee_micro_lamports,
    )?;

    let (mut tx, recent_blockhash) = utils::execute(
        client,
        &payer.pubkey(),
        &instructions,
        minimum_balance_for_rent_exemption,
    )
    .await?;
    tx.try_sign(&[payer, &mint_keypair], recent_blockhash)?;

    let signature = utils::submit_transaction(client, tx).await?;

    tracing::info!(%mint, %signature, "minted NFT");

    Ok(MintedNft {
        mint,
        token_account: get_associated_token_address(&payer.pubkey(), &mint),
        metadata_account: Metadata::find_pda(&mint).0,
        master_edition_account: MasterEdition::find_pda(&mint).0,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::single_creator;

    fn params(payer: &Pubkey) -> MintParams {
        MintParams {
            name: "Clip #1".to_owned(),
            symbol: "CLIP".to_owned(),
            metadata_uri: "https://gateway.pinata.cloud/ipfs/QmMeta".to_owned(),
            royalty_basis_points: 500,
            creators: single_creator(*payer, payer),
        }
    }

    #[test]
    fn test_instruction_sequence() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ins = mint_nft_instructions(&payer, &mint, &params(&payer), 1_461_600, 10_000).unwrap();
        assert_eq!(ins.len(), 7);
        assert_eq!(ins[0].program_id, solana_sdk::compute_budget::id());
        assert_eq!(ins[1].program_id, system_program::id());
        assert_eq!(ins[2].program_id, spl_token::id());
        assert_eq!(ins[3].program_id, spl_associated_token_account::id());
        assert_eq!(ins[4].program_id, spl_token::id());
        assert_eq!(ins[5].program_id, mpl_token_metadata::ID);
        assert_eq!(ins[6].program_id, mpl_token_metadata::ID);
    }

    #[test]
    fn test_mint_account_created_with_mint_len() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ins = mint_nft_instructions(&payer, &mint, &params(&payer), 1_461_600, 10_000).unwrap();
        // create_account carries the new account as the second writable signer
        assert_eq!(ins[1].accounts[0].pubkey, payer);
        assert_eq!(ins[1].accounts[1].pubkey, mint);
        assert!(ins[1].accounts[1].is_signer);
    }

    #[test]
    fn test_token_account_is_payer_ata() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ins = mint_nft_instructions(&payer, &mint, &params(&payer), 1_461_600, 10_000).unwrap();
        let ata = get_associated_token_address(&payer, &mint);
        // mint_to destination
        assert_eq!(ins[4].accounts[1].pubkey, ata);
        // ATA creation instruction funds the same account
        assert_eq!(ins[3].accounts[1].pubkey, ata);
    }

    #[test]
    fn test_rejects_bad_royalty() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut p = params(&payer);
        p.royalty_basis_points = 10001;
        assert!(matches!(
            mint_nft_instructions(&payer, &mint, &p, 0, 10_000),
            Err(crate::Error::RoyaltyOutOfRange(10001))
        ));
    }

    #[test]
    fn test_rejects_bad_shares() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut p = params(&payer);
        p.creators[0].share = 50;
        assert!(matches!(
            mint_nft_instructions(&payer, &mint, &p, 0, 10_000),
            Err(crate::Error::InvalidCreatorShares(50))
        ));
    }
}
