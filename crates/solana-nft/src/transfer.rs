use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};

use crate::utils;

#[derive(Debug, Clone)]
pub struct TransferredNft {
    pub mint: Pubkey,
    pub from_token_account: Pubkey,
    pub to_token_account: Pubkey,
    /// Whether the recipient's associated token account was created as part
    /// of this transfer.
    pub funded_recipient: bool,
    pub signature: Signature,
}

/// Instructions moving one token of `mint` from the sender's associated
/// token account to the recipient's. When `fund_recipient` is set the
/// recipient's account is created first, paid for by the sender.
pub fn transfer_instructions(
    sender: &Pubkey,
    mint: &Pubkey,
    recipient: &Pubkey,
    fund_recipient: bool,
) -> crate::Result<Vec<Instruction>> {
    let from_token_account = get_associated_token_address(sender, mint);
    let to_token_account = get_associated_token_address(recipient, mint);

    let mut instructions = Vec::with_capacity(2);
    if fund_recipient {
        instructions.push(create_associated_token_account(
            sender,
            recipient,
            mint,
            &spl_token::id(),
        ));
    }
    instructions.push(spl_token::instruction::transfer_checked(
        &spl_token::id(),
        &from_token_account,
        mint,
        &to_token_account,
        sender,
        &[],
        1,
        0,
    )?);

    Ok(instructions)
}

/// Transfer an NFT out of the signer's wallet. The recipient's associated
/// token account is created on the fly if it does not exist yet.
pub async fn transfer_nft(
    client: &RpcClient,
    sender: &Keypair,
    mint: &Pubkey,
    recipient: &Pubkey,
) -> crate::Result<TransferredNft> {
    let from_token_account = get_associated_token_address(&sender.pubkey(), mint);
    let to_token_account = get_associated_token_address(recipient, mint);

    let fund_recipient = client
        .get_account_with_commitment(&to_token_account, client.commitment())
        .await?
        .value
        .is_none();

    let mut minimum_balance_for_rent_exemption = 0;
    if fund_recipient {
        minimum_balance_for_rent_exemption += client
            .get_minimum_balance_for_rent_exemption(spl_token::state::Account::LEN)
            .await?;
    }

    let instructions = transfer_instructions(&sender.pubkey(), mint, recipient, fund_recipient)?;

    let (mut tx, recent_blockhash) = utils::execute(
        client,
        &sender.pubkey(),
        &instructions,
        minimum_balance_for_rent_exemption,
    )
    .await?;
    tx.try_sign(&[sender], recent_blockhash)?;

    let signature = utils::submit_transaction(client, tx).await?;

    tracing::info!(%mint, %recipient, funded_recipient = fund_recipient, %signature, "transferred NFT");

    Ok(TransferredNft {
        mint: *mint,
        from_token_account,
        to_token_account,
        funded_recipient: fund_recipient,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funded_recipient_skips_account_creation() {
        let sender = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let ins = transfer_instructions(&sender, &mint, &recipient, false).unwrap();
        assert_eq!(ins.len(), 1);
        assert_eq!(ins[0].program_id, spl_token::id());
    }

    #[test]
    fn test_unfunded_recipient_gets_account() {
        let sender = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let ins = transfer_instructions(&sender, &mint, &recipient, true).unwrap();
        assert_eq!(ins.len(), 2);
        assert_eq!(ins[0].program_id, spl_associated_token_account::id());
        // funded account matches the transfer destination
        let to = get_associated_token_address(&recipient, &mint);
        assert_eq!(ins[0].accounts[1].pubkey, to);
        assert_eq!(ins[1].accounts[2].pubkey, to);
    }

    #[test]
    fn test_transfer_moves_between_atas() {
        let sender = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let ins = transfer_instructions(&sender, &mint, &recipient, false).unwrap();
        assert_eq!(
            ins[0].accounts[0].pubkey,
            get_associated_token_address(&sender, &mint)
        );
        assert_eq!(
            ins[0].accounts[2].pubkey,
            get_associated_token_address(&recipient, &mint)
        );
        assert!(ins[0]
            .accounts
            .iter()
            .any(|a| a.pubkey == sender && a.is_signer));
    }
}
