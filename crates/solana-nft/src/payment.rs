use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_client::{
    nonblocking::rpc_client::RpcClient, rpc_client::GetConfirmedSignaturesForAddress2Config,
    rpc_config::RpcTransactionConfig,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use solana_transaction_status::UiTransactionEncoding;

/// Signatures fetched per RPC page.
pub const SIGNATURE_PAGE_LIMIT: usize = 50;
/// Pages walked before giving up. Together with the page size this bounds
/// the scan horizon at 400 signatures per verification attempt.
pub const MAX_SIGNATURE_PAGES: usize = 8;

#[derive(Serialize, Debug, Clone)]
pub struct PaymentReceipt {
    #[serde(with = "crate::signature")]
    pub signature: Signature,
    pub lamports: u64,
    pub block_time: Option<i64>,
}

/// Match a transfer of at least `min_lamports` from `from` to `to` against
/// one transaction's balance sheet. Returns the lamports received. Both
/// parties must appear in the account keys, the sender's balance must have
/// gone down and the receiver's up.
pub fn match_balance_delta(
    account_keys: &[Pubkey],
    pre_balances: &[u64],
    post_balances: &[u64],
    from: &Pubkey,
    to: &Pubkey,
    min_lamports: u64,
) -> Option<u64> {
    let from_index = account_keys.iter().position(|key| key == from)?;
    let to_index = account_keys.iter().position(|key| key == to)?;

    let from_pre = *pre_balances.get(from_index)?;
    let from_post = *post_balances.get(from_index)?;
    let to_pre = *pre_balances.get(to_index)?;
    let to_post = *post_balances.get(to_index)?;

    if from_post >= from_pre {
        return None;
    }
    let received = to_post.checked_sub(to_pre)?;
    if received == 0 || received < min_lamports {
        return None;
    }
    Some(received)
}

/// Scan recent transactions to `to` for a payment of at least `min_lamports`
/// coming from `from` no earlier than `earliest`. Signatures are walked
/// newest-first in pages of [`SIGNATURE_PAGE_LIMIT`]; the scan stops at the
/// first entry older than the window, after [`MAX_SIGNATURE_PAGES`] pages, or
/// on the first match. A payment buried deeper than that horizon is reported
/// as not found.
pub async fn verify_payment(
    client: &RpcClient,
    from: &Pubkey,
    to: &Pubkey,
    min_lamports: u64,
    earliest: DateTime<Utc>,
) -> crate::Result<Option<PaymentReceipt>> {
    let earliest_ts = earliest.timestamp();
    let mut before: Option<Signature> = None;

    for _ in 0..MAX_SIGNATURE_PAGES {
        let entries = client
            .get_signatures_for_address_with_config(
                to,
                GetConfirmedSignaturesForAddress2Config {
                    before,
                    until: None,
                    limit: Some(SIGNATURE_PAGE_LIMIT),
                    commitment: Some(CommitmentConfig::confirmed()),
                },
            )
            .await?;

        if entries.is_empty() {
            break;
        }

        for entry in &entries {
            // Entries come newest-first, everything past this one is older.
            if entry.block_time.is_some_and(|t| t < earliest_ts) {
                return Ok(None);
            }
            if entry.err.is_some() {
                continue;
            }

            let signature: Signature =
                entry.signature.parse().map_err(crate::Error::custom)?;
            let tx = match client
                .get_transaction_with_config(
                    &signature,
                    RpcTransactionConfig {
                        encoding: Some(UiTransactionEncoding::Base64),
                        commitment: Some(CommitmentConfig::confirmed()),
                        max_supported_transaction_version: Some(0),
                    },
                )
                .await
            {
                Ok(tx) => tx,
                Err(error) => {
                    tracing::debug!(%signature, %error, "skipping transaction we could not fetch");
                    continue;
                }
            };

            let Some(meta) = &tx.transaction.meta else {
                continue;
            };
            if meta.err.is_some() {
                continue;
            }
            let Some(decoded) = tx.transaction.transaction.decode() else {
                continue;
            };

            let received = match_balance_delta(
                decoded.message.static_account_keys(),
                &meta.pre_balances,
                &meta.post_balances,
                from,
                to,
                min_lamports,
            );
            if let Some(lamports) = received {
                tracing::info!(%signature, lamports, "payment verified");
                return Ok(Some(PaymentReceipt {
                    signature,
                    lamports,
                    block_time: entry.block_time.or(tx.block_time),
                }));
            }
        }

        if entries.len() < SIGNATURE_PAGE_LIMIT {
            break;
        }
        before = match entries.last() {
            Some(entry) => match entry.signature.parse() {
                Ok(signature) => Some(signature),
                Err(_) => break,
            },
            None => break,
        };
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_SOL: u64 = 500_000_000;

    #[test]
    fn test_exact_payment_matches() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let keys = [from, to, program];
        // sender also pays the fee, so their delta exceeds the transfer
        let pre = [1_000_000_000, 0, 1];
        let post = [1_000_000_000 - 50_000_000 - 5_000, 50_000_000, 1];
        assert_eq!(
            match_balance_delta(&keys, &pre, &post, &from, &to, 50_000_000),
            Some(50_000_000)
        );
    }

    #[test]
    fn test_underpayment_does_not_match() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let keys = [from, to];
        let pre = [1_000_000_000, 0];
        let post = [1_000_000_000 - 40_000_000 - 5_000, 40_000_000];
        assert_eq!(
            match_balance_delta(&keys, &pre, &post, &from, &to, 50_000_000),
            None
        );
    }

    #[test]
    fn test_overpayment_matches() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let keys = [from, to];
        let pre = [1_000_000_000, 0];
        let post = [1_000_000_000 - HALF_SOL - 5_000, HALF_SOL];
        assert_eq!(
            match_balance_delta(&keys, &pre, &post, &from, &to, 50_000_000),
            Some(HALF_SOL)
        );
    }

    #[test]
    fn test_sender_absent_does_not_match() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let keys = [other, to];
        let pre = [1_000_000_000, 0];
        let post = [949_995_000, 50_000_000];
        assert_eq!(
            match_balance_delta(&keys, &pre, &post, &from, &to, 50_000_000),
            None
        );
    }

    #[test]
    fn test_sender_must_lose_balance() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let keys = [from, to];
        // both balances grew, someone else funded this transaction
        let pre = [1_000_000_000, 0];
        let post = [1_000_000_001, 50_000_000];
        assert_eq!(
            match_balance_delta(&keys, &pre, &post, &from, &to, 50_000_000),
            None
        );
    }

    #[test]
    fn test_receiver_must_gain_balance() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let keys = [from, to];
        let pre = [1_000_000_000, 50_000_000];
        let post = [999_995_000, 50_000_000];
        assert_eq!(match_balance_delta(&keys, &pre, &post, &from, &to, 0), None);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let keys = [to, from];
        let pre = [0, 1_000_000_000];
        let post = [50_000_000, 949_995_000];
        assert_eq!(
            match_balance_delta(&keys, &pre, &post, &from, &to, 50_000_000),
            Some(50_000_000)
        );
    }

    #[test]
    fn test_truncated_balances_do_not_match() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let keys = [from, to];
        let pre = [1_000_000_000];
        let post = [949_995_000];
        assert_eq!(
            match_balance_delta(&keys, &pre, &post, &from, &to, 50_000_000),
            None
        );
    }
}
