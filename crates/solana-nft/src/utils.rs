use rust_decimal::{prelude::ToPrimitive, Decimal};
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_request::{RpcError, RpcResponseErrorData},
    rpc_response::RpcSimulateTransactionResult,
};
use solana_program::{
    hash::Hash, instruction::Instruction, message::Message, native_token::LAMPORTS_PER_SOL,
};
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};

/// Build an unsigned transaction over a fresh blockhash, after checking the
/// fee payer can cover rent and the transaction fee.
pub async fn execute(
    client: &RpcClient,
    fee_payer: &Pubkey,
    instructions: &[Instruction],
    minimum_balance_for_rent_exemption: u64,
) -> crate::Result<(Transaction, Hash)> {
    let recent_blockhash = client.get_latest_blockhash().await?;

    let message = Message::new_with_blockhash(instructions, Some(fee_payer), &recent_blockhash);

    let balance = client.get_balance(fee_payer).await?;

    let needed = minimum_balance_for_rent_exemption + client.get_fee_for_message(&message).await?;

    if balance < needed {
        return Err(crate::Error::InsufficientSolanaBalance { balance, needed });
    }

    let transaction = Transaction::new_unsigned(message);

    Ok((transaction, recent_blockhash))
}

pub async fn submit_transaction(client: &RpcClient, tx: Transaction) -> crate::Result<Signature> {
    Ok(client.send_and_confirm_transaction(&tx).await?)
}

pub fn sol_to_lamports(amount: Decimal) -> crate::Result<u64> {
    if amount < Decimal::ZERO {
        return Err(crate::Error::InvalidAmount("amount is negative".to_owned()));
    }
    amount
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .and_then(|d| d.floor().to_u64())
        .ok_or_else(|| crate::Error::InvalidAmount("amount overflow".to_owned()))
}

pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)
}

pub fn find_failed_instruction(err: &ClientError) -> Option<usize> {
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError { message, .. }) = &err.kind {
        if let Some(s) =
            message.strip_prefix("Transaction simulation failed: Error processing Instruction ")
        {
            let index = s
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>();
            index.parse().ok()
        } else {
            None
        }
    } else {
        None
    }
}

/// Render an RPC error together with simulation logs when the node returned
/// them, so mint failures are debuggable from the error string alone.
pub fn verbose_solana_error(err: &ClientError) -> String {
    use std::fmt::Write;
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
        code,
        message,
        data,
    }) = &err.kind
    {
        let mut s = String::new();
        writeln!(s, "{} ({})", message, code).unwrap();
        if let RpcResponseErrorData::SendTransactionPreflightFailure(
            RpcSimulateTransactionResult {
                logs: Some(logs), ..
            },
        ) = data
        {
            for (i, log) in logs.iter().enumerate() {
                writeln!(s, "{}: {}", i + 1, log).unwrap();
            }
        }
        s
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_sol_to_lamports() {
        assert_eq!(
            sol_to_lamports(Decimal::from_str("0.05").unwrap()).unwrap(),
            50_000_000
        );
        assert_eq!(sol_to_lamports(Decimal::ONE).unwrap(), LAMPORTS_PER_SOL);
        assert_eq!(sol_to_lamports(Decimal::ZERO).unwrap(), 0);
        // sub-lamport dust is floored
        assert_eq!(
            sol_to_lamports(Decimal::from_str("0.0000000019").unwrap()).unwrap(),
            1
        );
        assert!(sol_to_lamports(Decimal::from_str("-1").unwrap()).is_err());
    }

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(
            lamports_to_sol(50_000_000),
            Decimal::from_str("0.05").unwrap()
        );
        assert_eq!(
            sol_to_lamports(lamports_to_sol(123_456_789)).unwrap(),
            123_456_789
        );
    }
}
