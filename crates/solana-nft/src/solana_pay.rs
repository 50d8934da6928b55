use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use url::form_urlencoded;

/// Solana Pay transfer request URL, scannable as a QR code.
/// `reference` lets the payer's transaction be tied back to an order.
pub fn payment_url(
    recipient: &Pubkey,
    amount: Decimal,
    label: &str,
    message: &str,
    reference: Option<&str>,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("amount", &amount.normalize().to_string());
    query.append_pair("label", label);
    query.append_pair("message", message);
    if let Some(reference) = reference {
        query.append_pair("reference", reference);
    }
    format!("solana:{recipient}?{}", query.finish())
}

/// Universal link opening `pay_url` inside Phantom's in-app browser.
/// `origin` identifies the requesting site to the wallet.
pub fn phantom_deeplink(pay_url: &str, origin: &str) -> String {
    let encoded_url: String = form_urlencoded::byte_serialize(pay_url.as_bytes()).collect();
    let encoded_origin: String = form_urlencoded::byte_serialize(origin.as_bytes()).collect();
    format!("https://phantom.app/ul/browse/{encoded_url}?ref={encoded_origin}")
}

/// Solana explorer page for an address. The explorer assumes mainnet unless
/// told otherwise.
pub fn explorer_url(address: &Pubkey, cluster: &str) -> String {
    if cluster == "mainnet-beta" {
        format!("https://explorer.solana.com/address/{address}")
    } else {
        format!("https://explorer.solana.com/address/{address}?cluster={cluster}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_payment_url() {
        let recipient = Pubkey::new_unique();
        let url = payment_url(
            &recipient,
            Decimal::from_str("0.05").unwrap(),
            "NFT Mint Fee",
            "Payment for NFT minting",
            Some("0198e9a1-7e27-7e58-b0ea-d3f95fbc5d64"),
        );
        assert!(url.starts_with(&format!("solana:{recipient}?")));
        assert!(url.contains("amount=0.05"));
        assert!(url.contains("label=NFT+Mint+Fee"));
        assert!(url.contains("reference=0198e9a1-7e27-7e58-b0ea-d3f95fbc5d64"));
    }

    #[test]
    fn test_payment_url_amount_is_normalized() {
        let recipient = Pubkey::new_unique();
        let url = payment_url(
            &recipient,
            Decimal::from_str("0.0500").unwrap(),
            "Payment",
            "Solana Payment",
            None,
        );
        assert!(url.contains("amount=0.05&"));
        assert!(!url.contains("reference="));
    }

    #[test]
    fn test_phantom_deeplink_encodes_pay_url() {
        let recipient = Pubkey::new_unique();
        let pay_url = payment_url(
            &recipient,
            Decimal::from_str("0.05").unwrap(),
            "NFT Mint Fee",
            "Payment",
            None,
        );
        let link = phantom_deeplink(&pay_url, "https://example.app");
        assert!(link.starts_with("https://phantom.app/ul/browse/solana%3A"));
        assert!(link.ends_with("?ref=https%3A%2F%2Fexample.app"));
        // the embedded URL must not terminate the path early
        let path = link.trim_start_matches("https://phantom.app/ul/browse/");
        let (embedded, _) = path.split_once('?').unwrap();
        assert!(!embedded.contains(':'));
        assert!(!embedded.contains('?'));
        assert!(!embedded.contains('&'));
    }

    #[test]
    fn test_explorer_url_cluster_suffix() {
        let address = Pubkey::new_unique();
        assert_eq!(
            explorer_url(&address, "devnet"),
            format!("https://explorer.solana.com/address/{address}?cluster=devnet")
        );
        assert_eq!(
            explorer_url(&address, "mainnet-beta"),
            format!("https://explorer.solana.com/address/{address}")
        );
    }
}
