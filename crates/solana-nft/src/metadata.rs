use mpl_token_metadata::types::{Creator, DataV2};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// On-chain creator entry, shares in percent.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct NftCreator {
    #[serde(with = "crate::pubkey")]
    pub address: Pubkey,
    pub verified: Option<bool>,
    pub share: u8,
}

impl From<NftCreator> for Creator {
    fn from(v: NftCreator) -> Self {
        Creator {
            address: v.address,
            verified: v.verified.unwrap_or(false),
            share: v.share,
        }
    }
}

/// Off-chain metadata document pinned next to the media file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NftMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub seller_fee_basis_points: u16,
    pub image: String,
    pub animation_url: Option<String>,
    pub external_url: Option<String>,
    pub attributes: Vec<NftMetadataAttribute>,
    pub properties: Option<NftMetadataProperties>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NftMetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NftMetadataProperties {
    pub files: Option<Vec<NftMetadataFile>>,
    pub category: Option<String>,
    pub creators: Option<Vec<NftMetadataCreator>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NftMetadataFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NftMetadataCreator {
    pub address: String,
    pub share: u8,
}

pub fn check_royalty_basis_points(basis_points: u16) -> crate::Result<()> {
    if basis_points > 10000 {
        return Err(crate::Error::RoyaltyOutOfRange(basis_points));
    }
    Ok(())
}

pub fn check_creator_shares(creators: &[NftCreator]) -> crate::Result<()> {
    let total = creators.iter().map(|c| c.share as u32).sum::<u32>();
    if total != 100 {
        return Err(crate::Error::InvalidCreatorShares(total));
    }
    Ok(())
}

/// Single full-share creator list. The entry is marked verified only when
/// the creator is the fee payer, since only signers can be verified at
/// creation time.
pub fn single_creator(creator: Pubkey, payer: &Pubkey) -> Vec<NftCreator> {
    vec![NftCreator {
        address: creator,
        verified: Some(creator == *payer),
        share: 100,
    }]
}

/// Metadata document for a single pinned media file. The media URL doubles
/// as `image` and `animation_url` so wallets render video uploads too.
pub fn media_metadata(
    name: &str,
    symbol: &str,
    description: &str,
    royalty_basis_points: u16,
    media_url: &str,
    content_type: &str,
    creators: &[NftCreator],
) -> NftMetadata {
    let (file_kind, category) = if content_type.starts_with("video/") {
        ("Video", "video")
    } else {
        ("Image", "image")
    };
    NftMetadata {
        name: name.to_owned(),
        symbol: symbol.to_owned(),
        description: description.to_owned(),
        seller_fee_basis_points: royalty_basis_points,
        image: media_url.to_owned(),
        animation_url: (file_kind == "Video").then(|| media_url.to_owned()),
        external_url: None,
        attributes: vec![NftMetadataAttribute {
            trait_type: "File Type".to_owned(),
            value: file_kind.to_owned(),
        }],
        properties: Some(NftMetadataProperties {
            files: Some(vec![NftMetadataFile {
                uri: media_url.to_owned(),
                kind: content_type.to_owned(),
            }]),
            category: Some(category.to_owned()),
            creators: Some(
                creators
                    .iter()
                    .map(|c| NftMetadataCreator {
                        address: c.address.to_string(),
                        share: c.share,
                    })
                    .collect(),
            ),
        }),
    }
}

/// On-chain metadata payload for a freshly minted NFT.
pub fn nft_data(
    name: &str,
    symbol: &str,
    uri: &str,
    royalty_basis_points: u16,
    creators: &[NftCreator],
) -> DataV2 {
    DataV2 {
        name: name.to_owned(),
        symbol: symbol.to_owned(),
        uri: uri.to_owned(),
        seller_fee_basis_points: royalty_basis_points,
        creators: Some(creators.iter().cloned().map(Into::into).collect()),
        collection: None,
        uses: None,
    }
}

/// Replace only the royalty field, everything else passes through unchanged.
pub fn merge_royalty(data: DataV2, royalty_basis_points: u16) -> DataV2 {
    DataV2 {
        seller_fee_basis_points: royalty_basis_points,
        ..data
    }
}
