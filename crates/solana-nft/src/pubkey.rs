use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

pub type Target = Pubkey;

pub mod opt {
    pub fn serialize<S>(p: &Option<super::Target>, s: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match p {
            Some(p) => super::serialize(p, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<super::Target>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        d.deserialize_option(crate::OptionVisitor(super::Visitor))
    }
}

pub fn serialize<S>(p: &Target, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&p.to_string())
}

struct Visitor;

impl serde::de::Visitor<'_> for Visitor {
    type Value = Pubkey;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("public key encoded in bs58")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Pubkey::from_str(v).map_err(|_| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(v),
                &"public key encoded in bs58",
            )
        })
    }
}

pub fn deserialize<'de, D>(d: D) -> Result<Target, D::Error>
where
    D: serde::Deserializer<'de>,
{
    d.deserialize_str(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Wrap {
        #[serde(with = "super")]
        key: Pubkey,
        #[serde(default, with = "super::opt")]
        other: Option<Pubkey>,
    }

    #[test]
    fn test_roundtrip() {
        let key = Pubkey::new_unique();
        let json = serde_json::to_string(&Wrap { key, other: None }).unwrap();
        let back: Wrap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, key);
        assert_eq!(back.other, None);
    }

    #[test]
    fn test_opt_some() {
        let key = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let json = format!(r#"{{"key": "{}", "other": "{}"}}"#, key, other);
        let back: Wrap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.other, Some(other));
    }

    #[test]
    fn test_invalid() {
        assert!(serde_json::from_str::<Wrap>(r#"{"key": "not-a-key"}"#).is_err());
    }
}
