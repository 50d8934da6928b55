use solana_sdk::signer::keypair::Keypair;

pub type Target = Keypair;

pub mod opt {
    pub fn serialize<S>(k: &Option<super::Target>, s: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match k {
            Some(k) => super::serialize(k, s),
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

pub fn serialize<S>(k: &Target, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&k.to_base58_string())
}

struct Visitor;

impl<'de> serde::de::Visitor<'de> for Visitor {
    type Value = Keypair;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("keypair encoded in bs58 or an array of 64 bytes")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Keypair::from_bytes(v).map_err(|_| serde::de::Error::invalid_length(v.len(), &"64"))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let mut buf = [0u8; 64];
        let size = bs58::decode(v).into(&mut buf).map_err(|_| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(v),
                &"keypair encoded in bs58",
            )
        })?;
        self.visit_bytes(&buf[..size])
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut buf = [0u8; 64];
        let mut iter_mut = buf.iter_mut();
        loop {
            match (seq.next_element()?, iter_mut.next()) {
                (Some(value), Some(ptr)) => *ptr = value,
                (None, None) => break,
                _ => return Err(serde::de::Error::custom("expected array of 64 elements")),
            }
        }
        Keypair::from_bytes(&buf).map_err(|_| serde::de::Error::custom("invalid keypair"))
    }
}

pub fn deserialize<'de, D>(d: D) -> Result<Target, D::Error>
where
    D: serde::Deserializer<'de>,
{
    d.deserialize_any(Visitor)
}

/// Parse a secret key from a config value, either bs58-encoded or a JSON
/// array of 64 bytes.
pub fn load_keypair(s: &str) -> crate::Result<Keypair> {
    let s = s.trim();
    if s.starts_with('[') {
        let bytes = serde_json::from_str::<Vec<u8>>(s)
            .map_err(|e| crate::Error::InvalidKeypair(e.to_string()))?;
        Keypair::from_bytes(&bytes).map_err(|e| crate::Error::InvalidKeypair(e.to_string()))
    } else {
        let mut buf = [0u8; 64];
        let size = bs58::decode(s)
            .into(&mut buf)
            .map_err(|e| crate::Error::InvalidKeypair(e.to_string()))?;
        Keypair::from_bytes(&buf[..size]).map_err(|e| crate::Error::InvalidKeypair(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bs58() {
        let k = Keypair::new();
        assert_eq!(load_keypair(&k.to_base58_string()).unwrap(), k);
    }

    #[test]
    fn test_load_byte_array() {
        let k = Keypair::new();
        let json = serde_json::to_string(&k.to_bytes().to_vec()).unwrap();
        assert_eq!(load_keypair(&json).unwrap(), k);
    }

    #[test]
    fn test_load_invalid() {
        assert!(load_keypair("not a keypair").is_err());
        assert!(load_keypair("[1,2,3]").is_err());
    }

    #[test]
    fn test_deserialize_field() {
        #[derive(serde::Deserialize)]
        struct Cfg {
            #[serde(with = "super")]
            keypair: Keypair,
        }

        let k = Keypair::new();
        let from_str: Cfg = serde_json::from_str(&format!(
            r#"{{"keypair": "{}"}}"#,
            k.to_base58_string()
        ))
        .unwrap();
        assert_eq!(from_str.keypair, k);

        let from_seq: Cfg = serde_json::from_str(&format!(
            r#"{{"keypair": {}}}"#,
            serde_json::to_string(&k.to_bytes().to_vec()).unwrap()
        ))
        .unwrap();
        assert_eq!(from_seq.keypair, k);
    }
}
