use serde::{Deserialize, Serialize};

/// JSON form of an SSH signature exchanged between signer and verifier:
/// `{"Format": "<algorithm>", "Blob": "<base64>", "Rest": null}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSignature {
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "Blob", with = "base64_bytes")]
    pub blob: Vec<u8>,
    #[serde(rename = "Rest", default, with = "base64_opt_bytes")]
    pub rest: Option<Vec<u8>>,
}

impl WireSignature {
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn to_ssh_signature(&self) -> Result<ssh_key::Signature, ssh_key::Error> {
        let algorithm = ssh_key::Algorithm::new(&self.format)?;
        ssh_key::Signature::new(algorithm, self.blob.clone())
    }
}

impl From<&ssh_key::Signature> for WireSignature {
    fn from(signature: &ssh_key::Signature) -> Self {
        WireSignature {
            format: signature.algorithm().as_str().to_string(),
            blob: signature.as_bytes().to_vec(),
            rest: None,
        }
    }
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod base64_opt_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&base64::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| base64::decode(encoded).map_err(serde::de::Error::custom))
            .transpose()
    }
}
