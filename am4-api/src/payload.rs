use am4_core::ProvisionRequest;
use am4_utils::parse::parse_discord_id;
use serde::{Deserialize, Deserializer, Serialize, de};

/// Body of `POST /api/_core/users/from_discord`. Missing fields bind to
/// their empty values.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FromDiscordPayload {
    pub username: String,
    pub game_name: String,
    pub game_mode: String,
    #[serde(deserialize_with = "deserialize_discord_id")]
    pub discord_id: i64,
}

impl From<FromDiscordPayload> for ProvisionRequest {
    fn from(payload: FromDiscordPayload) -> Self {
        Self {
            username: payload.username,
            game_name: payload.game_name,
            game_mode: payload.game_mode,
            discord_id: payload.discord_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDiscordId {
    Number(i64),
    Text(String),
}

/// Accept a Discord id as a JSON integer or as a decimal string.
fn deserialize_discord_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDiscordId::deserialize(deserializer)? {
        RawDiscordId::Number(value) => Ok(value),
        RawDiscordId::Text(raw) => parse_discord_id(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid discord_id `{raw}`"))),
    }
}

/// Success envelope shared by every user route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

#[cfg(test)]
mod tests {
    use super::FromDiscordPayload;

    #[test]
    fn discord_id_accepts_numbers_and_strings() {
        let numeric: FromDiscordPayload =
            serde_json::from_str(r#"{"username":"a","discord_id":12345}"#).unwrap();
        assert_eq!(numeric.discord_id, 12345);

        let text: FromDiscordPayload =
            serde_json::from_str(r#"{"discord_id":"1104459318476316752"}"#).unwrap();
        assert_eq!(text.discord_id, 1_104_459_318_476_316_752);
    }

    #[test]
    fn missing_fields_bind_to_empty_values() {
        let payload: FromDiscordPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.username, "");
        assert_eq!(payload.game_name, "");
        assert_eq!(payload.game_mode, "");
        assert_eq!(payload.discord_id, 0);
    }

    #[test]
    fn malformed_discord_ids_are_rejected() {
        assert!(serde_json::from_str::<FromDiscordPayload>(r#"{"discord_id":"abc"}"#).is_err());
        assert!(serde_json::from_str::<FromDiscordPayload>(r#"{"discord_id":1.5}"#).is_err());
    }
}
