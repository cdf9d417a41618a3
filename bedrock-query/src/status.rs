//! The server status carried in an unconnected pong.

use serde::Serialize;

/// Number of positional fields before the free-form tail.
const FIXED_FIELDS: usize = 9;

/// Status of a Bedrock server as reported in its pong.
///
/// An unreachable server is represented by [`StatusRecord::placeholder`]
/// rather than an error: `online` is false, text fields are empty and numeric
/// fields are `-1`.
///
/// The payload fields, in order:
///
/// ```text
/// Game type (MCPE, or MCEE for Education Edition)
/// MOTD
/// Protocol version
/// Minecraft version
/// Player count
/// Max player count
/// Server id
/// Server software (often the second MOTD line)
/// Gamemode
/// Anything else, kept as extra data
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    online: bool,
    game_type: String,
    message_of_the_day: String,
    protocol_version: i64,
    minecraft_version: String,
    player_count: i64,
    max_player_count: i64,
    server_id: i64,
    server_software: String,
    gamemode: String,
    extra_data: Vec<String>,
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl StatusRecord {
    /// The record returned whenever a server could not be queried.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self {
            online: false,
            game_type: String::new(),
            message_of_the_day: String::new(),
            protocol_version: -1,
            minecraft_version: String::new(),
            player_count: -1,
            max_player_count: -1,
            server_id: -1,
            server_software: String::new(),
            gamemode: String::new(),
            extra_data: Vec::new(),
        }
    }

    /// Builds a record from the pong's status string.
    ///
    /// Missing fields keep their placeholder value, as do numeric fields that
    /// do not parse. Escaped semicolons (`\;`) stay inside their field with the
    /// backslash intact.
    #[must_use]
    pub fn parse(payload: &str) -> Self {
        let parts = split_status(payload);
        let text = |i: usize| parts.get(i).map_or_else(String::new, |s| (*s).to_owned());
        let number = |i: usize| parts.get(i).map_or(-1, |s| parse_int(s));

        Self {
            online: !parts.is_empty(),
            game_type: text(0),
            message_of_the_day: text(1),
            protocol_version: number(2),
            minecraft_version: text(3),
            player_count: number(4),
            max_player_count: number(5),
            server_id: number(6),
            server_software: text(7),
            gamemode: text(8),
            extra_data: parts
                .iter()
                .skip(FIXED_FIELDS)
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }

    /// Whether the server answered.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.online
    }

    /// The game type, e.g. "MCPE".
    #[must_use]
    pub fn game_type(&self) -> &str {
        &self.game_type
    }

    /// The message of the day shown in the server list.
    #[must_use]
    pub fn message_of_the_day(&self) -> &str {
        &self.message_of_the_day
    }

    /// The protocol version, e.g. 390.
    #[must_use]
    pub const fn protocol_version(&self) -> i64 {
        self.protocol_version
    }

    /// The Minecraft version name, e.g. "1.16.200".
    #[must_use]
    pub fn minecraft_version(&self) -> &str {
        &self.minecraft_version
    }

    #[must_use]
    pub const fn player_count(&self) -> i64 {
        self.player_count
    }

    #[must_use]
    pub const fn max_player_count(&self) -> i64 {
        self.max_player_count
    }

    /// The server's id, randomized on startup.
    #[must_use]
    pub const fn server_id(&self) -> i64 {
        self.server_id
    }

    /// The server software, e.g. "PocketMine-MP".
    #[must_use]
    pub fn server_software(&self) -> &str {
        &self.server_software
    }

    /// The default gamemode, e.g. "Survival".
    #[must_use]
    pub fn gamemode(&self) -> &str {
        &self.gamemode
    }

    /// Fields past the gamemode, in the order the server sent them.
    #[must_use]
    pub fn extra_data(&self) -> &[String] {
        &self.extra_data
    }
}

/// Splits a status string on `;`, except where the `;` directly follows a `\`.
///
/// Escapes are not removed. An empty string yields one empty part.
#[must_use]
pub fn split_status(payload: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (idx, ch) in payload.char_indices() {
        if ch == ';' && !escaped {
            parts.push(&payload[start..idx]);
            start = idx + ch.len_utf8();
        }
        escaped = ch == '\\';
    }
    parts.push(&payload[start..]);
    parts
}

/// Parses a decimal integer, saturating at the `i64` bounds. Server GUIDs are
/// unsigned 64-bit and regularly exceed `i64::MAX`.
fn parse_int(s: &str) -> i64 {
    let s = s.trim();
    if let Ok(n) = s.parse() {
        return n;
    }
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return -1;
    }
    if negative { i64::MIN } else { i64::MAX }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload() {
        let status =
            StatusRecord::parse("MCPE;My Server;422;1.18.0;5;20;123456789;Bedrock;Survival;");
        assert!(status.is_online());
        assert_eq!(status.game_type(), "MCPE");
        assert_eq!(status.message_of_the_day(), "My Server");
        assert_eq!(status.protocol_version(), 422);
        assert_eq!(status.minecraft_version(), "1.18.0");
        assert_eq!(status.player_count(), 5);
        assert_eq!(status.max_player_count(), 20);
        assert_eq!(status.server_id(), 123_456_789);
        assert_eq!(status.server_software(), "Bedrock");
        assert_eq!(status.gamemode(), "Survival");
        assert_eq!(status.extra_data(), [String::new()]);
    }

    #[test]
    fn missing_fields_fall_back_individually() {
        let status = StatusRecord::parse("MCPE;Lobby;390;1.16.200");
        assert!(status.is_online());
        assert_eq!(status.game_type(), "MCPE");
        assert_eq!(status.message_of_the_day(), "Lobby");
        assert_eq!(status.protocol_version(), 390);
        assert_eq!(status.minecraft_version(), "1.16.200");
        assert_eq!(status.player_count(), -1);
        assert_eq!(status.max_player_count(), -1);
        assert_eq!(status.server_id(), -1);
        assert_eq!(status.server_software(), "");
        assert_eq!(status.gamemode(), "");
        assert!(status.extra_data().is_empty());
    }

    #[test]
    fn bad_number_only_affects_its_field() {
        let status = StatusRecord::parse("MCPE;MOTD;not-a-number;1.20.0;3;10");
        assert_eq!(status.game_type(), "MCPE");
        assert_eq!(status.message_of_the_day(), "MOTD");
        assert_eq!(status.protocol_version(), -1);
        assert_eq!(status.minecraft_version(), "1.20.0");
        assert_eq!(status.player_count(), 3);
        assert_eq!(status.max_player_count(), 10);
    }

    #[test]
    fn oversized_server_id_saturates() {
        let status = StatusRecord::parse(
            "MCPE;Dedicated Server;390;1.14.60;0;10;13253860892328930865;Bedrock level;Survival;1;19132;19133;",
        );
        assert_eq!(status.server_id(), i64::MAX);
        assert_eq!(status.server_software(), "Bedrock level");
        assert_eq!(status.extra_data(), ["1", "19132", "19133", ""]);
        assert_eq!(parse_int("-99999999999999999999"), i64::MIN);
        assert_eq!(parse_int("+"), -1);
        assert_eq!(parse_int("12x"), -1);
    }

    #[test]
    fn numbers_tolerate_padding_and_sign() {
        let status = StatusRecord::parse("MCPE;MOTD; 422 ;v;-4;+8");
        assert_eq!(status.protocol_version(), 422);
        assert_eq!(status.player_count(), -4);
        assert_eq!(status.max_player_count(), 8);
    }

    #[test]
    fn escaped_semicolon_stays_in_field() {
        let status = StatusRecord::parse(r"A\;B;rest");
        assert_eq!(status.game_type(), r"A\;B");
        assert_eq!(status.message_of_the_day(), "rest");
    }

    #[test]
    fn extra_fields_keep_order() {
        let status =
            StatusRecord::parse("MCPE;M;1;v;1;2;3;PocketMine-MP;Creative;1;19132;19133;x\\;y");
        assert_eq!(status.gamemode(), "Creative");
        assert_eq!(status.extra_data(), ["1", "19132", "19133", "x\\;y"]);
    }

    #[test]
    fn empty_payload_is_online() {
        let status = StatusRecord::parse("");
        assert!(status.is_online());
        assert_eq!(status.game_type(), "");
        assert_eq!(status.protocol_version(), -1);
        assert!(status.extra_data().is_empty());
    }

    #[test]
    fn separator_only_payload() {
        let status = StatusRecord::parse(";");
        assert!(status.is_online());
        assert_eq!(status.game_type(), "");
        assert_eq!(status.message_of_the_day(), "");
    }

    #[test]
    fn placeholder_is_default() {
        let status = StatusRecord::placeholder();
        assert_eq!(status, StatusRecord::default());
        assert!(!status.is_online());
        assert_eq!(status.game_type(), "");
        assert_eq!(status.protocol_version(), -1);
        assert_eq!(status.player_count(), -1);
        assert_eq!(status.max_player_count(), -1);
        assert_eq!(status.server_id(), -1);
        assert!(status.extra_data().is_empty());
    }

    #[test]
    fn split_plain() {
        assert_eq!(split_status("a;b;;c"), ["a", "b", "", "c"]);
        assert_eq!(split_status("abc"), ["abc"]);
        assert_eq!(split_status(""), [""]);
        assert_eq!(split_status(";"), ["", ""]);
    }

    #[test]
    fn split_escapes() {
        assert_eq!(split_status(r"a\;b;c"), [r"a\;b", "c"]);
        // only the character right before the semicolon counts
        assert_eq!(split_status(r"a\\;b"), [r"a\\;b"]);
        assert_eq!(split_status(r"a\b;c"), [r"a\b", "c"]);
        assert_eq!(split_status(r"\;"), [r"\;"]);
    }

    #[test]
    fn split_multibyte() {
        assert_eq!(split_status("§aHé;ü"), ["§aHé", "ü"]);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(StatusRecord::placeholder()).unwrap();
        assert_eq!(json["online"], false);
        assert_eq!(json["messageOfTheDay"], "");
        assert_eq!(json["maxPlayerCount"], -1);
        assert_eq!(json["extraData"], serde_json::json!([]));
    }
}
