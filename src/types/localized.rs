// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Localized text as delivered by the API (`MessageModelList`).
//!
//! Names and descriptions arrive as arrays of culture/message pairs:
//!
//! ```json
//! [{"Culture": "nl", "Message": "Nieuwpoort"}, {"Culture": "en", "Message": "Nieuwpoort"}]
//! ```
//!
//! A [`LocalizedText`] keeps the pairs in the order received and is never
//! empty. [`LocalizedText::resolve`] picks one string for display.

use serde::{Deserialize, Serialize};

/// Culture used when the preferred language is not available.
pub const FALLBACK_LANGUAGE: &str = "nl";

/// Default preferred language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// One culture/message pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Language code, e.g. `nl`, `en`, `fr-BE`.
    #[serde(rename = "Culture")]
    pub culture: String,
    /// Text in that language.
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(culture: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            culture: culture.into(),
            message: message.into(),
        }
    }

    /// Returns true if this message is in the given language.
    ///
    /// Comparison ignores ASCII case and region subtags, so `en-GB`
    /// matches `en`.
    #[must_use]
    pub fn is_language(&self, language: &str) -> bool {
        primary_subtag(&self.culture).eq_ignore_ascii_case(primary_subtag(language))
    }
}

fn primary_subtag(culture: &str) -> &str {
    culture.split(['-', '_']).next().unwrap_or(culture)
}

/// A non-empty, ordered set of localized messages.
///
/// # Examples
///
/// ```
/// use meetnet_lib::types::{LocalizedText, Message};
///
/// let text = LocalizedText::new(vec![
///     Message::new("nl", "Windsnelheid"),
///     Message::new("en", "Wind speed"),
/// ])
/// .unwrap();
///
/// assert_eq!(text.resolve("en"), "Wind speed");
/// assert_eq!(text.resolve("de"), "Windsnelheid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct LocalizedText(Vec<Message>);

/// Error returned when a localized text array is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyMessageList;

impl std::fmt::Display for EmptyMessageList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("message list is empty")
    }
}

impl std::error::Error for EmptyMessageList {}

impl LocalizedText {
    /// Builds a localized text from received messages.
    ///
    /// Later entries repeating an earlier culture are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyMessageList`] when `messages` is empty.
    pub fn new(messages: Vec<Message>) -> Result<Self, EmptyMessageList> {
        if messages.is_empty() {
            return Err(EmptyMessageList);
        }

        let mut unique: Vec<Message> = Vec::with_capacity(messages.len());
        for message in messages {
            if unique
                .iter()
                .any(|m| m.culture.eq_ignore_ascii_case(&message.culture))
            {
                tracing::warn!(culture = %message.culture, "Dropping duplicate culture in message list");
                continue;
            }
            unique.push(message);
        }

        Ok(Self(unique))
    }

    /// Creates a single-language text.
    #[must_use]
    pub fn single(culture: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![Message::new(culture, message)])
    }

    /// Returns the messages in received order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    /// Returns the message for an exact language, if present.
    #[must_use]
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|m| m.is_language(language))
            .map(|m| m.message.as_str())
    }

    /// Resolves the text to display for `preferred_language`.
    ///
    /// See [`extract_message`].
    #[must_use]
    pub fn resolve(&self, preferred_language: &str) -> &str {
        extract_message(self, preferred_language)
    }
}

impl TryFrom<Vec<Message>> for LocalizedText {
    type Error = EmptyMessageList;

    fn try_from(messages: Vec<Message>) -> Result<Self, Self::Error> {
        Self::new(messages)
    }
}

impl From<LocalizedText> for Vec<Message> {
    fn from(text: LocalizedText) -> Self {
        text.0
    }
}

/// Picks the message to display from a localized text.
///
/// Order of preference:
///
/// 1. the entry in `preferred_language`
/// 2. the entry in [`FALLBACK_LANGUAGE`]
/// 3. the first entry as received from the API
#[must_use]
pub fn extract_message<'a>(messages: &'a LocalizedText, preferred_language: &str) -> &'a str {
    messages
        .get(preferred_language)
        .or_else(|| messages.get(FALLBACK_LANGUAGE))
        .unwrap_or_else(|| messages.0[0].message.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(pairs: &[(&str, &str)]) -> LocalizedText {
        LocalizedText::new(pairs.iter().map(|(c, m)| Message::new(*c, *m)).collect()).unwrap()
    }

    #[test]
    fn prefers_requested_language() {
        let t = text(&[("nl", "Westhinder"), ("en", "West Hinder"), ("fr", "Hinder Ouest")]);
        assert_eq!(extract_message(&t, "en"), "West Hinder");
        assert_eq!(extract_message(&t, "fr"), "Hinder Ouest");
    }

    #[test]
    fn falls_back_to_dutch() {
        let t = text(&[("fr", "Vitesse du vent"), ("nl", "Windsnelheid")]);
        assert_eq!(extract_message(&t, "en"), "Windsnelheid");
    }

    #[test]
    fn falls_back_to_first_entry() {
        let t = text(&[("fr", "Vitesse du vent"), ("de", "Windgeschwindigkeit")]);
        assert_eq!(extract_message(&t, "en"), "Vitesse du vent");
    }

    #[test]
    fn matches_region_subtags_case_insensitively() {
        let t = text(&[("nl-BE", "Golfhoogte"), ("EN-gb", "Wave height")]);
        assert_eq!(extract_message(&t, "en"), "Wave height");
        assert_eq!(extract_message(&t, "de"), "Golfhoogte");
    }

    #[test]
    fn rejects_empty_list() {
        assert_eq!(LocalizedText::new(Vec::new()), Err(EmptyMessageList));
        let parsed: Result<LocalizedText, _> = serde_json::from_str("[]");
        assert!(parsed.is_err());
    }

    #[test]
    fn drops_duplicate_cultures_keeping_first() {
        let t = text(&[("en", "First"), ("en", "Second")]);
        assert_eq!(t.messages().len(), 1);
        assert_eq!(t.resolve("en"), "First");
    }

    #[test]
    fn deserializes_api_format() {
        let json = r#"[{"Culture":"nl","Message":"Nieuwpoort"},{"Culture":"en","Message":"Nieuwpoort pier"}]"#;
        let t: LocalizedText = serde_json::from_str(json).unwrap();
        assert_eq!(t.resolve("en"), "Nieuwpoort pier");
        assert_eq!(t.get("nl"), Some("Nieuwpoort"));
    }
}
