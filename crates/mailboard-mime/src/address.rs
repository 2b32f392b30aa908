//! Parsing of `From`/`To`/`Cc`/`Bcc` header values.
//!
//! Values are expected to have had their encoded-words decoded already,
//! since display names are where non-ASCII text usually lives.

/// A mailbox split into display name and address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Display name; empty when the header carried a bare address.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Address {
    /// Parses a single mailbox.
    ///
    /// `"Jane Doe" <jane@x.com>` yields name `Jane Doe` and email
    /// `jane@x.com`. Without an angle-bracket form the whole trimmed value
    /// is taken as the address.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some((name, email)) = split_angle_addr(raw) {
            return Self {
                name: name.trim().trim_matches('"').trim().to_string(),
                email: email.trim().to_string(),
            };
        }

        Self {
            name: String::new(),
            email: raw.trim().to_string(),
        }
    }
}

/// Splits `name <addr>` into its halves. The bracketed part must be
/// non-empty.
fn split_angle_addr(raw: &str) -> Option<(&str, &str)> {
    let open = raw.rfind('<')?;
    let close = open + raw[open..].find('>')?;
    let email = &raw[open + 1..close];
    if email.trim().is_empty() {
        return None;
    }
    Some((&raw[..open], email))
}

/// Parses an address-list header value into its email addresses.
///
/// Entries are separated by commas; commas inside a quoted display name do
/// not split. Entries that yield an empty address are dropped.
#[must_use]
pub fn parse_address_list(raw: &str) -> Vec<String> {
    split_list(raw)
        .into_iter()
        .map(|entry| Address::parse(entry.trim()).email)
        .filter(|email| !email.is_empty())
        .collect()
}

fn split_list(raw: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                entries.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&raw[start..]);
    entries
}
