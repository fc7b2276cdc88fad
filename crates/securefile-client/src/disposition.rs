//! `Content-Disposition` parsing
//!
//! Downloads are saved under the name the server puts in the disposition
//! header, never under the requested remote path.

use crate::{Result, SecureFileError};
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use std::collections::HashMap;

/// A parsed disposition header value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition: String,
    params: HashMap<String, String>,
}

impl ContentDisposition {
    /// Parse a header value such as `attachment; filename="hello.txt"`
    pub fn parse(value: &str) -> Result<Self> {
        let (head, mut rest) = match value.find(';') {
            Some(i) => (&value[..i], &value[i..]),
            None => (value, ""),
        };

        let disposition = head.trim().to_ascii_lowercase();
        if disposition.is_empty() || !disposition.chars().all(is_token_char) {
            return Err(malformed(format!("invalid disposition type {:?}", head.trim())));
        }

        let mut raw: HashMap<String, String> = HashMap::new();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            rest = rest
                .strip_prefix(';')
                .ok_or_else(|| malformed(format!("expected ';' before {:?}", rest)))?
                .trim_start();
            if rest.is_empty() {
                break;
            }

            let (key, after_key) = consume_token(rest);
            if key.is_empty() {
                return Err(malformed(format!("missing parameter name in {:?}", rest)));
            }
            let after_eq = after_key
                .trim_start()
                .strip_prefix('=')
                .ok_or_else(|| malformed(format!("parameter {:?} has no value", key)))?
                .trim_start();
            let (param_value, after_value) = consume_value(after_eq)?;
            rest = after_value;

            let key = key.to_ascii_lowercase();
            if raw.contains_key(&key) {
                return Err(malformed(format!("duplicate parameter {:?}", key)));
            }
            raw.insert(key, param_value);
        }

        let mut params = HashMap::with_capacity(raw.len());
        let mut extended: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (key, value) in raw {
            match key.split_once('*') {
                Some((base, suffix)) => {
                    extended
                        .entry(base.to_string())
                        .or_default()
                        .insert(suffix.to_string(), value);
                }
                None => {
                    params.insert(key, value);
                }
            }
        }
        // RFC 2231 values take precedence over their plain counterparts
        for (key, pieces) in extended {
            if let Some(decoded) = resolve_extended(&key, &pieces)? {
                params.insert(key, decoded);
            }
        }

        Ok(Self {
            disposition,
            params,
        })
    }

    /// Lowercased disposition type, e.g. `attachment`
    pub fn disposition(&self) -> &str {
        &self.disposition
    }

    /// Look up a parameter by case-insensitive name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The `filename` parameter
    pub fn filename(&self) -> Option<&str> {
        self.param("filename")
    }
}

/// Extract the output filename for a download from its response headers
pub(crate) fn download_filename(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(CONTENT_DISPOSITION)
        .ok_or_else(|| malformed("no Content-Disposition header in secure file response"))?
        .to_str()
        .map_err(|e| malformed(format!("unreadable Content-Disposition header: {}", e)))?;

    let disposition = ContentDisposition::parse(value)?;
    let filename = disposition
        .filename()
        .ok_or_else(|| malformed("no filename present in secure file header"))?;

    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
    {
        return Err(malformed(format!(
            "refusing to save secure file under {:?}",
            filename
        )));
    }

    Ok(filename.to_string())
}

fn malformed(message: impl Into<String>) -> SecureFileError {
    SecureFileError::MalformedResponse(message.into())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii() && !c.is_ascii_control() && !"()<>@,;:\\\"/[]?= ".contains(c)
}

fn consume_token(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_token_char(c)).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

fn consume_value(s: &str) -> Result<(String, &str)> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (token, rest) = consume_token(s);
        if token.is_empty() {
            return Err(malformed(format!("missing parameter value in {:?}", s)));
        }
        return Ok((token.to_string(), rest));
    };

    let mut value = String::new();
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &quoted[i + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            '\r' | '\n' => break,
            c => value.push(c),
        }
    }
    Err(malformed("unterminated quoted parameter value"))
}

/// Join the RFC 2231 forms of one parameter
///
/// `pieces` maps the text after the first `*` of each raw key to its value:
/// `""` for `name*=`, `"0"`, `"1"` for plain continuations and `"0*"`, `"1*"`
/// for percent-encoded ones. Continuations are read from 0 until the first
/// gap. Only the first encoded piece carries the `charset'language'` prefix.
fn resolve_extended(key: &str, pieces: &HashMap<String, String>) -> Result<Option<String>> {
    if let Some(value) = pieces.get("") {
        return decode_extended_value(value).map(Some);
    }

    let mut bytes = Vec::new();
    let mut found = false;
    for n in 0.. {
        if let Some(value) = pieces.get(&n.to_string()) {
            bytes.extend_from_slice(value.as_bytes());
        } else if let Some(value) = pieces.get(&format!("{}*", n)) {
            if n == 0 {
                bytes.extend(decode_extended_bytes(value)?);
            } else {
                bytes.extend(urlencoding::decode_binary(value.as_bytes()).iter());
            }
        } else {
            break;
        }
        found = true;
    }

    if !found {
        return Ok(None);
    }
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|_| malformed(format!("parameter {:?} is not valid UTF-8", key)))
}

fn decode_extended_value(value: &str) -> Result<String> {
    String::from_utf8(decode_extended_bytes(value)?)
        .map_err(|e| malformed(format!("invalid extended parameter encoding: {}", e)))
}

fn decode_extended_bytes(value: &str) -> Result<Vec<u8>> {
    let mut parts = value.splitn(3, '\'');
    let (Some(charset), Some(_language), Some(encoded)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed(format!("invalid extended parameter {:?}", value)));
    };

    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "us-ascii" => Ok(urlencoding::decode_binary(encoded.as_bytes()).into_owned()),
        other => Err(malformed(format!("unsupported charset {:?}", other))),
    }
}
