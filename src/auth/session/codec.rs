//! Property-array serialization for sessions.
//!
//! Sessions serialize to an ordered list of `(key, value)` pairs so callers
//! can persist them in row-oriented stores without committing to a schema.
//! Keys use camelCase on the wire. Pairs whose value is absent are omitted
//! entirely rather than written as null.
//!
//! An encrypted variant runs selected values through AES-256-GCM before
//! writing them out, prefixing each ciphertext with `encrypted#` so plain
//! and encrypted values can coexist in the same store.
//!
//! # User data
//!
//! The `return_user_data` flag controls how online sessions serialize their
//! user. When `true`, the user's fields are flattened into the array
//! (`userId`, `firstName`, and so on). When `false`, only the numeric user
//! id is written under the `onlineAccessInfo` key, and the remaining user
//! details do not survive a round trip.

use crate::auth::associated_user::{AssociatedUser, OnlineAccessInfo};
use crate::auth::session::{AccessTokenKind, Session};
use crate::config::ShopDomain;
use crate::crypto::{self, CryptoError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Marker prefix distinguishing encrypted values from plain ones.
const ENCRYPTED_PREFIX: &str = "encrypted#";

/// Fields that must never be encrypted.
///
/// `id` and `shop` aside, these are the fields storage backends filter and
/// index on, plus the booleans and timestamps whose types would be destroyed
/// by stringification.
const UNENCRYPTABLE_FIELDS: &[&str] = &[
    "id",
    "isOnline",
    "expires",
    "refreshTokenExpires",
    "emailVerified",
    "accountOwner",
    "collaborator",
    "onlineAccessInfo",
];

/// Fields encrypted when no explicit list is given.
const DEFAULT_ENCRYPTED_FIELDS: &[&str] = &[
    "shop",
    "state",
    "scope",
    "accessToken",
    "refreshToken",
    "userId",
    "firstName",
    "lastName",
    "email",
    "locale",
];

/// A value in a serialized session property array.
///
/// Serializes untagged, so a property array renders as plain JSON scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// String value.
    String(String),

    /// Integer value. Holds user ids and epoch-second timestamps.
    Number(i64),

    /// Boolean value.
    Bool(bool),
}

impl PropertyValue {
    fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Errors from serializing or reconstructing sessions.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The caller asked to encrypt fields that must stay plain.
    #[error("Can't encrypt fields: [{}]", .0.join(", "))]
    UnencryptableFields(Vec<String>),

    /// A required field was absent from the property array.
    #[error("missing required session field '{field}'")]
    MissingField { field: &'static str },

    /// A field held a value of the wrong type or shape.
    #[error("invalid value for session field '{field}'")]
    InvalidValue { field: &'static str },

    /// The shop domain failed validation.
    #[error(transparent)]
    InvalidShop(#[from] crate::error::ConfigError),

    /// Encryption or decryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Serializes a session to `(key, value)` pairs.
///
/// Absent optional fields produce no pair. `expires` and
/// `refreshTokenExpires` are written as whole epoch seconds, so sub-second
/// precision does not survive a round trip.
#[must_use]
pub fn to_property_array(session: &Session, return_user_data: bool) -> Vec<(String, PropertyValue)> {
    let mut entries: Vec<(String, PropertyValue)> = vec![
        ("id".to_string(), session.id.as_str().into()),
        ("shop".to_string(), session.shop.as_ref().into()),
        ("state".to_string(), session.state.as_str().into()),
        ("isOnline".to_string(), session.is_online().into()),
    ];

    if let Some(scope) = &session.scope {
        entries.push(("scope".to_string(), scope.to_string().into()));
    }
    if let Some(token) = &session.access_token {
        entries.push(("accessToken".to_string(), token.as_str().into()));
    }
    if let Some(expires) = session.expires {
        entries.push(("expires".to_string(), expires.timestamp().into()));
    }
    if let Some(token) = &session.refresh_token {
        entries.push(("refreshToken".to_string(), token.as_str().into()));
    }
    if let Some(expires) = session.refresh_token_expires {
        entries.push((
            "refreshTokenExpires".to_string(),
            expires.timestamp().into(),
        ));
    }

    if let AccessTokenKind::Online(info) = &session.kind {
        let user = &info.associated_user;
        if return_user_data {
            entries.push(("userId".to_string(), i64::try_from(user.id).unwrap_or(0).into()));
            entries.push(("firstName".to_string(), user.first_name.as_str().into()));
            entries.push(("lastName".to_string(), user.last_name.as_str().into()));
            entries.push(("email".to_string(), user.email.as_str().into()));
            entries.push(("locale".to_string(), user.locale.as_str().into()));
            entries.push(("emailVerified".to_string(), user.email_verified.into()));
            entries.push(("accountOwner".to_string(), user.account_owner.into()));
            entries.push(("collaborator".to_string(), user.collaborator.into()));
        } else {
            // Only the numeric id survives in this mode.
            entries.push((
                "onlineAccessInfo".to_string(),
                i64::try_from(user.id).unwrap_or(0).into(),
            ));
        }
    }

    entries
}

/// Reconstructs a session from `(key, value)` pairs.
///
/// # Errors
///
/// Fails when `id`, `shop`, or `isOnline` are missing or hold the wrong
/// type, or when the shop domain is invalid. Unknown keys are ignored.
pub fn from_property_array(
    entries: &[(String, PropertyValue)],
    return_user_data: bool,
) -> Result<Session, CodecError> {
    let get = |key: &str| entries.iter().find(|(k, _)| k == key).map(|(_, v)| v);

    let id = get("id")
        .ok_or(CodecError::MissingField { field: "id" })?
        .as_str()
        .ok_or(CodecError::InvalidValue { field: "id" })?
        .to_string();

    let shop = get("shop")
        .ok_or(CodecError::MissingField { field: "shop" })?
        .as_str()
        .ok_or(CodecError::InvalidValue { field: "shop" })?;
    let shop = ShopDomain::new(shop)?;

    let is_online = get("isOnline")
        .ok_or(CodecError::MissingField { field: "isOnline" })?
        .as_bool()
        .ok_or(CodecError::InvalidValue { field: "isOnline" })?;

    let state = get("state")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let scope = get("scope")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok());

    let access_token = get("accessToken")
        .and_then(|v| v.as_str())
        .map(ToString::to_string);

    let expires = get("expires")
        .map(|v| parse_timestamp(v, "expires"))
        .transpose()?;

    let refresh_token = get("refreshToken")
        .and_then(|v| v.as_str())
        .map(ToString::to_string);

    let refresh_token_expires = get("refreshTokenExpires")
        .map(|v| parse_timestamp(v, "refreshTokenExpires"))
        .transpose()?;

    let kind = if is_online {
        let user = if return_user_data {
            AssociatedUser {
                id: get("userId")
                    .and_then(PropertyValue::as_number)
                    .and_then(|n| u64::try_from(n).ok())
                    .unwrap_or_default(),
                first_name: owned_str(get("firstName")),
                last_name: owned_str(get("lastName")),
                email: owned_str(get("email")),
                locale: owned_str(get("locale")),
                email_verified: get("emailVerified")
                    .and_then(PropertyValue::as_bool)
                    .unwrap_or_default(),
                account_owner: get("accountOwner")
                    .and_then(PropertyValue::as_bool)
                    .unwrap_or_default(),
                collaborator: get("collaborator")
                    .and_then(PropertyValue::as_bool)
                    .unwrap_or_default(),
            }
        } else {
            get("onlineAccessInfo")
                .and_then(PropertyValue::as_number)
                .and_then(|n| u64::try_from(n).ok())
                .map(AssociatedUser::from_id)
                .unwrap_or_default()
        };
        AccessTokenKind::Online(OnlineAccessInfo {
            expires_in: None,
            associated_user_scope: None,
            associated_user: user,
        })
    } else {
        AccessTokenKind::Offline
    };

    Ok(Session {
        id,
        shop,
        state,
        access_token,
        scope,
        expires,
        kind,
        refresh_token,
        refresh_token_expires,
    })
}

/// Serializes a session with selected values encrypted.
///
/// `encrypt_fields` defaults to every non-structural field; `key` must be a
/// 32-byte AES-256 key. Encrypted values are written as
/// `encrypted#` + base64(iv || ciphertext || tag).
///
/// # Errors
///
/// Rejects the whole operation, producing no output, when `encrypt_fields`
/// names a field from the non-encryptable set. Propagates cipher failures.
pub fn to_encrypted_property_array(
    session: &Session,
    return_user_data: bool,
    key: &[u8],
    encrypt_fields: Option<&[&str]>,
) -> Result<Vec<(String, PropertyValue)>, CodecError> {
    let fields = encrypt_fields.unwrap_or(DEFAULT_ENCRYPTED_FIELDS);

    let forbidden: Vec<String> = fields
        .iter()
        .filter(|f| UNENCRYPTABLE_FIELDS.contains(f))
        .map(ToString::to_string)
        .collect();
    if !forbidden.is_empty() {
        return Err(CodecError::UnencryptableFields(forbidden));
    }

    to_property_array(session, return_user_data)
        .into_iter()
        .map(|(k, v)| {
            if fields.contains(&k.as_str()) {
                let sealed = crypto::encrypt(key, v.to_string().as_bytes())?;
                let encoded = format!("{ENCRYPTED_PREFIX}{}", BASE64.encode(sealed));
                Ok((k, PropertyValue::String(encoded)))
            } else {
                Ok((k, v))
            }
        })
        .collect()
}

/// Reconstructs a session from pairs produced by
/// [`to_encrypted_property_array`].
///
/// Values without the `encrypted#` prefix pass through untouched, so arrays
/// mixing plain and encrypted values decode fine.
///
/// # Errors
///
/// Any single value that fails authentication aborts the whole
/// reconstruction.
pub fn from_encrypted_property_array(
    entries: &[(String, PropertyValue)],
    return_user_data: bool,
    key: &[u8],
) -> Result<Session, CodecError> {
    let decrypted: Vec<(String, PropertyValue)> = entries
        .iter()
        .map(|(k, v)| {
            let value = match v.as_str().and_then(|s| s.strip_prefix(ENCRYPTED_PREFIX)) {
                Some(encoded) => {
                    let sealed = BASE64
                        .decode(encoded)
                        .map_err(|_| CryptoError::DecryptionFailed)?;
                    let plain = crypto::decrypt(key, &sealed)?;
                    let plain = String::from_utf8(plain)
                        .map_err(|_| CryptoError::DecryptionFailed)?;
                    restore_value_type(k, plain)
                }
                None => v.clone(),
            };
            Ok((k.clone(), value))
        })
        .collect::<Result<_, CodecError>>()?;

    from_property_array(&decrypted, return_user_data)
}

/// Restores the pre-encryption type of a decrypted value.
///
/// Encryption stringifies everything; `userId` is the one default-encrypted
/// field that was numeric.
fn restore_value_type(key: &str, plain: String) -> PropertyValue {
    if key == "userId" {
        if let Ok(n) = plain.parse::<i64>() {
            return PropertyValue::Number(n);
        }
    }
    PropertyValue::String(plain)
}

fn parse_timestamp(value: &PropertyValue, field: &'static str) -> Result<DateTime<Utc>, CodecError> {
    let secs = value
        .as_number()
        .ok_or(CodecError::InvalidValue { field })?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(CodecError::InvalidValue { field })
}

fn owned_str(value: Option<&PropertyValue>) -> String {
    value
        .and_then(PropertyValue::as_str)
        .unwrap_or_default()
        .to_string()
}
