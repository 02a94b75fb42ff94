//! Plaintext payload carried inside a temporary token.
//!
//! ```text
//! <expire ISO-8601 UTC, millisecond precision>[!p<permissions>][!r<rid>][!f<fid>][!i<ipv4>][!h<host>]
//! ```
//!
//! Values are not escaped. A value containing `!` renders fine but will not
//! parse back unambiguously.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

use super::error::TokenError;

/// Separator placed before every scope segment.
pub const SEGMENT_SEPARATOR: char = '!';

/// Scope restriction tags, declared in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeTag {
    Permissions,
    Rid,
    Fid,
    SourceIpv4,
    Host,
}

impl ScopeTag {
    /// Every tag, in the order segments appear in a payload.
    pub const ALL: [ScopeTag; 5] = [
        ScopeTag::Permissions,
        ScopeTag::Rid,
        ScopeTag::Fid,
        ScopeTag::SourceIpv4,
        ScopeTag::Host,
    ];

    /// The one-character wire tag.
    pub const fn as_char(self) -> char {
        match self {
            ScopeTag::Permissions => 'p',
            ScopeTag::Rid => 'r',
            ScopeTag::Fid => 'f',
            ScopeTag::SourceIpv4 => 'i',
            ScopeTag::Host => 'h',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_char() == c)
    }
}

/// Optional restrictions embedded in a temporary token.
///
/// `None` omits the segment. `Some(String::new())` is still present and
/// renders as a bare tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub permissions: Option<String>,
    pub rid: Option<String>,
    pub fid: Option<String>,
    pub source_ipv4: Option<String>,
    pub host: Option<String>,
}

impl Scope {
    pub fn with_permissions(mut self, value: impl Into<String>) -> Self {
        self.permissions = Some(value.into());
        self
    }

    pub fn with_rid(mut self, value: impl Into<String>) -> Self {
        self.rid = Some(value.into());
        self
    }

    pub fn with_fid(mut self, value: impl Into<String>) -> Self {
        self.fid = Some(value.into());
        self
    }

    pub fn with_source_ipv4(mut self, value: impl Into<String>) -> Self {
        self.source_ipv4 = Some(value.into());
        self
    }

    pub fn with_host(mut self, value: impl Into<String>) -> Self {
        self.host = Some(value.into());
        self
    }

    /// Value for `tag`, if present.
    pub fn get(&self, tag: ScopeTag) -> Option<&str> {
        match tag {
            ScopeTag::Permissions => self.permissions.as_deref(),
            ScopeTag::Rid => self.rid.as_deref(),
            ScopeTag::Fid => self.fid.as_deref(),
            ScopeTag::SourceIpv4 => self.source_ipv4.as_deref(),
            ScopeTag::Host => self.host.as_deref(),
        }
    }

    fn slot_mut(&mut self, tag: ScopeTag) -> &mut Option<String> {
        match tag {
            ScopeTag::Permissions => &mut self.permissions,
            ScopeTag::Rid => &mut self.rid,
            ScopeTag::Fid => &mut self.fid,
            ScopeTag::SourceIpv4 => &mut self.source_ipv4,
            ScopeTag::Host => &mut self.host,
        }
    }

    /// Returns `true` when no restriction is set.
    pub fn is_unrestricted(&self) -> bool {
        ScopeTag::ALL.into_iter().all(|tag| self.get(tag).is_none())
    }
}

/// Years an expiry may fall in. Outside this range the rendered timestamp
/// needs an extended-year form that neither side of the wire reads back.
pub const EXPIRE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Returns `true` if `instant` renders as a plain four-digit-year timestamp.
pub fn expire_in_range(instant: &DateTime<Utc>) -> bool {
    EXPIRE_YEARS.contains(&instant.year())
}

/// Format `instant` the way payloads carry it, e.g. `2024-01-01T12:00:00.000Z`.
pub fn format_expire(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the payload string for `expire` and `scope`.
pub fn render_payload(expire: &DateTime<Utc>, scope: &Scope) -> String {
    let mut out = format_expire(expire);
    for tag in ScopeTag::ALL {
        if let Some(value) = scope.get(tag) {
            out.push(SEGMENT_SEPARATOR);
            out.push(tag.as_char());
            out.push_str(value);
        }
    }
    out
}

/// A decoded temporary token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub expire: DateTime<Utc>,
    pub scope: Scope,
}

impl TokenPayload {
    pub fn new(expire: DateTime<Utc>, scope: Scope) -> Self {
        Self { expire, scope }
    }

    /// Render to the wire payload string.
    pub fn render(&self) -> String {
        render_payload(&self.expire, &self.scope)
    }

    /// Parse a rendered payload.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedPayload`] if the timestamp is not
    /// RFC 3339, a segment is empty or carries an unknown tag, or tags repeat
    /// or appear out of order.
    pub fn parse(payload: &str) -> Result<Self, TokenError> {
        let mut segments = payload.split(SEGMENT_SEPARATOR);
        let expire_str = segments.next().unwrap_or_default();
        let expire = DateTime::parse_from_rfc3339(expire_str)
            .map_err(|e| TokenError::MalformedPayload(format!("bad expire timestamp: {e}")))?
            .with_timezone(&Utc);

        let mut scope = Scope::default();
        let mut previous: Option<ScopeTag> = None;
        for segment in segments {
            let mut chars = segment.chars();
            let tag_char = chars
                .next()
                .ok_or_else(|| TokenError::MalformedPayload("empty scope segment".into()))?;
            let tag = ScopeTag::from_char(tag_char).ok_or_else(|| {
                TokenError::MalformedPayload(format!("unknown scope tag '{tag_char}'"))
            })?;
            if previous.is_some_and(|prev| tag <= prev) {
                return Err(TokenError::MalformedPayload(format!(
                    "scope tag '{tag_char}' repeated or out of order"
                )));
            }
            previous = Some(tag);
            *scope.slot_mut(tag) = Some(chars.as_str().to_owned());
        }

        Ok(Self { expire, scope })
    }

    /// Returns `true` once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire
    }
}
