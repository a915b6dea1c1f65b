//! Route codec
//!
//! A route is the intent carried by a callback button: which component
//! (`kind`), which sub-operation (`path`) and a flat string argument map.
//! It travels as a compact ASCII token:
//!
//! ```text
//! t=<type>;p=<path>?<k1>=<v1>&<k2>=<v2>
//! ```
//!
//! Characters that would otherwise be read as grammar are written as `%XX`:
//! `%`, `;` and `?` in the type and path, `%`, `&` and `=` in argument keys,
//! `%` and `&` in values. Any printable string survives a round trip.
//!
//! The token is the only artifact that outlives a process: buttons rendered
//! yesterday still carry tokens encoded yesterday. Decoding therefore stays
//! lenient about things the encoder never emits (missing `p=`, missing query,
//! unknown header sections, empty `&&` segments, a `%` not followed by two
//! hex digits) and strict only about the pieces it needs.

use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use super::RoutingError;

/// Route arguments, in the order they were added
pub type Args = IndexMap<String, String>;

/// Type tag routed to the hook registry instead of a component
pub const HOOK_KIND: &str = "hook";
/// Type tag of the built-in standard component (close button)
pub const STANDARD_KIND: &str = "standard";
/// Path of the back sentinel
pub const BACK_PATH: &str = "../";
/// Path handled by the standard component to close a view
pub const CLOSE_PATH: &str = "/close";

/// Arg marking a route as non-historical
pub const META_ARG: &str = "meta";
/// Arg holding the hook id on hook routes
pub const HOOK_ID_ARG: &str = "id";
/// Arg on the back sentinel asking to drop the top page controller too
pub const REMOVE_PAGE_ARG: &str = "removePage";

const HEADER_RESERVED: &[char] = &['%', ';', '?'];
const KEY_RESERVED: &[char] = &['%', '&', '='];
const VALUE_RESERVED: &[char] = &['%', '&'];

fn escape<'a>(s: &'a str, reserved: &[char]) -> Cow<'a, str> {
    if !s.contains(reserved) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if reserved.contains(&c) {
            let _ = write!(out, "%{:02X}", c as u32);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Reverse of [`escape`]. Only ASCII escapes are recognised; anything else
/// after a `%` is kept literally.
fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('%') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('%') {
        out.push_str(&rest[..i]);
        let tail = &rest[i + 1..];
        let byte = tail
            .get(..2)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .filter(u8::is_ascii);
        match byte {
            Some(byte) => {
                out.push(char::from(byte));
                rest = &tail[2..];
            }
            None => {
                out.push('%');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decoded routing intent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    /// Component type tag (empty for the back sentinel)
    pub kind: String,
    /// Optional sub-operation selector inside the component
    pub path: Option<String>,
    pub args: Args,
}

impl Route {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: None,
            args: Args::new(),
        }
    }

    /// Set the path. An empty path is the same as no path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = (!path.is_empty()).then_some(path);
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.args.insert(key.into(), value.to_string());
        self
    }

    pub fn with_args(mut self, args: Args) -> Self {
        self.args.extend(args);
        self
    }

    /// Mark the route as non-historical
    pub fn meta(self) -> Self {
        self.with_arg(META_ARG, "")
    }

    /// The back sentinel: an empty type with the reserved back path
    pub fn back(remove_page: bool) -> Self {
        Self::new("")
            .with_path(BACK_PATH)
            .with_arg(REMOVE_PAGE_ARG, remove_page)
    }

    /// Route addressed to a registered hook. Hook routes never enter history.
    pub fn hook(id: impl Into<String>) -> Self {
        Self::new(HOOK_KIND).with_arg(HOOK_ID_ARG, id.into()).meta()
    }

    /// Route closing the current view through the standard component
    pub fn close() -> Self {
        Self::new(STANDARD_KIND).with_path(CLOSE_PATH).meta()
    }

    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }

    pub fn is_meta(&self) -> bool {
        self.args.contains_key(META_ARG)
    }

    pub fn is_hook(&self) -> bool {
        self.kind == HOOK_KIND
    }

    pub fn is_back(&self) -> bool {
        self.path.as_deref() == Some(BACK_PATH)
    }

    /// Value of the `removePage` flag on a back sentinel.
    ///
    /// Absent means false; older tokens spell the value `True`/`False`.
    pub fn remove_page(&self) -> bool {
        self.arg(REMOVE_PAGE_ARG)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Encode into the wire token
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a wire token
    pub fn decode(token: &str) -> Result<Self, RoutingError> {
        // Everything after the first '?' is the query, so values may carry ';'
        let (head, query) = match token.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (token, None),
        };

        let mut kind: Option<&str> = None;
        let mut path: Option<&str> = None;
        for section in head.split(';') {
            let (key, value) = section
                .split_once('=')
                .ok_or_else(|| RoutingError::malformed(token, "header section without '='"))?;
            let slot = match key {
                "t" => &mut kind,
                "p" => &mut path,
                _ => continue,
            };
            if slot.replace(value).is_some() {
                return Err(RoutingError::malformed(token, "duplicate header section"));
            }
        }
        let kind = kind.ok_or_else(|| RoutingError::malformed(token, "missing type"))?;

        let mut args = Args::new();
        if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
            for pair in query.split('&').filter(|pair| !pair.is_empty()) {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| RoutingError::malformed(token, "argument without '='"))?;
                if args
                    .insert(unescape(key).into_owned(), unescape(value).into_owned())
                    .is_some()
                {
                    return Err(RoutingError::malformed(token, "duplicate argument"));
                }
            }
        }

        Ok(Self {
            kind: unescape(kind).into_owned(),
            path: path
                .filter(|p| !p.is_empty())
                .map(|p| unescape(p).into_owned()),
            args,
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={};p={}?",
            escape(&self.kind, HEADER_RESERVED),
            escape(self.path(), HEADER_RESERVED)
        )?;
        for (i, (key, value)) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                escape(key, KEY_RESERVED),
                escape(value, VALUE_RESERVED)
            )?;
        }
        Ok(())
    }
}

impl FromStr for Route {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
