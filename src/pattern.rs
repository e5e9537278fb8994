use core::fmt;
use core::str::FromStr;

use bitflags::bitflags;

use crate::{Error, Result};

/// Longest content pattern the engines accept, in bytes.
pub const MAX_PATTERN_LEN: usize = 256;

bitflags! {
    /// Flags which modify the behaviour of a pattern.
    #[derive(Default)]
    pub struct Flags: u32 {
        /// Matching is performed case-insensitively for ASCII letters.
        const CASELESS = 0b0001;
    }
}

impl FromStr for Flags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut flags = Flags::empty();

        for c in s.chars() {
            match c {
                'i' => flags |= Flags::CASELESS,
                _ => return Err(Error::InvalidFlag(c)),
            }
        }

        Ok(flags)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Flags::CASELESS) {
            write!(f, "i")?
        }
        Ok(())
    }
}

/// A literal byte pattern lifted from a rule's `content:"…"` clause.
///
/// The bytes are opaque to the core; hex escapes are decoded by the rule
/// lexer before a pattern is constructed. A pattern is never mutated
/// after it enters a [`PatternSet`](crate::PatternSet), and its index in
/// that set is its id everywhere in the engines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    /// The literal bytes to search for.
    pub bytes: Vec<u8>,
    /// Flags which modify the behaviour of the pattern.
    pub flags: Flags,
    /// Snort rule id this pattern came from, if any.
    pub sid: Option<u32>,
    /// Human-readable rule message, if any.
    pub msg: Option<String>,
}

impl Pattern {
    /// Construct a pattern over the given bytes.
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> Pattern {
        Pattern {
            bytes: bytes.into(),
            flags: Flags::empty(),
            sid: None,
            msg: None,
        }
    }

    /// Construct a pattern with flags.
    pub fn with_flags<B: Into<Vec<u8>>>(bytes: B, flags: Flags) -> Pattern {
        Pattern {
            bytes: bytes.into(),
            flags,
            sid: None,
            msg: None,
        }
    }

    /// Set case-insensitive matching.
    pub fn caseless(mut self) -> Self {
        self.flags |= Flags::CASELESS;
        self
    }

    /// Attach the originating rule's sid.
    pub fn sid(mut self, sid: u32) -> Self {
        self.sid = Some(sid);
        self
    }

    /// Attach the originating rule's message.
    pub fn msg<S: Into<String>>(mut self, msg: S) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// Number of bytes in the pattern.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the pattern holds no bytes. Such a pattern is refused at
    /// pattern-set construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether this pattern matches irrespective of ASCII case.
    pub fn nocase(&self) -> bool {
        self.flags.contains(Flags::CASELESS)
    }

    /// Parse a `sid:/bytes/flags` description: an optional numeric rule
    /// id, the literal bytes between slashes, and trailing flag letters.
    /// A bare string parses as the whole pattern with no flags.
    pub fn parse(s: &str) -> Result<Pattern> {
        let (sid, expr) = match s.find(':') {
            Some(off) => match s[..off].parse::<u32>() {
                Ok(sid) => (Some(sid), &s[off + 1..]),
                Err(_) => (None, s),
            },
            None => (None, s),
        };

        let pattern = match (expr.starts_with('/'), expr.rfind('/')) {
            (true, Some(end)) if end > 0 => Pattern {
                bytes: expr[1..end].into(),
                flags: expr[end + 1..].parse()?,
                sid,
                msg: None,
            },

            _ => Pattern {
                bytes: expr.into(),
                flags: Flags::empty(),
                sid,
                msg: None,
            },
        };

        debug!("pattern `{}` parsed to `{}`", s, pattern);

        Ok(pattern)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sid) = self.sid {
            write!(f, "{}:", sid)?;
        }

        let expr = String::from_utf8_lossy(&self.bytes);

        if self.sid.is_some() || !self.flags.is_empty() {
            write!(f, "/{}/{}", expr, self.flags)
        } else {
            write!(f, "{}", expr)
        }
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

/// Vec of `Pattern`
pub type Patterns = Vec<Pattern>;

/// Define a [`Pattern`] with optional flags.
///
/// ```
/// use multiscan::Flags;
///
/// let p = multiscan::pattern! {"cmd.exe", flags => Flags::CASELESS};
/// assert!(p.nocase());
/// ```
#[macro_export]
macro_rules! pattern {
    ($expr:expr) => {
        $crate::Pattern::new($expr)
    };
    ($expr:expr, flags => $flags:expr) => {
        $crate::Pattern::with_flags($expr, $flags)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let _ = pretty_env_logger::try_init();

        assert_eq!("i".parse::<Flags>().unwrap(), Flags::CASELESS);
        assert_eq!(Flags::CASELESS.to_string(), "i");
        assert!("x".parse::<Flags>().is_err());
    }

    #[test]
    fn test_parse() {
        let _ = pretty_env_logger::try_init();

        let p = Pattern::parse("test").unwrap();

        assert_eq!(p.bytes, b"test");
        assert!(p.flags.is_empty());
        assert_eq!(p.sid, None);

        let p = Pattern::parse("/test/i").unwrap();

        assert_eq!(p.bytes, b"test");
        assert_eq!(p.flags, Flags::CASELESS);

        let p = Pattern::parse("1394:/cmd.exe/i").unwrap();

        assert_eq!(p.bytes, b"cmd.exe");
        assert_eq!(p.flags, Flags::CASELESS);
        assert_eq!(p.sid, Some(1394));

        let p = Pattern::parse("test/i").unwrap();

        assert_eq!(p.bytes, b"test/i");
        assert!(p.flags.is_empty());
    }

    #[test]
    fn test_display_round_trip() {
        let p = Pattern::new("uid=0").sid(42).caseless();
        let back = Pattern::parse(&p.to_string()).unwrap();

        assert_eq!(back.bytes, p.bytes);
        assert_eq!(back.flags, p.flags);
        assert_eq!(back.sid, p.sid);
    }

    #[test]
    fn test_pattern_macro() {
        let p = pattern! {"GET /"};

        assert_eq!(p.bytes, b"GET /");
        assert!(!p.nocase());

        let p = pattern! {"cmd.exe", flags => Flags::CASELESS};

        assert!(p.nocase());
    }
}
