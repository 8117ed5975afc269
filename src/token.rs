use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A token type, pairing a numeric id with a display name.
///
/// The id doubles as the lexing priority: when a DFA state accepts for
/// several patterns at once, the pattern whose token has the lowest id wins.
#[derive(Clone, Debug)]
pub struct TokenType {
    /// Unique positive identifier. Lower means higher priority.
    pub id: u32,
    /// The name of this token type, e.g. "NUMBER".
    pub name: String,
}

impl TokenType {
    pub fn new(id: u32, name: &str) -> Self {
        TokenType {
            id,
            name: name.into(),
        }
    }
}

// Identity is the id alone. The name is presentation.
impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TokenType {}

impl Hash for TokenType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TokenType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A matched lexeme paired with its token type.
///
/// `ty` is `None` when the simulator could not advance at this position; the
/// lexeme then covers the offending input and the token reads as ERROR.
#[derive(Clone, Debug, PartialEq)]
pub struct LexicalToken {
    /// The slice of input this token covers.
    pub lexeme: String,
    /// The recognized token type, or `None` for a lexical error.
    pub ty: Option<TokenType>,
}

impl LexicalToken {
    pub fn new(ty: TokenType, lexeme: impl Into<String>) -> Self {
        LexicalToken {
            lexeme: lexeme.into(),
            ty: Some(ty),
        }
    }

    /// Construct the distinguished ERROR token over the given lexeme.
    pub fn error(lexeme: impl Into<String>) -> Self {
        LexicalToken {
            lexeme: lexeme.into(),
            ty: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.ty.is_none()
    }

    /// The token type name, or "ERROR".
    pub fn name(&self) -> &str {
        match &self.ty {
            Some(ty) => &ty.name,
            None => "ERROR",
        }
    }
}

impl fmt::Display for LexicalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "['{}' -> {}]", self.lexeme, self.name())
    }
}
