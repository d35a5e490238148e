//! Token kinds, the token registry, and token sets.
//!
//! A [`TokenKind`] is the category of a syntax construct ("if statement",
//! "left curly brace"). The parser front end builds one [`TokenRegistry`]
//! per grammar at startup; after that the registry is read-only and checks,
//! configuration, and dispatch all resolve names through it.

use std::collections::HashMap;

use thiserror::Error;

/// Stable identifier of a syntax construct category.
///
/// Ids are assigned by the [`TokenRegistry`] in registration order and are
/// only meaningful relative to the registry that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKind(u16);

impl TokenKind {
    /// Creates a kind from a raw id.
    ///
    /// Normally kinds come out of a [`TokenRegistry`]; this constructor
    /// exists for code that builds trees against a known registry layout.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A token name or id that the registry does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownToken {
    /// The name is not registered.
    #[error("unknown token name {0:?}")]
    Name(String),
    /// The id is out of range for the registry.
    #[error("unknown token id {0}")]
    Id(u16),
}

/// Process-wide mapping between grammar construct names and stable ids.
///
/// Built once by the parser front end, read-only afterwards; lookups need
/// no synchronization.
#[derive(Debug)]
pub struct TokenRegistry {
    names: Vec<String>,
    by_name: HashMap<String, TokenKind>,
}

impl TokenRegistry {
    /// Builds a registry from an ordered sequence of names.
    ///
    /// Ids are assigned in iteration order. A repeated name keeps its first
    /// id; later occurrences are ignored.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self {
            names: Vec::new(),
            by_name: HashMap::new(),
        };
        for name in names {
            let name = name.into();
            if registry.by_name.contains_key(&name) {
                continue;
            }
            let kind = TokenKind(registry.names.len() as u16);
            registry.by_name.insert(name.clone(), kind);
            registry.names.push(name);
        }
        registry
    }

    /// Resolves a token name to its id.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownToken::Name`] if the name is not registered.
    pub fn id_of(&self, name: &str) -> Result<TokenKind, UnknownToken> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| UnknownToken::Name(name.to_string()))
    }

    /// Resolves an id back to its canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownToken::Id`] if the id is out of range.
    pub fn name_of(&self, kind: TokenKind) -> Result<&str, UnknownToken> {
        self.names
            .get(kind.index())
            .map(String::as_str)
            .ok_or(UnknownToken::Id(kind.raw()))
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Every registered kind as a set.
    #[must_use]
    pub fn all(&self) -> TokenSet {
        let mut set = TokenSet::new();
        for index in 0..self.names.len() {
            set.insert(TokenKind(index as u16));
        }
        set
    }

    /// Resolves a list of names into a set.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownToken::Name`] for the first unresolvable name.
    pub fn set_of<S: AsRef<str>>(&self, names: &[S]) -> Result<TokenSet, UnknownToken> {
        let mut set = TokenSet::new();
        for name in names {
            set.insert(self.id_of(name.as_ref())?);
        }
        Ok(set)
    }
}

/// A set of token kinds backed by a bitmap.
///
/// Iteration order is ascending id order, which makes every consumer of a
/// set deterministic by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    blocks: Vec<u64>,
}

impl TokenSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a kind. Returns `true` if it was not already present.
    pub fn insert(&mut self, kind: TokenKind) -> bool {
        let (block, bit) = Self::slot(kind);
        if block >= self.blocks.len() {
            self.blocks.resize(block + 1, 0);
        }
        let present = self.blocks[block] & bit != 0;
        self.blocks[block] |= bit;
        !present
    }

    /// Returns `true` if the kind is in the set.
    #[must_use]
    pub fn contains(&self, kind: TokenKind) -> bool {
        let (block, bit) = Self::slot(kind);
        self.blocks.get(block).is_some_and(|b| b & bit != 0)
    }

    /// Adds every kind of `other` to this set.
    pub fn union_with(&mut self, other: &TokenSet) {
        if other.blocks.len() > self.blocks.len() {
            self.blocks.resize(other.blocks.len(), 0);
        }
        for (slot, block) in other.blocks.iter().enumerate() {
            self.blocks[slot] |= block;
        }
    }

    /// Returns `true` if every kind of this set is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &TokenSet) -> bool {
        self.blocks
            .iter()
            .enumerate()
            .all(|(slot, block)| block & !other.blocks.get(slot).copied().unwrap_or(0) == 0)
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| *b == 0)
    }

    /// Number of kinds in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterates the members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.blocks.iter().enumerate().flat_map(|(slot, &block)| {
            (0..64u16).filter_map(move |bit| {
                if block & (1u64 << bit) != 0 {
                    Some(TokenKind(slot as u16 * 64 + bit))
                } else {
                    None
                }
            })
        })
    }

    fn slot(kind: TokenKind) -> (usize, u64) {
        (kind.index() / 64, 1u64 << (kind.index() % 64))
    }
}

impl FromIterator<TokenKind> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        let mut set = Self::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// A check's claim over token kinds.
///
/// "Accept every kind" is an explicit declaration, never inferred from an
/// empty set: an empty [`TokenScope::Tokens`] means *no* tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScope {
    /// Every kind the registry knows.
    All,
    /// Exactly the listed kinds.
    Tokens(TokenSet),
}

impl TokenScope {
    /// A scope over the named kinds.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownToken::Name`] for the first unresolvable name.
    pub fn of<S: AsRef<str>>(registry: &TokenRegistry, names: &[S]) -> Result<Self, UnknownToken> {
        Ok(Self::Tokens(registry.set_of(names)?))
    }

    /// An empty scope (no tokens).
    #[must_use]
    pub fn none() -> Self {
        Self::Tokens(TokenSet::new())
    }

    /// Resolves the scope against a registry into a concrete set.
    #[must_use]
    pub fn resolve(&self, registry: &TokenRegistry) -> TokenSet {
        match self {
            Self::All => registry.all(),
            Self::Tokens(set) => set.clone(),
        }
    }
}
