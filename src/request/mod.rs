//! Validated edit requests
//!
//! Turns parsed command-line flags into a [`MutationRequest`]: the selector
//! that picks documents, the per-document changes, the optional list
//! description, and the dry-run switch.
//!
//! List IDs are normalized the way the archiver stores them in `list_raw`:
//! `dev@foo.example.org` and `<dev.foo.example.org>` both become
//! `<dev.foo.example.org>`. With `--notag` only the `@` is rewritten.

pub mod error;

pub use error::RequestError;

use std::fmt;

use crate::cli::Cli;
use crate::store::{Query, fields};

/// Normalized mailing list identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListId(String);

impl ListId {
    /// Normalize a list ID or posting address
    ///
    /// Every `@` becomes `.`. When `tagged`, surrounding `<` and `>` are
    /// stripped and the result is wrapped in a single pair again, so
    /// normalizing twice yields the same ID.
    #[must_use]
    pub fn normalize(raw: &str, tagged: bool) -> Self {
        let dotted = raw.replace('@', ".");
        if tagged {
            Self(format!("<{}>", dotted.trim_matches(['<', '>'])))
        } else {
            Self(dotted)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ListId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Visibility override for matched emails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Value stored in the `private` field
    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }
}

/// A validated combination of selector, changes and mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    /// Source list (`--source`)
    pub source: Option<ListId>,
    /// Single message selector (`--mid`), wins over `source` for matching
    pub message_id: Option<String>,
    /// Match `source` as a wildcard pattern
    pub wildcard: bool,
    /// New list ID (`--rename`)
    pub target: Option<ListId>,
    pub visibility: Option<Visibility>,
    pub delete: bool,
    /// List description to upsert (`--desc`)
    pub description: Option<String>,
    /// Text to replace with the redaction placeholder (`--obfuscate`)
    pub redact: Option<String>,
    /// Count only, write nothing (`--test`)
    pub dry_run: bool,
}

impl MutationRequest {
    /// Validate parsed flags
    ///
    /// # Errors
    /// Returns a [`RequestError`] when no source is given, no action is given,
    /// both `--public` and `--private` are set, a description has no list to
    /// attach to, or the redaction text is empty.
    pub fn from_cli(cli: &Cli) -> Result<Self, RequestError> {
        let tagged = !cli.notag;

        if cli.source.is_none() && cli.mid.is_none() {
            return Err(RequestError::MissingSource);
        }
        let has_action = cli.rename.is_some()
            || cli.private
            || cli.public
            || cli.delete
            || cli.desc.is_some()
            || cli.obfuscate.is_some();
        if !has_action {
            return Err(RequestError::NothingToDo);
        }
        if cli.public && cli.private {
            return Err(RequestError::ConflictingVisibility);
        }
        if cli.obfuscate.as_deref() == Some("") {
            return Err(RequestError::EmptyRedaction);
        }

        let source = cli.source.as_deref().map(|s| ListId::normalize(s, tagged));
        let target = cli.rename.as_deref().map(|s| ListId::normalize(s, tagged));
        if cli.desc.is_some() && source.is_none() && target.is_none() {
            return Err(RequestError::DescriptionWithoutList);
        }

        let visibility = if cli.private {
            Some(Visibility::Private)
        } else if cli.public {
            Some(Visibility::Public)
        } else {
            None
        };

        Ok(Self {
            source,
            message_id: cli.mid.clone(),
            wildcard: cli.wildcard,
            target,
            visibility,
            delete: cli.delete,
            description: cli.desc.clone(),
            redact: cli.obfuscate.clone(),
            dry_run: cli.test,
        })
    }

    /// Whether any change applies to the matched emails themselves
    #[must_use]
    pub const fn has_document_mutations(&self) -> bool {
        self.target.is_some() || self.visibility.is_some() || self.delete || self.redact.is_some()
    }

    /// List the description is stored under: the rename target if any
    #[must_use]
    pub fn effective_list(&self) -> Option<&ListId> {
        self.target.as_ref().or(self.source.as_ref())
    }

    /// Store query selecting the emails to edit
    ///
    /// A message ID takes precedence over any list selector.
    #[must_use]
    pub fn query(&self) -> Option<Query> {
        if let Some(mid) = &self.message_id {
            return Some(Query::term(fields::MID, mid.as_str()));
        }
        self.source.as_ref().map(|list| {
            if self.wildcard {
                Query::wildcard(fields::LIST_RAW, list.as_str())
            } else {
                Query::term(fields::LIST_RAW, list.as_str())
            }
        })
    }
}
