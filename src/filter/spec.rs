//! Recipe filter specification
//!
//! Query parameters are mapped to typed predicates through a fixed table of
//! parsers. Unknown keys are ignored so that boundary-layer parameters
//! (paging, formatting) can share the same query string.

use serde::Serialize;

use crate::domain::DomainError;

/// Sentinel author value meaning "the requesting user"
pub const AUTHOR_ME: &str = "me";

/// Author filter as requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthorFilter {
    Me,
    Id(i64),
}

/// Filter request, before the requesting identity is bound
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeQuery {
    pub author: Option<AuthorFilter>,
    /// Tag slugs; a recipe matches if it carries any of them
    pub tags: Vec<String>,
    pub favorited_by_me: bool,
    pub in_cart_of_me: bool,
}

type ParamParser = fn(&mut RecipeQuery, &str) -> Result<(), DomainError>;

/// Filter key to parser mapping
const PARAMETERS: &[(&str, ParamParser)] = &[
    ("author", parse_author),
    ("tags", parse_tag),
    ("is_favorited", parse_is_favorited),
    ("is_in_shopping_cart", parse_is_in_shopping_cart),
];

impl RecipeQuery {
    /// Build from raw query pairs. Repeated keys accumulate (`tags`) or
    /// overwrite (everything else).
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, DomainError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = RecipeQuery::default();
        for (key, value) in pairs {
            if let Some((_, parse)) = PARAMETERS.iter().find(|(name, _)| *name == key.as_ref()) {
                parse(&mut query, value.as_ref())?;
            }
        }
        Ok(query)
    }

    /// Bind the requesting identity, producing the predicate list.
    ///
    /// "me"-relative predicates for an anonymous caller match nothing.
    pub fn resolve(self, requesting_user: Option<i64>) -> RecipeFilter {
        let mut predicates = Vec::new();

        if let Some(author) = self.author {
            let author_id = match author {
                AuthorFilter::Me => requesting_user,
                AuthorFilter::Id(id) => Some(id),
            };
            predicates.push(Predicate::Author(author_id));
        }
        if !self.tags.is_empty() {
            predicates.push(Predicate::AnyTag(self.tags));
        }
        if self.favorited_by_me {
            predicates.push(Predicate::FavoritedBy(requesting_user));
        }
        if self.in_cart_of_me {
            predicates.push(Predicate::InCartOf(requesting_user));
        }

        RecipeFilter { predicates }
    }
}

/// One typed condition over the recipe catalog. `None` identities come from
/// "me" filters on anonymous requests and never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Predicate {
    Author(Option<i64>),
    AnyTag(Vec<String>),
    FavoritedBy(Option<i64>),
    InCartOf(Option<i64>),
}

/// Conjunction of predicates; empty matches every recipe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeFilter {
    pub predicates: Vec<Predicate>,
}

fn parse_author(query: &mut RecipeQuery, value: &str) -> Result<(), DomainError> {
    let value = value.trim();
    query.author = Some(if value.eq_ignore_ascii_case(AUTHOR_ME) {
        AuthorFilter::Me
    } else {
        let id = value
            .parse::<i64>()
            .map_err(|_| DomainError::validation(format!("Invalid author filter: {:?}", value)))?;
        AuthorFilter::Id(id)
    });
    Ok(())
}

fn parse_tag(query: &mut RecipeQuery, value: &str) -> Result<(), DomainError> {
    let slug = value.trim();
    if !slug.is_empty() && !query.tags.iter().any(|t| t == slug) {
        query.tags.push(slug.to_string());
    }
    Ok(())
}

fn parse_is_favorited(query: &mut RecipeQuery, value: &str) -> Result<(), DomainError> {
    query.favorited_by_me = parse_flag("is_favorited", value)?;
    Ok(())
}

fn parse_is_in_shopping_cart(query: &mut RecipeQuery, value: &str) -> Result<(), DomainError> {
    query.in_cart_of_me = parse_flag("is_in_shopping_cart", value)?;
    Ok(())
}

/// Only the truthy sentinel restricts; the falsy one is the same as absent
fn parse_flag(name: &str, value: &str) -> Result<bool, DomainError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        other => Err(DomainError::validation(format!(
            "Invalid value for {}: {:?}",
            name, other
        ))),
    }
}
