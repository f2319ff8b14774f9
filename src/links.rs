//! Link generation
//!
//! Deterministic string composition of self/related/relationship/next
//! URLs from the request context and resource identity. No I/O and no
//! side effects; path segments derived from types, ids, and relationship
//! names are percent-encoded.

use crate::cursor;
use crate::types::RequestContext;

/// Query parameter carrying the pagination cursor
pub const CURSOR_PARAM: &str = "page[cursor]";

/// Path of a resource collection: `/articles`
pub fn collection_path(resource_type: &str) -> String {
    format!("/{}", urlencoding::encode(resource_type))
}

/// Path of a single resource: `/articles/42`
pub fn resource_path(resource_type: &str, id: &str) -> String {
    format!(
        "/{}/{}",
        urlencoding::encode(resource_type),
        urlencoding::encode(id)
    )
}

/// Path of a relationship itself: `/articles/42/relationships/author`
pub fn relationship_path(resource_type: &str, id: &str, relationship: &str) -> String {
    format!(
        "{}/relationships/{}",
        resource_path(resource_type, id),
        urlencoding::encode(relationship)
    )
}

/// Path of a relationship's related resources: `/articles/42/author`
pub fn related_path(resource_type: &str, id: &str, relationship: &str) -> String {
    format!(
        "{}/{}",
        resource_path(resource_type, id),
        urlencoding::encode(relationship)
    )
}

/// Absolute link to the active request itself
pub fn self_link(ctx: &RequestContext) -> String {
    format!("{}{}", ctx.base_url, ctx.path)
}

/// Absolute link to a resource
pub fn resource_link(ctx: &RequestContext, resource_type: &str, id: &str) -> String {
    format!("{}{}", ctx.base_url, resource_path(resource_type, id))
}

/// Absolute link to a relationship
pub fn relationship_link(
    ctx: &RequestContext,
    resource_type: &str,
    id: &str,
    relationship: &str,
) -> String {
    format!(
        "{}{}",
        ctx.base_url,
        relationship_path(resource_type, id, relationship)
    )
}

/// Absolute link to a relationship's related resources
pub fn related_link(
    ctx: &RequestContext,
    resource_type: &str,
    id: &str,
    relationship: &str,
) -> String {
    format!(
        "{}{}",
        ctx.base_url,
        related_path(resource_type, id, relationship)
    )
}

/// Absolute link to the next page of the active request
pub fn next_link(ctx: &RequestContext, state: &cursor::CursorState) -> String {
    next_link_with_token(ctx, &cursor::encode(state))
}

/// Absolute next-page link carrying an already-encoded token
pub fn next_link_with_token(ctx: &RequestContext, token: &str) -> String {
    format!(
        "{}{}?{}={}",
        ctx.base_url,
        ctx.path,
        CURSOR_PARAM,
        urlencoding::encode(token)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessTier, Principal};
    use crate::cursor::CursorState;

    fn ctx() -> RequestContext {
        RequestContext::new(
            Principal::new("u-1", AccessTier::public()),
            "https://api.example.org",
            "/articles",
        )
    }

    #[test]
    fn test_paths() {
        assert_eq!(collection_path("articles"), "/articles");
        assert_eq!(resource_path("articles", "42"), "/articles/42");
        assert_eq!(
            relationship_path("articles", "42", "author"),
            "/articles/42/relationships/author"
        );
        assert_eq!(related_path("articles", "42", "author"), "/articles/42/author");
    }

    #[test]
    fn test_id_segments_are_percent_encoded() {
        assert_eq!(
            resource_path("articles", "a/b c"),
            "/articles/a%2Fb%20c"
        );
    }

    #[test]
    fn test_absolute_links() {
        let ctx = ctx();
        assert_eq!(self_link(&ctx), "https://api.example.org/articles");
        assert_eq!(
            resource_link(&ctx, "people", "9"),
            "https://api.example.org/people/9"
        );
    }

    #[test]
    fn test_next_link_round_trips_through_cursor() {
        let ctx = ctx();
        let state = CursorState { limit: 10, offset: 20 };
        let link = next_link(&ctx, &state);
        let prefix = "https://api.example.org/articles?page[cursor]=";
        assert!(link.starts_with(prefix), "link: {link}");

        let token = urlencoding::decode(&link[prefix.len()..]).unwrap();
        assert_eq!(crate::cursor::decode(&token).unwrap(), state);
    }
}
