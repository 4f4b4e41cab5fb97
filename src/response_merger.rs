//! Merging of two responses that share a status key.
//!
//! Responses for one key can come from several places: route defaults, thrown exceptions in
//! doc comments, response attributes and the hand-written partial document. They are folded
//! pairwise in that order, so the most specific source is always applied last.

use crate::openapi::Response;
use log::debug;

pub struct ResponseMerger;

impl ResponseMerger {
    /// Merges `incoming` into `existing`.
    ///
    /// - the description is taken from `incoming` unless it is missing or empty
    /// - content is the union of both maps; for a MIME type present on both sides the
    ///   incoming content wins, existing MIME types keep their position and new ones are
    ///   appended
    ///
    /// Both responses must share the same key.
    pub fn merge(existing: Response, incoming: Response) -> Response {
        debug_assert_eq!(
            existing.key(),
            incoming.key(),
            "responses with different keys cannot be merged"
        );

        let (key, existing_description, mut content) = existing.into_parts();
        let (_, incoming_description, incoming_content) = incoming.into_parts();

        debug!(
            "Merging response {}: {} existing + {} incoming content types",
            key,
            content.len(),
            incoming_content.len()
        );

        let description = match incoming_description {
            Some(description) if !description.is_empty() => Some(description),
            _ => existing_description,
        };

        for (mime_type, value) in incoming_content {
            content.insert(mime_type, value);
        }

        Response::from_parts(key, description, content)
    }
}
