//! Persisting description edits.
//!
//! A [`DescriptionsChanger`] sends one description to the repository against
//! the last known revision, then applies whatever the repository saved to the
//! local entity. An empty description removes the term.

use crate::codec::ObjectReader;
use crate::error::RepoApiError;
use crate::model::{Entity, EntityId, Term};
use crate::registry::WireValue;

/// The subset of the repository API used for description edits.
pub trait RepoApi {
    /// Sets (or with empty `text`, removes) a description. Returns the raw
    /// response, which carries the saved entity terms and `lastrevid`.
    fn set_description(
        &self,
        id: EntityId,
        base_revision: u64,
        language: &str,
        text: &str,
    ) -> Result<WireValue, RepoApiError>;
}

/// Tracks the revision each edit is based on.
pub trait RevisionStore {
    fn description_revision(&self) -> u64;

    fn set_description_revision(&mut self, revision: u64);
}

pub struct DescriptionsChanger<A, R> {
    api: A,
    revisions: R,
    entity: Entity,
}

impl<A: RepoApi, R: RevisionStore> DescriptionsChanger<A, R> {
    pub fn new(api: A, revisions: R, entity: Entity) -> Self {
        Self {
            api,
            revisions,
            entity,
        }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn revisions(&self) -> &R {
        &self.revisions
    }

    /// Saves `description` and returns the term the repository stored, or
    /// `None` when the description was removed.
    pub fn set_description(&mut self, description: &Term) -> Result<Option<Term>, RepoApiError> {
        let language = description.language();
        let response = self.api.set_description(
            self.entity.id(),
            self.revisions.description_revision(),
            language,
            description.text(),
        )?;

        let (saved, revision) = read_response(&response, language)?;
        if let Some(revision) = revision {
            self.revisions.set_description_revision(revision);
        }

        let fingerprint = self.entity.fingerprint_mut();
        match &saved {
            Some(term) => fingerprint.set_description(term.clone()),
            None => {
                fingerprint.remove_description(language);
            }
        }
        tracing::debug!(
            entity = %self.entity.id(),
            language,
            revision = ?revision,
            removed = saved.is_none(),
            "description saved"
        );
        Ok(saved)
    }
}

/// Reads the saved description for `language` and the new revision, if the
/// response carries one. An absent or empty `value` means the description
/// was removed.
fn read_response(
    response: &WireValue,
    language: &str,
) -> Result<(Option<Term>, Option<u64>), RepoApiError> {
    let invalid = |_| invalid_response();
    let entity = ObjectReader::new(response, "response")
        .and_then(|r| r.required("entity"))
        .and_then(|e| ObjectReader::new(e, "entity"))
        .map_err(invalid)?;

    let revision = match entity.optional("lastrevid") {
        None => None,
        Some(WireValue::Number(n)) => Some(n.as_u64().ok_or_else(invalid_response)?),
        Some(WireValue::String(s)) => Some(s.parse().map_err(|_| invalid_response())?),
        Some(_) => return Err(invalid_response()),
    };

    let saved = entity
        .optional_object("descriptions")
        .map_err(invalid)?
        .and_then(|descriptions| descriptions.get(language))
        .filter(|term| term.get("removed").is_none());
    let text = match saved {
        Some(wire) => ObjectReader::new(wire, "description")
            .and_then(|term| term.optional_str("value"))
            .map_err(invalid)?,
        None => None,
    };
    let term = text
        .filter(|text| !text.is_empty())
        .map(|text| Term::new(language, text));
    Ok((term, revision))
}

fn invalid_response() -> RepoApiError {
    RepoApiError::new("invalid-response")
}
