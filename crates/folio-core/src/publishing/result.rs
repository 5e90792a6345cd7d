use std::fmt;

use folio_core_types::DocumentId;
use serde::{Deserialize, Serialize};

/// Outcome of a publish or unpublish attempt
///
/// Business-rule failures are values of this type, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishResultType {
    SuccessPublish,
    SuccessPublishCulture,
    /// Branch item already published without changes
    SuccessPublishAlready,
    SuccessUnpublish,
    SuccessUnpublishAlready,
    SuccessUnpublishCulture,
    SuccessUnpublishLastCulture,
    SuccessUnpublishMandatoryCulture,
    SuccessMixedCulture,
    FailedPublishNothingToPublish,
    FailedPublishContentInvalid,
    FailedPublishHasExpired,
    FailedPublishCultureHasExpired,
    FailedPublishAwaitingRelease,
    FailedPublishCultureAwaitingRelease,
    FailedPublishPathNotPublished,
    FailedPublishIsTrashed,
    FailedPublishMandatoryCultureMissing,
}

impl PublishResultType {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            PublishResultType::SuccessPublish
                | PublishResultType::SuccessPublishCulture
                | PublishResultType::SuccessPublishAlready
                | PublishResultType::SuccessUnpublish
                | PublishResultType::SuccessUnpublishAlready
                | PublishResultType::SuccessUnpublishCulture
                | PublishResultType::SuccessUnpublishLastCulture
                | PublishResultType::SuccessUnpublishMandatoryCulture
                | PublishResultType::SuccessMixedCulture
        )
    }

    /// Short reason used in log lines
    pub fn reason(&self) -> &'static str {
        match self {
            PublishResultType::FailedPublishNothingToPublish => "nothing to publish",
            PublishResultType::FailedPublishContentInvalid => "document is invalid",
            PublishResultType::FailedPublishHasExpired => "document has expired",
            PublishResultType::FailedPublishCultureHasExpired => "document culture has expired",
            PublishResultType::FailedPublishAwaitingRelease => "document is awaiting release",
            PublishResultType::FailedPublishCultureAwaitingRelease => {
                "document culture is awaiting release"
            }
            PublishResultType::FailedPublishPathNotPublished => "parent is not published",
            PublishResultType::FailedPublishIsTrashed => "document is trashed",
            PublishResultType::FailedPublishMandatoryCultureMissing => {
                "mandatory culture is missing"
            }
            _ => "ok",
        }
    }
}

impl fmt::Display for PublishResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub result: PublishResultType,
    pub document_id: DocumentId,
    /// Aliases of properties that failed validation
    pub invalid_properties: Vec<String>,
}

impl PublishResult {
    pub fn new(result: PublishResultType, document_id: DocumentId) -> Self {
        Self {
            result,
            document_id,
            invalid_properties: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_classification() {
        assert!(PublishResultType::SuccessMixedCulture.is_success());
        assert!(PublishResultType::SuccessPublishAlready.is_success());
        assert!(!PublishResultType::FailedPublishPathNotPublished.is_success());
        assert!(!PublishResultType::FailedPublishMandatoryCultureMissing.is_success());
    }
}
