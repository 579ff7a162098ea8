//! Best-effort cache of in-progress quiz answers
//!
//! Answers are kept per quiz so an attempt can be resumed before submission.
//! Nothing here is validated and storage failures only produce warnings.

use crate::error::CoreError;
use crate::storage::KeyValueStorage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

const ANSWERS_PREFIX: &str = "quiz_answers_v1";
const RESULT_PREFIX: &str = "quiz_result_id";

/// One answered question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAnswer {
    pub question_id: i64,
    #[serde(rename = "type")]
    pub question_type: String,
    pub value: Option<String>,
}

#[derive(Clone)]
pub struct AnswerCache {
    storage: Arc<dyn KeyValueStorage>,
}

impl AnswerCache {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    fn answers_key(quiz_id: i64) -> String {
        format!("{ANSWERS_PREFIX}:{quiz_id}")
    }

    fn result_key(quiz_id: i64) -> String {
        format!("{RESULT_PREFIX}:{quiz_id}")
    }

    /// Cached answers keyed by question id, empty when nothing usable is stored
    pub fn load(&self, quiz_id: i64) -> BTreeMap<i64, CachedAnswer> {
        let raw = match self.storage.get(&Self::answers_key(quiz_id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read cached answers for quiz {quiz_id}: {e}");
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding malformed answer cache for quiz {quiz_id}: {e}");
            BTreeMap::new()
        })
    }

    /// Record or replace the answer to one question
    pub fn record(&self, quiz_id: i64, answer: CachedAnswer) {
        let mut answers = self.load(quiz_id);
        answers.insert(answer.question_id, answer);

        let result = serde_json::to_string(&answers)
            .map_err(CoreError::from)
            .and_then(|raw| self.storage.set(&Self::answers_key(quiz_id), &raw));
        if let Err(e) = result {
            warn!("Failed to cache answer for quiz {quiz_id}: {e}");
        }
    }

    pub fn clear(&self, quiz_id: i64) {
        if let Err(e) = self.storage.remove(&Self::answers_key(quiz_id)) {
            warn!("Failed to clear answer cache for quiz {quiz_id}: {e}");
        }
    }

    /// Remember the result id of the latest submission of a quiz
    pub fn remember_result(&self, quiz_id: i64, quiz_result_id: i64) {
        if let Err(e) = self
            .storage
            .set(&Self::result_key(quiz_id), &quiz_result_id.to_string())
        {
            warn!("Failed to remember result for quiz {quiz_id}: {e}");
        }
    }

    pub fn last_result(&self, quiz_id: i64) -> Option<i64> {
        match self.storage.get(&Self::result_key(quiz_id)) {
            Ok(raw) => raw.and_then(|raw| raw.parse().ok()),
            Err(e) => {
                warn!("Failed to read result id for quiz {quiz_id}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::tests::storage::UnavailableStorage;

    fn answer(question_id: i64, value: &str) -> CachedAnswer {
        CachedAnswer {
            question_id,
            question_type: "OX".to_string(),
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn test_record_replaces_previous_answer() {
        let cache = AnswerCache::new(Arc::new(MemoryStorage::new()));
        cache.record(3, answer(10, "O"));
        cache.record(3, answer(11, "X"));
        cache.record(3, answer(10, "X"));

        let answers = cache.load(3);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[&10].value.as_deref(), Some("X"));
        assert!(cache.load(4).is_empty());
    }

    #[test]
    fn test_clear_only_touches_one_quiz() {
        let cache = AnswerCache::new(Arc::new(MemoryStorage::new()));
        cache.record(1, answer(1, "O"));
        cache.record(2, answer(1, "O"));
        cache.clear(1);

        assert!(cache.load(1).is_empty());
        assert_eq!(cache.load(2).len(), 1);
    }

    #[test]
    fn test_result_id_round_trip() {
        let cache = AnswerCache::new(Arc::new(MemoryStorage::new()));
        assert_eq!(cache.last_result(5), None);
        cache.remember_result(5, 42);
        assert_eq!(cache.last_result(5), Some(42));
    }

    #[test]
    fn test_malformed_cache_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("quiz_answers_v1:9", "[1, 2").unwrap();
        let cache = AnswerCache::new(storage);

        assert!(cache.load(9).is_empty());
        cache.record(9, answer(1, "O"));
        assert_eq!(cache.load(9).len(), 1);
    }

    #[test]
    fn test_unavailable_storage_is_tolerated() {
        let cache = AnswerCache::new(Arc::new(UnavailableStorage));
        cache.record(1, answer(1, "O"));
        cache.remember_result(1, 2);
        cache.clear(1);

        assert!(cache.load(1).is_empty());
        assert_eq!(cache.last_result(1), None);
    }
}
