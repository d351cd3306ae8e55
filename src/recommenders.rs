use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::datasets::RatingsStore;
use crate::error::RecError;
use crate::metrics::similarity_scores;
use crate::types::Candidate;

pub trait Recommender {
    fn recommend(&self, user_id: &str) -> Result<Vec<Candidate>, RecError>;
}

/// 類似ユーザーの評価を類似度で重み付けして集計する
///
/// 類似度が0以下のユーザーは無視する。対象ユーザーが既に評価したアイテムは候補にしない。
/// `similarities` に無いユーザーは類似度0として扱う。
pub fn aggregate(
    store: &RatingsStore,
    target: &str,
    similarities: &BTreeMap<String, f64>,
) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();
    let Some(target_ratings) = store.get(target) else {
        return scores;
    };

    for (user, ratings) in store.users() {
        if user == target {
            continue;
        }
        let similarity = similarities.get(user).copied().unwrap_or(0.0);
        if similarity <= 0.0 {
            continue;
        }

        for (item, &rating) in ratings {
            if target_ratings.contains_key(item) {
                continue;
            }
            *scores.entry(item.clone()).or_insert(0.0) += similarity * f64::from(rating);
        }
    }
    scores
}

/// スコアの降順に並べる。同点はitem_idの昇順。
pub fn rank(scores: BTreeMap<String, f64>) -> Vec<Candidate> {
    let mut results: Vec<Candidate> = scores
        .into_iter()
        .map(|(item_id, score)| Candidate { item_id, score })
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    results
}

/// ユーザーベースの協調フィルタリング
pub struct UserBasedRecommender<'a> {
    pub store: &'a RatingsStore,
}

impl<'a> UserBasedRecommender<'a> {
    pub fn new(store: &'a RatingsStore) -> Self {
        Self { store }
    }
}

impl Recommender for UserBasedRecommender<'_> {
    fn recommend(&self, user_id: &str) -> Result<Vec<Candidate>, RecError> {
        let similarities = similarity_scores(self.store, user_id)
            .ok_or_else(|| RecError::UserNotFound(user_id.to_string()))?;

        let scores = aggregate(self.store, user_id, &similarities);
        tracing::info!(user = user_id, candidates = scores.len(), "aggregated recommendations");
        Ok(rank(scores))
    }
}
