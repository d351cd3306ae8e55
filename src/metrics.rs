use std::collections::BTreeMap;

use crate::datasets::{RatingsStore, UserRatings};

/// `a` から見た `b` の類似度
///
/// normA は `a` の全評価で計算するが、dot と normB は両者が評価したアイテムだけで計算する。
/// そのため similarity(a, b) と similarity(b, a) は一般に一致しない。
pub fn similarity(a: &UserRatings, b: &UserRatings) -> f64 {
    let mut dot_product = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (item, &rating_a) in a {
        let rating_a = f64::from(rating_a);
        norm_a += rating_a * rating_a;

        if let Some(&rating_b) = b.get(item) {
            let rating_b = f64::from(rating_b);
            dot_product += rating_a * rating_b;
            norm_b += rating_b * rating_b;
        }
    }

    // 共通アイテムなし
    if dot_product == 0.0 || norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product / (norm_a.sqrt() * norm_b.sqrt())
}

/// 対象ユーザー以外の全ユーザーとの類似度を計算する
///
/// 対象ユーザーが存在しなければ None
pub fn similarity_scores(store: &RatingsStore, target: &str) -> Option<BTreeMap<String, f64>> {
    let target_ratings = store.get(target)?;

    let scores = store
        .users()
        .filter(|(user, _)| *user != target)
        .map(|(user, ratings)| {
            let score = similarity(target_ratings, ratings);
            tracing::debug!(user = target, other = user, score, "similarity");
            (user.to_string(), score)
        })
        .collect();
    Some(scores)
}
