use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::error::RecError;
use crate::types::{Rating, RatingRecord, MAX_RATING, MIN_RATING};

/// 1ユーザー分の評価 (item_id -> rating)
pub type UserRatings = BTreeMap<String, Rating>;

/// ユーザーIDを正規化する (前後の空白を除いて大文字にする)
pub fn normalize_user_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// user_id -> (item_id -> rating) の読み取り専用ストア
///
/// 構築後は変更できない。BTreeMapなので走査順が固定され、
/// 浮動小数点の加算順も実行ごとに変わらない。
#[derive(Debug, Clone, Default)]
pub struct RatingsStore {
    users: BTreeMap<String, UserRatings>,
}

impl RatingsStore {
    /// 組み込みのサンプルデータ
    pub fn sample() -> Self {
        let seed: [(&str, &[(&str, Rating)]); 4] = [
            ("U1", &[("Item1", 5), ("Item2", 3), ("Item3", 4)]),
            ("U2", &[("Item1", 3), ("Item2", 4), ("Item4", 2)]),
            ("U3", &[("Item2", 5), ("Item3", 3), ("Item4", 4), ("Item5", 4)]),
            ("U4", &[("Item1", 4), ("Item3", 4), ("Item4", 3), ("Item5", 5)]),
        ];

        let users = seed
            .iter()
            .map(|(user, ratings)| {
                let ratings = ratings
                    .iter()
                    .map(|(item, rating)| (item.to_string(), *rating))
                    .collect();
                (user.to_string(), ratings)
            })
            .collect();
        Self { users }
    }

    /// 検証済みのレコード列からストアを作る
    pub fn from_records(records: impl IntoIterator<Item = RatingRecord>) -> Result<Self, RecError> {
        let mut users: BTreeMap<String, UserRatings> = BTreeMap::new();
        for record in records {
            let user = normalize_user_id(&record.user_id);
            let item = record.item_id.trim().to_string();
            // 空のIDは受け付けない
            if user.is_empty() {
                return Err(RecError::EmptyId { field: "userId" });
            }
            if item.is_empty() {
                return Err(RecError::EmptyId { field: "itemId" });
            }
            if !(MIN_RATING..=MAX_RATING).contains(&record.rating) {
                return Err(RecError::InvalidRating {
                    user,
                    item,
                    rating: record.rating,
                });
            }
            let ratings = users.entry(user.clone()).or_default();
            if ratings.insert(item.clone(), record.rating).is_some() {
                return Err(RecError::DuplicateRating { user, item });
            }
        }
        Ok(Self { users })
    }

    /// ヘッダー付きCSV (userId,itemId,rating) を読み込む
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let records = reader
            .deserialize()
            .collect::<Result<Vec<RatingRecord>, csv::Error>>()?;
        let store = Self::from_records(records)?;
        tracing::info!(users = store.len(), "loaded ratings");
        Ok(store)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RecError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// 未知のユーザーは None。評価ゼロ件の既知ユーザーとは区別される。
    pub fn get(&self, user_id: &str) -> Option<&UserRatings> {
        self.users.get(user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = (&str, &UserRatings)> {
        self.users.iter().map(|(user, ratings)| (user.as_str(), ratings))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, item: &str, rating: Rating) -> RatingRecord {
        RatingRecord {
            user_id: user.to_string(),
            item_id: item.to_string(),
            rating,
        }
    }

    #[test]
    fn test_sample_data() {
        let store = RatingsStore::sample();
        assert_eq!(store.len(), 4);

        let u3 = store.get("U3").unwrap();
        assert_eq!(u3.len(), 4);
        assert_eq!(u3.get("Item5"), Some(&4));
        assert_eq!(store.get("U1").unwrap().get("Item4"), None);
    }

    #[test]
    fn test_unknown_user_is_none() {
        let store = RatingsStore::sample();
        assert!(store.get("U9").is_none());
        assert!(store.get("u1").is_none());
    }

    #[test]
    fn test_normalize_user_id() {
        assert_eq!(normalize_user_id("  u1 \n"), "U1");
        assert_eq!(normalize_user_id("U2"), "U2");
    }

    #[test]
    fn test_from_reader() {
        let csv = "userId,itemId,rating\nu1,A,5\nU1, B ,3\nu2,A,1\n";
        let store = RatingsStore::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(store.len(), 2);
        let u1 = store.get("U1").unwrap();
        assert_eq!(u1.get("A"), Some(&5));
        assert_eq!(u1.get("B"), Some(&3));
        assert_eq!(store.get("U2").unwrap().get("A"), Some(&1));
    }

    #[test]
    fn test_from_reader_rejects_out_of_range_rating() {
        let csv = "userId,itemId,rating\nU1,A,6\n";
        let err = RatingsStore::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RecError::InvalidRating { rating: 6, .. }));
    }

    #[test]
    fn test_from_reader_rejects_malformed_row() {
        let csv = "userId,itemId,rating\nU1,A,five\n";
        let err = RatingsStore::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RecError::Csv(_)));
    }

    #[test]
    fn test_from_reader_rejects_blank_user_id() {
        let csv = "userId,itemId,rating\n  ,A,3\nU1,A,4\n";
        let err = RatingsStore::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RecError::EmptyId { field: "userId" }));
    }

    #[test]
    fn test_empty_item_id() {
        let err = RatingsStore::from_records(vec![record("U1", " ", 3)]).unwrap_err();
        assert!(matches!(err, RecError::EmptyId { field: "itemId" }));
    }

    #[test]
    fn test_duplicate_rating() {
        let err = RatingsStore::from_records(vec![record("U1", "A", 2), record("u1", "A", 4)])
            .unwrap_err();
        match err {
            RecError::DuplicateRating { user, item } => {
                assert_eq!(user, "U1");
                assert_eq!(item, "A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
