//! In-process similarity index. Exact cosine search over every entry.
//!
//! Entries keep their first-insertion position, so equal scores always come
//! back in insertion order.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    cosine_similarity, metadata_matches, IndexError, Metadata, MetadataFilter,
    SimilarityCandidate, SimilarityIndex,
};

struct IndexEntry {
    id: String,
    vector: Vec<f32>,
    metadata: Metadata,
}

pub struct InMemoryIndex {
    dimension: usize,
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SimilarityIndex for InMemoryIndex {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> Result<(), IndexError> {
        self.check_dimension(&vector)?;
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => {
                existing.vector = vector;
                existing.metadata = metadata;
            }
            None => entries.push(IndexEntry {
                id: id.to_string(),
                vector,
                metadata,
            }),
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filters: Option<&MetadataFilter>,
    ) -> Result<Vec<SimilarityCandidate>, IndexError> {
        self.check_dimension(vector)?;
        let entries = self.entries.read().await;

        let mut scored: Vec<(&IndexEntry, f32)> = entries
            .iter()
            .filter(|e| filters.map_or(true, |f| metadata_matches(&e.metadata, f)))
            .map(|e| (e, cosine_similarity(vector, &e.vector)))
            .collect();

        // Stable sort: ties keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(entry, score)| SimilarityCandidate {
                id: entry.id.clone(),
                score,
                metadata: entry.metadata.clone(),
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<(), IndexError> {
        self.entries.write().await.retain(|e| e.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(industry: &str) -> Metadata {
        json!({ "industry": industry }).as_object().cloned().unwrap()
    }

    fn industry_filter(values: &[&str]) -> MetadataFilter {
        let mut filter = MetadataFilter::new();
        filter.insert(
            "industry".to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        filter
    }

    #[tokio::test]
    async fn test_upsert_then_filtered_query_then_delete() {
        let index = InMemoryIndex::new(3);
        index.upsert("5", vec![0.2, 0.4, 0.9], meta("tech")).await.unwrap();
        let filter = industry_filter(&["tech"]);

        let results = index.query(&[0.2, 0.4, 0.9], 10, Some(&filter)).await.unwrap();
        assert!(results.iter().any(|c| c.id == "5"));

        index.delete("5").await.unwrap();
        let results = index.query(&[0.2, 0.4, 0.9], 10, Some(&filter)).await.unwrap();
        assert!(results.iter().all(|c| c.id != "5"));
    }

    #[tokio::test]
    async fn test_round_trip_without_filters() {
        let index = InMemoryIndex::new(2);
        index.upsert("42", vec![1.0, 0.0], Metadata::new()).await.unwrap();

        let results = index.query(&[1.0, 0.0], 1, None).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "42");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_results_ordered_by_descending_score() {
        let index = InMemoryIndex::new(2);
        index.upsert("far", vec![0.0, 1.0], Metadata::new()).await.unwrap();
        index.upsert("near", vec![1.0, 0.1], Metadata::new()).await.unwrap();
        index.upsert("mid", vec![1.0, 1.0], Metadata::new()).await.unwrap();

        let ids: Vec<String> = index
            .query(&[1.0, 0.0], 10, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids, vec!["near", "mid", "far"]);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let index = InMemoryIndex::new(2);
        for id in ["b", "a", "c"] {
            index.upsert(id, vec![1.0, 0.0], Metadata::new()).await.unwrap();
        }

        let ids: Vec<String> = index
            .query(&[1.0, 0.0], 10, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_top_k_bounds_results() {
        let index = InMemoryIndex::new(2);
        for i in 0..5 {
            index
                .upsert(&i.to_string(), vec![1.0, i as f32], Metadata::new())
                .await
                .unwrap();
        }
        assert_eq!(index.query(&[1.0, 0.0], 2, None).await.unwrap().len(), 2);
        assert_eq!(index.query(&[1.0, 0.0], 0, None).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_upsert_same_id_replaces() {
        let index = InMemoryIndex::new(2);
        index.upsert("1", vec![1.0, 0.0], meta("tech")).await.unwrap();
        index.upsert("1", vec![0.0, 1.0], meta("finance")).await.unwrap();

        assert_eq!(index.len().await, 1);
        let results = index
            .query(&[0.0, 1.0], 10, Some(&industry_filter(&["finance"])))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["industry"], "finance");
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_noop() {
        let index = InMemoryIndex::new(2);
        index.delete("missing").await.unwrap();
        assert_eq!(index.len().await, 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let index = InMemoryIndex::new(3);
        let err = index.upsert("1", vec![1.0], Metadata::new()).await.unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }
}
