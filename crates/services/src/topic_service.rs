use std::sync::Arc;

use momentum_core::calc;
use momentum_core::model::{
    Subtopic, SubtopicDraft, SubtopicId, SubtopicPatch, Topic, TopicDraft, TopicId, TopicPatch,
};
use storage::repository::{
    NewSubtopicRecord, NewTopicRecord, StorageError, SubtopicRepository, TopicRepository,
};

use crate::Clock;
use crate::error::TopicServiceError;

/// A topic enriched with its subtopics and freshly computed derived values.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicWithSubtopics {
    pub topic: Topic,
    pub subtopics: Vec<Subtopic>,
}

/// A subtopic plus its milestone earnings, computed on read.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtopicView {
    pub subtopic: Subtopic,
    pub milestone_earnings: f64,
}

/// Result of a reps adjustment: the subtopic and its recalculated parent.
#[derive(Debug, Clone, PartialEq)]
pub struct RepsAdjusted {
    pub subtopic: Subtopic,
    pub topic: Topic,
}

/// Orchestrates topic and subtopic CRUD plus derived-value upkeep.
///
/// Reads recompute and persist earnings/completion so stored values never go
/// stale ("always serve fresh calculated values"); the write-on-read side
/// effect is isolated in [`TopicService::recompute_and_save`].
#[derive(Clone)]
pub struct TopicService {
    clock: Clock,
    topics: Arc<dyn TopicRepository>,
    subtopics: Arc<dyn SubtopicRepository>,
}

impl TopicService {
    #[must_use]
    pub fn new(
        clock: Clock,
        topics: Arc<dyn TopicRepository>,
        subtopics: Arc<dyn SubtopicRepository>,
    ) -> Self {
        Self {
            clock,
            topics,
            subtopics,
        }
    }

    /// Create a new topic. Earnings and completion start at zero.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Topic` for validation failures,
    /// `TopicServiceError::Storage` if persistence fails.
    pub async fn create_topic(
        &self,
        draft: TopicDraft,
    ) -> Result<TopicWithSubtopics, TopicServiceError> {
        let now = self.clock.now();
        let topic = Topic::new(TopicId::new(0), draft, now)?;
        let id = self
            .topics
            .insert_topic(NewTopicRecord::from_topic(&topic))
            .await?;
        self.get_topic(id).await
    }

    /// Fetch a topic with recomputed derived values.
    ///
    /// The recomputed earnings/completion are persisted back before the
    /// enriched topic is returned, so a read after stale writes self-heals.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` with `NotFound` if the topic does
    /// not exist.
    pub async fn get_topic(&self, id: TopicId) -> Result<TopicWithSubtopics, TopicServiceError> {
        let topic = self.topics.get_topic(id).await?.ok_or(StorageError::NotFound)?;
        let subtopics = self.subtopics.subtopics_for_topic(id).await?;
        let topic = self.recompute_and_save(topic, &subtopics).await?;
        Ok(TopicWithSubtopics { topic, subtopics })
    }

    /// List all topics, each with recomputed derived values.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` if repository access fails.
    pub async fn list_topics(&self) -> Result<Vec<TopicWithSubtopics>, TopicServiceError> {
        let topics = self.topics.list_topics().await?;
        let mut enriched = Vec::with_capacity(topics.len());
        for topic in topics {
            let subtopics = self.subtopics.subtopics_for_topic(topic.id()).await?;
            let topic = self.recompute_and_save(topic, &subtopics).await?;
            enriched.push(TopicWithSubtopics { topic, subtopics });
        }
        Ok(enriched)
    }

    /// Apply a partial update, then recompute and persist derived values.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Topic` for validation failures,
    /// `TopicServiceError::Storage` with `NotFound` if the topic is missing.
    pub async fn update_topic(
        &self,
        id: TopicId,
        patch: TopicPatch,
    ) -> Result<TopicWithSubtopics, TopicServiceError> {
        let mut topic = self.topics.get_topic(id).await?.ok_or(StorageError::NotFound)?;
        topic.apply(patch, self.clock.now())?;
        let subtopics = self.subtopics.subtopics_for_topic(id).await?;
        let topic = self.recompute_and_save(topic, &subtopics).await?;
        Ok(TopicWithSubtopics { topic, subtopics })
    }

    /// Delete a topic. Its subtopics go with it.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` with `NotFound` if the topic does
    /// not exist.
    pub async fn delete_topic(&self, id: TopicId) -> Result<(), TopicServiceError> {
        self.topics.delete_topic(id).await?;
        Ok(())
    }

    /// The sorted, deduplicated set of all topics' categories.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` if repository access fails.
    pub async fn categories(&self) -> Result<Vec<String>, TopicServiceError> {
        let topics = self.topics.list_topics().await?;
        let mut categories: Vec<String> =
            topics.iter().map(|t| t.category().to_owned()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Create a subtopic under an existing topic and recalculate the parent.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` with `NotFound` if the parent
    /// topic does not exist, `TopicServiceError::Subtopic` for validation
    /// failures.
    pub async fn create_subtopic(
        &self,
        topic_id: TopicId,
        draft: SubtopicDraft,
    ) -> Result<SubtopicView, TopicServiceError> {
        let topic = self
            .topics
            .get_topic(topic_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        let subtopic = Subtopic::new(SubtopicId::new(0), topic_id, draft)?;
        let id = self
            .subtopics
            .insert_subtopic(NewSubtopicRecord::from_subtopic(&subtopic))
            .await?;

        let subtopics = self.subtopics.subtopics_for_topic(topic_id).await?;
        self.recompute_and_save(topic, &subtopics).await?;

        let subtopic = subtopics
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or(StorageError::NotFound)?;
        Ok(self.subtopic_view(subtopic))
    }

    /// Fetch a subtopic with its milestone earnings.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` with `NotFound` if the subtopic
    /// does not exist.
    pub async fn get_subtopic(&self, id: SubtopicId) -> Result<SubtopicView, TopicServiceError> {
        let subtopic = self
            .subtopics
            .get_subtopic(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(self.subtopic_view(subtopic))
    }

    /// Apply a partial update to a subtopic.
    ///
    /// The parent topic is deliberately not recalculated here; recompute
    /// happens on reps changes and topic reads only.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Subtopic` for validation failures,
    /// `TopicServiceError::Storage` with `NotFound` if the subtopic is
    /// missing.
    pub async fn update_subtopic(
        &self,
        id: SubtopicId,
        patch: SubtopicPatch,
    ) -> Result<SubtopicView, TopicServiceError> {
        let mut subtopic = self
            .subtopics
            .get_subtopic(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        subtopic.apply(patch)?;
        self.subtopics.update_subtopic(&subtopic).await?;
        Ok(self.subtopic_view(subtopic))
    }

    /// Adjust a subtopic's completed reps by a signed delta (clamped at zero)
    /// and recalculate the parent topic.
    ///
    /// Returns both the updated subtopic and the updated topic.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` with `NotFound` if the subtopic
    /// or its parent topic is missing.
    pub async fn adjust_reps(
        &self,
        id: SubtopicId,
        delta: i64,
    ) -> Result<RepsAdjusted, TopicServiceError> {
        let mut subtopic = self
            .subtopics
            .get_subtopic(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        subtopic.adjust_reps(delta);
        self.subtopics.update_subtopic(&subtopic).await?;

        let topic = self
            .topics
            .get_topic(subtopic.topic_id())
            .await?
            .ok_or(StorageError::NotFound)?;
        let subtopics = self.subtopics.subtopics_for_topic(topic.id()).await?;
        let topic = self.recompute_and_save(topic, &subtopics).await?;

        Ok(RepsAdjusted { subtopic, topic })
    }

    /// Delete a subtopic and recalculate the parent topic.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` with `NotFound` if the subtopic
    /// does not exist.
    pub async fn delete_subtopic(
        &self,
        id: SubtopicId,
    ) -> Result<TopicWithSubtopics, TopicServiceError> {
        let subtopic = self
            .subtopics
            .get_subtopic(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        let topic_id = subtopic.topic_id();
        self.subtopics.delete_subtopic(id).await?;
        self.get_topic(topic_id).await
    }

    /// The single recompute-and-persist operation behind every read and
    /// mutation path that refreshes derived values.
    async fn recompute_and_save(
        &self,
        mut topic: Topic,
        subtopics: &[Subtopic],
    ) -> Result<Topic, TopicServiceError> {
        let earnings = calc::topic_earnings(subtopics, topic.money_per_5_reps());
        let completion = calc::topic_completion(subtopics);
        topic.set_derived(earnings, completion, self.clock.now());
        self.topics.update_topic(&topic).await?;
        Ok(topic)
    }

    fn subtopic_view(&self, subtopic: Subtopic) -> SubtopicView {
        let milestone_earnings =
            calc::subtopic_milestone_earnings(subtopic.reps_completed(), subtopic.goal_amount());
        SubtopicView {
            subtopic,
            milestone_earnings,
        }
    }
}
