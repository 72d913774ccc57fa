//! Moderation service
//!
//! Submission, author edits, the moderator review queue and the
//! approve/reject dispositions, plus access-checked detail views.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::{
    AuthorSummary, ModelContent, ModelContentUpdate, ModelId, ModelRecord, ModelStatus, ModelView,
    NewModelRecord, PageRequest, PublishedQuery, ReviewDecision, ReviewFilter, ReviewPage,
    ReviewQueueItem, ReviewSort, ReviewStats, UserId,
};
use crate::domain::ports::{EngagementRepository, ModelRepository, UserRepository};
use crate::error::{AppError, DomainError};

/// Service driving a model through verification to published or rejected
pub struct ModerationService<MR, UR, ER>
where
    MR: ModelRepository,
    UR: UserRepository,
    ER: EngagementRepository,
{
    models: Arc<MR>,
    users: Arc<UR>,
    engagement: Arc<ER>,
}

impl<MR, UR, ER> ModerationService<MR, UR, ER>
where
    MR: ModelRepository + 'static,
    UR: UserRepository,
    ER: EngagementRepository,
{
    pub fn new(models: Arc<MR>, users: Arc<UR>, engagement: Arc<ER>) -> Self {
        Self {
            models,
            users,
            engagement,
        }
    }

    /// Submit a new model for review
    pub async fn submit(
        &self,
        author_id: &UserId,
        content: ModelContent,
    ) -> Result<ModelRecord, AppError> {
        let content = content.normalized();
        content.validate()?;

        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("User {} not found", author_id)).into());
        }

        if self
            .models
            .title_taken(author_id, &content.title, None)
            .await?
        {
            return Err(duplicate_title().into());
        }

        let record = self
            .models
            .create(&NewModelRecord {
                author_id: *author_id,
                content,
            })
            .await?;

        tracing::info!(model_id = %record.id, author_id = %author_id, "Model submitted for review");
        Ok(record)
    }

    /// Edit a model's content. Only the author may edit, and only while the
    /// record is in verification or rejected; a rejected record is resubmitted.
    pub async fn update(
        &self,
        id: &ModelId,
        editor: &UserId,
        patch: ModelContentUpdate,
    ) -> Result<ModelRecord, AppError> {
        let mut record = self.find(id).await?;

        if !record.is_owned_by(editor) {
            return Err(DomainError::Forbidden("Only the author can edit this model".to_string()).into());
        }
        if !record.status.is_editable() {
            return Err(DomainError::Conflict(format!(
                "Model is {} and can no longer be edited",
                record.status
            ))
            .into());
        }

        let content = patch.apply_to(&record.content).normalized();
        content.validate()?;

        if content.title != record.content.title
            && self
                .models
                .title_taken(editor, &content.title, Some(id))
                .await?
        {
            return Err(duplicate_title().into());
        }

        let read_status = record.status;
        let resubmitted = read_status == ModelStatus::Rejected;
        record.apply_content(content, Utc::now());
        self.models.update_content(&record, read_status).await?;

        if resubmitted {
            tracing::info!(model_id = %id, "Rejected model edited and resubmitted for review");
        }
        Ok(record)
    }

    /// One page of the review queue with author summaries and global stats
    pub async fn list_for_review(
        &self,
        filter: ReviewFilter,
        sort: ReviewSort,
        page: PageRequest,
    ) -> Result<ReviewPage, AppError> {
        let (records, total_matching) = self.models.list_for_review(filter, sort, page).await?;
        let stats = self.models.review_stats().await?;

        let mut author_ids: Vec<UserId> = records.iter().map(|r| r.author_id).collect();
        author_ids.sort_by_key(|id| id.0);
        author_ids.dedup();

        let authors: HashMap<UserId, AuthorSummary> = self
            .users
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, AuthorSummary::from(u)))
            .collect();

        let items = records
            .into_iter()
            .map(|record| ReviewQueueItem {
                author: authors.get(&record.author_id).cloned(),
                record,
            })
            .collect();

        Ok(ReviewPage {
            items,
            stats,
            page: page.page(),
            limit: page.limit(),
            total_matching,
        })
    }

    /// Status counts over every record, independent of any filter
    pub async fn stats(&self) -> Result<ReviewStats, AppError> {
        Ok(self.models.review_stats().await?)
    }

    /// Publish a model
    pub async fn approve(
        &self,
        id: &ModelId,
        moderator: &UserId,
        admin_notes: Option<String>,
    ) -> Result<ModelRecord, AppError> {
        let decision = ReviewDecision::Approve {
            admin_notes: clean_notes(admin_notes),
        };
        self.review(id, moderator, decision).await
    }

    /// Reject a model with a reason the author will see
    pub async fn reject(
        &self,
        id: &ModelId,
        moderator: &UserId,
        rejection_reason: &str,
        admin_notes: Option<String>,
    ) -> Result<ModelRecord, AppError> {
        let rejection_reason = rejection_reason.trim();
        if rejection_reason.is_empty() {
            return Err(
                DomainError::Validation("Rejection reason is required".to_string()).into(),
            );
        }

        let decision = ReviewDecision::Reject {
            rejection_reason: rejection_reason.to_string(),
            admin_notes: clean_notes(admin_notes),
        };
        self.review(id, moderator, decision).await
    }

    async fn review(
        &self,
        id: &ModelId,
        moderator: &UserId,
        decision: ReviewDecision,
    ) -> Result<ModelRecord, AppError> {
        let record = self
            .models
            .apply_review(id, &decision, moderator, Utc::now())
            .await?
            .ok_or_else(|| model_not_found(id))?;

        tracing::info!(
            model_id = %id,
            moderator_id = %moderator,
            status = %record.status,
            "Model reviewed"
        );
        Ok(record)
    }

    /// Fetch a model for display, counting the view when it is published and
    /// the viewer is not the author
    pub async fn view(
        &self,
        id: &ModelId,
        viewer: Option<&UserId>,
    ) -> Result<ModelView, AppError> {
        let mut record = self.find(id).await?;

        if !record.is_viewable_by(viewer) {
            return Err(
                DomainError::Forbidden("You do not have access to this model".to_string()).into(),
            );
        }

        let is_author = viewer.is_some_and(|v| record.is_owned_by(v));
        if record.status == ModelStatus::Published && !is_author {
            // Fire and forget; the read succeeds even if the counter write fails
            let models = Arc::clone(&self.models);
            let model_id = record.id;
            tokio::spawn(async move {
                if let Err(e) = models.increment_views(&model_id).await {
                    tracing::warn!(error = %e, model_id = %model_id, "Failed to increment views");
                }
            });
            record.views += 1;
        }

        let liked_by_viewer = match viewer {
            Some(viewer) => self.engagement.has_liked(viewer, id).await?,
            None => false,
        };
        let author = self
            .users
            .find_by_id(&record.author_id)
            .await?
            .map(|u| AuthorSummary::from(&u));

        Ok(ModelView {
            permissions: record.permissions_for(viewer),
            author,
            liked_by_viewer,
            record,
        })
    }

    /// Public browse feed
    pub async fn list_published(
        &self,
        query: &PublishedQuery,
    ) -> Result<Vec<ModelRecord>, AppError> {
        Ok(self.models.list_published(query).await?)
    }

    /// Every record of the author, in any status
    pub async fn list_mine(
        &self,
        author_id: &UserId,
        page: PageRequest,
    ) -> Result<Vec<ModelRecord>, AppError> {
        Ok(self.models.find_by_author(author_id, page).await?)
    }

    async fn find(&self, id: &ModelId) -> Result<ModelRecord, AppError> {
        self.models
            .find_by_id(id)
            .await?
            .ok_or_else(|| model_not_found(id))
    }
}

fn model_not_found(id: &ModelId) -> AppError {
    DomainError::NotFound(format!("Model {} not found", id)).into()
}

fn duplicate_title() -> DomainError {
    DomainError::Conflict("You already have a model with this title".to_string())
}

/// Blank notes are treated as absent
fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Visibility;
    use crate::test_utils::{
        test_admin, test_content, test_content_titled, test_model, test_model_created_at,
        test_model_with_status, test_published_model, test_user, test_user_named, InMemoryEngagementRepository,
        InMemoryModelRepository, InMemoryUserRepository,
    };
    use chrono::Duration;

    type Service =
        ModerationService<InMemoryModelRepository, InMemoryUserRepository, InMemoryEngagementRepository>;

    fn create_service(
        models: InMemoryModelRepository,
        users: InMemoryUserRepository,
    ) -> (Service, Arc<InMemoryModelRepository>) {
        let engagement = InMemoryEngagementRepository::new(&models);
        let models = Arc::new(models);
        let service = ModerationService::new(
            Arc::clone(&models),
            Arc::new(users),
            Arc::new(engagement),
        );
        (service, models)
    }

    /// Let spawned best-effort tasks run on the current-thread test runtime
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn is_domain<T>(result: &Result<T, AppError>, f: impl Fn(&DomainError) -> bool) -> bool {
        matches!(result, Err(AppError::Domain(e)) if f(e))
    }

    // ------------------------------------------------------------------
    // submit
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn submit_creates_record_in_verification() {
        let author = test_user();
        let (service, _) = create_service(
            InMemoryModelRepository::new(),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let record = service.submit(&author.id, test_content()).await.unwrap();

        assert_eq!(record.status, ModelStatus::Verification);
        assert_eq!(record.author_id, author.id);
        assert_eq!((record.likes, record.downloads, record.views), (0, 0, 0));
        assert!(record.published_at.is_none());
        assert!(record.rejection_reason.is_none());
        assert!(record.admin_notes.is_none());
    }

    #[tokio::test]
    async fn submit_trims_title_before_validating() {
        let author = test_user();
        let (service, _) = create_service(
            InMemoryModelRepository::new(),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let record = service
            .submit(&author.id, test_content_titled("  Skull  "))
            .await
            .unwrap();

        assert_eq!(record.content.title, "Skull");
    }

    #[tokio::test]
    async fn submit_without_media_is_rejected() {
        let author = test_user();
        let (service, _) = create_service(
            InMemoryModelRepository::new(),
            InMemoryUserRepository::new().with_user(author.clone()),
        );
        let mut content = test_content();
        content.cover_image_url = Some("   ".to_string());
        content.model_file_url = None;

        let result = service.submit(&author.id, content).await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn submit_with_short_title_is_rejected() {
        let author = test_user();
        let (service, _) = create_service(
            InMemoryModelRepository::new(),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let result = service.submit(&author.id, test_content_titled("ab")).await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn submit_for_unknown_author_is_not_found() {
        let (service, _) = create_service(InMemoryModelRepository::new(), InMemoryUserRepository::new());

        let result = service.submit(&UserId::new(), test_content()).await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn submit_duplicate_title_conflicts() {
        let author = test_user();
        let (service, _) = create_service(
            InMemoryModelRepository::new(),
            InMemoryUserRepository::new().with_user(author.clone()),
        );
        service.submit(&author.id, test_content()).await.unwrap();

        let result = service.submit(&author.id, test_content()).await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn same_title_from_different_authors_is_allowed() {
        let alice = test_user_named("alice");
        let bob = test_user_named("bob");
        let (service, _) = create_service(
            InMemoryModelRepository::new(),
            InMemoryUserRepository::new()
                .with_user(alice.clone())
                .with_user(bob.clone()),
        );

        service.submit(&alice.id, test_content()).await.unwrap();
        let result = service.submit(&bob.id, test_content()).await;

        assert!(result.is_ok());
    }

    // ------------------------------------------------------------------
    // update
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn editing_rejected_model_resubmits_it() {
        let author = test_user();
        let model = test_model_with_status(author.id, ModelStatus::Rejected);
        let (service, models) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let patch = ModelContentUpdate {
            description: Some("Sharper images of the heart chambers".to_string()),
            ..Default::default()
        };
        let updated = service.update(&model.id, &author.id, patch).await.unwrap();

        assert_eq!(updated.status, ModelStatus::Verification);
        assert!(updated.rejection_reason.is_none());
        let stored = models.get(&model.id).unwrap();
        assert_eq!(stored.status, ModelStatus::Verification);
        assert_eq!(stored.content.description, "Sharper images of the heart chambers");
    }

    #[tokio::test]
    async fn editing_published_model_conflicts() {
        let author = test_user();
        let model = test_published_model(author.id);
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let result = service
            .update(&model.id, &author.id, ModelContentUpdate::default())
            .await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn edit_written_after_an_approval_does_not_unpublish() {
        let author = test_user();
        let moderator = test_admin();
        let model = test_model(author.id);
        let (_, models) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        // The author's copy is read before the moderator acts
        let mut stale = models.find_by_id(&model.id).await.unwrap().unwrap();
        models
            .apply_review(
                &model.id,
                &ReviewDecision::Approve { admin_notes: None },
                &moderator.id,
                Utc::now(),
            )
            .await
            .unwrap();

        let read_status = stale.status;
        let mut content = stale.content.clone();
        content.title = "Heart Model v2".to_string();
        stale.apply_content(content, Utc::now());
        let result = models.update_content(&stale, read_status).await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
        let stored = models.get(&model.id).unwrap();
        assert_eq!(stored.status, ModelStatus::Published);
        assert!(stored.published_at.is_some());
        assert_eq!(stored.content.title, model.content.title);
    }

    #[tokio::test]
    async fn editing_someone_elses_model_is_forbidden() {
        let author = test_user();
        let model = test_model(author.id);
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author),
        );

        let result = service
            .update(&model.id, &UserId::new(), ModelContentUpdate::default())
            .await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn edit_that_removes_all_media_fails_validation() {
        let author = test_user();
        let model = test_model(author.id);
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let patch = ModelContentUpdate {
            cover_image_url: Some(None),
            model_file_url: Some(None),
            ..Default::default()
        };
        let result = service.update(&model.id, &author.id, patch).await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::Validation(_))));
    }

    // ------------------------------------------------------------------
    // review queue
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn stats_cover_all_records_regardless_of_filter() {
        let author = test_user();
        let (service, _) = create_service(
            InMemoryModelRepository::new()
                .with_model(test_model(author.id))
                .with_model(test_model(author.id))
                .with_model(test_published_model(author.id))
                .with_model(test_model_with_status(author.id, ModelStatus::Rejected)),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let page = service
            .list_for_review(ReviewFilter::Published, ReviewSort::Newest, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_matching, 1);
        assert_eq!(
            page.stats,
            ReviewStats {
                pending: 2,
                approved: 1,
                rejected: 1,
                total: 4
            }
        );
    }

    #[tokio::test]
    async fn queue_items_carry_author_summary() {
        let author = test_user_named("anatomy-lab");
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(test_model(author.id)),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let page = service
            .list_for_review(ReviewFilter::All, ReviewSort::Newest, PageRequest::default())
            .await
            .unwrap();

        let summary = page.items[0].author.as_ref().unwrap();
        assert_eq!(summary.name, "anatomy-lab");
    }

    #[tokio::test]
    async fn queue_sorts_and_pages() {
        let author = test_user();
        let now = Utc::now();
        let oldest = test_model_created_at(author.id, "Femur", "ortho", now - Duration::hours(3));
        let middle = test_model_created_at(author.id, "Lung", "pulmo", now - Duration::hours(2));
        let newest = test_model_created_at(author.id, "Brain", "neuro", now - Duration::hours(1));
        let (service, _) = create_service(
            InMemoryModelRepository::new()
                .with_model(oldest.clone())
                .with_model(middle.clone())
                .with_model(newest.clone()),
            InMemoryUserRepository::new().with_user(author),
        );

        let page = service
            .list_for_review(ReviewFilter::All, ReviewSort::Oldest, PageRequest::new(Some(1), Some(2)))
            .await
            .unwrap();
        let ids: Vec<ModelId> = page.items.iter().map(|i| i.record.id).collect();
        assert_eq!(ids, vec![oldest.id, middle.id]);
        assert_eq!(page.total_matching, 3);

        let page = service
            .list_for_review(ReviewFilter::All, ReviewSort::Category, PageRequest::default())
            .await
            .unwrap();
        let categories: Vec<&str> = page
            .items
            .iter()
            .map(|i| i.record.content.category.as_str())
            .collect();
        assert_eq!(categories, vec!["neuro", "ortho", "pulmo"]);
    }

    // ------------------------------------------------------------------
    // approve / reject
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn approve_publishes_and_stamps_reviewer() {
        let author = test_user();
        let admin = test_admin();
        let model = test_model(author.id);
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author),
        );

        let record = service
            .approve(&model.id, &admin.id, Some("Looks great".to_string()))
            .await
            .unwrap();

        assert_eq!(record.status, ModelStatus::Published);
        assert!(record.published_at.is_some());
        assert!(record.rejection_reason.is_none());
        assert_eq!(record.admin_notes.as_deref(), Some("Looks great"));
        assert_eq!(record.reviewed_by, Some(admin.id));
        assert!(record.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn approve_twice_restamps_reviewer() {
        let author = test_user();
        let first = test_admin();
        let second = test_user_named("second-admin");
        let model = test_model(author.id);
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author),
        );

        let once = service.approve(&model.id, &first.id, None).await.unwrap();
        let twice = service.approve(&model.id, &second.id, None).await.unwrap();

        assert_eq!(once.status, ModelStatus::Published);
        assert_eq!(twice.status, ModelStatus::Published);
        assert_eq!(twice.reviewed_by, Some(second.id));
        assert!(twice.reviewed_at >= once.reviewed_at);
    }

    #[tokio::test]
    async fn reject_requires_reason() {
        let author = test_user();
        let model = test_model(author.id);
        let (service, models) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author),
        );

        let result = service.reject(&model.id, &UserId::new(), "   ", None).await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::Validation(_))));
        assert_eq!(models.get(&model.id).unwrap().status, ModelStatus::Verification);
    }

    #[tokio::test]
    async fn reject_after_approve_clears_published_at() {
        let author = test_user();
        let model = test_model(author.id);
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author),
        );
        let admin = test_admin();

        service.approve(&model.id, &admin.id, Some("ok".to_string())).await.unwrap();
        let record = service
            .reject(&model.id, &admin.id, "Licensing issue", None)
            .await
            .unwrap();

        assert_eq!(record.status, ModelStatus::Rejected);
        assert!(record.published_at.is_none());
        assert_eq!(record.rejection_reason.as_deref(), Some("Licensing issue"));
        assert!(record.admin_notes.is_none());
    }

    #[tokio::test]
    async fn review_of_missing_model_is_not_found() {
        let (service, _) = create_service(InMemoryModelRepository::new(), InMemoryUserRepository::new());

        let approve = service.approve(&ModelId::new(), &UserId::new(), None).await;
        let reject = service.reject(&ModelId::new(), &UserId::new(), "Blurry", None).await;

        assert!(is_domain(&approve, |e| matches!(e, DomainError::NotFound(_))));
        assert!(is_domain(&reject, |e| matches!(e, DomainError::NotFound(_))));
    }

    // ------------------------------------------------------------------
    // view
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn unpublished_model_visible_only_to_author() {
        let author = test_user();
        let model = test_model(author.id);
        let (service, models) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let own = service.view(&model.id, Some(&author.id)).await.unwrap();
        let stranger = service.view(&model.id, Some(&UserId::new())).await;
        let anonymous = service.view(&model.id, None).await;

        assert!(own.permissions.is_owner);
        assert!(own.permissions.can_edit);
        assert!(!own.permissions.can_share);
        assert!(is_domain(&stranger, |e| matches!(e, DomainError::Forbidden(_))));
        assert!(is_domain(&anonymous, |e| matches!(e, DomainError::Forbidden(_))));

        settle().await;
        assert_eq!(models.get(&model.id).unwrap().views, 0);
    }

    #[tokio::test]
    async fn private_published_model_hidden_from_others() {
        let author = test_user();
        let mut model = test_published_model(author.id);
        model.content.visibility = Visibility::Private;
        let (service, _) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        assert!(service.view(&model.id, Some(&author.id)).await.is_ok());
        let result = service.view(&model.id, None).await;
        assert!(is_domain(&result, |e| matches!(e, DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn published_view_counts_every_call() {
        let author = test_user();
        let model = test_published_model(author.id);
        let (service, models) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );
        let viewer = UserId::new();

        let first = service.view(&model.id, Some(&viewer)).await.unwrap();
        settle().await;
        let second = service.view(&model.id, Some(&viewer)).await.unwrap();
        settle().await;

        assert_eq!(first.record.views, 1);
        assert_eq!(second.record.views, 2);
        assert_eq!(models.get(&model.id).unwrap().views, 2);
        assert_eq!(first.author.map(|a| a.id), Some(author.id));
        assert!(first.permissions.can_like);
        assert!(!first.liked_by_viewer);
    }

    #[tokio::test]
    async fn author_view_does_not_count() {
        let author = test_user();
        let model = test_published_model(author.id);
        let (service, models) = create_service(
            InMemoryModelRepository::new().with_model(model.clone()),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let view = service.view(&model.id, Some(&author.id)).await.unwrap();
        settle().await;

        assert_eq!(view.record.views, 0);
        assert_eq!(models.get(&model.id).unwrap().views, 0);
        assert!(!view.permissions.can_like);
        assert!(!view.permissions.can_edit);
    }

    #[tokio::test]
    async fn view_succeeds_when_view_counter_fails() {
        let author = test_user();
        let model = test_published_model(author.id);
        let (service, models) = create_service(
            InMemoryModelRepository::new()
                .with_model(model.clone())
                .with_failing_view_increments(),
            InMemoryUserRepository::new().with_user(author),
        );

        let view = service.view(&model.id, None).await.unwrap();
        settle().await;

        assert_eq!(view.record.views, 1);
        assert_eq!(models.get(&model.id).unwrap().views, 0);
        assert!(!view.permissions.can_download);
        assert!(view.permissions.can_share);
    }

    #[tokio::test]
    async fn view_of_missing_model_is_not_found() {
        let (service, _) = create_service(InMemoryModelRepository::new(), InMemoryUserRepository::new());

        let result = service.view(&ModelId::new(), None).await;

        assert!(is_domain(&result, |e| matches!(e, DomainError::NotFound(_))));
    }

    // ------------------------------------------------------------------
    // feeds
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn published_feed_hides_unpublished_private_and_nsfw() {
        let author = test_user();
        let visible = test_published_model(author.id);
        let mut private = test_published_model(author.id);
        private.content.visibility = Visibility::Private;
        let mut nsfw = test_published_model(author.id);
        nsfw.content.nsfw = true;
        let (service, _) = create_service(
            InMemoryModelRepository::new()
                .with_model(visible.clone())
                .with_model(private)
                .with_model(nsfw.clone())
                .with_model(test_model(author.id)),
            InMemoryUserRepository::new().with_user(author),
        );

        let feed = service.list_published(&PublishedQuery::default()).await.unwrap();
        assert_eq!(feed.iter().map(|m| m.id).collect::<Vec<_>>(), vec![visible.id]);

        let with_nsfw = service
            .list_published(&PublishedQuery {
                include_nsfw: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(with_nsfw.len(), 2);
        assert!(with_nsfw.iter().any(|m| m.id == nsfw.id));
    }

    #[tokio::test]
    async fn list_mine_returns_every_status() {
        let author = test_user();
        let other = test_user_named("other");
        let (service, _) = create_service(
            InMemoryModelRepository::new()
                .with_model(test_model(author.id))
                .with_model(test_published_model(author.id))
                .with_model(test_model_with_status(author.id, ModelStatus::Rejected))
                .with_model(test_model(other.id)),
            InMemoryUserRepository::new().with_user(author.clone()),
        );

        let mine = service.list_mine(&author.id, PageRequest::default()).await.unwrap();

        assert_eq!(mine.len(), 3);
        assert!(mine.iter().all(|m| m.author_id == author.id));
    }
}
