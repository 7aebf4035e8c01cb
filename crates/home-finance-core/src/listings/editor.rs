use std::fmt;
use tracing::{debug, warn};

use crate::error::HomeFinanceError;
use crate::listings::post::{PostField, PropertyPost};
use crate::HomeFinanceResult;

/// What the post page is showing.
///
/// `Editing` keeps the last saved copy so a cancel can restore it.
#[derive(Debug, Clone, PartialEq)]
pub enum PostView {
    Viewing(PropertyPost),
    Editing {
        saved: PropertyPost,
        draft: PropertyPost,
    },
}

impl PostView {
    pub fn open(post: PropertyPost) -> Self {
        PostView::Viewing(post)
    }

    /// The last saved version of the post.
    pub fn post(&self) -> &PropertyPost {
        match self {
            PostView::Viewing(post) => post,
            PostView::Editing { saved, .. } => saved,
        }
    }

    pub fn draft(&self) -> Option<&PropertyPost> {
        match self {
            PostView::Viewing(_) => None,
            PostView::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, PostView::Editing { .. })
    }

    /// Only the author of a post may edit it; anonymous visitors never can.
    pub fn can_edit(&self, user_id: Option<&str>) -> bool {
        user_id.is_some_and(|id| id == self.post().author_id)
    }

    /// Enter edit mode with a draft copied from the saved post.
    ///
    /// Calling this while already editing keeps the current draft.
    pub fn begin_edit(&mut self, user_id: Option<&str>) -> HomeFinanceResult<()> {
        if !self.can_edit(user_id) {
            return Err(HomeFinanceError::Unauthorized {
                user_id: user_id.unwrap_or("anonymous").to_string(),
            });
        }
        if let PostView::Viewing(post) = self {
            let saved = post.clone();
            debug!(post_id = %saved.id, "editing post");
            *self = PostView::Editing {
                draft: saved.clone(),
                saved,
            };
        }
        Ok(())
    }

    pub fn update_draft(&mut self, field: PostField, value: &str) -> HomeFinanceResult<()> {
        match self {
            PostView::Editing { draft, .. } => draft.set_field(field, value),
            PostView::Viewing(_) => Err(HomeFinanceError::InvalidState(
                "cannot change a post that is not being edited".into(),
            )),
        }
    }

    /// Drop the draft and go back to the saved post.
    pub fn cancel(&mut self) {
        if let PostView::Editing { saved, .. } = self {
            let saved = saved.clone();
            *self = PostView::Viewing(saved);
        }
    }

    /// Validate the draft and hand it to `persist`.
    ///
    /// On success the draft becomes the saved post. On failure the view stays
    /// in edit mode with the draft untouched so the author can retry.
    pub fn commit<F, E>(&mut self, persist: F) -> HomeFinanceResult<&PropertyPost>
    where
        F: FnOnce(&PropertyPost) -> Result<(), E>,
        E: fmt::Display,
    {
        let draft = match self {
            PostView::Editing { draft, .. } => draft,
            PostView::Viewing(_) => {
                return Err(HomeFinanceError::InvalidState(
                    "no edit in progress".into(),
                ))
            }
        };

        draft.validate()?;

        if let Err(e) = persist(draft) {
            warn!(post_id = %draft.id, error = %e, "failed to update post");
            return Err(HomeFinanceError::PersistenceFailed(e.to_string()));
        }

        let committed = draft.clone();
        debug!(post_id = %committed.id, "post updated");
        *self = PostView::Viewing(committed);
        Ok(self.post())
    }
}
