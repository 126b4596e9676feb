use std::sync::{Arc, PoisonError, RwLock};

use crate::api::{BlogApi, ClientError, ResourceBackend};
use crate::i18n::LocalizedText;
use crate::models::BlogPost;
use crate::store::slice::{Action, ResourceSlice};
use crate::store::{Operation, Rejected};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taxonomy {
    pub categories: Vec<LocalizedText>,
    pub tags: Vec<LocalizedText>,
}

pub struct BlogStore {
    slice: ResourceSlice<BlogPost>,
    api: Arc<dyn BlogApi>,
    taxonomy: RwLock<Taxonomy>,
}

impl BlogStore {
    pub fn new<B>(backend: Arc<B>) -> Self
    where
        B: ResourceBackend<BlogPost> + BlogApi + 'static,
    {
        Self {
            slice: ResourceSlice::new(backend.clone()),
            api: backend,
            taxonomy: RwLock::new(Taxonomy::default()),
        }
    }

    pub fn slice(&self) -> &ResourceSlice<BlogPost> {
        &self.slice
    }

    pub fn taxonomy(&self) -> Taxonomy {
        self.taxonomy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the article page; the post becomes `selected`. Shares the
    /// detail generation with `fetch_by_id`, so a slower earlier load
    /// cannot replace it.
    pub async fn fetch_by_slug(&self, slug: &str) -> Result<BlogPost, Rejected> {
        self.slice.load_selected(self.api.post_by_slug(slug)).await
    }

    pub async fn fetch_categories(&self) -> Result<Vec<LocalizedText>, Rejected> {
        let categories = self
            .api
            .blog_categories()
            .await
            .map_err(|e| taxonomy_error(&e, "Failed to fetch categories"))?;
        self.taxonomy
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .categories = categories.clone();
        Ok(categories)
    }

    pub async fn fetch_tags(&self) -> Result<Vec<LocalizedText>, Rejected> {
        let tags = self
            .api
            .blog_tags()
            .await
            .map_err(|e| taxonomy_error(&e, "Failed to fetch tags"))?;
        self.taxonomy
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .tags = tags.clone();
        Ok(tags)
    }

    /// Like a post and write the server's count into the list and the
    /// selected post, wherever it is loaded.
    pub async fn like(&self, id: &str) -> Result<u64, Rejected> {
        self.slice.dispatch(Action::Pending(Operation::Update));
        let likes = match self.api.like_post(id).await {
            Ok(likes) => likes,
            Err(e) => return Err(self.slice.reject(Operation::Update, &e)),
        };

        let loaded = self.slice.read(|state| {
            state
                .find(id)
                .or(state.selected.as_ref().filter(|post| post.id == id))
                .cloned()
        });
        match loaded {
            Some(mut post) => {
                post.metrics.likes = likes;
                self.slice.dispatch(Action::Updated(post));
            }
            None => self.slice.dispatch(Action::Settled(Operation::Update)),
        }
        Ok(likes)
    }
}

fn taxonomy_error(err: &ClientError, fallback: &str) -> Rejected {
    tracing::warn!(error = %err, "{}", fallback);
    Rejected {
        op: Operation::FetchList,
        message: err.user_message(fallback),
    }
}
