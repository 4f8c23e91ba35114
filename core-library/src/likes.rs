//! Liked media list
//!
//! Stored as a JSON array under a single settings key so that likes written
//! by the web app carry over.

use std::collections::HashSet;
use std::sync::Arc;

use bridge_traits::{Clock, SettingsStore};
use tracing::{instrument, warn};

use crate::error::{LibraryError, Result};
use crate::models::LikedMedia;

pub const LIKED_MEDIA_KEY: &str = "drive-reels-liked-media";

#[derive(Clone)]
pub struct LikesStore {
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
}

impl LikesStore {
    pub fn new(settings: Arc<dyn SettingsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    /// All likes in the order they were added. Unreadable data reads as empty.
    pub async fn list(&self) -> Result<Vec<LikedMedia>> {
        let Some(raw) = self.settings.get_string(LIKED_MEDIA_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(liked) => Ok(liked),
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable likes list");
                Ok(Vec::new())
            }
        }
    }

    pub async fn liked_ids(&self) -> Result<HashSet<String>> {
        Ok(self.list().await?.into_iter().map(|l| l.id).collect())
    }

    pub async fn is_liked(&self, media_id: &str) -> Result<bool> {
        Ok(self.list().await?.iter().any(|l| l.id == media_id))
    }

    /// Flip the like state of `media_id`; returns whether it is now liked.
    #[instrument(skip(self))]
    pub async fn toggle(&self, media_id: &str) -> Result<bool> {
        if media_id.is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "media_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let mut liked = self.list().await?;
        let now_liked = match liked.iter().position(|l| l.id == media_id) {
            Some(index) => {
                liked.remove(index);
                false
            }
            None => {
                liked.push(LikedMedia {
                    id: media_id.to_string(),
                    liked_at: self.clock.now(),
                });
                true
            }
        };

        self.settings
            .set_string(LIKED_MEDIA_KEY, &serde_json::to_string(&liked)?)
            .await?;
        Ok(now_liked)
    }

    pub async fn clear(&self) -> Result<()> {
        self.settings.delete(LIKED_MEDIA_KEY).await?;
        Ok(())
    }
}
