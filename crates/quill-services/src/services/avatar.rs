use std::sync::Arc;

use quill_core::{AppError, ImageDescriptor};
use quill_upload::{ImageUploadService, IncomingFile};
use uuid::Uuid;

use crate::models::Account;
use crate::repository::Repository;

/// Account avatar management
#[derive(Clone)]
pub struct AvatarService {
    accounts: Arc<dyn Repository<Account>>,
    uploads: ImageUploadService,
}

impl AvatarService {
    pub fn new(accounts: Arc<dyn Repository<Account>>, uploads: ImageUploadService) -> Self {
        Self { accounts, uploads }
    }

    /// Upload `file` and make it the account's avatar.
    ///
    /// If the account cannot be saved the new image is deleted again. The
    /// previous avatar is deleted only after the account points at the new one;
    /// failing to delete it is logged, not returned.
    #[tracing::instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn change_avatar(
        &self,
        account_id: Uuid,
        file: IncomingFile,
    ) -> Result<ImageDescriptor, AppError> {
        let mut account = self.load(account_id).await?;

        let descriptor = self.uploads.upload_single(file).await?;
        let previous = account.avatar.replace(descriptor.clone());
        account.updated_at = chrono::Utc::now();

        if let Err(e) = self.accounts.update(account).await {
            tracing::error!(
                error = %e,
                public_id = %descriptor.public_id,
                "Failed to save account, deleting new avatar"
            );
            if !self.uploads.delete_single(&descriptor.public_id).await {
                tracing::warn!(
                    public_id = %descriptor.public_id,
                    "New avatar could not be deleted and is orphaned"
                );
            }
            return Err(e);
        }

        if let Some(previous) = previous {
            if !self.uploads.delete_single(&previous.public_id).await {
                tracing::warn!(
                    public_id = %previous.public_id,
                    "Previous avatar could not be deleted"
                );
            }
        }

        tracing::info!(public_id = %descriptor.public_id, "Avatar changed");
        Ok(descriptor)
    }

    /// Clear the account's avatar and delete the image.
    ///
    /// Returns whether the remote deletion succeeded; an account without an
    /// avatar has nothing to delete and returns `true`.
    #[tracing::instrument(skip(self))]
    pub async fn remove_avatar(&self, account_id: Uuid) -> Result<bool, AppError> {
        let mut account = self.load(account_id).await?;

        let Some(avatar) = account.avatar.take() else {
            return Ok(true);
        };
        account.updated_at = chrono::Utc::now();
        self.accounts.update(account).await?;

        let deleted = self.uploads.delete_single(&avatar.public_id).await;
        if !deleted {
            tracing::warn!(public_id = %avatar.public_id, "Removed avatar could not be deleted");
        }
        Ok(deleted)
    }

    async fn load(&self, account_id: Uuid) -> Result<Account, AppError> {
        self.accounts
            .get(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", account_id)))
    }
}
