//! Asset manager: browsing and CRUD for stored files and directories.

use ledgerdrive_protocol::messages::{
    AssetsTreeResponse, ChangeAssetNameRequest, CreateDirectoryRequest, DeleteAssetRequest,
    GetAssetsTreeRequest,
};
use ledgerdrive_protocol::{
    AssetId, AssetRecord, AssetRef, DirectoryRecord, FileRecord, Metadata, Method, Permission,
};
use tracing::{debug, info};

use crate::backend::{self, BackendConnection};
use crate::error::FileManagerError;
use crate::types::DirectoryTotals;

/// Manages assets already stored on the backend.
pub struct AssetManager<'a> {
    conn: &'a dyn BackendConnection,
}

impl<'a> AssetManager<'a> {
    pub fn new(conn: &'a dyn BackendConnection) -> Self {
        Self { conn }
    }

    /// Lists the assets below `parent_id`, or the root when `None`.
    pub async fn get_assets_tree(
        &self,
        parent_id: Option<AssetId>,
    ) -> Result<Vec<AssetRecord>, FileManagerError> {
        let req = GetAssetsTreeRequest { parent_id };
        let resp: AssetsTreeResponse =
            backend::request(self.conn, Method::GetAssetsTree, &req).await?;
        debug!(?parent_id, assets = resp.assets.len(), "fetched assets tree");
        Ok(resp.assets)
    }

    /// Fetches backend usage statistics.
    pub async fn get_metadata(&self) -> Result<Metadata, FileManagerError> {
        backend::request(self.conn, Method::GetMetadata, &serde_json::json!({})).await
    }

    /// Creates an empty public directory.
    pub async fn create_directory(
        &self,
        name: &str,
        parent_id: Option<AssetId>,
    ) -> Result<DirectoryRecord, FileManagerError> {
        let name = validate_name(name)?;
        let req = CreateDirectoryRequest {
            name: name.to_string(),
            permission: Permission::Public,
            parent_id,
        };
        let dir: DirectoryRecord =
            backend::request(self.conn, Method::CreateDirectory, &req).await?;
        info!(id = dir.id, name = %dir.name, ?parent_id, "created directory");
        Ok(dir)
    }

    /// Deletes a file, or a directory with everything below it.
    pub async fn delete_asset(&self, asset: AssetRef) -> Result<(), FileManagerError> {
        backend::send(self.conn, Method::DeleteAsset, &DeleteAssetRequest { asset }).await?;
        info!(?asset, "deleted asset");
        Ok(())
    }

    /// Renames an asset to exactly `name`.
    pub async fn rename_asset(&self, asset: AssetRef, name: &str) -> Result<(), FileManagerError> {
        let name = validate_name(name)?;
        let req = ChangeAssetNameRequest {
            name: name.to_string(),
            asset,
        };
        backend::send(self.conn, Method::ChangeAssetName, &req).await?;
        info!(?asset, name, "renamed asset");
        Ok(())
    }

    /// Renames a file, keeping its stored extension.
    ///
    /// `stem` is the new name without extension; `"{stem}.{extension}"` is
    /// sent to the backend.
    pub async fn rename_file(&self, file: &FileRecord, stem: &str) -> Result<(), FileManagerError> {
        let stem = validate_name(stem)?;
        let name = if file.extension.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}.{}", file.extension)
        };
        self.rename_asset(AssetRef::File(file.id), &name).await
    }
}

fn validate_name(name: &str) -> Result<&str, FileManagerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(FileManagerError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// Sums sizes and files below `dir`, recursively.
pub fn directory_totals(dir: &DirectoryRecord) -> DirectoryTotals {
    let mut totals = DirectoryTotals::default();
    for child in &dir.children {
        match child {
            AssetRecord::File(f) => {
                totals.total_bytes += f.size;
                totals.total_files += 1;
            }
            AssetRecord::Directory(d) => {
                let inner = directory_totals(d);
                totals.total_bytes += inner.total_bytes;
                totals.total_files += inner.total_files;
                totals.subdirectories += 1;
            }
        }
    }
    totals
}

/// Finds an asset by id anywhere in `assets`.
pub fn find_asset(assets: &[AssetRecord], id: AssetId) -> Option<&AssetRecord> {
    assets.iter().find_map(|asset| {
        if asset.id() == id {
            return Some(asset);
        }
        match asset {
            AssetRecord::Directory(d) => find_asset(&d.children, id),
            AssetRecord::File(_) => None,
        }
    })
}

/// Whether `principal` may rename or delete `asset`.
///
/// Protected assets are read-only for everyone. Directories without an
/// owner cannot be modified.
pub fn is_modifiable_by(asset: &AssetRecord, principal: &str) -> bool {
    match asset {
        AssetRecord::File(f) => !f.is_protected && f.owner == principal,
        AssetRecord::Directory(d) => !d.is_protected && d.owner.as_deref() == Some(principal),
    }
}
