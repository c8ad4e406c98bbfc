use std::fmt;

use serde::{Deserialize, Serialize};

/// Principal text of an unauthenticated caller.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Remote procedures exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    AddAssets,
    AddChunks,
    GetAssetsTree,
    GetMetadata,
    CreateDirectory,
    DeleteAsset,
    ChangeAssetName,
}

impl Method {
    /// Returns the wire name of the procedure.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::AddAssets => "add_assets",
            Method::AddChunks => "add_chunks",
            Method::GetAssetsTree => "get_assets_tree",
            Method::GetMetadata => "get_metadata",
            Method::CreateDirectory => "create_directory",
            Method::DeleteAsset => "delete_asset",
            Method::ChangeAssetName => "change_asset_name",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
