use serde::{Deserialize, Serialize};

use crate::types::{AssetId, AssetRecord, AssetRef, AssetTreeNode, ChunkId, FileRecord, Permission};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Creates a forest of assets under `parent_id` (root when `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAssetsRequest {
    #[serde(default)]
    pub parent_id: Option<AssetId>,
    pub assets: Vec<AssetTreeNode>,
}

/// One chunk of file content.
///
/// `data` is base64-encoded in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub id: ChunkId,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Stores a batch of chunks in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddChunksRequest {
    pub chunks: Vec<ChunkPayload>,
}

/// Lists the asset tree below `parent_id` (root when `None`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetAssetsTreeRequest {
    #[serde(default)]
    pub parent_id: Option<AssetId>,
}

/// Creates a single empty directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDirectoryRequest {
    pub name: String,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default)]
    pub parent_id: Option<AssetId>,
}

/// Deletes a file, or a directory with everything below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAssetRequest {
    pub asset: AssetRef,
}

/// Renames a file or directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeAssetNameRequest {
    pub name: String,
    pub asset: AssetRef,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// A file created by `add_assets`, paired with the path it was selected with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedFile {
    pub file: FileRecord,
    #[serde(default)]
    pub origin_path: String,
}

/// Files created by `add_assets`, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddAssetsResponse {
    #[serde(default)]
    pub files: Vec<CreatedFile>,
}

/// Result of `get_assets_tree`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsTreeResponse {
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_payload_is_base64() {
        let req = AddChunksRequest {
            chunks: vec![ChunkPayload {
                id: ChunkId(9),
                data: vec![0x48, 0x65, 0x6c, 0x6c, 0x6f],
            }],
        };
        let json = serde_json::to_string(&req).unwrap();
        // "Hello" = "SGVsbG8="
        assert!(json.contains("SGVsbG8="));
        assert!(json.contains("\"id\":\"9\""));
        let parsed: AddChunksRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn add_assets_root_parent_is_null() {
        let req = AddAssetsRequest {
            parent_id: None,
            assets: vec![AssetTreeNode::directory("docs")],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["parent_id"].is_null());
        assert_eq!(json["assets"][0]["asset"]["Directory"]["name"], "docs");
    }

    #[test]
    fn delete_request_tags_kind() {
        let req = DeleteAssetRequest {
            asset: AssetRef::Directory(12),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"asset":{"Directory":12}}"#);
    }

    #[test]
    fn add_assets_response_defaults() {
        let resp: AddAssetsResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.files.is_empty());
    }
}
