//! Dungeon-master DTOs for the DM projection endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use super::log_dto::LogDto;
use crate::domain::{DungeonMasterId, DungeonMasterRecord};

/// DM row for `GET /dms`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DmRowDto {
    /// Dungeon master identifier.
    pub id: DungeonMasterId,
    /// Display name.
    pub name: String,
    /// DCI organized-play number, if recorded.
    pub dci: Option<String>,
    /// Number of logs credited to this DM.
    pub log_count: usize,
}

impl From<&DungeonMasterRecord> for DmRowDto {
    fn from(record: &DungeonMasterRecord) -> Self {
        Self {
            id: record.dm.id,
            name: record.dm.name.clone(),
            dci: record.dm.dci.clone(),
            log_count: record.logs.len(),
        }
    }
}

/// Response body for `GET /dms`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DmListResponse {
    /// DM rows sorted by name.
    pub data: Vec<DmRowDto>,
}

/// DM detail for `GET /dms/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DmDetailResponse {
    /// Dungeon master identifier.
    pub id: DungeonMasterId,
    /// Display name.
    pub name: String,
    /// DCI organized-play number, if recorded.
    pub dci: Option<String>,
    /// Logs credited to this DM, ascending by effective date.
    pub logs: Vec<LogDto>,
}

impl From<&DungeonMasterRecord> for DmDetailResponse {
    fn from(record: &DungeonMasterRecord) -> Self {
        Self {
            id: record.dm.id,
            name: record.dm.name.clone(),
            dci: record.dm.dci.clone(),
            logs: record.logs.iter().map(LogDto::from).collect(),
        }
    }
}
