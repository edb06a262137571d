use uuid::Uuid;

use super::status::TableStatus;

pub const DEFAULT_SEATS: i32 = 4;

#[derive(Debug, Clone)]
pub struct TableView {
    pub id: Uuid,
    pub number: i32,
    pub seats: i32,
    pub status: TableStatus,
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTable {
    pub number: i32,
    pub seats: i32,
    pub qr_code: Option<String>,
}
