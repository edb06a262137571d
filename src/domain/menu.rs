use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MenuView {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub is_active: bool,
    pub requires_cooking: bool,
}

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub name: String,
    pub price: i64,
    pub is_active: bool,
    pub requires_cooking: bool,
}

/// Staff edits; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct MenuPatch {
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}
