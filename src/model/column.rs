use serde::{Deserialize, Serialize};

/// A lane on the board. A feature sits in the column whose id equals its `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Left-to-right (or top-to-bottom) position
    #[serde(default)]
    pub order: i64,
}

impl Column {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>, order: i64) -> Self {
        Column {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            order,
        }
    }
}

/// Columns sorted by `order`, ties broken by list position
pub fn ordered(columns: &[Column]) -> Vec<&Column> {
    let mut sorted: Vec<&Column> = columns.iter().collect();
    sorted.sort_by_key(|c| c.order);
    sorted
}

/// The column that comes first by `order`
pub fn first_by_order(columns: &[Column]) -> Option<&Column> {
    columns.iter().min_by_key(|c| c.order)
}

/// Rewrite `order` so it matches the current list position (0, 1, 2, ...)
pub fn renumber(columns: &mut [Column]) {
    for (i, col) in columns.iter_mut().enumerate() {
        col.order = i as i64;
    }
}

/// The columns a new project starts with
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("ideas", "Ideas", "purple", 0),
        Column::new("planned", "Planned", "blue", 1),
        Column::new("working", "Working", "yellow", 2),
        Column::new("done", "Done", "green", 3),
    ]
}
