//! Adjacent-swap reordering for the manually ordered lists.
//!
//! `sort_order` values only need to be relatively ordered. Moving an item
//! swaps its value with the nearest neighbour in the requested direction;
//! nothing is renumbered. Rows that share a `sort_order` are never strictly
//! less or greater than each other, so which of several equal neighbours gets
//! picked is up to SQLite.

use rusqlite::{params, Connection, OptionalExtension};

/// The lists that carry a `sort_order` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortableList {
    Works,
    Events,
    Gallery,
}

impl SortableList {
    fn table(self) -> &'static str {
        match self {
            SortableList::Works => "work",
            SortableList::Events => "event",
            SortableList::Gallery => "gallery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Next `sort_order` for a new row: one past the current maximum.
pub fn next_sort_order(conn: &Connection, list: SortableList) -> Result<i64, String> {
    conn.query_row(
        &format!("SELECT COALESCE(MAX(sort_order), 0) FROM {}", list.table()),
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|max| max + 1)
    .map_err(|e| e.to_string())
}

/// Swap `id` with its neighbour. Returns `Ok(false)` when the item or the
/// neighbour does not exist.
///
/// The two updates run as separate statements.
pub fn move_item(
    conn: &Connection,
    list: SortableList,
    id: i64,
    direction: Direction,
) -> Result<bool, String> {
    let table = list.table();

    let item: Option<(i64, i64)> = conn
        .query_row(
            &format!("SELECT id, sort_order FROM {} WHERE id = ?1", table),
            params![id],
            |row| Ok((row.get(0)?, row.get::<_, Option<i64>>(1)?.unwrap_or(0))),
        )
        .optional()
        .map_err(|e| e.to_string())?;

    let (item_id, item_order) = match item {
        Some(i) => i,
        None => return Ok(false),
    };

    let (op, order) = match direction {
        Direction::Up => ("<", "DESC"),
        Direction::Down => (">", "ASC"),
    };

    let neighbour: Option<(i64, i64)> = conn
        .query_row(
            &format!(
                "SELECT id, sort_order FROM {} WHERE sort_order {} ?1 ORDER BY sort_order {} LIMIT 1",
                table, op, order
            ),
            params![item_order],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| e.to_string())?;

    let (neighbour_id, neighbour_order) = match neighbour {
        Some(n) => n,
        None => return Ok(false),
    };

    conn.execute(
        &format!("UPDATE {} SET sort_order = ?1 WHERE id = ?2", table),
        params![neighbour_order, item_id],
    )
    .map_err(|e| e.to_string())?;
    conn.execute(
        &format!("UPDATE {} SET sort_order = ?1 WHERE id = ?2", table),
        params![item_order, neighbour_id],
    )
    .map_err(|e| e.to_string())?;

    Ok(true)
}
