//! Sort-key assignment for ordered siblings.
//!
//! A new column (within a board) or task (within a column) without an
//! explicit position lands after its last sibling: `MAX(position) + 1`, or
//! `0` when the scope is empty. Existing siblings are never renumbered and
//! keys are not dense. Ties from explicit positions are allowed and ordered
//! by insertion (`rowid`).
//!
//! The default is computed by a subquery inside the writing statement, so
//! the read and the write happen under the same SQLite write lock.

/// Parent scope a position is ordered within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Columns of one board.
    BoardColumns,
    /// Tasks of one column.
    ColumnTasks,
}

impl Scope {
    fn table(self) -> &'static str {
        match self {
            Scope::BoardColumns => "columns",
            Scope::ColumnTasks => "tasks",
        }
    }

    fn parent_key(self) -> &'static str {
        match self {
            Scope::BoardColumns => "board_id",
            Scope::ColumnTasks => "column_id",
        }
    }

    /// SQL expression for the next free position; `parent_param` is the
    /// placeholder bound to the parent id.
    pub fn next_position_sql(self, parent_param: &str) -> String {
        format!(
            "(SELECT COALESCE(MAX(position), -1) + 1 FROM {} WHERE {} = {})",
            self.table(),
            self.parent_key(),
            parent_param
        )
    }

    /// SQL expression using `explicit_param` when it is bound to a value and
    /// the next free position otherwise.
    pub fn position_or_next_sql(self, explicit_param: &str, parent_param: &str) -> String {
        format!(
            "COALESCE({}, {})",
            explicit_param,
            self.next_position_sql(parent_param)
        )
    }
}
