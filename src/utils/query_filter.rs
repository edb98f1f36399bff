#![forbid(unsafe_code)]

use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use crate::utils::db_statements::PLACEHOLDER;

// The conjunction appended after each rendered comparison.  The final
// trailing occurrence is stripped before the clause is finalized.
const CONJUNCTION: &str = " AND ";

// ***************************************************************************
//                                BookFilter
// ***************************************************************************
// ---------------------------------------------------------------------------
// Constraint:
// ---------------------------------------------------------------------------
/** One recognized filter key with its typed value.  id and published compare
 * numerically; author is an exact text match with no case folding. */
#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    Id(i32),
    Published(i32),
    Author(String),
}

impl Constraint {
    fn column(&self) -> &'static str {
        match self {
            Constraint::Id(_) => "id",
            Constraint::Published(_) => "published",
            Constraint::Author(_) => "author",
        }
    }
}

// ---------------------------------------------------------------------------
// BookFilter:
// ---------------------------------------------------------------------------
/** A structured conjunctive predicate over the recognized filter keys.  The
 * predicate is assembled independently of any statement text and later bound
 * parameter by parameter, so no request value ever reaches the SQL string. */
#[derive(Debug, Clone, PartialEq)]
pub struct BookFilter {
    constraints: Vec<Constraint>,
}

impl BookFilter {
    /** Collect the constraints in fixed evaluation order: id, then published,
     * then author.  Absent parameters contribute nothing.  An empty author
     * value (`?author=`) counts as absent, not as a match against the empty
     * string. */
    pub fn new(id: Option<i32>, published: Option<i32>, author: Option<String>) -> BookFilter {
        let mut constraints = Vec::new();
        if let Some(v) = id {
            constraints.push(Constraint::Id(v));
        }
        if let Some(v) = published {
            constraints.push(Constraint::Published(v));
        }
        if let Some(v) = author {
            if !v.is_empty() {
                constraints.push(Constraint::Author(v));
            }
        }
        BookFilter { constraints }
    }

    /** True when no recognized filter key was present on the request. */
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /** Render the WHERE clause body: one `column = ?` comparison per
     * constraint, ANDed together.  Callers must reject empty filters before
     * rendering. */
    fn where_clause(&self) -> String {
        let mut clause = String::new();
        for constraint in &self.constraints {
            clause.push_str(constraint.column());
            clause.push_str(" = ?");
            clause.push_str(CONJUNCTION);
        }
        // Strip the trailing conjunction.
        clause.truncate(clause.len().saturating_sub(CONJUNCTION.len()));
        clause
    }

    /** Bind the constraint values in clause order. */
    pub fn bind_values<'q>(
        &self,
        mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        for constraint in &self.constraints {
            query = match constraint {
                Constraint::Id(v) => query.bind(*v),
                Constraint::Published(v) => query.bind(*v),
                Constraint::Author(v) => query.bind(v.clone()),
            };
        }
        query
    }
}

// ---------------------------------------------------------------------------
// sql_substitute_where_clause:
// ---------------------------------------------------------------------------
/** Substitute the rendered filter clause into a statement template.  Only
 * fixed column names and `= ?` markers are spliced into the statement; the
 * values themselves travel as bound parameters. */
pub fn sql_substitute_where_clause(template: &str, filter: &BookFilter) -> String {
    template.replace(PLACEHOLDER, &filter.where_clause())
}
