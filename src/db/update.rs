use sqlx::sqlite::SqliteRow;
use sqlx::{Encode, FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use tracing::debug;

#[derive(Debug)]
pub enum UpdateOutcome<T> {
    Updated(T),
    NotFound,
    NoChanges,
}

/// `UPDATE <table> SET ... WHERE <key> = ? RETURNING *` built from the
/// fields that are present.
///
/// Column names are `&'static str`, so only names written into the
/// repository code can reach the SQL text. Values are always bound.
pub struct PartialUpdate {
    table: &'static str,
    key: &'static str,
    builder: QueryBuilder<'static, Sqlite>,
    assignments: usize,
}

impl PartialUpdate {
    pub fn new(table: &'static str, key: &'static str) -> Self {
        let mut builder = QueryBuilder::new("UPDATE ");
        builder.push(table).push(" SET ");
        Self {
            table,
            key,
            builder,
            assignments: 0,
        }
    }

    /// Appends `column = ?` when `value` is present.
    pub fn set<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'static + Send + Encode<'static, Sqlite> + Type<Sqlite>,
    {
        if let Some(value) = value {
            if self.assignments > 0 {
                self.builder.push(", ");
            }
            self.builder.push(column).push(" = ").push_bind(value);
            self.assignments += 1;
        }
        self
    }

    /// Appends an assignment only if some client field is already present.
    pub fn touch<T>(&mut self, column: &'static str, value: T) -> &mut Self
    where
        T: 'static + Send + Encode<'static, Sqlite> + Type<Sqlite>,
    {
        if !self.is_empty() {
            self.set(column, Some(value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments == 0
    }

    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub async fn execute<R>(mut self, db: &SqlitePool, id: i64) -> Result<UpdateOutcome<R>, sqlx::Error>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        if self.is_empty() {
            return Ok(UpdateOutcome::NoChanges);
        }

        self.builder
            .push(" WHERE ")
            .push(self.key)
            .push(" = ")
            .push_bind(id)
            .push(" RETURNING *");
        debug!(table = self.table, sql = self.builder.sql(), "partial update");

        let row = self
            .builder
            .build_query_as::<R>()
            .fetch_optional(db)
            .await?;

        Ok(match row {
            Some(row) => UpdateOutcome::Updated(row),
            None => UpdateOutcome::NotFound,
        })
    }
}
