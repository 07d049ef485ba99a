//! Type definitions of a low-level SQL string representation.

use indexmap::IndexMap;
use serde::Serialize;

use super::dialect::{Dialect, QuoteStyle};

/// A rendered statement: text with named placeholders plus the parameter
/// map binding them, unique within this one render.
#[derive(Debug, PartialEq)]
pub struct Sql {
    pub sql: String,
    pub params: IndexMap<String, Param>,
    /// for internal use and tests only
    pub param_index: u64,
    dialect: &'static Dialect,
}

/// A value bound to a named parameter of a parameterized query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Sql {
    pub fn new(dialect: &'static Dialect) -> Sql {
        Sql {
            sql: String::new(),
            params: IndexMap::new(),
            param_index: 0,
            dialect,
        }
    }

    pub fn dialect(&self) -> &'static Dialect {
        self.dialect
    }

    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append an identifier quoted per the dialect. A quote character inside
    /// the identifier is doubled, closing brackets likewise.
    pub fn append_identifier(&mut self, ident: &str) {
        match self.dialect.quote {
            QuoteStyle::DoubleQuote => {
                self.sql.push('"');
                self.sql.push_str(&ident.replace('"', "\"\""));
                self.sql.push('"');
            }
            QuoteStyle::Backtick => {
                self.sql.push('`');
                self.sql.push_str(&ident.replace('`', "``"));
                self.sql.push('`');
            }
            QuoteStyle::Bracket => {
                self.sql.push('[');
                self.sql.push_str(&ident.replace(']', "]]"));
                self.sql.push(']');
            }
        }
    }

    /// Append a named placeholder and record its binding. Names count up
    /// from `:p1` and are never reused within one render.
    pub fn append_param(&mut self, param: Param) {
        self.param_index += 1;
        let name = format!("p{}", self.param_index);
        self.sql.push(':');
        self.sql.push_str(&name);
        self.params.insert(name, param);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect;

    #[test]
    fn test_param_names_are_unique_within_one_render() {
        let mut sql = Sql::new(&dialect::ANSI);
        sql.append_param(Param::Int(1));
        sql.append_param(Param::Int(2));
        sql.append_param(Param::String("x".to_string()));
        assert_eq!(sql.sql, ":p1:p2:p3");
        assert_eq!(sql.params.len(), 3);
    }

    #[test]
    fn test_identifier_quoting_follows_dialect() {
        let mut ansi = Sql::new(&dialect::ANSI);
        ansi.append_identifier("users");
        assert_eq!(ansi.sql, "\"users\"");

        let mut mysql = Sql::new(&dialect::MYSQL);
        mysql.append_identifier("users");
        assert_eq!(mysql.sql, "`users`");

        let mut mssql = Sql::new(&dialect::MSSQL);
        mssql.append_identifier("users");
        assert_eq!(mssql.sql, "[users]");
    }

    #[test]
    fn test_embedded_quote_is_doubled() {
        let mut sql = Sql::new(&dialect::ANSI);
        sql.append_identifier("odd\"name");
        assert_eq!(sql.sql, "\"odd\"\"name\"");
    }
}
