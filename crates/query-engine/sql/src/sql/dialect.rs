//! Backend dialect descriptors: identifier quoting, count function,
//! paging syntax and the union keyword, selected once from a detected
//! engine identifier.

/// Rendering rules for one backend family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    /// Substrings matched against the lowercased engine identifier.
    markers: &'static [&'static str],
    pub quote: QuoteStyle,
    pub count_function: &'static str,
    pub paging: PagingStyle,
    pub union_keyword: &'static str,
}

/// Identifier quoting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `"name"`
    DoubleQuote,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

/// Bounded paging clause template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingStyle {
    /// `LIMIT n OFFSET m`
    LimitOffset,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
}

pub const POSTGRES: Dialect = Dialect {
    name: "postgresql",
    markers: &["postgres"],
    quote: QuoteStyle::DoubleQuote,
    count_function: "COUNT",
    paging: PagingStyle::LimitOffset,
    union_keyword: "UNION",
};

pub const MYSQL: Dialect = Dialect {
    name: "mysql",
    markers: &["mysql", "mariadb"],
    quote: QuoteStyle::Backtick,
    count_function: "COUNT",
    paging: PagingStyle::LimitOffset,
    union_keyword: "UNION",
};

pub const MSSQL: Dialect = Dialect {
    name: "mssql",
    markers: &["sql server", "mssql"],
    quote: QuoteStyle::Bracket,
    count_function: "COUNT",
    paging: PagingStyle::OffsetFetch,
    union_keyword: "UNION",
};

pub const ORACLE: Dialect = Dialect {
    name: "oracle",
    markers: &["oracle"],
    quote: QuoteStyle::DoubleQuote,
    count_function: "COUNT",
    paging: PagingStyle::OffsetFetch,
    union_keyword: "UNION",
};

/// Fallback when no registered dialect recognizes the engine identifier.
pub const ANSI: Dialect = Dialect {
    name: "ansi",
    markers: &[],
    quote: QuoteStyle::DoubleQuote,
    count_function: "COUNT",
    paging: PagingStyle::LimitOffset,
    union_keyword: "UNION",
};

/// Every dialect the engine knows, in selection order.
pub const REGISTERED: &[Dialect] = &[POSTGRES, MYSQL, MSSQL, ORACLE];

impl Dialect {
    /// Does this dialect recognize the given engine identifier?
    pub fn supports(&self, engine: &str) -> bool {
        let engine = engine.to_lowercase();
        self.markers.iter().any(|marker| engine.contains(marker))
    }
}

/// Select the dialect for a detected engine identifier. Falls back to the
/// ANSI descriptor when nothing matches.
pub fn for_engine(engine: &str) -> &'static Dialect {
    REGISTERED
        .iter()
        .find(|dialect| dialect.supports(engine))
        .unwrap_or(&ANSI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_identifier_selects_dialect() {
        assert_eq!(for_engine("PostgreSQL 16.2").name, "postgresql");
        assert_eq!(for_engine("MySQL Community Server 8.3").name, "mysql");
        assert_eq!(for_engine("Microsoft SQL Server 2022").name, "mssql");
        assert_eq!(for_engine("Oracle Database 19c").name, "oracle");
    }

    #[test]
    fn test_unknown_engine_falls_back_to_ansi() {
        assert_eq!(for_engine("H2 2.2").name, "ansi");
        assert_eq!(for_engine("").name, "ansi");
    }
}
