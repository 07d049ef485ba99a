//! Convert a SQL AST to a low-level SQL string.

use super::ast::*;
use super::dialect::PagingStyle;
use super::string::Sql;

impl Statement {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            Statement::Select(select) => select.to_sql(sql),
            Statement::Union(union) => union.to_sql(sql),
        }
    }
}

impl Union {
    pub fn to_sql(&self, sql: &mut Sql) {
        for (index, branch) in self.branches.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(" ");
                sql.append_syntax(sql.dialect().union_keyword);
                sql.append_syntax(" ");
            }
            branch.to_sql(sql);
        }
    }
}

impl Select {
    pub fn to_sql(&self, sql: &mut Sql) {
        sql.append_syntax("SELECT ");

        self.select_list.to_sql(sql);

        match &self.from {
            Some(from) => {
                sql.append_syntax(" ");
                from.to_sql(sql);
            }
            None => (),
        }

        for join in &self.joins {
            join.to_sql(sql);
        }

        self.where_.to_sql(sql);

        self.order_by.to_sql(sql);

        self.limit.to_sql(sql);
    }
}

impl SelectList {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            SelectList::SelectList(select_list) => {
                for (index, expr) in select_list.iter().enumerate() {
                    expr.to_sql(sql);
                    if index < (select_list.len() - 1) {
                        sql.append_syntax(", ");
                    }
                }
            }
            SelectList::SelectStar => {
                sql.append_syntax("*");
            }
            SelectList::Count(count_type) => {
                sql.append_syntax(sql.dialect().count_function);
                sql.append_syntax("(");
                count_type.to_sql(sql);
                sql.append_syntax(")");
            }
        }
    }
}

impl From {
    pub fn to_sql(&self, sql: &mut Sql) {
        sql.append_syntax("FROM ");
        match self {
            From::Table { reference, alias } => {
                reference.to_sql(sql);
                sql.append_syntax(" AS ");
                alias.to_sql(sql);
            }
        }
    }
}

impl Join {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self.kind {
            JoinKind::Inner => sql.append_syntax(" INNER JOIN "),
            JoinKind::Left => sql.append_syntax(" LEFT JOIN "),
        }
        self.table.to_sql(sql);
        sql.append_syntax(" AS ");
        self.alias.to_sql(sql);
        sql.append_syntax(" ON ");
        self.on.to_sql(sql);
    }
}

impl Where {
    pub fn to_sql(&self, sql: &mut Sql) {
        let Where(expression) = self;
        if let Some(expression) = expression {
            sql.append_syntax(" WHERE ");
            expression.to_sql(sql);
        }
    }
}

// scalars
impl Expression {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            Expression::And { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" AND ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Or { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" OR ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Not(expr) => {
                sql.append_syntax("NOT ");
                expr.to_sql(sql);
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryArrayOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                sql.append_syntax("(");
                for (index, item) in right.iter().enumerate() {
                    item.to_sql(sql);
                    if index < (right.len() - 1) {
                        sql.append_syntax(", ");
                    }
                }
                sql.append_syntax(")");
                sql.append_syntax(")");
            }
            Expression::ColumnReference(column_reference) => column_reference.to_sql(sql),
            Expression::Parameter(param) => sql.append_param(param.clone()),
            Expression::Value(value) => value.to_sql(sql),
        }
    }
}

impl BinaryOperator {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            BinaryOperator::Equals => sql.append_syntax(" = "),
            BinaryOperator::NotEquals => sql.append_syntax(" <> "),
            BinaryOperator::GreaterThan => sql.append_syntax(" > "),
            BinaryOperator::GreaterThanOrEqualTo => sql.append_syntax(" >= "),
            BinaryOperator::LessThan => sql.append_syntax(" < "),
            BinaryOperator::LessThanOrEqualTo => sql.append_syntax(" <= "),
            BinaryOperator::Like => sql.append_syntax(" LIKE "),
        }
    }
}

impl BinaryArrayOperator {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            BinaryArrayOperator::In => sql.append_syntax(" IN "),
            BinaryArrayOperator::NotIn => sql.append_syntax(" NOT IN "),
        }
    }
}

impl CountType {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            CountType::Star => sql.append_syntax("*"),
            CountType::Simple(column) => column.to_sql(sql),
            CountType::Distinct(column) => {
                sql.append_syntax("DISTINCT ");
                column.to_sql(sql);
            }
        }
    }
}

impl Value {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            Value::Bool(true) => sql.append_syntax("true"),
            Value::Bool(false) => sql.append_syntax("false"),
            Value::Int(i) => sql.append_syntax(&i.to_string()),
            Value::Null => sql.append_syntax("NULL"),
        }
    }
}

impl Limit {
    pub fn to_sql(&self, sql: &mut Sql) {
        match sql.dialect().paging {
            PagingStyle::LimitOffset => {
                if let Some(limit) = self.limit {
                    sql.append_syntax(" LIMIT ");
                    sql.append_syntax(&limit.to_string());
                }
                if let Some(offset) = self.offset {
                    sql.append_syntax(" OFFSET ");
                    sql.append_syntax(&offset.to_string());
                }
            }
            PagingStyle::OffsetFetch => {
                if self.limit.is_some() || self.offset.is_some() {
                    sql.append_syntax(" OFFSET ");
                    sql.append_syntax(&self.offset.unwrap_or(0).to_string());
                    sql.append_syntax(" ROWS");
                }
                if let Some(limit) = self.limit {
                    sql.append_syntax(" FETCH NEXT ");
                    sql.append_syntax(&limit.to_string());
                    sql.append_syntax(" ROWS ONLY");
                }
            }
        }
    }
}

// names
impl TableReference {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            TableReference::DBTable { schema, table } => {
                sql.append_identifier(&schema.0);
                sql.append_syntax(".");
                sql.append_identifier(&table.0);
            }
            TableReference::AliasedTable(alias) => alias.to_sql(sql),
        }
    }
}

impl TableAlias {
    pub fn to_sql(&self, sql: &mut Sql) {
        sql.append_identifier(&self.name);
    }
}

impl ColumnReference {
    pub fn to_sql(&self, sql: &mut Sql) {
        self.table.to_sql(sql);
        sql.append_syntax(".");
        sql.append_identifier(&self.name.0);
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut Sql) {
        if !self.elements.is_empty() {
            sql.append_syntax(" ORDER BY ");
            for (index, order_by_item) in self.elements.iter().enumerate() {
                order_by_item.to_sql(sql);
                if index < (self.elements.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
        }
    }
}

impl OrderByElement {
    pub fn to_sql(&self, sql: &mut Sql) {
        self.target.to_sql(sql);
        self.direction.to_sql(sql);
    }
}

impl OrderByDirection {
    pub fn to_sql(&self, sql: &mut Sql) {
        match self {
            OrderByDirection::Asc => sql.append_syntax(" ASC"),
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::sql::dialect;
    use crate::sql::helpers;
    use crate::sql::string::Param;

    fn users_column(alias: &TableAlias, name: &str) -> Expression {
        Expression::ColumnReference(ColumnReference {
            table: TableReference::AliasedTable(alias.clone()),
            name: ColumnName(name.to_string()),
        })
    }

    fn users_from(alias: &TableAlias) -> From {
        From::Table {
            reference: TableReference::DBTable {
                schema: SchemaName("public".to_string()),
                table: TableName("users".to_string()),
            },
            alias: alias.clone(),
        }
    }

    #[test]
    fn test_render_select_with_predicate_order_and_paging() {
        let alias = helpers::make_table_alias(0, "user_0");
        let mut select = helpers::simple_select(vec![
            users_column(&alias, "age"),
            users_column(&alias, "status"),
        ]);
        select.from = Some(users_from(&alias));
        select.where_ = Where(Some(Expression::BinaryOperation {
            left: Box::new(users_column(&alias, "age")),
            operator: BinaryOperator::GreaterThan,
            right: Box::new(Expression::Parameter(Param::Int(30))),
        }));
        select.order_by = OrderBy {
            elements: vec![OrderByElement {
                target: users_column(&alias, "age"),
                direction: OrderByDirection::Desc,
            }],
        };
        select.limit = Limit {
            limit: Some(10),
            offset: Some(5),
        };

        let mut sql = Sql::new(&dialect::ANSI);
        select.to_sql(&mut sql);
        assert_eq!(
            sql.sql,
            "SELECT \"user_0\".\"age\", \"user_0\".\"status\" \
             FROM \"public\".\"users\" AS \"user_0\" \
             WHERE (\"user_0\".\"age\" > :p1) \
             ORDER BY \"user_0\".\"age\" DESC \
             LIMIT 10 OFFSET 5"
        );
        assert_eq!(sql.params.get("p1"), Some(&Param::Int(30)));
    }

    #[test]
    fn test_render_offset_fetch_paging() {
        let alias = helpers::make_table_alias(0, "user_0");
        let mut select = helpers::simple_select(vec![users_column(&alias, "age")]);
        select.from = Some(users_from(&alias));
        select.limit = Limit {
            limit: Some(10),
            offset: Some(5),
        };

        let mut sql = Sql::new(&dialect::MSSQL);
        select.to_sql(&mut sql);
        assert_eq!(
            sql.sql,
            "SELECT [user_0].[age] FROM [public].[users] AS [user_0] \
             OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_unset_paging_renders_no_clause() {
        let alias = helpers::make_table_alias(0, "user_0");
        let mut select = helpers::simple_select(vec![users_column(&alias, "age")]);
        select.from = Some(users_from(&alias));

        let mut sql = Sql::new(&dialect::ANSI);
        select.to_sql(&mut sql);
        assert_eq!(
            sql.sql,
            "SELECT \"user_0\".\"age\" FROM \"public\".\"users\" AS \"user_0\""
        );
    }

    #[test]
    fn test_render_count_statement() {
        let alias = helpers::make_table_alias(0, "user_0");
        let mut select = helpers::simple_select(vec![]);
        select.select_list = SelectList::Count(CountType::Star);
        select.from = Some(users_from(&alias));

        let mut sql = Sql::new(&dialect::ANSI);
        select.to_sql(&mut sql);
        assert_eq!(
            sql.sql,
            "SELECT COUNT(*) FROM \"public\".\"users\" AS \"user_0\""
        );
    }

    #[test]
    fn test_render_union_branches_with_dialect_keyword() {
        let first = helpers::make_table_alias(0, "user_0");
        let second = helpers::make_table_alias(1, "acco_1");

        let mut left = helpers::simple_select(vec![users_column(&first, "id")]);
        left.from = Some(users_from(&first));

        let mut right = helpers::simple_select(vec![users_column(&second, "id")]);
        right.from = Some(From::Table {
            reference: TableReference::DBTable {
                schema: SchemaName("public".to_string()),
                table: TableName("accounts".to_string()),
            },
            alias: second.clone(),
        });

        let union = Statement::Union(Union {
            branches: vec![left, right],
        });

        let mut sql = Sql::new(&dialect::ANSI);
        union.to_sql(&mut sql);
        assert_eq!(
            sql.sql,
            "SELECT \"user_0\".\"id\" FROM \"public\".\"users\" AS \"user_0\" \
             UNION \
             SELECT \"acco_1\".\"id\" FROM \"public\".\"accounts\" AS \"acco_1\""
        );
    }

    #[test]
    fn test_render_in_list_binds_each_operand() {
        let alias = helpers::make_table_alias(0, "user_0");
        let expr = Expression::BinaryArrayOperation {
            left: Box::new(users_column(&alias, "status")),
            operator: BinaryArrayOperator::In,
            right: vec![
                Expression::Parameter(Param::String("active".to_string())),
                Expression::Parameter(Param::String("locked".to_string())),
            ],
        };

        let mut sql = Sql::new(&dialect::ANSI);
        expr.to_sql(&mut sql);
        assert_eq!(sql.sql, "(\"user_0\".\"status\" IN (:p1, :p2))");
        assert_eq!(sql.params.len(), 2);
    }
}
