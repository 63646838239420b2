use super::common::to_snake_case;
use super::errors::SqlGeneratorError;
use super::pattern_registry::{pattern_library, PatternLibrary};
use crate::dax_parser::ast::{BinaryOperator, DaxExpression, LiteralValue, UnaryOperator};
use crate::semantic_catalog::SchemaContext;

/// SQL generation visitor.
///
/// A pure syntactic walk over the AST. Known functions translate through the
/// pattern rules below; unknown ones are emitted verbatim with a warning.
/// The walk accumulates applied patterns, warnings and referenced tables
/// (first-encounter order, deduplicated) for the translator to fold into the
/// final result.
pub struct SqlGenerator<'a> {
    context: Option<&'a SchemaContext>,
    patterns: &'static PatternLibrary,
    pub patterns_applied: Vec<String>,
    pub warnings: Vec<String>,
    pub tables_used: Vec<String>,
}

impl<'a> SqlGenerator<'a> {
    pub fn new(
        context: Option<&'a SchemaContext>,
        patterns: Option<&'static PatternLibrary>,
    ) -> Self {
        Self {
            context,
            patterns: patterns.unwrap_or_else(pattern_library),
            patterns_applied: Vec::new(),
            warnings: Vec::new(),
            tables_used: Vec::new(),
        }
    }

    /// Generate SQL for one expression tree.
    pub fn generate(&mut self, node: &DaxExpression) -> Result<String, SqlGeneratorError> {
        match node {
            DaxExpression::Literal(value) => self.gen_literal(value),
            DaxExpression::Column { table, column } => Ok(self.gen_column(table.as_deref(), column)),
            DaxExpression::Table { name } => Ok(self.gen_table(name)),
            DaxExpression::MeasureRef { name } => Ok(to_snake_case(name)),
            DaxExpression::FunctionCall { name, args } => self.gen_function(name, args),
            DaxExpression::BinaryOp { op, left, right } => self.gen_binary_op(*op, left, right),
            DaxExpression::UnaryOp { op, operand } => self.gen_unary_op(*op, operand),
            DaxExpression::Measure { name, expression } => {
                let sql = self.generate(expression)?;
                Ok(format!("{} AS {}", sql, to_snake_case(name)))
            }
        }
    }

    fn gen_literal(&self, value: &LiteralValue) -> Result<String, SqlGeneratorError> {
        match value {
            LiteralValue::Number(n) => {
                if !n.is_finite() {
                    return Err(SqlGeneratorError::NonFiniteNumber);
                }
                Ok(format!("{}", n))
            }
            LiteralValue::Text(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
            LiteralValue::Boolean(true) => Ok("TRUE".to_string()),
            LiteralValue::Boolean(false) => Ok("FALSE".to_string()),
            LiteralValue::Blank => Ok("NULL".to_string()),
        }
    }

    fn gen_column(&mut self, table: Option<&str>, column: &str) -> String {
        match table {
            Some(table) => {
                self.record_table(table);
                if let Some(context) = self.context {
                    let sql_table = context.get_sql_table_name(table);
                    let sql_col = context.get_sql_column_name(table, column);
                    if let (Some(sql_table), Some(sql_col)) = (sql_table, sql_col) {
                        return format!("{}.{}", sql_table, sql_col);
                    }
                }
                format!("{}.{}", to_snake_case(table), to_snake_case(column))
            }
            None => to_snake_case(column),
        }
    }

    fn gen_table(&mut self, name: &str) -> String {
        self.record_table(name);
        if let Some(sql_name) = self.context.and_then(|c| c.get_sql_table_name(name)) {
            return sql_name;
        }
        to_snake_case(name)
    }

    fn record_table(&mut self, name: &str) {
        if !self.tables_used.iter().any(|t| t == name) {
            self.tables_used.push(name.to_string());
        }
    }

    fn gen_binary_op(
        &mut self,
        op: BinaryOperator,
        left: &DaxExpression,
        right: &DaxExpression,
    ) -> Result<String, SqlGeneratorError> {
        let left = self.generate(left)?;
        let right = self.generate(right)?;

        // Snowflake has no infix exponentiation worth relying on.
        if op == BinaryOperator::Power {
            return Ok(format!("POWER({}, {})", left, right));
        }

        let op = match op {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Ampersand => "||",
            BinaryOperator::Power => unreachable!("handled above"),
        };

        // Parentheses are mandatory: they preserve the source precedence
        // without re-analysis on the SQL side.
        Ok(format!("({} {} {})", left, op, right))
    }

    fn gen_unary_op(
        &mut self,
        op: UnaryOperator,
        operand: &DaxExpression,
    ) -> Result<String, SqlGeneratorError> {
        let operand = self.generate(operand)?;
        Ok(match op {
            UnaryOperator::Negate => format!("-{}", operand),
            UnaryOperator::Not => format!("NOT {}", operand),
        })
    }

    fn gen_args(&mut self, args: &[DaxExpression]) -> Result<Vec<String>, SqlGeneratorError> {
        args.iter().map(|arg| self.generate(arg)).collect()
    }

    fn gen_function(
        &mut self,
        name: &str,
        args: &[DaxExpression],
    ) -> Result<String, SqlGeneratorError> {
        let func = name.to_uppercase();

        if self.patterns.has_pattern(&func) {
            self.patterns_applied.push(func.clone());
        }

        let sql = match func.as_str() {
            "SUM" | "COUNT" | "MIN" | "MAX" => match args.first() {
                Some(arg) => {
                    let inner = self.generate(arg)?;
                    format!("{}({})", func, inner)
                }
                None => format!("{}(*)", func),
            },

            "AVERAGE" => match args.first() {
                Some(arg) => {
                    let inner = self.generate(arg)?;
                    format!("AVG({})", inner)
                }
                None => "AVG(*)".to_string(),
            },

            "SUMX" => {
                if args.len() >= 2 {
                    // The table argument is walked for table tracking, then
                    // dropped: plain SQL aggregates over the FROM context.
                    let _table = self.generate(&args[0])?;
                    let expr = self.generate(&args[1])?;
                    self.warnings
                        .push("SUMX table argument discarded - aggregating the expression directly".to_string());
                    format!("SUM({})", expr)
                } else {
                    "SUM(/* SUMX expression */)".to_string()
                }
            }

            "AVERAGEX" => {
                if args.len() >= 2 {
                    let expr = self.generate(&args[1])?;
                    format!("AVG({})", expr)
                } else {
                    "AVG(/* AVERAGEX expression */)".to_string()
                }
            }

            "COUNTROWS" => "COUNT(*)".to_string(),

            "DISTINCTCOUNT" => match args.first() {
                Some(arg) => {
                    let inner = self.generate(arg)?;
                    format!("COUNT(DISTINCT {})", inner)
                }
                None => "COUNT(DISTINCT *)".to_string(),
            },

            "IF" => {
                if args.len() >= 2 {
                    let condition = self.generate(&args[0])?;
                    let true_val = self.generate(&args[1])?;
                    let false_val = match args.get(2) {
                        Some(arg) => self.generate(arg)?,
                        None => "NULL".to_string(),
                    };
                    format!(
                        "CASE WHEN {} THEN {} ELSE {} END",
                        condition, true_val, false_val
                    )
                } else {
                    "/* IF expression */".to_string()
                }
            }

            "SWITCH" => {
                if args.len() >= 3 {
                    let expr = self.generate(&args[0])?;
                    let mut cases = Vec::new();
                    let mut i = 1;
                    while i + 1 < args.len() {
                        let value = self.generate(&args[i])?;
                        let result = self.generate(&args[i + 1])?;
                        cases.push(format!("WHEN {} THEN {}", value, result));
                        i += 2;
                    }
                    // A trailing unpaired argument is the default branch.
                    if (args.len() - 1) % 2 == 1 {
                        if let Some(default_arg) = args.last() {
                            let default = self.generate(default_arg)?;
                            cases.push(format!("ELSE {}", default));
                        }
                    }
                    format!("CASE {} {} END", expr, cases.join(" "))
                } else {
                    "/* SWITCH expression */".to_string()
                }
            }

            "DIVIDE" => {
                if args.len() >= 2 {
                    let numerator = self.generate(&args[0])?;
                    let denominator = self.generate(&args[1])?;
                    let alternate = match args.get(2) {
                        Some(arg) => self.generate(arg)?,
                        None => "NULL".to_string(),
                    };
                    format!(
                        "CASE WHEN {} = 0 THEN {} ELSE {} / {} END",
                        denominator, alternate, numerator, denominator
                    )
                } else {
                    "/* DIVIDE expression */".to_string()
                }
            }

            "ISBLANK" => match args.first() {
                Some(arg) => {
                    let inner = self.generate(arg)?;
                    format!("{} IS NULL", inner)
                }
                None => "/* ISBLANK */".to_string(),
            },

            "COALESCE" => {
                let inners = self.gen_args(args)?;
                format!("COALESCE({})", inners.join(", "))
            }

            "CONCATENATE" => {
                if args.len() >= 2 {
                    let parts = self.gen_args(args)?;
                    format!("CONCAT({})", parts.join(", "))
                } else {
                    "/* CONCATENATE */".to_string()
                }
            }

            "LEFT" | "RIGHT" => {
                if args.len() >= 2 {
                    let text = self.generate(&args[0])?;
                    let n = self.generate(&args[1])?;
                    format!("{}({}, {})", func, text, n)
                } else {
                    format!("/* {} */", func)
                }
            }

            "MID" => {
                if args.len() >= 3 {
                    let text = self.generate(&args[0])?;
                    let start = self.generate(&args[1])?;
                    let length = self.generate(&args[2])?;
                    format!("SUBSTR({}, {}, {})", text, start, length)
                } else {
                    "/* MID */".to_string()
                }
            }

            "LEN" => match args.first() {
                Some(arg) => {
                    let text = self.generate(arg)?;
                    format!("LENGTH({})", text)
                }
                None => "/* LEN */".to_string(),
            },

            "UPPER" | "LOWER" | "TRIM" => match args.first() {
                Some(arg) => {
                    let text = self.generate(arg)?;
                    format!("{}({})", func, text)
                }
                None => format!("/* {} */", func),
            },

            "ABS" | "ROUND" | "SQRT" | "POWER" => {
                let inners = self.gen_args(args)?;
                format!("{}({})", func, inners.join(", "))
            }

            "INT" => match args.first() {
                Some(arg) => {
                    let value = self.generate(arg)?;
                    format!("FLOOR({})", value)
                }
                None => "/* INT */".to_string(),
            },

            "MOD" => {
                if args.len() >= 2 {
                    let numerator = self.generate(&args[0])?;
                    let divisor = self.generate(&args[1])?;
                    format!("MOD({}, {})", numerator, divisor)
                } else {
                    "/* MOD */".to_string()
                }
            }

            "CALCULATE" => {
                if let Some((measure, filters)) = args.split_first() {
                    let measure = self.generate(measure)?;
                    let filters = self.gen_args(filters)?;
                    self.warnings.push(
                        "CALCULATE filter context approximated as a comment - semantics not preserved"
                            .to_string(),
                    );
                    if filters.is_empty() {
                        measure
                    } else {
                        format!("{} /* WHERE {} */", measure, filters.join(" AND "))
                    }
                } else {
                    "/* CALCULATE */".to_string()
                }
            }

            "FILTER" => {
                if args.len() >= 2 {
                    let table = self.generate(&args[0])?;
                    let condition = self.generate(&args[1])?;
                    self.warnings.push(
                        "FILTER translated as a placeholder comment - row context not preserved"
                            .to_string(),
                    );
                    format!("/* FILTER({}, {}) */", table, condition)
                } else {
                    "/* FILTER */".to_string()
                }
            }

            "ALL" => match args.first() {
                Some(arg) => {
                    let target = self.generate(arg)?;
                    self.warnings
                        .push("ALL translated as a comment - filter removal not applied".to_string());
                    format!("/* ALL({}) - removes filters */", target)
                }
                None => "/* ALL */".to_string(),
            },

            "VALUES" => match args.first() {
                Some(arg) => {
                    let column = self.generate(arg)?;
                    format!("DISTINCT {}", column)
                }
                None => "/* VALUES */".to_string(),
            },

            "SAMEPERIODLASTYEAR" => match args.first() {
                Some(arg) => {
                    let date_col = self.generate(arg)?;
                    format!("DATEADD(year, -1, {})", date_col)
                }
                None => "/* SAMEPERIODLASTYEAR */".to_string(),
            },

            "DATEADD" => {
                // DAX: DATEADD(dates, number, interval)
                // Snowflake: DATEADD(interval, number, date)
                if args.len() >= 3 {
                    let date_col = self.generate(&args[0])?;
                    let number = self.generate(&args[1])?;
                    let interval = match &args[2] {
                        DaxExpression::Table { name } => name.to_lowercase(),
                        _ => "day".to_string(),
                    };
                    format!("DATEADD({}, {}, {})", interval, number, date_col)
                } else {
                    "/* DATEADD */".to_string()
                }
            }

            "TOTALYTD" => match args.first() {
                Some(arg) => {
                    let measure = self.generate(arg)?;
                    self.warnings
                        .push("TOTALYTD year-to-date filter emitted as a comment".to_string());
                    format!("{} /* YTD filter applied */", measure)
                }
                None => "/* TOTALYTD */".to_string(),
            },

            "RELATED" => match args.first() {
                Some(arg) => {
                    let column = self.generate(arg)?;
                    self.warnings.push(
                        "RELATED resolved as a direct column reference - relationship traversal not applied"
                            .to_string(),
                    );
                    format!("{} /* via relationship */", column)
                }
                None => "/* RELATED */".to_string(),
            },

            _ => {
                self.warnings
                    .push(format!("Pattern '{}' not fully implemented", func));
                let inners = self.gen_args(args)?;
                format!("{}({})", func, inners.join(", "))
            }
        };

        Ok(sql)
    }
}
