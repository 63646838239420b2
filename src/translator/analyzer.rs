use crate::dax_parser::ast::DaxExpression;

/// Time-intelligence functions that shift the date context.
const TIME_INTEL_FUNCTIONS: &[&str] = &[
    "SAMEPERIODLASTYEAR",
    "DATEADD",
    "DATESYTD",
    "PREVIOUSYEAR",
    "TOTALYTD",
    "PARALLELPERIOD",
    "PREVIOUSMONTH",
    "DATESBETWEEN",
];

/// Functions that modify the evaluation's filter context.
const FILTER_MOD_FUNCTIONS: &[&str] =
    &["CALCULATE", "CALCULATETABLE", "ALL", "ALLEXCEPT", "FILTER"];

/// Depth-first AST inspection feeding confidence assessment and JOIN
/// planning. Does not mutate the tree.
#[derive(Debug, Default)]
pub struct AstAnalyzer {
    /// Uppercased function names in encounter order, duplicates retained.
    pub functions: Vec<String>,
    /// `(table, column)` pairs in encounter order.
    pub columns: Vec<(Option<String>, String)>,
    /// Referenced table names, deduplicated, first-encounter order.
    pub tables: Vec<String>,
    pub has_time_intel: bool,
    pub has_filter_mod: bool,
    /// Visited node count.
    pub complexity: usize,
}

impl AstAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(&mut self, node: &DaxExpression) {
        self.complexity += 1;

        match node {
            DaxExpression::FunctionCall { name, args } => {
                let func = name.to_uppercase();
                if TIME_INTEL_FUNCTIONS.contains(&func.as_str()) {
                    self.has_time_intel = true;
                }
                if FILTER_MOD_FUNCTIONS.contains(&func.as_str()) {
                    self.has_filter_mod = true;
                }
                self.functions.push(func);
                for arg in args {
                    self.analyze(arg);
                }
            }
            DaxExpression::Column { table, column } => {
                self.columns.push((table.clone(), column.clone()));
                if let Some(table) = table {
                    self.record_table(table);
                }
            }
            DaxExpression::Table { name } => {
                self.record_table(name);
            }
            DaxExpression::BinaryOp { left, right, .. } => {
                self.analyze(left);
                self.analyze(right);
            }
            DaxExpression::UnaryOp { operand, .. } => {
                self.analyze(operand);
            }
            DaxExpression::Measure { expression, .. } => {
                self.analyze(expression);
            }
            DaxExpression::Literal(_) | DaxExpression::MeasureRef { .. } => {}
        }
    }

    fn record_table(&mut self, name: &str) {
        if !self.tables.iter().any(|t| t == name) {
            self.tables.push(name.to_string());
        }
    }
}
