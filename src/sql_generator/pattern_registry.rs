//! DAX to Snowflake SQL pattern registry
//!
//! Process-wide, read-mostly registry of translation patterns. Consumers
//! obtain the shared instance through [`pattern_library`]; it is seeded once
//! on first access. Lookup is case-insensitive via uppercased keys.

use serde::Serialize;
use std::collections::HashMap;

/// How involved the SQL translation of a pattern is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternComplexity {
    Simple,
    Medium,
    Complex,
}

/// A worked example attached to a pattern.
#[derive(Debug, Clone, Serialize)]
pub struct PatternExample {
    pub dax: &'static str,
    pub sql: &'static str,
}

/// One DAX function to SQL construct mapping.
///
/// `sql_template` is documentation for humans and LLM prompts; the executable
/// rule lives in the generator.
#[derive(Debug, Clone, Serialize)]
pub struct DaxPattern {
    pub dax_function: &'static str,
    pub sql_template: &'static str,
    pub description: &'static str,
    pub complexity: PatternComplexity,
    pub examples: &'static [PatternExample],
}

/// Registry of DAX translation patterns keyed by uppercased function name.
#[derive(Debug)]
pub struct PatternLibrary {
    patterns: HashMap<&'static str, DaxPattern>,
}

impl PatternLibrary {
    pub fn has_pattern(&self, name: &str) -> bool {
        self.patterns.contains_key(name.to_uppercase().as_str())
    }

    pub fn get_pattern(&self, name: &str) -> Option<&DaxPattern> {
        self.patterns.get(name.to_uppercase().as_str())
    }

    /// All patterns, sorted by function name for deterministic output.
    pub fn list_patterns(&self) -> Vec<&DaxPattern> {
        let mut patterns: Vec<&DaxPattern> = self.patterns.values().collect();
        patterns.sort_by_key(|p| p.dax_function);
        patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Render the registry as a reference card for LLM prompts.
    pub fn to_prompt_context(&self) -> String {
        let mut lines = vec!["DAX to Snowflake SQL pattern reference:".to_string()];
        for pattern in self.list_patterns() {
            lines.push(format!(
                "- {}: {} ({})",
                pattern.dax_function, pattern.sql_template, pattern.description
            ));
            if let Some(example) = pattern.examples.first() {
                lines.push(format!("    e.g. {}  =>  {}", example.dax, example.sql));
            }
        }
        lines.join("\n")
    }

    fn insert(&mut self, pattern: DaxPattern) {
        self.patterns.insert(pattern.dax_function, pattern);
    }

    fn seeded() -> Self {
        use PatternComplexity::{Complex, Medium, Simple};

        let mut lib = PatternLibrary {
            patterns: HashMap::new(),
        };

        // ===== AGGREGATIONS =====

        lib.insert(DaxPattern {
            dax_function: "SUM",
            sql_template: "SUM(column)",
            description: "Column sum",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "SUM(Sales[Amount])",
                sql: "SUM(sales.amount)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "AVERAGE",
            sql_template: "AVG(column)",
            description: "Column average; AVERAGE renames to AVG",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "AVERAGE(Sales[Amount])",
                sql: "AVG(sales.amount)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "COUNT",
            sql_template: "COUNT(column)",
            description: "Non-null count",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "COUNT(Sales[OrderId])",
                sql: "COUNT(sales.order_id)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "MIN",
            sql_template: "MIN(column)",
            description: "Column minimum",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "MIN(Sales[Amount])",
                sql: "MIN(sales.amount)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "MAX",
            sql_template: "MAX(column)",
            description: "Column maximum",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "MAX(Sales[Amount])",
                sql: "MAX(sales.amount)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "SUMX",
            sql_template: "SUM(expression)",
            description: "Row-wise sum; the table argument is discarded",
            complexity: Medium,
            examples: &[PatternExample {
                dax: "SUMX(Sales, Sales[Price] * Sales[Qty])",
                sql: "SUM((sales.price * sales.qty))",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "AVERAGEX",
            sql_template: "AVG(expression)",
            description: "Row-wise average over an expression",
            complexity: Medium,
            examples: &[PatternExample {
                dax: "AVERAGEX(Sales, Sales[Price] * Sales[Qty])",
                sql: "AVG((sales.price * sales.qty))",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "COUNTROWS",
            sql_template: "COUNT(*)",
            description: "Row count of a table",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "COUNTROWS(Sales)",
                sql: "COUNT(*)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "DISTINCTCOUNT",
            sql_template: "COUNT(DISTINCT column)",
            description: "Distinct value count",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "DISTINCTCOUNT(Sales[CustomerKey])",
                sql: "COUNT(DISTINCT sales.customer_key)",
            }],
        });

        // ===== CONDITIONALS =====

        lib.insert(DaxPattern {
            dax_function: "IF",
            sql_template: "CASE WHEN condition THEN a ELSE b END",
            description: "Two-way conditional; missing else-branch yields NULL",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "IF(Sales[Amount] > 100, \"big\", \"small\")",
                sql: "CASE WHEN (sales.amount > 100) THEN 'big' ELSE 'small' END",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "SWITCH",
            sql_template: "CASE expr WHEN v1 THEN r1 ... ELSE default END",
            description: "Multi-way value dispatch",
            complexity: Medium,
            examples: &[PatternExample {
                dax: "SWITCH(Product[Tier], 1, \"gold\", 2, \"silver\", \"bronze\")",
                sql: "CASE product.tier WHEN 1 THEN 'gold' WHEN 2 THEN 'silver' ELSE 'bronze' END",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "DIVIDE",
            sql_template: "CASE WHEN d = 0 THEN alt ELSE n / d END",
            description: "Division with divide-by-zero guard",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "DIVIDE(Sales[Revenue], Sales[Cost], 0)",
                sql: "CASE WHEN sales.cost = 0 THEN 0 ELSE sales.revenue / sales.cost END",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "ISBLANK",
            sql_template: "expression IS NULL",
            description: "Blank test maps to NULL test",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "ISBLANK(Customer[Email])",
                sql: "customer.email IS NULL",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "COALESCE",
            sql_template: "COALESCE(a, b, ...)",
            description: "First non-null argument",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "COALESCE(Sales[Discount], 0)",
                sql: "COALESCE(sales.discount, 0)",
            }],
        });

        // ===== TEXT =====

        lib.insert(DaxPattern {
            dax_function: "CONCATENATE",
            sql_template: "CONCAT(a, b, ...)",
            description: "String concatenation",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "CONCATENATE(Customer[First], Customer[Last])",
                sql: "CONCAT(customer.first, customer.last)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "LEFT",
            sql_template: "LEFT(text, n)",
            description: "Leading substring",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "LEFT(Product[Code], 3)",
                sql: "LEFT(product.code, 3)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "RIGHT",
            sql_template: "RIGHT(text, n)",
            description: "Trailing substring",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "RIGHT(Product[Code], 2)",
                sql: "RIGHT(product.code, 2)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "MID",
            sql_template: "SUBSTR(text, start, length)",
            description: "Substring by position",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "MID(Product[Code], 2, 3)",
                sql: "SUBSTR(product.code, 2, 3)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "LEN",
            sql_template: "LENGTH(text)",
            description: "String length",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "LEN(Customer[Name])",
                sql: "LENGTH(customer.name)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "UPPER",
            sql_template: "UPPER(text)",
            description: "Uppercase",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "UPPER(Customer[Name])",
                sql: "UPPER(customer.name)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "LOWER",
            sql_template: "LOWER(text)",
            description: "Lowercase",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "LOWER(Customer[Email])",
                sql: "LOWER(customer.email)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "TRIM",
            sql_template: "TRIM(text)",
            description: "Strip surrounding whitespace",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "TRIM(Customer[Name])",
                sql: "TRIM(customer.name)",
            }],
        });

        // ===== MATH =====

        lib.insert(DaxPattern {
            dax_function: "ABS",
            sql_template: "ABS(x)",
            description: "Absolute value",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "ABS(Sales[Delta])",
                sql: "ABS(sales.delta)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "ROUND",
            sql_template: "ROUND(x, digits)",
            description: "Rounding",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "ROUND(Sales[Amount], 2)",
                sql: "ROUND(sales.amount, 2)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "SQRT",
            sql_template: "SQRT(x)",
            description: "Square root",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "SQRT(Sales[Variance])",
                sql: "SQRT(sales.variance)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "POWER",
            sql_template: "POWER(base, exponent)",
            description: "Exponentiation",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "POWER(Sales[Growth], 2)",
                sql: "POWER(sales.growth, 2)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "INT",
            sql_template: "FLOOR(x)",
            description: "Integer truncation maps to FLOOR",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "INT(Sales[Amount])",
                sql: "FLOOR(sales.amount)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "MOD",
            sql_template: "MOD(n, d)",
            description: "Modulo",
            complexity: Simple,
            examples: &[PatternExample {
                dax: "MOD(Sales[Qty], 10)",
                sql: "MOD(sales.qty, 10)",
            }],
        });

        // ===== FILTER CONTEXT =====
        // Approximations only: the SQL carries the intent as a comment and the
        // translator downgrades confidence.

        lib.insert(DaxPattern {
            dax_function: "CALCULATE",
            sql_template: "measure /* WHERE filters */",
            description: "Filter-context modification approximated as a comment",
            complexity: Complex,
            examples: &[PatternExample {
                dax: "CALCULATE(SUM(Sales[Amount]), Sales[Region] = \"US\")",
                sql: "SUM(sales.amount) /* WHERE (sales.region = 'US') */",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "FILTER",
            sql_template: "/* FILTER(table, condition) */",
            description: "Row-context iteration; placeholder comment only",
            complexity: Complex,
            examples: &[PatternExample {
                dax: "FILTER(Sales, Sales[Amount] > 0)",
                sql: "/* FILTER(sales, (sales.amount > 0)) */",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "ALL",
            sql_template: "/* ALL(target) - removes filters */",
            description: "Filter removal; comment only",
            complexity: Complex,
            examples: &[PatternExample {
                dax: "ALL(Sales)",
                sql: "/* ALL(sales) - removes filters */",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "VALUES",
            sql_template: "DISTINCT column",
            description: "Distinct values of a column",
            complexity: Medium,
            examples: &[PatternExample {
                dax: "VALUES(Product[Category])",
                sql: "DISTINCT product.category",
            }],
        });

        // ===== TIME INTELLIGENCE =====

        lib.insert(DaxPattern {
            dax_function: "SAMEPERIODLASTYEAR",
            sql_template: "DATEADD(year, -1, date_column)",
            description: "Shift the date context back one year",
            complexity: Medium,
            examples: &[PatternExample {
                dax: "SAMEPERIODLASTYEAR('Date'[Date])",
                sql: "DATEADD(year, -1, date.date)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "DATEADD",
            sql_template: "DATEADD(interval, n, date_column)",
            description: "Date shift; DAX argument order is reversed for Snowflake",
            complexity: Medium,
            examples: &[PatternExample {
                dax: "DATEADD('Date'[Date], -1, MONTH)",
                sql: "DATEADD(month, -1, date.date)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "TOTALYTD",
            sql_template: "measure /* YTD filter applied */",
            description: "Year-to-date accumulation; comment only",
            complexity: Complex,
            examples: &[PatternExample {
                dax: "TOTALYTD(SUM(Sales[Amount]), 'Date'[Date])",
                sql: "SUM(sales.amount) /* YTD filter applied */",
            }],
        });

        // ===== RELATIONSHIPS =====

        lib.insert(DaxPattern {
            dax_function: "RELATED",
            sql_template: "column /* via relationship */",
            description: "Cross-table lookup; requires a JOIN from the schema context",
            complexity: Medium,
            examples: &[PatternExample {
                dax: "RELATED(Product[Category])",
                sql: "product.category /* via relationship */",
            }],
        });

        // ===== DOCUMENTED, NOT YET IMPLEMENTED =====
        // Present so prompts and the patterns API can describe them; the
        // generator emits them verbatim with a warning.

        lib.insert(DaxPattern {
            dax_function: "RANKX",
            sql_template: "RANK() OVER (ORDER BY expression)",
            description: "Ranking over a table expression",
            complexity: Complex,
            examples: &[PatternExample {
                dax: "RANKX(ALL(Product), [Total Sales])",
                sql: "RANK() OVER (ORDER BY total_sales DESC)",
            }],
        });
        lib.insert(DaxPattern {
            dax_function: "EARLIER",
            sql_template: "correlated subquery",
            description: "Outer row-context reference",
            complexity: Complex,
            examples: &[],
        });
        lib.insert(DaxPattern {
            dax_function: "LOOKUPVALUE",
            sql_template: "scalar subquery with equality predicates",
            description: "Single-value lookup by key",
            complexity: Complex,
            examples: &[],
        });
        lib.insert(DaxPattern {
            dax_function: "HASONEVALUE",
            sql_template: "COUNT(DISTINCT column) = 1",
            description: "Single-selection test",
            complexity: Complex,
            examples: &[],
        });
        lib.insert(DaxPattern {
            dax_function: "SELECTEDVALUE",
            sql_template: "MAX(column) guarded by COUNT(DISTINCT column) = 1",
            description: "Current single selection or default",
            complexity: Complex,
            examples: &[],
        });

        lib
    }
}

lazy_static::lazy_static! {
    static ref PATTERN_LIBRARY: PatternLibrary = PatternLibrary::seeded();
}

/// Shared process-wide pattern registry, seeded on first access.
pub fn pattern_library() -> &'static PatternLibrary {
    &PATTERN_LIBRARY
}
