//! Builtin formula catalog.
//!
//! Two tiers of entries:
//! - Executable formulas, backed by a [`Transform`](super::Transform) in
//!   the executor's transform registry.
//! - Catalog-only formulas (TEXT_JOIN, SUMIFS, PIVOT, VLOOKUP): listed,
//!   searchable and validatable, but executing them degrades to the
//!   unknown-function sentinel until a transform is registered for them.

use crate::formula::definition::{FormulaDefinition, FormulaParameter, ParameterKind};
use crate::formula::registry::FormulaRegistry;

const TEXT: &str = "Text";
const MATH: &str = "Math";
const AGGREGATION: &str = "Aggregation";
const LOOKUP: &str = "Lookup";

impl FormulaRegistry {
    /// The builtin catalog, constructed once at startup.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in builtin_definitions() {
            registry.register(definition);
        }
        registry
    }
}

fn column(name: &str, description: &str) -> FormulaParameter {
    FormulaParameter::required(name, ParameterKind::Column, description)
}

fn builtin_definitions() -> Vec<FormulaDefinition> {
    vec![
        // ---- Text ------------------------------------------------------
        FormulaDefinition::new("UPPER", TEXT, "Converts text to uppercase")
            .with_syntax("UPPER [column]")
            .with_parameter(column("column", "Text column to convert"))
            .with_example("UPPER [First Name]"),
        FormulaDefinition::new("LOWER", TEXT, "Converts text to lowercase")
            .with_syntax("LOWER [column]")
            .with_parameter(column("column", "Text column to convert"))
            .with_example("LOWER [Email]"),
        FormulaDefinition::new("TRIM", TEXT, "Removes leading and trailing whitespace")
            .with_syntax("TRIM [column]")
            .with_parameter(column("column", "Text column to clean"))
            .with_example("TRIM [Address]"),
        FormulaDefinition::new("TEXT_LENGTH", TEXT, "Counts the characters in a text value")
            .with_alias("LEN")
            .with_syntax("TEXT_LENGTH [column]")
            .with_parameter(column("column", "Text column to measure"))
            .with_example("TEXT_LENGTH [Description]")
            .with_example("LEN [Product Code]"),
        FormulaDefinition::new("PROPER_CASE", TEXT, "Capitalizes every word")
            .with_alias("TITLE_CASE")
            .with_syntax("PROPER_CASE [column]")
            .with_parameter(column("column", "Text column to convert"))
            .with_example("PROPER_CASE [Full Name]"),
        FormulaDefinition::new("REVERSE", TEXT, "Reverses the character sequence")
            .with_syntax("REVERSE [column]")
            .with_parameter(column("column", "Text column to reverse"))
            .with_example("REVERSE [Code]"),
        FormulaDefinition::new("CAPITALIZE", TEXT, "Uppercases the first character only")
            .with_syntax("CAPITALIZE [column]")
            .with_parameter(column("column", "Text column to convert"))
            .with_example("CAPITALIZE [City]"),
        FormulaDefinition::new(
            "TEXT_JOIN",
            TEXT,
            "Combines multiple text columns with custom separators",
        )
        .with_syntax("TEXT_JOIN [separator -> ignore_empty -> column1 -> column2 -> column3]")
        .with_parameter(FormulaParameter::required(
            "separator",
            ParameterKind::String,
            "Separator placed between values",
        ))
        .with_parameter(
            FormulaParameter::optional(
                "ignore_empty",
                ParameterKind::Boolean,
                "Skip empty values",
            )
            .with_default("TRUE"),
        )
        .with_parameter(column("column1", "First text column"))
        .with_parameter(FormulaParameter::optional(
            "column2",
            ParameterKind::Column,
            "Second text column",
        ))
        .with_parameter(FormulaParameter::optional(
            "column3",
            ParameterKind::Column,
            "Third text column",
        ))
        .with_example("Join First Name + Last Name with space separator")
        .with_example("Join Address components with comma separator"),
        // ---- Math ------------------------------------------------------
        FormulaDefinition::new("ADD", MATH, "Adds the numeric values of two columns")
            .with_syntax("ADD [column1 -> column2]")
            .with_parameter(column("column1", "Left operand column"))
            .with_parameter(column("column2", "Right operand column"))
            .with_example("ADD [Price -> Tax]"),
        FormulaDefinition::new("SUBTRACT", MATH, "Subtracts the second column from the first")
            .with_syntax("SUBTRACT [column1 -> column2]")
            .with_parameter(column("column1", "Left operand column"))
            .with_parameter(column("column2", "Right operand column"))
            .with_example("SUBTRACT [Revenue -> Cost]"),
        FormulaDefinition::new("MULTIPLY", MATH, "Multiplies the numeric values of two columns")
            .with_syntax("MULTIPLY [column1 -> column2]")
            .with_parameter(column("column1", "Left operand column"))
            .with_parameter(column("column2", "Right operand column"))
            .with_example("MULTIPLY [Quantity -> Unit Price]"),
        // ---- Aggregation ----------------------------------------------
        FormulaDefinition::new(
            "SUMIFS",
            AGGREGATION,
            "Sums values based on multiple criteria conditions",
        )
        .with_syntax("SUMIFS [sum_range -> criteria_column -> criteria_value -> group_by]")
        .with_parameter(column("sum_range", "Column whose values are summed"))
        .with_parameter(column("criteria_column", "Column the criteria applies to"))
        .with_parameter(FormulaParameter::required(
            "criteria_value",
            ParameterKind::Value,
            "Value a row must match",
        ))
        .with_parameter(FormulaParameter::optional(
            "group_by",
            ParameterKind::Column,
            "Optional grouping column",
        ))
        .with_example("Sum sales where Region = 'North' AND Product = 'Electronics'")
        .with_example("Sum revenue where Status = 'Completed'"),
        FormulaDefinition::new("PIVOT", AGGREGATION, "Creates summary tables with aggregations")
            .with_syntax("PIVOT [index_columns -> value_columns -> aggregation_type]")
            .with_parameter(column("index_columns", "Columns forming the pivot index"))
            .with_parameter(column("value_columns", "Columns whose values are aggregated"))
            .with_parameter(
                FormulaParameter::optional(
                    "aggregation_type",
                    ParameterKind::String,
                    "sum, mean, count, min or max",
                )
                .with_default("sum"),
            )
            .with_example("Pivot sales by Region and Product with SUM aggregation")
            .with_example("Pivot counts by Status and Category"),
        // ---- Lookup ----------------------------------------------------
        FormulaDefinition::new(
            "VLOOKUP",
            LOOKUP,
            "Finds values in reference tables based on lookup keys",
        )
        .with_syntax("VLOOKUP [lookup_value -> lookup_key -> return_column -> default_value]")
        .with_parameter(column("lookup_value", "Column holding the key to look up"))
        .with_parameter(column("lookup_key", "Key column of the reference table"))
        .with_parameter(column("return_column", "Column returned on a match"))
        .with_parameter(
            FormulaParameter::optional(
                "default_value",
                ParameterKind::Value,
                "Fallback when no match is found",
            )
            .with_default("Not Found"),
        )
        .with_example("Find product name using product ID")
        .with_example("Find customer region using customer ID"),
    ]
}
