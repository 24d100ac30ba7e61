pub mod fixtures;

use xmlquery::{ExpressionProcessor, ExpressionSpec, QueryError, ResultTable, XmlDocument, XmlNode};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Expression with the expression text as display name, under the `test` source.
pub fn expr(expression: &str) -> ExpressionSpec {
    ExpressionSpec::new("test", expression, expression)
}

/// Runs `specs` over a parsed document with a fresh processor.
pub fn process<'a>(
    doc: &'a XmlDocument<'a>,
    specs: &[ExpressionSpec],
) -> Result<ResultTable<XmlNode<'a>>, QueryError> {
    let seed = ResultTable::with_display_names("test", specs);
    ExpressionProcessor::new().process(doc.root_node(), specs, &seed)
}

/// Owned display values, for comparing against literal tables.
pub fn values(table: &ResultTable<XmlNode<'_>>) -> Vec<Vec<String>> {
    table
        .values()
        .into_iter()
        .map(|row| row.into_iter().map(str::to_string).collect())
        .collect()
}

pub fn rows(literal: &[&[&str]]) -> Vec<Vec<String>> {
    literal
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}
