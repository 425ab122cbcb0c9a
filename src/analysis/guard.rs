//! Column checks run before any rule.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AnalysisError;

static DF_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"df\[\s*['"]([^'"\]]+)['"]\s*\]"#).expect("valid column reference regex")
});

/// Reject code mentioning any of `forbidden`, naming the real `columns` in the error.
pub fn check_forbidden(code: &str, forbidden: &[String], columns: &[String]) -> Result<(), AnalysisError> {
    match forbidden.iter().find(|f| !f.is_empty() && code.contains(f.as_str())) {
        Some(column) => {
            tracing::warn!(column = %column, "code references a forbidden calculated column");
            Err(AnalysisError::ForbiddenColumn {
                column: column.clone(),
                allowed: columns.to_vec(),
            })
        }
        None => Ok(()),
    }
}

/// `df['x']` references whose column is not in `columns`. Each one is logged; none is fatal.
pub fn unknown_references(code: &str, columns: &[String]) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    for caps in DF_COLUMN.captures_iter(code) {
        let name = &caps[1];
        if !columns.iter().any(|c| c == name) && !unknown.iter().any(|u| u == name) {
            tracing::warn!(column = name, available = ?columns, "code references unknown column");
            unknown.push(name.to_string());
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols() -> Vec<String> {
        vec!["SALES".to_string(), "PROFIT".to_string()]
    }

    #[test]
    fn forbidden_token_anywhere_is_rejected() {
        let forbidden = vec!["DISCOUNT_AMOUNT".to_string(), "PROFIT_MARGIN".to_string()];
        let err = check_forbidden("df['PROFIT_MARGIN'] = df['PROFIT'] / df['SALES']", &forbidden, &cols())
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ForbiddenColumn {
                column: "PROFIT_MARGIN".to_string(),
                allowed: cols(),
            }
        );
        assert!(check_forbidden("df['PROFIT'].sum()", &forbidden, &cols()).is_ok());
    }

    #[test]
    fn unknown_references_are_reported_once() {
        let unknown = unknown_references("df['SALES'] + df['Qty'] + df[\"Qty\"]", &cols());
        assert_eq!(unknown, vec!["Qty"]);
    }
}
