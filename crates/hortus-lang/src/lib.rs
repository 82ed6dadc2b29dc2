//! Hortus search language
//!
//! This crate tokenizes and parses the search strings typed into a botanical
//! collection browser, types their literals, and works out which relations a
//! filter has to join.
//!
//! # Syntax
//!
//! ```text
//! Ixora                                     value search over every entity
//! "Ixora coccinea", 2001.0042               several values
//! fam=Orchid                                partial match through a shortcut
//! genus==Ixora                              exact match
//! gen=*                                     every record of a domain
//! genus where family.family like 'Orch%'    full query
//! genus where id in 1,2,4 and id<3
//! plant where accession.species.id=113
//! genus where count(species.id) > 3
//! species where author is not None
//! ```
//!
//! # Usage
//!
//! ```rust
//! use hortus_lang::{needs_join, parse_string, Statement};
//!
//! let stmt = parse_string("plant where accession.species.id=113").unwrap();
//! if let Statement::Query(query) = &stmt {
//!     assert_eq!(needs_join(&query.filter)[0].hops, ["accession", "species"]);
//! }
//! assert_eq!(
//!     stmt.to_string(),
//!     "SELECT * FROM plant WHERE (accession.species.id = 113.0)"
//! );
//! ```

pub mod ast;
pub mod error;
pub mod join;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod span;
pub mod value;

pub use ast::{
    ComparisonOp, DomainExpression, DomainOp, DomainValues, Filter, Path, Query, Statement,
    ValueList,
};
pub use error::ParseError;
pub use join::{needs_join, JoinPath};
pub use lexer::tokenize;
pub use parser::{parse_spanned_values, parse_string, parse_value, parse_value_list};
pub use span::{Span, Spanned};
pub use value::{parse_typed_value, Datum, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(source: &str) -> String {
        parse_string(source).unwrap().to_string()
    }

    #[test]
    fn test_render_queries() {
        assert_eq!(
            render("species where species.genus=genus1"),
            "SELECT * FROM species WHERE (species.genus = 'genus1')"
        );
        assert_eq!(
            render("species where not species.genus.family.family=name"),
            "SELECT * FROM species WHERE NOT (species.genus.family.family = 'name')"
        );
        assert_eq!(
            render("species where species.genus=genus1 or species.sp=name and species.genus.family.family=name"),
            "SELECT * FROM species WHERE ((species.genus = 'genus1') OR ((species.sp = 'name') AND (species.genus.family.family = 'name')))"
        );
        assert_eq!(
            render("plant where accession.species.id=113"),
            "SELECT * FROM plant WHERE (accession.species.id = 113.0)"
        );
        assert_eq!(
            render("species where family=1 or family=2 and not genus.id=3"),
            "SELECT * FROM species WHERE ((family = 1.0) OR ((family = 2.0) AND NOT (genus.id = 3.0)))"
        );
    }

    #[test]
    fn test_render_is_stable() {
        let stmt = parse_string("genus where id between 1 and 3 and family.family contains orch").unwrap();
        let first = stmt.to_string();
        assert_eq!(first, stmt.to_string());
        assert_eq!(
            first,
            "SELECT * FROM genus WHERE ((id BETWEEN 1.0 AND 3.0) AND (family.family CONTAINS 'orch'))"
        );
    }

    #[test]
    fn test_error_with_source_context() {
        let source = "genus where family.family = 'Orch";
        let err = parse_string(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1:29"));
        assert!(formatted.contains("unterminated"));
    }

    #[test]
    fn test_tokenize_roundtrip_count() {
        let tokens = tokenize("genus where id in (1, 2)").unwrap();
        assert_eq!(tokens.len(), 9);
    }
}
