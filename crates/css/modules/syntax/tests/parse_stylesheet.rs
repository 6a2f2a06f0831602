//! Stylesheet parsing: rules, grouping at-rules and error reporting.

use css_syntax::{CssItem, parse_stylesheet};

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Plain style rules keep their prelude and declaration order.
    ///
    /// # Panics
    /// Panics if parsing fails or the rules do not match.
    #[test]
    fn parses_style_rules_in_order() {
        init_logging();
        let sheet = parse_stylesheet(".test2{color:red}.test3{color: blue; display:block !important}")
            .expect("valid css");
        assert_eq!(sheet.items.len(), 2);
        let CssItem::Style(second) = &sheet.items[1] else {
            panic!("expected a style rule");
        };
        assert_eq!(second.prelude, ".test3");
        assert_eq!(second.declarations.len(), 2);
        assert_eq!(second.declarations[0].name, "color");
        assert_eq!(second.declarations[0].value, "blue");
        assert!(!second.declarations[0].important);
        assert_eq!(second.declarations[1].value, "block");
        assert!(second.declarations[1].important);
    }

    /// Media blocks become groups holding their nested rules.
    ///
    /// # Panics
    /// Panics if the media group is not produced.
    #[test]
    fn parses_media_groups() {
        init_logging();
        let sheet = parse_stylesheet(
            ".a{color:red} @media only screen and (max-width: 620px) { .notused { color: red; } }",
        )
        .expect("valid css");
        assert_eq!(sheet.items.len(), 2);
        let CssItem::Group(group) = &sheet.items[1] else {
            panic!("expected a group");
        };
        assert_eq!(group.name, "media");
        assert_eq!(group.prelude, "only screen and (max-width: 620px)");
        assert_eq!(group.rules.len(), 1);
        assert_eq!(group.rules[0].prelude, ".notused");
    }

    /// Each `@font-face` block is kept as its own item.
    ///
    /// # Panics
    /// Panics if the font faces are merged or lost.
    #[test]
    fn keeps_every_font_face() {
        init_logging();
        let css = "@font-face { font-family: 'A'; src: url('http://a.link') format('woff2'); }
                   @font-face { font-family: 'B'; src: url('http://b.link') format('woff2'); }";
        let sheet = parse_stylesheet(css).expect("valid css");
        assert_eq!(sheet.items.len(), 2);
        for item in &sheet.items {
            let CssItem::AtRule(rule) = item else {
                panic!("expected an at-rule");
            };
            assert_eq!(rule.name, "font-face");
            assert_eq!(rule.declarations.len(), 2);
        }
    }

    /// Block-less at-rules are reported as statements.
    ///
    /// # Panics
    /// Panics if the import statement is not recognized.
    #[test]
    fn parses_statements() {
        init_logging();
        let sheet = parse_stylesheet("@import url(theme.css);").expect("valid css");
        assert!(matches!(
            &sheet.items[0],
            CssItem::Statement { name, prelude } if name == "import" && prelude == "url(theme.css)"
        ));
    }

    /// A malformed declaration fails the whole sheet with a location.
    ///
    /// # Panics
    /// Panics if the error is not reported.
    #[test]
    fn malformed_declaration_is_an_error() {
        init_logging();
        let error = parse_stylesheet(".ok{color:red}\n.bad{color red}").expect_err("invalid css");
        assert_eq!(error.line, 2);
        assert!(error.to_string().contains("CSS syntax error"));
    }

    /// A rule without a block fails the sheet.
    ///
    /// # Panics
    /// Panics if the trailing prelude is accepted.
    #[test]
    fn dangling_prelude_is_an_error() {
        init_logging();
        assert!(parse_stylesheet(".a{color:red} .b").is_err());
    }

    /// The important flag is read case-insensitively and only at the end of a value.
    ///
    /// # Panics
    /// Panics if the flag or the value is misread.
    #[test]
    fn reads_important_flag() {
        init_logging();
        let sheet = parse_stylesheet(".a{color: red ! IMPORTANT; content: \"!important-ish\"}")
            .expect("valid css");
        let CssItem::Style(rule) = &sheet.items[0] else {
            panic!("expected a style rule");
        };
        assert_eq!(rule.declarations[0].value, "red");
        assert!(rule.declarations[0].important);
        assert_eq!(rule.declarations[1].value, "\"!important-ish\"");
        assert!(!rule.declarations[1].important);
    }
}
