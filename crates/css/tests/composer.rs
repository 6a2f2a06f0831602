//! Composer behaviour: pruning, at-rule grouping and find-or-create access.

use css::{
    CssComposer, CssOptions, CssRule, RuleDefinition, RuleScope, SelectorDefinition, SelectorKind, StyleMap,
    UsedSelectors,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn used(classes: &[&str]) -> UsedSelectors {
        UsedSelectors::new(classes.iter().copied(), Vec::<String>::new())
    }

    const KEEP: CssOptions = CssOptions {
        keep_unused_styles: true,
    };

    /// Unreferenced class rules are pruned unless unused styles are kept.
    ///
    /// # Panics
    /// Panics if the output differs from the canonical text.
    #[test]
    fn prunes_unused_class_rules() {
        init_logging();
        let mut composer = CssComposer::new();
        composer
            .add_rules(".test2{color:red}.test3{color:blue}")
            .expect("valid css");
        let usage = used(&["test2"]);
        assert_eq!(
            composer.to_css(&usage, CssOptions::default()),
            ".test2{color:red;}"
        );
        assert_eq!(
            composer.to_css(&usage, KEEP),
            ".test2{color:red;}.test3{color:blue;}"
        );
        let unused = composer.unused_rules(&usage);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].selectors_to_string(), ".test3");
    }

    /// Media rules are grouped after top-level rules and dropped when empty.
    ///
    /// # Panics
    /// Panics if the media block is printed incorrectly.
    #[test]
    fn groups_media_rules() {
        init_logging();
        let mut composer = CssComposer::new();
        composer
            .add_rules(
                ".test2{color:red}.test3{color:blue}\
                 @media only screen and (max-width: 620px) { .notused { color: red; } }",
            )
            .expect("valid css");
        assert_eq!(composer.len(), 3);
        let usage = used(&["test2"]);
        assert_eq!(
            composer.to_css(&usage, CssOptions::default()),
            ".test2{color:red;}"
        );
        assert_eq!(
            composer.to_css(&usage, KEEP),
            ".test2{color:red;}.test3{color:blue;}\
             @media only screen and (max-width: 620px){.notused{color:red;}}"
        );
    }

    /// Rules sharing an at-rule header print inside one block in first-appearance order.
    ///
    /// # Panics
    /// Panics if the blocks are not merged.
    #[test]
    fn merges_blocks_with_the_same_header() {
        init_logging();
        let mut composer = CssComposer::new();
        composer
            .add_rules(
                "@media (max-width: 992px){.a{color:red}}\
                 .b{color:blue}\
                 @media (max-width: 480px){.a{color:green}}\
                 @media (max-width: 992px){.b{margin:0}}",
            )
            .expect("valid css");
        assert_eq!(
            composer.to_css(&used(&["a", "b"]), CssOptions::default()),
            ".b{color:blue;}\
             @media (max-width: 992px){.a{color:red;}.b{margin:0;}}\
             @media (max-width: 480px){.a{color:green;}}"
        );
    }

    /// Every `@font-face` block is kept and printed on its own.
    ///
    /// # Panics
    /// Panics if font faces are merged or pruned.
    #[test]
    fn keeps_font_faces() {
        init_logging();
        let mut composer = CssComposer::new();
        composer
            .add_rules(
                "@font-face { font-family: 'A'; src: url('http://a.link') format('woff2'); }\
                 @font-face { font-family: 'B'; src: url('http://b.link') format('woff2'); }",
            )
            .expect("valid css");
        assert_eq!(composer.len(), 2);
        let css = composer.to_css(&used(&[]), CssOptions::default());
        assert_eq!(css.matches("@font-face").count(), 2);
        assert!(css.starts_with("@font-face{font-family:'A';"));
    }

    /// Complex selectors go to the extra selector text and always print.
    ///
    /// # Panics
    /// Panics if the selector is classified wrongly.
    #[test]
    fn complex_selectors_always_render() {
        init_logging();
        let mut composer = CssComposer::new();
        composer
            .add_rules(".btn:hover, div > p{color:red} #main{margin:0}")
            .expect("valid css");
        let first = &composer.get_all()[0];
        assert_eq!(first.state, "hover");
        assert_eq!(first.selectors_add, "div > p");
        assert_eq!(first.selectors_to_string(), ".btn:hover, div > p");
        assert_eq!(composer.get_all()[1].selectors[0].kind, SelectorKind::Id);
        assert_eq!(
            composer.to_css(&used(&[]), CssOptions::default()),
            ".btn:hover, div > p{color:red;}"
        );
    }

    /// The class rule lookup only matches plain single-class rules.
    ///
    /// # Panics
    /// Panics if the wrong rule is returned.
    #[test]
    fn finds_class_rules() {
        init_logging();
        let mut composer = CssComposer::new();
        composer
            .add_rules(".a:hover{color:red} .a.b{color:blue} .a{color:green !important}")
            .expect("valid css");
        let rule = composer.get_class_rule("a").expect("class rule");
        assert_eq!(rule.get_style().get("color").map(String::as_str), Some("green !important"));
        assert!(composer.get_class_rule("b").is_none());
    }

    /// `set_rule` updates the rule for a scope instead of adding a second one.
    ///
    /// # Panics
    /// Panics if duplicates are created.
    #[test]
    fn set_rule_finds_or_creates() {
        init_logging();
        let mut composer = CssComposer::new();
        let mut style = StyleMap::new();
        style.insert("color".into(), "red".into());
        let first = composer.set_rule(".a.b", style.clone(), &RuleScope::default());
        style.insert("color".into(), "blue".into());
        let second = composer.set_rule(".b.a", style.clone(), &RuleScope::default());
        assert_eq!(first, second);
        assert_eq!(composer.len(), 1);

        let media = RuleScope::media("(max-width: 992px)");
        let third = composer.set_rule(".a.b", style.clone(), &media);
        assert_ne!(first, third);
        let hover = composer.set_rule(".a.b", style, &RuleScope::default().with_state("hover"));
        assert_eq!(composer.len(), 3);
        assert_eq!(
            composer.get_rule(".a.b:hover", &RuleScope::default()).map(CssRule::id),
            Some(hover)
        );
        assert!(composer.get_rule(".a.b", &media).is_some());
    }

    /// Literal duplicates from CSS text are kept.
    ///
    /// # Panics
    /// Panics if a duplicate is dropped.
    #[test]
    fn keeps_literal_duplicates() {
        init_logging();
        let mut composer = CssComposer::new();
        composer.add_rules(".a{color:red}").expect("valid css");
        composer.add_rules(".a{color:red}").expect("valid css");
        assert_eq!(composer.len(), 2);
    }

    /// A parse failure leaves the collection untouched.
    ///
    /// # Panics
    /// Panics if rules are added from an invalid sheet.
    #[test]
    fn parse_error_changes_nothing() {
        init_logging();
        let mut composer = CssComposer::new();
        composer.add_rules(".a{color:red}").expect("valid css");
        assert!(composer.add_rules(".b{color:blue} .c{color green}").is_err());
        assert_eq!(composer.len(), 1);
    }

    /// Selector-only definitions create empty rules that never print.
    ///
    /// # Panics
    /// Panics if definitions are not loaded.
    #[test]
    fn loads_definitions() {
        init_logging();
        let definitions: Vec<RuleDefinition> = serde_json::from_str(
            r##"[
                {"selectors": ["test4"]},
                {"selectors": [{"name": "main", "type": "id"}], "style": {"color": "white"}},
                {"selectors": ["test5"], "mediaText": "(max-width: 480px)", "style": {"margin": "0"}}
            ]"##,
        )
        .expect("valid json");
        let mut composer = CssComposer::new();
        composer.replace_with_definitions(&definitions);
        assert_eq!(composer.len(), 3);
        let usage = UsedSelectors::new(["test4", "test5"], ["main"]);
        assert_eq!(
            composer.to_css(&usage, CssOptions::default()),
            "#main{color:white;}@media (max-width: 480px){.test5{margin:0;}}"
        );
        let round_trip = composer.to_definitions();
        assert_eq!(round_trip[1].selectors[0], SelectorDefinition::from("#main"));
        assert_eq!(round_trip[2].at_rule_type, "media");
    }

    /// Pseudo-elements keep their double colon through parsing and printing.
    ///
    /// # Panics
    /// Panics if `::before` is printed as `:before`.
    #[test]
    fn keeps_pseudo_element_colons() {
        init_logging();
        let mut composer = CssComposer::new();
        composer
            .add_rules(".a::before{content:\"x\"}.a:hover{color:red}")
            .expect("valid css");
        assert_eq!(composer.get_all()[0].state, ":before");
        assert_eq!(composer.get_all()[0].selectors_to_string(), ".a::before");
        assert_eq!(composer.get_all()[1].state, "hover");
        assert_eq!(
            composer.to_css(&used(&["a"]), CssOptions::default()),
            ".a::before{content:\"x\";}.a:hover{color:red;}"
        );
    }
}
