use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use tangle_lexer::Lexer;
use tangle_parser::Parser;

fn any_js_like() -> impl Strategy<Value = String> {
    let ascii =
        proptest::collection::vec(any::<char>().prop_filter("ascii", |c| c.is_ascii()), 0..40)
            .prop_map(|v| v.into_iter().collect::<String>());
    let unicode = proptest::collection::vec(
        any::<char>().prop_filter("non-ascii", |c| !c.is_ascii()),
        0..40,
    )
    .prop_map(|v| v.into_iter().collect::<String>());
    let sym = ",;()[]{}?:/* */ // \"\\ '\\' \n \t . === !== >>> ++ -- var function return new typeof instanceof in this if else for while do switch case default throw try catch finally true false null"
        .to_string();
    (ascii, unicode, any::<bool>(), any::<bool>()).prop_map(move |(a, b, f1, f2)| {
        let mut s = String::new();
        s.push_str(&a);
        s.push_str(&b);
        if f1 {
            s.push_str(&sym);
        }
        if f2 {
            s.push_str(&sym);
        }
        s.chars().take(200).collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 16, max_shrink_iters: 200, .. ProptestConfig::default()
    })]
    #[test]
    fn parse_random_input_should_not_panic(s in any_js_like()) {
        let lex = Lexer::new(&s).lex();
        let parsed = Parser::new(&s, &lex.tokens).parse();
        // Diagnostics are allowed; this only checks robustness (no panic).
        let _ = parsed.program.body.len();
    }
}
