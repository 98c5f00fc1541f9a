//! Property tests for the pipeline's structural guarantees.

use markview_core::classify::Classification;
use markview_core::highlight::PlainHighlighter;
use markview_core::slug::Slugger;
use markview_core::{contains, extract_urls, parse, render_with, transform, Node, RenderOptions};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

fn link() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{1,8}", "https://[a-z]{1,8}\\.test/[a-z0-9]{0,8}")
}

fn markdownish() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(":high["),
            Just("::high["),
            Just(":note["),
            Just(":::high"),
            Just(":::"),
            Just("]"),
            Just("{.a #b k=\"v\"}"),
            Just("~"),
            Just("~~"),
            Just("@user"),
            Just("`"),
            Just("*"),
            Just("# "),
            Just("word "),
            Just("é"),
            Just("\n"),
            Just("\n\n"),
        ],
        0..24,
    )
    .prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn extracted_urls_match_link_targets(links in prop::collection::vec(link(), 0..8)) {
        let markdown = links
            .iter()
            .map(|(label, url)| format!("[{label}]({url})"))
            .collect::<Vec<_>>()
            .join(" and ");
        let expected: BTreeSet<String> = links.into_iter().map(|(_, url)| url).collect();
        prop_assert_eq!(extract_urls(&parse(&markdown)), expected);
    }

    #[test]
    fn slugs_are_pairwise_distinct(headings in prop::collection::vec("[A-Za-z0-9 _-]{0,12}", 1..20)) {
        let mut slugger = Slugger::new();
        let slugs: Vec<String> = headings.iter().map(|h| slugger.slug(h)).collect();
        let distinct: HashSet<&String> = slugs.iter().collect();
        prop_assert_eq!(distinct.len(), slugs.len());

        let mut again = Slugger::new();
        let repeated: Vec<String> = headings.iter().map(|h| again.slug(h)).collect();
        prop_assert_eq!(slugs, repeated);
    }

    #[test]
    fn transform_is_idempotent(text in markdownish()) {
        let mut once = parse(&text);
        transform(&mut once);
        let mut twice = once.clone();
        transform(&mut twice);
        prop_assert_eq!(&once, &twice);
        let is_high = |node: &Node| matches!(node, Node::Directive(d) if d.name == "high" && d.kind != markview_core::ast::DirectiveKind::Container);
        prop_assert!(!contains(&once, is_high));
    }

    #[test]
    fn rendered_urls_keep_allowed_schemes(
        scheme in "[A-Za-z]{1,10}",
        rest in "[a-z0-9/.,]{0,12}",
    ) {
        let url = format!("{scheme}:{rest}");
        let tree = render_with(
            &format!("[a]({url}) ![b]({url})"),
            &RenderOptions::default(),
            &Classification::default(),
            &PlainHighlighter,
        );
        let allowed = ["http", "https", "mailto", "tel"]
            .iter()
            .any(|s| scheme.eq_ignore_ascii_case(s));
        let expected = if allowed { url.as_str() } else { "#" };
        prop_assert_eq!(tree.links()[0].href.as_str(), expected);
        prop_assert_eq!(tree.images().len(), usize::from(allowed));
    }

    #[test]
    fn render_is_total(text in markdownish()) {
        let tree = render_with(
            &text,
            &RenderOptions::default(),
            &Classification::default(),
            &PlainHighlighter,
        );
        let ids: Vec<String> = tree.headings().iter().filter_map(|h| h.id.clone()).collect();
        let distinct: HashSet<&String> = ids.iter().collect();
        prop_assert_eq!(distinct.len(), ids.len());
    }
}
