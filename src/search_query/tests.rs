use super::eval::visible_rows;
use super::parser::Filter;
use super::{apply_filter, parse_search_query, ColumnKeys, ParsedQuery};
use crate::table::{Column, Row};

fn matches(query: &str, row: &Row, columns: &impl ColumnKeys) -> bool {
    !visible_rows(std::slice::from_ref(row), &parse_search_query(query), columns).is_empty()
}

fn columns() -> Vec<Column> {
    vec![
        Column::keyed("name", "Name"),
        Column::keyed("lang", "Language"),
        Column::unkeyed("Models"),
    ]
}

fn make_row(name: &str, lang: &str) -> Row {
    Row::new(vec![name.to_string(), lang.to_string(), "Show".to_string()])
}

fn scenario_rows() -> Vec<Row> {
    vec![make_row("Teacher", "en-fr"), make_row("Student", "en-de")]
}

fn filter(key: &str, value: &str, negated: bool) -> Filter {
    Filter {
        key: key.to_string(),
        value: value.to_string(),
        negated,
    }
}

// --- Parsing ---

#[test]
fn test_parse_empty_is_empty_query() {
    assert_eq!(parse_search_query(""), ParsedQuery::default());
    assert_eq!(parse_search_query("   "), ParsedQuery::default());
    assert!(parse_search_query("\t\n").is_empty());
}

#[test]
fn test_parse_simple_word() {
    let q = parse_search_query("hello");
    assert_eq!(q.terms, vec!["hello"]);
    assert!(q.filters.is_empty());
}

#[test]
fn test_parse_terms_are_lowercased() {
    let q = parse_search_query("Hello WORLD");
    assert_eq!(q.terms, vec!["hello", "world"]);
}

#[test]
fn test_parse_filter() {
    let q = parse_search_query("lang:en");
    assert!(q.terms.is_empty());
    assert_eq!(q.filters, vec![filter("lang", "en", false)]);
}

#[test]
fn test_parse_negated_filter() {
    let q = parse_search_query("-lang:en");
    assert_eq!(q.filters, vec![filter("lang", "en", true)]);
}

#[test]
fn test_parse_quoted_filter_value() {
    let q = parse_search_query(r#"name:"en to fr""#);
    assert!(q.terms.is_empty());
    assert_eq!(q.filters, vec![filter("name", "en to fr", false)]);
}

#[test]
fn test_parse_filter_value_lowercased() {
    let q = parse_search_query("name:Spring-2025");
    assert_eq!(q.filters, vec![filter("name", "spring-2025", false)]);
}

#[test]
fn test_parse_hyphenated_key() {
    let q = parse_search_query("model-name:student");
    assert_eq!(q.filters, vec![filter("model-name", "student", false)]);
}

#[test]
fn test_parse_invalid_key_is_term() {
    let q = parse_search_query("Key1:value");
    assert!(q.filters.is_empty());
    assert_eq!(q.terms, vec!["key1:value"]);

    // Uppercase alone is enough to reject the key
    let q = parse_search_query("Lang:en");
    assert!(q.filters.is_empty());
    assert_eq!(q.terms, vec!["lang:en"]);

    let q = parse_search_query("a.b:c");
    assert_eq!(q.terms, vec!["a.b:c"]);
}

#[test]
fn test_parse_empty_key_is_term() {
    let q = parse_search_query(":en");
    assert!(q.filters.is_empty());
    assert_eq!(q.terms, vec![":en"]);
}

#[test]
fn test_parse_value_keeps_later_colons() {
    let q = parse_search_query("url:https://example.com");
    assert_eq!(q.filters, vec![filter("url", "https://example.com", false)]);
}

#[test]
fn test_parse_negated_term_drops_dash() {
    let q = parse_search_query("-student");
    assert_eq!(q.terms, vec!["student"]);
    assert!(q.filters.is_empty());
}

#[test]
fn test_parse_lone_dash_is_dropped() {
    assert!(parse_search_query("-").is_empty());
}

#[test]
fn test_parse_unterminated_quote() {
    let q = parse_search_query(r#"name:"en to fr"#);
    assert!(q.terms.is_empty());
    assert_eq!(q.filters, vec![filter("name", "en to fr", false)]);
}

#[test]
fn test_parse_unterminated_quote_swallows_following_tokens() {
    let q = parse_search_query(r#"name:"spring lang:en"#);
    assert_eq!(q.filters, vec![filter("name", "spring lang:en", false)]);
}

#[test]
fn test_parse_quoted_term() {
    let q = parse_search_query(r#""en to fr" teacher"#);
    assert_eq!(q.terms, vec!["en to fr", "teacher"]);
}

#[test]
fn test_parse_keeps_text_after_closing_quote() {
    let q = parse_search_query(r#"a:"b"c name:"Big run"S "spring"-2024"#);
    assert_eq!(
        q.filters,
        vec![filter("a", "bc", false), filter("name", "big runs", false)]
    );
    assert_eq!(q.terms, vec!["spring-2024"]);
}

#[test]
fn test_parse_mixed() {
    let q = parse_search_query(r#"spring -lang:en-de name:"big run" 2025"#);
    assert_eq!(q.terms, vec!["spring", "2025"]);
    assert_eq!(
        q.filters,
        vec![filter("lang", "en-de", true), filter("name", "big run", false)]
    );
}

// --- Filtering ---

#[test]
fn test_filter_scenario() {
    let rows = scenario_rows();
    let cols = columns();

    let q = parse_search_query("lang:en-fr");
    assert_eq!(visible_rows(&rows, &q, &cols), vec![0]);

    let q = parse_search_query("-lang:en-fr");
    assert_eq!(visible_rows(&rows, &q, &cols), vec![1]);

    let q = parse_search_query("student");
    assert_eq!(visible_rows(&rows, &q, &cols), vec![1]);
}

#[test]
fn test_empty_query_shows_everything() {
    let rows = scenario_rows();
    let q = parse_search_query("  ");
    assert_eq!(visible_rows(&rows, &q, &columns()), vec![0, 1]);
}

#[test]
fn test_unknown_key_is_noop() {
    let rows = scenario_rows();
    let cols = columns();
    let baseline = visible_rows(&rows, &ParsedQuery::default(), &cols);

    for query in ["nope:teacher", "-nope:teacher", "nope:zzz", "-nope:"] {
        let q = parse_search_query(query);
        assert_eq!(visible_rows(&rows, &q, &cols), baseline, "query {query:?}");
    }
}

#[test]
fn test_unknown_key_does_not_mask_other_clauses() {
    let rows = scenario_rows();
    let q = parse_search_query("nope:x lang:en-de");
    assert_eq!(visible_rows(&rows, &q, &columns()), vec![1]);
}

#[test]
fn test_filter_only_looks_at_its_column() {
    let rows = vec![make_row("en-fr experiment", "en-de")];
    let cols = columns();
    assert!(!matches("lang:en-fr", &rows[0], &cols));
    assert!(matches("name:en-fr", &rows[0], &cols));
}

#[test]
fn test_terms_match_across_whole_row() {
    let row = make_row("Teacher", "en-fr");
    let cols = columns();
    assert!(matches("teacher", &row, &cols));
    assert!(matches("en-fr", &row, &cols));
    assert!(matches("teacher en-fr", &row, &cols));
    assert!(!matches("teacher en-de", &row, &cols));
}

#[test]
fn test_matching_is_case_insensitive_substring() {
    let row = make_row("Spring Teacher", "EN-FR");
    let cols = columns();
    assert!(matches("TEACH", &row, &cols));
    assert!(matches("lang:En-F", &row, &cols));
    assert!(!matches("-lang:en", &row, &cols));
}

#[test]
fn test_all_clauses_must_pass() {
    let rows = vec![
        make_row("Teacher", "en-fr"),
        make_row("Teacher", "en-de"),
        make_row("Student", "en-fr"),
    ];
    let q = parse_search_query("teacher -lang:de");
    assert_eq!(visible_rows(&rows, &q, &columns()), vec![0]);
}

#[test]
fn test_filter_on_toggle_column_is_ignored() {
    // Columns without a key can't be targeted.
    let rows = scenario_rows();
    let q = parse_search_query("models:hide");
    assert_eq!(visible_rows(&rows, &q, &columns()), vec![0, 1]);
}

#[test]
fn test_apply_filter_is_idempotent() {
    let mut rows = scenario_rows();
    let cols = columns();
    let q = parse_search_query("-lang:en-fr");

    apply_filter(&mut rows, &q, &cols);
    let first: Vec<bool> = rows.iter().map(|r| r.visible).collect();
    apply_filter(&mut rows, &q, &cols);
    let second: Vec<bool> = rows.iter().map(|r| r.visible).collect();

    assert_eq!(first, vec![false, true]);
    assert_eq!(first, second);
}

#[test]
fn test_apply_filter_resets_visibility() {
    let mut rows = scenario_rows();
    let cols = columns();

    apply_filter(&mut rows, &parse_search_query("student"), &cols);
    assert!(!rows[0].visible);

    apply_filter(&mut rows, &parse_search_query(""), &cols);
    assert!(rows.iter().all(|r| r.visible));
}

#[test]
fn test_first_matching_column_wins() {
    let cols = vec![Column::keyed("name", "Name"), Column::keyed("name", "Alias")];
    let row = Row::new(vec!["alpha".to_string(), "beta".to_string()]);
    assert!(matches("name:alpha", &row, &cols));
    assert!(!matches("name:beta", &row, &cols));
}

#[test]
fn test_short_row_treated_as_empty_cell() {
    let row = Row::new(vec!["Teacher".to_string()]);
    let cols = columns();
    assert!(!matches("lang:en", &row, &cols));
    assert!(matches("-lang:en", &row, &cols));
}

// --- Filter expressions ---

#[test]
fn test_filter_expression_quotes_spaces() {
    assert_eq!(super::filter_expression("langpair", "en-fr"), "langpair:en-fr");
    assert_eq!(super::filter_expression("language", "Norwegian Bokmål"), r#"language:"Norwegian Bokmål""#);
}

#[test]
fn test_filter_expression_parses_back() {
    let expr = super::filter_expression("language", "Norwegian Bokmål");
    let q = parse_search_query(&expr);
    assert_eq!(q.filters, vec![filter("language", "norwegian bokmål", false)]);
}
