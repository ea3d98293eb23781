//! Insertion inside markup hosts.
//!
//! Positions are always reported in full-document coordinates, whatever
//! block the script came from.

use std::path::PathBuf;

use logweave::{insert_log, Category, Config, Error, ParseError, Request, Resolution, Selection};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join("web")
}

fn read(name: &str) -> String {
    std::fs::read_to_string(testdata_path().join(name)).expect("should read fixture")
}

fn ext(name: &str) -> &str {
    name.rsplit('.').next().unwrap()
}

fn run(name: &str, line: usize, value: &str) -> (String, Resolution) {
    let text = read(name);
    let request = Request::new(&text, ext(name), Selection::new(line, value)).with_file_name(name);
    let resolution = insert_log(&request, &Config::default()).expect("should resolve");
    (text, resolution)
}

#[test]
fn test_vue_script_setup() {
    let (text, resolution) = run("Counter.vue", 7, "count");
    assert_eq!(resolution.category, Some(Category::NamedFunctionAssignment));
    assert_eq!(resolution.insertion_line, 8);

    let edited = resolution.apply(&text);
    let lines: Vec<&str> = edited.lines().collect();
    assert_eq!(
        lines[8],
        "console.log(\"🚀 ~ file: Counter.vue:9 ~ count:\", count);"
    );
    assert_eq!(lines[9], "function increment(step: number) {");
}

#[test]
fn test_vue_parameter_lands_in_body() {
    let (_, resolution) = run("Counter.vue", 8, "step");
    assert_eq!(resolution.category, Some(Category::FunctionParameter));
    assert_eq!(resolution.insertion_line, 9);
    assert!(
        resolution.statement.contains("~ increment ~"),
        "{}",
        resolution.statement
    );
}

#[test]
fn test_svelte_keeps_indentation() {
    let (text, resolution) = run("Total.svelte", 2, "total");
    assert_eq!(resolution.insertion_line, 3);
    let edited = resolution.apply(&text);
    let lines: Vec<&str> = edited.lines().collect();
    assert!(lines[3].starts_with("  console.log("), "{edited}");
    assert_eq!(lines[4], "</script>");
}

#[test]
fn test_html_skips_data_blocks() {
    let (_, resolution) = run("index.html", 5, "greeting");
    assert_eq!(resolution.category, Some(Category::PrimitiveAssignment));
    assert_eq!(resolution.insertion_line, 6);
}

#[test]
fn test_astro_frontmatter_and_script() {
    let (_, front) = run("Layout.astro", 1, "title");
    assert_eq!(front.category, Some(Category::PrimitiveAssignment));
    assert_eq!(front.insertion_line, 2);

    let (_, script) = run("Layout.astro", 5, "heading");
    assert_eq!(script.category, Some(Category::FunctionCallAssignment));
    assert_eq!(script.insertion_line, 6);
}

#[test]
fn test_markup_without_script_fails() {
    let text = read("static.html");
    let request = Request::new(&text, "html", Selection::new(2, "p"));
    let err = insert_log(&request, &Config::default()).unwrap_err();
    assert_eq!(
        err,
        Error::Parse(ParseError::NoScriptBlock {
            dialect: "html".to_string()
        })
    );
}

#[test]
fn test_template_line_is_not_script() {
    let text = read("Counter.vue");
    let request = Request::new(&text, "vue", Selection::new(1, "count"));
    let err = insert_log(&request, &Config::default()).unwrap_err();
    assert_eq!(
        err,
        Error::Parse(ParseError::NoScriptBlock {
            dialect: "vue".to_string()
        })
    );
}
