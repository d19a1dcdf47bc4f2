#![allow(dead_code)]
use std::fs;
use std::path::Path;

use indiscript::{Language, Program, lexer, parser};
use test_support::load_cases;

pub struct Workload {
    pub label: String,
    pub language: Language,
    pub source: String,
}

/// Fixture programs whose `case.yaml` enables benchmarking.
pub fn workloads() -> Vec<Workload> {
    let cases = load_cases(Path::new("tests/programs"))
        .unwrap_or_else(|err| panic!("load bench cases: {err:#}"));
    cases
        .into_iter()
        .filter(|case| case.spec.bench.enabled)
        .map(|case| {
            let language = case
                .spec
                .language
                .parse()
                .unwrap_or_else(|err| panic!("language of {}: {err}", case.name));
            let source = fs::read_to_string(&case.program_path)
                .unwrap_or_else(|err| panic!("read {}: {err}", case.program_path.display()));
            Workload {
                label: case.name,
                language,
                source,
            }
        })
        .collect()
}

pub fn load_program(workload: &Workload) -> Program {
    let keywords = workload.language.keywords();
    let tokens = lexer::tokenize(&workload.source, keywords);
    parser::parse(&tokens, keywords).unwrap_or_else(|err| panic!("parse {}: {err}", workload.label))
}
