//! Indiscript: a small scripting language with a Kannada and a Sanskrit
//! lexicon over one grammar.
//!
//! Source text is tokenized against the selected [`KeywordTable`], parsed
//! into a [`Program`], lowered to a JavaScript subset by [`codegen`] and run
//! by the embedded [`runner`], whose printed lines are captured.

pub mod ast;
pub mod codegen;
pub mod keywords;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod token;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

pub use ast::Program;
pub use codegen::GenerateError;
pub use keywords::{KeywordTable, Language};
pub use parser::ParseError;
pub use runner::{CapturedOutput, OutputSink, RunOutcome, RunnerConfig, RuntimeError};

/// Pipeline settings, deserializable from fixture and config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub runner: RunnerConfig,
}

impl Config {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }
}

/// Failures that stop a program before it runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Parses `source` written in `language`.
pub fn parse(source: &str, language: Language) -> Result<Program, ParseError> {
    let keywords = language.keywords();
    let tokens = lexer::tokenize(source, keywords);
    debug!("lexed {} tokens as {language}", tokens.len());
    parser::parse(&tokens, keywords)
}

/// Translates `source` into host-dialect text.
pub fn compile(source: &str, language: Language) -> Result<String, CompileError> {
    let program = parse(source, language)?;
    Ok(codegen::generate(&program)?)
}

/// Translates and runs `source`, returning what it printed.
///
/// Runtime faults do not fail the call; they appear as a final
/// `Error: <message>` line of the returned output.
pub fn compile_and_run(source: &str, language: Language) -> Result<String, CompileError> {
    let mut output = CapturedOutput::new();
    compile_and_run_with(source, &Config::new(language), &mut output)?;
    Ok(output.finish())
}

pub fn compile_and_run_with(
    source: &str,
    config: &Config,
    sink: &mut dyn OutputSink,
) -> Result<RunOutcome, CompileError> {
    let generated = compile(source, config.language)?;
    Ok(runner::run_with(&generated, &config.runner, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn declarations_and_print() {
        let source = "srsti x = 10; srsti y = 20; srsti sum = x + y; mudrisu sum";
        assert_eq!(compile_and_run(source, Language::Kannada).as_deref(), Ok("30"));
    }

    #[test]
    fn if_else_picks_the_else_branch() {
        let source =
            "srsti x = 10; srsti y = 20; onduVele (x > y) { mudrisu x } illadiddare { mudrisu y }";
        assert_eq!(compile_and_run(source, Language::Kannada).as_deref(), Ok("20"));
    }

    #[test]
    fn for_loop_prints_each_iteration() {
        let source = "matte (srsti i = 0; i < 5; i = i + 1) { mudrisu i }";
        assert_eq!(
            compile_and_run(source, Language::Kannada).as_deref(),
            Ok("0\n1\n2\n3\n4")
        );
    }

    #[test]
    fn sanskrit_program_runs_the_same() {
        let source = indoc! {r#"
            srsti greeting = "namaste"
            yadhi (greeting == "namaste") {
                mudran greeting
            } anyatha {
                mudran "?"
            }
            punah (srsti i = 3; i > 0; i = i - 1) { mudran i }
        "#};
        assert_eq!(
            compile_and_run(source, Language::Sanskrit).as_deref(),
            Ok("namaste\n3\n2\n1")
        );
    }

    #[test]
    fn undeclared_name_becomes_error_line() {
        let output = compile_and_run("mudrisu 1 mudrisu ghost", Language::Kannada)
            .expect("compilation should succeed");
        assert_eq!(output, "1\nError: ghost is not defined");
    }

    #[test]
    fn reassigning_a_declared_name_is_a_runtime_error() {
        let output = compile_and_run("srsti a = 1 mudrisu a srsti a = 2", Language::Kannada)
            .expect("compilation should succeed");
        assert_eq!(output, "Error: Identifier 'a' has already been declared");
    }

    #[test]
    fn keywords_of_the_other_lexicon_are_plain_identifiers() {
        let output = compile_and_run("mudran 1", Language::Kannada).expect("compile");
        assert_eq!(output, "");
    }

    #[test]
    fn parse_errors_surface_as_compile_errors() {
        let error = compile_and_run("onduVele x > 1 { mudrisu x }", Language::Kannada)
            .expect_err("missing paren must fail");
        assert!(matches!(
            error,
            CompileError::Parse(ParseError::ExpectedToken { expected: "(", .. })
        ));
        assert!(matches!(
            compile("srsti", Language::Kannada),
            Err(CompileError::Parse(ParseError::ExpectedName { .. }))
        ));
        assert!(matches!(
            compile("mudrisu }", Language::Kannada),
            Err(CompileError::Parse(ParseError::ExpectedExpression { .. }))
        ));
    }

    #[test]
    fn step_limit_ends_runaway_loops() {
        let config = Config {
            language: Language::Sanskrit,
            runner: RunnerConfig {
                max_steps: Some(1_000),
            },
        };
        let mut output = CapturedOutput::new();
        let outcome = compile_and_run_with("punah (srsti i = 0; 1; i = i) { }", &config, &mut output)
            .expect("compilation should succeed");
        assert_eq!(
            outcome,
            RunOutcome::Faulted(RuntimeError::StepLimitExceeded { limit: 1_000 })
        );
        assert_eq!(
            output.finish(),
            "Error: Execution step limit of 1000 exceeded"
        );
    }

    #[test]
    fn loop_updates_reach_the_host_intact() {
        let source = "matte (srsti i = 0; i < 3; i++) { mudrisu i } matte (srsti j = 5; j > 0; j -= 2) { mudrisu j }";
        assert_eq!(
            compile_and_run(source, Language::Kannada).as_deref(),
            Ok("0\n1\n2\n5\n3\n1")
        );
        let source = "srsti a = 1 srsti b = \"1\" onduVele (a !== b) { mudrisu \"strict\" }";
        assert_eq!(compile_and_run(source, Language::Kannada).as_deref(), Ok("strict"));
    }

    #[test]
    fn oversized_literals_print_at_full_magnitude() {
        assert_eq!(
            compile_and_run("mudrisu 99999999999999999999", Language::Kannada).as_deref(),
            Ok("100000000000000000000")
        );
        assert_eq!(
            compile_and_run("mudrisu 1152921504606846976", Language::Kannada).as_deref(),
            Ok("1152921504606847000")
        );
    }

    #[test]
    fn backslashes_in_strings_are_printed_literally() {
        let source = r#"mudrisu "C:\" mudrisu "a\nb""#;
        assert_eq!(
            compile(source, Language::Kannada).as_deref(),
            Ok("console.log(\"C:\\\\\");\nconsole.log(\"a\\\\nb\");\n")
        );
        assert_eq!(
            compile_and_run(source, Language::Kannada).as_deref(),
            Ok("C:\\\na\\nb")
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: Config = serde_yaml::from_str("language: sanskrit\n").expect("yaml");
        assert_eq!(config, Config::new(Language::Sanskrit));
    }
}
