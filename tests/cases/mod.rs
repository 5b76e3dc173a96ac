//! Shared harness for the end-to-end language tests.
//!
//! Each test file declares `mod cases;` and then lists its programs with
//! [`test_case!`]:
//!
//! ```ignore
//! test_case!(
//!     addition,
//!     input: "1 + 2",
//!     result: Ok("3"),
//! );
//!
//! test_case!(
//!     echo,
//!     input: "print(console.read())",
//!     stdin: ["hello"],
//!     output: "hello\n",
//!     result: Ok("hello"),
//! );
//!
//! test_case!(
//!     undefined,
//!     input: "$nope",
//!     result: Err(Error::Interpretation(_)),
//! );
//! ```
#![allow(dead_code)]

use quill::{BufferConsole, Engine, EngineOptions, Error};

/// What one program run produced.
pub struct Run {
    /// Rendered result, or the first error from any stage.
    pub result: Result<String, Error>,
    /// Everything the program wrote to its console.
    pub output: String,
}

/// Compile and run `source` with the full standard library, feeding `stdin`
/// to `console.read()` one line at a time.
pub fn run(source: &str, stdin: &[&str]) -> Run {
    let engine = Engine::with_stdlib(EngineOptions::default())
        .unwrap_or_else(|err| panic!("standard library failed to register: {err}"));
    let mut console = BufferConsole::with_input(stdin.iter().copied());
    let result = engine
        .compile(source)
        .and_then(|program| program.execute(&mut console)?.render());
    Run {
        result,
        output: console.take_output(),
    }
}

#[macro_export]
macro_rules! test_case {
    (
        $name:ident,
        input: $input:expr,
        $(stdin: [$($line:expr),* $(,)?],)?
        $(output: $output:expr,)?
        result: Ok($expected:expr) $(,)?
    ) => {
        #[test]
        fn $name() {
            let source: &str = $input;
            let run = $crate::cases::run(source, &[$($($line),*)?]);
            $(
                pretty_assertions::assert_eq!(run.output, $output, "console output of {:?}", source);
            )?
            match run.result {
                Ok(rendered) => pretty_assertions::assert_eq!(rendered, $expected, "result of {:?}", source),
                Err(err) => panic!("{:?} failed: {}", source, err),
            }
        }
    };
    (
        $name:ident,
        input: $input:expr,
        $(stdin: [$($line:expr),* $(,)?],)?
        $(output: $output:expr,)?
        result: Err($pattern:pat) $(,)?
    ) => {
        #[test]
        fn $name() {
            let source: &str = $input;
            let run = $crate::cases::run(source, &[$($($line),*)?]);
            $(
                pretty_assertions::assert_eq!(run.output, $output, "console output of {:?}", source);
            )?
            match run.result {
                Err($pattern) => {}
                other => panic!("{:?}: unexpected outcome {:?}", source, other),
            }
        }
    };
}
