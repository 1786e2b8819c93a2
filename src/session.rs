use crate::{equations, logging, Error, Expr};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

const HELP: &str = "\
Available commands:

  help
      Show this message.

  <expression>
      Evaluate an expression exactly, for example 5+3*(8-6).
      Operators: +, -, *, / and ^ (or **), with brackets for grouping.
      Numbers may have a decimal point, names are treated as symbols.

  <left> = <right>
      Solve an equation for x, for example x+3=7.
      The first real solution is shown. Complex solutions are not
      reported, so x^2=-1 says there is no solution.

  state
      Show the last 10 lines of the log.

  quit, exit
      Leave the calculator.";

/// How many log lines the `state` command shows.
const STATE_LINES: usize = 10;

/// Settings for a [`Session`].
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// The log file shown by the `state` command.
    pub log_file: PathBuf,
    /// Print decimal approximations next to exact results.
    pub numeric: bool,
}

/// An interactive read-eval-print loop.
#[derive(Debug)]
pub struct Session<R, W> {
    input: R,
    output: W,
    options: Options,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, options: Options) -> Self {
        Session {
            input,
            output,
            options,
        }
    }

    pub fn into_output(self) -> W { self.output }

    /// Keep handling lines until the user quits or we run out of input.
    pub fn run(&mut self) -> io::Result<()> {
        log::info!("Session started");
        writeln!(self.output, "Type 'help' for help.")?;

        while let Some(line) = self.next_line()? {
            if line.is_empty() {
                continue;
            }

            log::info!("Input received: {}", line);

            match line.as_str() {
                "quit" | "exit" => break,
                "help" => writeln!(self.output, "{}", HELP)?,
                "state" => self.show_state()?,
                _ => match process(&line, self.options.numeric) {
                    Ok(result) => writeln!(self.output, "Result: {}", result)?,
                    Err(e) => writeln!(self.output, "Error: {}", e)?,
                },
            }
        }

        log::info!("Session finished");
        writeln!(self.output, "Goodbye!")?;
        self.output.flush()
    }

    /// Prompt for the next line, trimmed and lower-cased.
    fn next_line(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "> ")?;
        self.output.flush()?;

        let mut buffer = String::new();
        if self.input.read_line(&mut buffer)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }

        Ok(Some(buffer.trim().to_lowercase()))
    }

    fn show_state(&mut self) -> io::Result<()> {
        let path = &self.options.log_file;

        match logging::tail(path, STATE_LINES) {
            Ok(lines) => {
                writeln!(self.output, "Log history (last {}):", STATE_LINES)?;
                for line in lines {
                    writeln!(self.output, "{}", line)?;
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                writeln!(
                    self.output,
                    "The log file {} was not found.",
                    path.display()
                )?;
            },
            Err(e) => {
                log::warn!("Unable to read {}: {}", path.display(), e);
                writeln!(self.output, "Unable to read the log file: {}", e)?;
            },
        }

        Ok(())
    }
}

/// Handle a single line of input, an expression or an equation.
///
/// Failures are logged here, so callers only need to report them.
pub fn process(line: &str, numeric: bool) -> Result<String, Error> {
    if line.contains('=') {
        // the solver logs its own failures
        return Ok(equations::solve(line)?);
    }

    match crate::calculate(line) {
        Ok(value) => Ok(render(&value, numeric)),
        Err(e) => {
            log::error!("Unable to evaluate {:?}: {}", line, e);
            Err(e)
        },
    }
}

fn render(value: &Expr, numeric: bool) -> String {
    let exact = value.to_string();

    match value.approximate() {
        Some(approximation) if numeric => {
            let decimal = approximation.to_string();
            if decimal == exact {
                exact
            } else {
                format!("{} ≈ {}", exact, decimal)
            }
        },
        _ => exact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::{
        fs,
        sync::{Mutex, Once},
        thread::{self, ThreadId},
    };

    /// Remembers every record, so tests can see what their own thread
    /// logged.
    struct Recorder {
        records: Mutex<Vec<(ThreadId, Level, String)>>,
    }

    impl Log for Recorder {
        fn enabled(&self, _: &Metadata<'_>) -> bool { true }

        fn log(&self, record: &Record<'_>) {
            if let Ok(mut records) = self.records.lock() {
                records.push((
                    thread::current().id(),
                    record.level(),
                    record.args().to_string(),
                ));
            }
        }

        fn flush(&self) {}
    }

    static RECORDER: Recorder = Recorder {
        records: Mutex::new(Vec::new()),
    };

    fn record_logs() {
        static INSTALL: Once = Once::new();

        INSTALL.call_once(|| {
            log::set_logger(&RECORDER).unwrap();
            log::set_max_level(LevelFilter::Trace);
        });

        let current = thread::current().id();
        RECORDER
            .records
            .lock()
            .unwrap()
            .retain(|(id, _, _)| *id != current);
    }

    fn logged_errors() -> Vec<String> {
        let current = thread::current().id();

        RECORDER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, level, _)| *id == current && *level == Level::Error)
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    fn options() -> Options {
        Options {
            log_file: std::env::temp_dir()
                .join("symcalc-session-tests-that-do-not-exist")
                .join(logging::LOG_FILE),
            numeric: false,
        }
    }

    fn run(input: &str, options: Options) -> String {
        let mut session = Session::new(input.as_bytes(), Vec::new(), options);
        session.run().unwrap();
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn evaluate_an_expression() {
        let got = run("5+3*(2-1)\n", options());

        assert!(got.starts_with("Type 'help' for help.\n"));
        assert!(got.contains("> Result: 8\n"), "{}", got);
    }

    #[test]
    fn errors_are_reported_and_the_session_continues() {
        let got = run("1/0\n1 + 1\n", options());

        assert!(got.contains("Error: division by zero\n"), "{}", got);
        assert!(got.contains("Result: 2\n"), "{}", got);
    }

    #[test]
    fn syntax_errors() {
        let got = run("5 $ 3\n", options());

        assert!(got.contains("Error: syntax error: invalid character '$'"));
    }

    #[test]
    fn input_is_lower_cased() {
        let got = run("  X + X  \n", options());

        assert!(got.contains("Result: 2*x\n"), "{}", got);
    }

    #[test]
    fn equations_go_to_the_solver() {
        let got = run("x+3=7\nx^2=-1\n", options());

        assert!(got.contains("Result: Solution: x = 4\n"), "{}", got);
        assert!(
            got.contains(&format!("Result: {}\n", equations::NO_SOLUTION)),
            "{}",
            got
        );
    }

    #[test]
    fn each_failure_is_logged_once() {
        record_logs();

        let got = run("x = 1 = 2\n1/0\nx + 1 = \n", options());

        assert_eq!(got.matches("Error: ").count(), 3, "{}", got);
        assert_eq!(logged_errors().len(), 3, "{:?}", logged_errors());
    }

    #[test]
    fn quit_stops_reading() {
        let got = run("quit\n1 + 1\n", options());

        assert!(!got.contains("Result"), "{}", got);
        assert!(got.ends_with("Goodbye!\n"));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let got = run("\n   \nexit\n", options());

        assert!(!got.contains("Error"), "{}", got);
    }

    #[test]
    fn help() {
        let got = run("help\n", options());

        assert!(got.contains(HELP));
    }

    #[test]
    fn help_explains_complex_solutions() {
        let got = run("help\nx^2=-1\n", options());

        assert!(got.contains("Complex solutions are not"), "{}", got);
        assert!(got.contains("x^2=-1 says there is no solution"));
        assert!(got.contains(&format!("Result: {}\n", equations::NO_SOLUTION)));
    }

    #[test]
    fn state_without_a_log_file() {
        let got = run("state\n", options());

        assert!(got.contains("was not found"), "{}", got);
    }

    #[test]
    fn state_shows_at_most_ten_lines() {
        let directory = std::env::temp_dir()
            .join(format!("symcalc-session-state-{}", std::process::id()));
        fs::create_dir_all(&directory).unwrap();
        let log_file = directory.join(logging::LOG_FILE);
        let text: String = (1..=12).map(|i| format!("entry {}\n", i)).collect();
        fs::write(&log_file, text).unwrap();
        let options = Options {
            log_file,
            numeric: false,
        };

        let got = run("state\n", options);

        assert!(got.contains("Log history (last 10):\nentry 3\n"), "{}", got);
        assert!(got.contains("entry 12\n"));
        assert!(!got.contains("entry 2\n"));

        fs::remove_dir_all(&directory).unwrap();
    }

    #[test]
    fn numeric_approximations() {
        let got = process("2^0.5", true).unwrap();
        assert!(got.starts_with("sqrt(2) ≈ 1.41421356"), "{}", got);

        let inputs = vec![
            ("1/4", "1/4 ≈ 0.25"),
            ("3", "3"),
            ("x + 1", "x + 1"),
        ];

        for (src, should_be) in inputs {
            let got = process(src, true).unwrap();
            assert_eq!(got, should_be, "{}", src);
        }
    }
}
