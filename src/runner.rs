//! External command runners
//!
//! Every external program knot talks to (image editor, PDF viewer, file
//! browser, rasterizer, compressor) is wrapped in a [`CommandRunner`]. The
//! runner is chosen once when the configuration is loaded: either a fixed
//! program with an argument template, or an in-process callback.

use std::fmt;
use std::process::{Command, Stdio};
use std::rc::Rc;

use log::debug;

use crate::config::CommandSetting;
use crate::errors::{external_tool_error, Result};

/// Placeholder in an argument template replaced by the next input
pub const PLACEHOLDER: &str = "{}";

/// In-process replacement for an external program
pub type Callback = Rc<dyn Fn(&[String]) -> Result<String>>;

#[derive(Clone)]
pub enum CommandRunner {
    /// Spawn `program` with `args`, substituting inputs for `{}`
    Program { program: String, args: Vec<String> },
    /// Call a function with the inputs
    Callback { name: String, callback: Callback },
}

impl fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandRunner::Program { program, args } => f
                .debug_struct("Program")
                .field("program", program)
                .field("args", args)
                .finish(),
            CommandRunner::Callback { name, .. } => {
                f.debug_struct("Callback").field("name", name).finish()
            }
        }
    }
}

impl CommandRunner {
    /// Runner spawning `program` with the inputs appended as arguments
    pub fn program(program: &str) -> Self {
        CommandRunner::Program {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Runner spawning `program` with an argument template
    pub fn with_args(program: &str, args: &[&str]) -> Self {
        CommandRunner::Program {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    pub fn callback<F>(name: &str, callback: F) -> Self
    where
        F: Fn(&[String]) -> Result<String> + 'static,
    {
        CommandRunner::Callback {
            name: name.to_string(),
            callback: Rc::new(callback),
        }
    }

    /// Builds a runner from a configured command
    ///
    /// A plain string is split on whitespace into program and arguments;
    /// `~` is expanded in every part.
    pub fn from_setting(setting: &CommandSetting) -> Self {
        match setting {
            CommandSetting::Command(command) => {
                let mut parts = command.split_whitespace().map(expand);
                let program = parts.next().unwrap_or_default();
                CommandRunner::Program {
                    program,
                    args: parts.collect(),
                }
            }
            CommandSetting::Detailed { program, args } => CommandRunner::Program {
                program: expand(program),
                args: args.iter().map(|arg| expand(arg)).collect(),
            },
        }
    }

    /// Name of the program or callback, for messages
    pub fn name(&self) -> &str {
        match self {
            CommandRunner::Program { program, .. } => program,
            CommandRunner::Callback { name, .. } => name,
        }
    }

    /// Runs to completion and returns the combined output
    ///
    /// # Errors
    /// Returns an error if the program cannot be spawned or exits with a
    /// non-zero status, or if the callback fails
    pub fn run(&self, inputs: &[String]) -> Result<String> {
        match self {
            CommandRunner::Program { program, args } => {
                let argv = build_argv(args, inputs);
                debug!("Running {program} {argv:?}");

                let output = Command::new(program)
                    .args(&argv)
                    .output()
                    .map_err(|e| external_tool_error(program, &e.to_string()))?;

                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));

                if !output.status.success() {
                    return Err(external_tool_error(
                        program,
                        &format!("{}: {}", output.status, combined.trim()),
                    ));
                }
                Ok(combined)
            }
            CommandRunner::Callback { name, callback } => {
                debug!("Calling {name} with {inputs:?}");
                callback(inputs)
            }
        }
    }

    /// Starts the program and leaves it running
    ///
    /// The child is detached from knot's standard streams and its exit is
    /// never awaited. Callbacks are simply invoked.
    pub fn start(&self, inputs: &[String]) -> Result<()> {
        match self {
            CommandRunner::Program { program, args } => {
                let argv = build_argv(args, inputs);
                debug!("Starting {program} {argv:?}");

                Command::new(program)
                    .args(&argv)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .map_err(|e| external_tool_error(program, &e.to_string()))?;
                Ok(())
            }
            CommandRunner::Callback { .. } => self.run(inputs).map(|_| ()),
        }
    }
}

fn expand(part: &str) -> String {
    shellexpand::tilde(part).into_owned()
}

/// Substitutes inputs for the placeholders in order; inputs left over are
/// appended.
pub fn build_argv(template: &[String], inputs: &[String]) -> Vec<String> {
    let mut remaining = inputs.iter();
    let mut argv: Vec<String> = template
        .iter()
        .map(|arg| {
            if arg.contains(PLACEHOLDER) {
                match remaining.next() {
                    Some(input) => arg.replacen(PLACEHOLDER, input, 1),
                    None => arg.clone(),
                }
            } else {
                arg.clone()
            }
        })
        .collect();
    argv.extend(remaining.cloned());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_build_argv_appends_without_placeholder() {
        let argv = build_argv(&[], &strings(&["/tmp/a.pdf"]));
        assert_eq!(argv, strings(&["/tmp/a.pdf"]));
    }

    #[test]
    fn test_build_argv_fills_placeholders_in_order() {
        let template = strings(&["{}", "--export", "--export-filename", "{}"]);
        let argv = build_argv(&template, &strings(&["page-0.kra", "page-0.png"]));
        assert_eq!(
            argv,
            strings(&["page-0.kra", "--export", "--export-filename", "page-0.png"])
        );
    }

    #[test]
    fn test_build_argv_placeholder_inside_argument() {
        let template = strings(&["-sOutputFile={}", "{}"]);
        let argv = build_argv(&template, &strings(&["out.pdf", "in.pdf"]));
        assert_eq!(argv, strings(&["-sOutputFile=out.pdf", "in.pdf"]));
    }

    #[test]
    fn test_from_setting_splits_command() {
        let runner = CommandRunner::from_setting(&CommandSetting::Command(
            "zathura --fork".to_string(),
        ));
        match runner {
            CommandRunner::Program { program, args } => {
                assert_eq!(program, "zathura");
                assert_eq!(args, strings(&["--fork"]));
            }
            other => panic!("unexpected runner {other:?}"),
        }
    }

    #[test]
    fn test_callback_receives_inputs() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let runner = CommandRunner::callback("recorder", move |inputs| {
            sink.borrow_mut().extend(inputs.iter().cloned());
            Ok("done".to_string())
        });

        assert_eq!(runner.run(&strings(&["a", "b"])).unwrap(), "done");
        runner.start(&strings(&["c"])).unwrap();
        assert_eq!(*seen.borrow(), strings(&["a", "b", "c"]));
        assert_eq!(runner.name(), "recorder");
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let runner = CommandRunner::program("knot-test-no-such-program");
        assert!(runner.run(&[]).is_err());
        assert!(runner.start(&[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_an_error() {
        assert!(CommandRunner::program("false").run(&[]).is_err());
        assert!(CommandRunner::program("true").run(&[]).is_ok());
    }
}
