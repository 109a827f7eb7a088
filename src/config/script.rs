//! Scripted configuration
//!
//! `config.rhai` in the configuration directory is an optional companion to
//! `config.yaml`. A tool is bound either to a command line, by a string
//! variable, or to a function of the same name receiving the inputs as an
//! array:
//!
//! ```text
//! let pdf_viewer = "zathura --fork";
//! let export_quality = 2;
//!
//! fn file_browser(inputs) {
//!     start("thunar", inputs)
//! }
//! ```
//!
//! Scripts can call `run(program, args)`, which waits and returns the
//! output, and `start(program, args)`, which leaves the program running.
//! Whatever the script binds takes precedence over `config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, warn};
use rhai::{Array, Dynamic, Engine, EvalAltResult, ImmutableString, Scope, AST, INT};

use crate::errors::external_tool_error;
use crate::runner::CommandRunner;

use super::model::{CommandSetting, Config, TOOL_NAMES};

/// A tool bound to a script function
pub type ScriptBinding = (&'static str, CommandRunner);

type HostResult<T> = std::result::Result<T, Box<EvalAltResult>>;

fn strings(inputs: Array) -> Vec<String> {
    inputs.into_iter().map(|input| input.to_string()).collect()
}

fn script_engine() -> Engine {
    let mut engine = Engine::new();
    engine.register_fn(
        "run",
        |program: ImmutableString, inputs: Array| -> HostResult<String> {
            CommandRunner::program(&program)
                .run(&strings(inputs))
                .map_err(|e| e.to_string().into())
        },
    );
    engine.register_fn(
        "start",
        |program: ImmutableString, inputs: Array| -> HostResult<()> {
            CommandRunner::program(&program)
                .start(&strings(inputs))
                .map_err(|e| e.to_string().into())
        },
    );
    engine
}

fn compile(engine: &Engine, file: &Path) -> Option<AST> {
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            warn!("Failed to read {}: {}. Ignoring it.", file.display(), e);
            return None;
        }
    };

    match engine.compile(source) {
        Ok(ast) => Some(ast),
        Err(e) => {
            warn!("Failed to parse {}: {}. Ignoring it.", file.display(), e);
            None
        }
    }
}

/// Applies the script in `file` to `config`
///
/// String variables named after a tool replace its command, and
/// `export_quality` and `log_file` replace their settings. Functions named
/// after a tool are returned as callback runners to install over the
/// resolved tools. A missing script changes nothing; a broken one is
/// reported and ignored.
pub fn load_script(file: &Path, config: &mut Config) -> Vec<ScriptBinding> {
    if !file.exists() {
        debug!("No script at {}", file.display());
        return Vec::new();
    }

    let engine = script_engine();
    let Some(ast) = compile(&engine, file) else {
        return Vec::new();
    };

    let mut scope = Scope::new();
    if let Err(e) = engine.run_ast_with_scope(&mut scope, &ast) {
        warn!("Failed to run {}: {}. Ignoring it.", file.display(), e);
        return Vec::new();
    }

    for name in TOOL_NAMES {
        if let (Some(command), Some(setting)) = (
            scope.get_value::<ImmutableString>(name),
            config.tool_setting_mut(name),
        ) {
            debug!("{name} bound to <{command}> by script");
            *setting = Some(CommandSetting::Command(command.to_string()));
        }
    }
    if let Some(quality) = scope.get_value::<INT>("export_quality") {
        config.export_quality = quality;
    }
    if let Some(log_file) = scope.get_value::<ImmutableString>("log_file") {
        config.log_file = Some(PathBuf::from(log_file.as_str()));
    }

    let bound: Vec<&'static str> = ast
        .iter_functions()
        .filter(|function| function.params.len() == 1)
        .filter_map(|function| TOOL_NAMES.into_iter().find(|name| *name == function.name))
        .collect();

    let script = Rc::new((engine, ast));
    bound
        .into_iter()
        .map(|name| {
            debug!("{name} bound to a script function");
            (name, script_callback(&script, name))
        })
        .collect()
}

fn script_callback(script: &Rc<(Engine, AST)>, name: &'static str) -> CommandRunner {
    let script = Rc::clone(script);
    CommandRunner::callback(name, move |inputs| {
        let (engine, ast) = &*script;
        let args: Array = inputs.iter().cloned().map(Dynamic::from).collect();
        engine
            .call_fn::<Dynamic>(&mut Scope::new(), ast, name, (args,))
            .map(|output| output.to_string())
            .map_err(|e| external_tool_error(name, &e.to_string()))
    })
}
