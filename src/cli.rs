use std::path::PathBuf;

use clap::{
    command, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgAction, ArgMatches, Command,
};

use crate::constants::{
    CONTENT_DIR_HELP, CONTENT_NAME_HELP, DEFAULT_EXPORT_DIR, DEFAULT_TEMPLATE, DEREGISTER_HELP,
    EXPORT_BATCH_HELP, EXPORT_DIR_HELP, EXPORT_HELP, INIT_HELP, LIST_HELP, LOG_FILE_HELP,
    NEW_BATCH_HELP, NEXT_BATCH_HELP, NEXT_PAGE_HELP, OPEN_BATCH_HELP, OPEN_HELP, PAGE_IN_HELP,
    PWD_HELP, SET_WD_HELP, SILENT_HELP, TEMPLATE_HELP, VERBOSE_HELP,
};
use crate::logging::LogLevel;
use crate::project::ProjectOptions;
use crate::workflow::Actions;

fn flag(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).help(help).action(ArgAction::SetTrue)
}

fn batch_number(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_name("N")
        .help(help)
        .value_parser(value_parser!(u32))
}

/// Defines the command-line interface
///
/// Every action is a flag and several of them may be combined in one
/// invocation.
pub fn build_command() -> Command {
    command!()
        .author(crate_authors!())
        .about(crate_description!())
        .name(crate_name!())
        .version(crate_version!())
        .arg(flag("silent", SILENT_HELP).short('s').long("silent"))
        .arg(
            Arg::new("content_dir")
                .long("content-dir")
                .value_name("NAME")
                .help(CONTENT_DIR_HELP)
                .default_value(""),
        )
        .arg(
            Arg::new("content_name")
                .short('c')
                .long("content-name")
                .value_name("NAME")
                .help(CONTENT_NAME_HELP),
        )
        .arg(
            Arg::new("init")
                .short('i')
                .long("init")
                .value_name("NAME")
                .help(INIT_HELP),
        )
        .arg(flag("batch", NEXT_BATCH_HELP).short('b').long("batch"))
        .arg(batch_number("new-batch", NEW_BATCH_HELP))
        .arg(flag("page", NEXT_PAGE_HELP).short('p').long("page"))
        .arg(batch_number("page-in", PAGE_IN_HELP).value_name("BATCH"))
        .arg(flag("export", EXPORT_HELP).short('e').long("export"))
        .arg(batch_number("export-batch", EXPORT_BATCH_HELP))
        .arg(
            Arg::new("export_dir")
                .long("export-dir")
                .value_name("NAME")
                .help(EXPORT_DIR_HELP)
                .default_value(DEFAULT_EXPORT_DIR),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("NAME")
                .help(TEMPLATE_HELP)
                .default_value(DEFAULT_TEMPLATE),
        )
        .arg(
            Arg::new("deregister")
                .short('d')
                .long("deregister")
                .value_name("NAME")
                .help(DEREGISTER_HELP),
        )
        .arg(
            Arg::new("open")
                .short('o')
                .long("open")
                .value_name("NAME")
                .help(OPEN_HELP),
        )
        .arg(batch_number("open-batch", OPEN_BATCH_HELP))
        .arg(flag("list", LIST_HELP).short('l').long("list"))
        .arg(flag("pwd", PWD_HELP).long("pwd"))
        .arg(
            Arg::new("wd")
                .long("wd")
                .value_name("DIR")
                .help(SET_WD_HELP)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help(VERBOSE_HELP)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .value_name("FILE")
                .help(LOG_FILE_HELP)
                .value_parser(value_parser!(PathBuf)),
        )
}

/// Parses the process arguments, exiting with usage on error
pub fn get_matches() -> ArgMatches {
    build_command().get_matches()
}

/// Collects the requested actions from the command-line arguments
pub fn get_actions(matches: &ArgMatches) -> Actions {
    let string = |id: &str| matches.get_one::<String>(id).cloned();
    let number = |id: &str| matches.get_one::<u32>(id).copied();

    Actions {
        silent: matches.get_flag("silent"),
        project: ProjectOptions {
            init_name: string("init"),
            content_dir_name: string("content_dir").unwrap_or_default(),
            content_name: string("content_name"),
            export_dir_name: string("export_dir")
                .unwrap_or_else(|| DEFAULT_EXPORT_DIR.to_string()),
            template_name: string("template").unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
        },
        next_batch: matches.get_flag("batch"),
        new_batch: number("new-batch"),
        next_page: matches.get_flag("page"),
        page_in: number("page-in"),
        export_latest: matches.get_flag("export"),
        export_batch: number("export-batch"),
        deregister: string("deregister"),
        open_project: string("open"),
        open_batch: number("open-batch"),
        list: matches.get_flag("list"),
        print_wd: matches.get_flag("pwd"),
        set_wd: matches.get_one::<PathBuf>("wd").cloned(),
    }
}

/// Gets the verbosity level from the number of `-v` flags
///
/// # Examples
/// ```
/// # use knot::cli::{build_command, get_verbosity};
/// # use knot::logging::LogLevel;
/// let matches = build_command().get_matches_from(["knot", "-vv"]);
/// assert_eq!(get_verbosity(&matches), LogLevel::Trace);
/// ```
pub fn get_verbosity(matches: &ArgMatches) -> LogLevel {
    let verbose_count = matches.get_count("verbose");
    LogLevel::from_occurrences(verbose_count)
}

pub fn get_log_file(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<PathBuf>("log_file").cloned()
}
