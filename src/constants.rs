//! Constants used throughout the application
//!
//! This module centralises file names, defaults and help texts.

/// Qualifier string used for application identification
pub const QUALIFIER: &str = "";

/// Organisation name used for application identification
pub const ORGANIZATION: &str = "";

/// Application name, also the name of the configuration directory
pub const APPLICATION: &str = "knot";

/// Registry of projects inside the configuration directory
pub const PROJECTS_FILE: &str = "projects.json";

/// User configuration inside the configuration directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Directory holding the template sets inside the configuration directory
pub const TEMPLATES_DIR: &str = "templates";

/// Scratch file in the temp directory persisting the knot working directory
pub const SCRATCH_FILE: &str = "knotconfig.json";

/// Subdirectory of a template that is copied for every new batch
pub const TEMPLATE_BATCH_DIR: &str = "batch";

/// Seed page inside the template batch directory
pub const TEMPLATE_PAGE: &str = "page.kra";

/// Extension of the native, editable page format
pub const NATIVE_EXTENSION: &str = "kra";

/// Flattened image stored inside every native page archive
pub const MERGED_IMAGE: &str = "mergedimage.png";

/// Script that can bind tools to functions, inside the configuration
/// directory
pub const SCRIPT_FILE: &str = "config.rhai";

/// Extension of rasterized pages
pub const RASTER_EXTENSION: &str = "png";

/// Extension of exported documents
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// A4 page size in PDF points
pub const PAGE_WIDTH_PT: i64 = 595;
pub const PAGE_HEIGHT_PT: i64 = 842;

pub const DEFAULT_EXPORT_DIR: &str = "export";
pub const DEFAULT_TEMPLATE: &str = "default";

pub const DEFAULT_PDF_VIEWER: &str = "evince";
pub const DEFAULT_FILE_BROWSER: &str = "nautilus";
pub const DEFAULT_IMAGE_EDITOR: &str = "krita";
pub const DEFAULT_COMPRESSOR: &str = "gs";

// Help texts for the command-line options
pub const SILENT_HELP: &str = "Silent mode; disable automatic opening of files";
pub const CONTENT_DIR_HELP: &str = "Name the directory of the content files. If none is specified, they are placed at the top level of the project directory";
pub const CONTENT_NAME_HELP: &str = "Name of the content files. If none is specified, the name of the project directory is used";
pub const INIT_HELP: &str = "Initialise a new project directory with the given name inside the knot working directory, or register an existing one";
pub const NEXT_BATCH_HELP: &str = "Create the next batch of pages";
pub const NEW_BATCH_HELP: &str = "Create a new batch with the given batch number";
pub const NEXT_PAGE_HELP: &str = "Create the next page in the latest batch";
pub const PAGE_IN_HELP: &str = "Create the next page in the batch with the given number";
pub const EXPORT_HELP: &str = "Export the latest batch to pdf";
pub const EXPORT_BATCH_HELP: &str = "Export the batch with the given number to pdf";
pub const EXPORT_DIR_HELP: &str = "The subdirectory in each batch where pages are rasterized to";
pub const TEMPLATE_HELP: &str = "The template used for new batches and pages";
pub const DEREGISTER_HELP: &str = "Remove the named project from the projects list";
pub const OPEN_HELP: &str = "Open the named project and the latest batch in it";
pub const OPEN_BATCH_HELP: &str = "Open all pages of the batch with the given number. Ignores silent mode";
pub const LIST_HELP: &str = "List all registered projects";
pub const PWD_HELP: &str = "Print the current knot working directory";
pub const SET_WD_HELP: &str = "Set the current knot working directory";
pub const VERBOSE_HELP: &str = "Increase verbosity level (can be used multiple times)";
pub const LOG_FILE_HELP: &str = "Also write log records to the given file";
