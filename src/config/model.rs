//! Configuration data structures
//!
//! This module contains the user configuration read from `config.yaml` and
//! `config.rhai`, and the external tools resolved from it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMPRESSOR, DEFAULT_FILE_BROWSER, DEFAULT_IMAGE_EDITOR, DEFAULT_PDF_VIEWER,
};
use crate::export::{merged_image_rasterizer, CompressionLevel};
use crate::runner::CommandRunner;

/// Settings naming a tool, in `config.yaml` and in `config.rhai`
pub const TOOL_NAMES: [&str; 5] = [
    "pdf_viewer",
    "file_browser",
    "image_editor",
    "rasterizer",
    "compressor",
];

/// A configured external command
///
/// Either a whole command line as one string, or a program with an
/// argument template in which `{}` stands for the inputs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandSetting {
    /// `pdf_viewer: zathura --fork`
    Command(String),
    /// `pdf_viewer: { program: zathura, args: ["--fork", "{}"] }`
    Detailed {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// User configuration
///
/// Every field is optional; anything left out falls back to the built-in
/// defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Program opening exported documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_viewer: Option<CommandSetting>,
    /// Program opening directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_browser: Option<CommandSetting>,
    /// Program opening native pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_editor: Option<CommandSetting>,
    /// Program rasterizing a native page; inputs are source and destination.
    /// Without one, the flattened image inside the page is copied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rasterizer: Option<CommandSetting>,
    /// Program compressing a PDF; inputs are the settings preset, the
    /// output file and the input file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressor: Option<CommandSetting>,
    /// Compression level applied after export, 0 disables compression
    pub export_quality: i64,
    /// File receiving a copy of the log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Preset of the compression pass, `None` when `export_quality` is 0
    pub fn compression_level(&self) -> Option<CompressionLevel> {
        (self.export_quality != 0).then(|| CompressionLevel::from_int(self.export_quality))
    }

    /// The setting of the tool called `name`
    pub fn tool_setting_mut(&mut self, name: &str) -> Option<&mut Option<CommandSetting>> {
        match name {
            "pdf_viewer" => Some(&mut self.pdf_viewer),
            "file_browser" => Some(&mut self.file_browser),
            "image_editor" => Some(&mut self.image_editor),
            "rasterizer" => Some(&mut self.rasterizer),
            "compressor" => Some(&mut self.compressor),
            _ => None,
        }
    }
}

/// External programs resolved from the configuration
#[derive(Debug, Clone)]
pub struct Tools {
    pub pdf_viewer: CommandRunner,
    pub file_browser: CommandRunner,
    pub image_editor: CommandRunner,
    pub rasterizer: CommandRunner,
    pub compressor: CommandRunner,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            pdf_viewer: CommandRunner::program(DEFAULT_PDF_VIEWER),
            file_browser: CommandRunner::program(DEFAULT_FILE_BROWSER),
            image_editor: CommandRunner::program(DEFAULT_IMAGE_EDITOR),
            rasterizer: merged_image_rasterizer(),
            compressor: CommandRunner::with_args(
                DEFAULT_COMPRESSOR,
                &[
                    "-dBATCH",
                    "-dNOPAUSE",
                    "-q",
                    "-sDEVICE=pdfwrite",
                    "-dPDFSETTINGS={}",
                    "-sOutputFile={}",
                    "{}",
                ],
            ),
        }
    }
}

impl Tools {
    /// Resolves every tool once, preferring configured commands
    pub fn from_config(config: &Config) -> Self {
        let defaults = Tools::default();
        let pick = |setting: &Option<CommandSetting>, default: CommandRunner| match setting {
            Some(setting) => CommandRunner::from_setting(setting),
            None => default,
        };

        Tools {
            pdf_viewer: pick(&config.pdf_viewer, defaults.pdf_viewer),
            file_browser: pick(&config.file_browser, defaults.file_browser),
            image_editor: pick(&config.image_editor, defaults.image_editor),
            rasterizer: pick(&config.rasterizer, defaults.rasterizer),
            compressor: pick(&config.compressor, defaults.compressor),
        }
    }

    /// Replaces tools by the runners bound to their names
    pub fn bind(&mut self, bindings: Vec<(&str, CommandRunner)>) {
        for (name, runner) in bindings {
            let slot = match name {
                "pdf_viewer" => &mut self.pdf_viewer,
                "file_browser" => &mut self.file_browser,
                "image_editor" => &mut self.image_editor,
                "rasterizer" => &mut self.rasterizer,
                "compressor" => &mut self.compressor,
                _ => continue,
            };
            *slot = runner;
        }
    }
}
