//! Workflow engine
//!
//! This module runs the requested actions one after the other and saves the
//! registry at the end.

use std::io::Write;
use std::path::Path;

use log::{debug, info};

use crate::config::SystemInfo;
use crate::dispatch::{open_best_effort, open_pages_in_batch};
use crate::errors::{file_operation_error, Result};
use crate::export::export_batch;
use crate::naming::{latest_batch_number, next_batch_number};
use crate::project::{create_project, make_batch, make_page, CreateOutcome};

use super::context::{Actions, WorkflowContext, WorkflowStats};

/// Runs `actions`, writing listings to standard output
pub fn run(actions: &Actions, system: &mut SystemInfo) -> Result<WorkflowStats> {
    let stdout = std::io::stdout();
    run_with_output(actions, system, &mut stdout.lock())
}

/// Runs `actions`, writing listings to `out`
///
/// The steps are:
/// 1. Initialise a new project, register it and move into it
/// 2. Create batches and pages
/// 3. Export batches
/// 4. Deregister and open projects, open batches
/// 5. List projects, print or set the knot working directory
/// 6. Save the registry
///
/// # Errors
/// * Returns an error if an action needs the current project and the knot
///   working directory is not inside a registered one
/// * Returns the first error of any step; later steps are not run and the
///   registry is not saved. Opening an exported document or a project
///   directory for the user is not a step: a failure there is only logged.
pub fn run_with_output<W: Write>(
    actions: &Actions,
    system: &mut SystemInfo,
    out: &mut W,
) -> Result<WorkflowStats> {
    let mut context = WorkflowContext::new(actions, system)?;
    if actions.needs_project() {
        context.project()?;
    }
    let open = actions.open();

    // Step 1: Initialise
    if actions.project.init_name.is_some() {
        let project = context.project()?.clone();
        let outcome = create_project(&context.template_path()?, &project, open, context.system)?;
        if outcome == CreateOutcome::Created {
            context.stats.batches_created += 1;
        }
        info!("Registered project <{}>", project.name());
        context.system.set_knot_wd(&project.project_dir)?;
        context.registry.insert(project);
    }

    // Step 2: Batches and pages
    if actions.next_batch {
        let project = context.project()?;
        let batch_number = next_batch_number(project)?;
        make_batch(&context.template_path()?, project, batch_number, open, context.system)?;
        context.stats.batches_created += 1;
    }

    if let Some(batch_number) = actions.new_batch {
        let project = context.project()?;
        make_batch(&context.template_path()?, project, batch_number, open, context.system)?;
        context.stats.batches_created += 1;
    }

    if actions.next_page {
        let project = context.project()?;
        let batch_number = latest_batch_number(project)?;
        make_page(&context.template_path()?, project, batch_number, open, context.system)?;
        context.stats.pages_created += 1;
    }

    if let Some(batch_number) = actions.page_in {
        let project = context.project()?;
        make_page(&context.template_path()?, project, batch_number, open, context.system)?;
        context.stats.pages_created += 1;
    }

    // Step 3: Export
    if actions.export_latest {
        let project = context.project()?;
        let batch_number = latest_batch_number(project)?;
        let output = export_batch(batch_number, project, context.system)?;
        open_best_effort(context.system, &output, open);
        context.stats.batches_exported += 1;
    }

    if let Some(batch_number) = actions.export_batch {
        let project = context.project()?;
        let output = export_batch(batch_number, project, context.system)?;
        open_best_effort(context.system, &output, open);
        context.stats.batches_exported += 1;
    }

    // Step 4: Deregister and open
    if let Some(target) = &actions.deregister {
        let name = project_name(target);
        if let Some(removed) = context.registry.remove(&name) {
            writeln!(
                out,
                "deregistered project <{}>, found in <{}>",
                name,
                removed.project_dir.display()
            )
            .map_err(|e| file_operation_error(e, removed.project_dir.clone(), "print"))?;
        } else {
            debug!("No project called <{name}> to deregister");
        }
    }

    if let Some(target) = &actions.open_project {
        let project = context.registry.lookup(&project_name(target))?.clone();
        open_best_effort(context.system, &project.project_dir, true);
        let batch_number = latest_batch_number(&project)?;
        open_pages_in_batch(context.system, &project, batch_number, open)?;
        context.system.set_knot_wd(&project.project_dir)?;
    }

    if let Some(batch_number) = actions.open_batch {
        open_pages_in_batch(context.system, context.project()?, batch_number, true)?;
    }

    // Step 5: Listing and working directory
    if actions.list {
        print_projects(&context, out)?;
    }

    if actions.print_wd {
        let knot_wd = context.system.knot_wd.clone();
        writeln!(out, "{}", knot_wd.display())
            .map_err(|e| file_operation_error(e, knot_wd.clone(), "print"))?;
    }

    if let Some(dir) = &actions.set_wd {
        context.system.set_knot_wd(dir)?;
    }

    // Step 6: Save
    context.registry.save(&context.system.projects_file)?;

    debug!("Finished with {:?}", context.stats);
    Ok(context.stats)
}

/// Registry key for a project given by name or by path
fn project_name(target: &str) -> String {
    Path::new(target)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.to_string())
}

fn print_projects<W: Write>(context: &WorkflowContext, out: &mut W) -> Result<()> {
    let print = |e| file_operation_error(e, context.system.projects_file.clone(), "print");

    writeln!(out, "registered projects:").map_err(print)?;
    for (name, project) in &context.registry {
        writeln!(
            out,
            "\t project <{}> in <{}>",
            name,
            project.project_dir.display()
        )
        .map_err(print)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use std::rc::Rc;

    use image::{Rgba, RgbaImage};
    use tempfile::{tempdir, TempDir};

    use crate::errors::generic_error;
    use crate::project::ProjectOptions;
    use crate::registry::Registry;
    use crate::runner::CommandRunner;

    struct Fixture {
        _config: TempDir,
        _scratch: TempDir,
        workspace: TempDir,
        system: SystemInfo,
        opened: Rc<RefCell<Vec<String>>>,
    }

    fn fixture() -> Fixture {
        let config = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let workspace = tempdir().unwrap();
        let mut system = SystemInfo::from_dirs(config.path(), scratch.path()).unwrap();
        system.set_knot_wd(workspace.path()).unwrap();

        let opened = Rc::new(RefCell::new(Vec::new()));
        let recorder = {
            let opened = opened.clone();
            CommandRunner::callback("recorder", move |inputs| {
                opened.borrow_mut().extend(inputs.iter().cloned());
                Ok(String::new())
            })
        };
        system.tools.image_editor = recorder.clone();
        system.tools.file_browser = recorder.clone();
        system.tools.pdf_viewer = recorder;

        let template = system.template_path("default").join("batch");
        fs::create_dir_all(&template).unwrap();
        fs::write(template.join("page.kra"), b"blank").unwrap();

        Fixture {
            _config: config,
            _scratch: scratch,
            workspace,
            system,
            opened,
        }
    }

    fn init(name: &str) -> Actions {
        Actions {
            silent: true,
            project: ProjectOptions {
                init_name: Some(name.to_string()),
                ..ProjectOptions::default()
            },
            ..Actions::default()
        }
    }

    fn run_quietly(actions: &Actions, system: &mut SystemInfo) -> Result<String> {
        let mut out = Vec::new();
        run_with_output(actions, system, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_init_registers_and_moves_into_project() {
        let mut f = fixture();
        let stats = run_with_output(&init("comic"), &mut f.system, &mut Vec::new()).unwrap();
        assert_eq!(stats.batches_created, 1);

        let project_dir = f.workspace.path().join("comic");
        assert!(project_dir.join("comic-0").join("page-0.kra").is_file());
        assert_eq!(f.system.knot_wd, project_dir);

        let registry = Registry::load(&f.system.projects_file).unwrap();
        assert_eq!(registry.get("comic").unwrap().project_dir, project_dir);
        assert!(f.opened.borrow().is_empty());
    }

    #[test]
    fn test_init_opens_seed_page_unless_silent() {
        let mut f = fixture();
        let actions = Actions {
            silent: false,
            ..init("comic")
        };
        run_quietly(&actions, &mut f.system).unwrap();

        let seed = f.workspace.path().join("comic").join("comic-0").join("page-0.kra");
        assert_eq!(*f.opened.borrow(), vec![seed.to_string_lossy().into_owned()]);
    }

    #[test]
    fn test_batches_and_pages_inside_project() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();

        let actions = Actions {
            silent: true,
            next_batch: true,
            next_page: true,
            ..Actions::default()
        };
        let stats = run_with_output(&actions, &mut f.system, &mut Vec::new()).unwrap();
        assert_eq!(stats.batches_created, 1);
        assert_eq!(stats.pages_created, 1);

        let project_dir = f.workspace.path().join("comic");
        assert!(project_dir.join("comic-1").join("page-0.kra").is_file());
        assert!(project_dir.join("comic-1").join("page-1.kra").is_file());
        assert!(!project_dir.join("comic-0").join("page-1.kra").exists());

        let actions = Actions {
            silent: true,
            page_in: Some(0),
            ..Actions::default()
        };
        run_quietly(&actions, &mut f.system).unwrap();
        assert!(project_dir.join("comic-0").join("page-1.kra").is_file());
    }

    #[test]
    fn test_project_actions_outside_project_fail() {
        let mut f = fixture();
        let actions = Actions {
            next_batch: true,
            ..Actions::default()
        };
        let result = run_quietly(&actions, &mut f.system);
        assert!(matches!(
            result,
            Err(crate::errors::Error::NotInProject { .. })
        ));
    }

    #[test]
    fn test_list_and_print_wd_outside_project() {
        let mut f = fixture();
        let actions = Actions {
            list: true,
            print_wd: true,
            ..Actions::default()
        };
        let output = run_quietly(&actions, &mut f.system).unwrap();
        assert_eq!(
            output,
            format!("registered projects:\n{}\n", f.workspace.path().display())
        );
    }

    #[test]
    fn test_list_deregister() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();
        f.system.set_knot_wd(f.workspace.path()).unwrap();
        run_quietly(&init("sketches"), &mut f.system).unwrap();

        let output = run_quietly(
            &Actions {
                list: true,
                ..Actions::default()
            },
            &mut f.system,
        )
        .unwrap();
        assert!(output.contains("project <comic> in <"));
        assert!(output.contains("project <sketches> in <"));

        let comic_dir = f.workspace.path().join("comic");
        let output = run_quietly(
            &Actions {
                deregister: Some(comic_dir.to_string_lossy().into_owned()),
                ..Actions::default()
            },
            &mut f.system,
        )
        .unwrap();
        assert_eq!(
            output,
            format!(
                "deregistered project <comic>, found in <{}>\n",
                comic_dir.display()
            )
        );

        let registry = Registry::load(&f.system.projects_file).unwrap();
        assert!(registry.get("comic").is_none());
        assert!(registry.get("sketches").is_some());
        assert!(comic_dir.is_dir());
    }

    #[test]
    fn test_deregister_unknown_project_is_quiet() {
        let mut f = fixture();
        let output = run_quietly(
            &Actions {
                deregister: Some("nothing".to_string()),
                ..Actions::default()
            },
            &mut f.system,
        )
        .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_open_project_moves_into_it() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();
        f.system.set_knot_wd(f.workspace.path()).unwrap();

        let actions = Actions {
            open_project: Some("comic".to_string()),
            ..Actions::default()
        };
        run_quietly(&actions, &mut f.system).unwrap();

        let project_dir = f.workspace.path().join("comic");
        assert_eq!(f.system.knot_wd, project_dir);
        let opened = f.opened.borrow();
        assert_eq!(opened[0], project_dir.to_string_lossy());
        assert!(opened[1].ends_with("page-0.kra"));
    }

    #[test]
    fn test_open_unknown_project_fails() {
        let mut f = fixture();
        let actions = Actions {
            open_project: Some("nothing".to_string()),
            ..Actions::default()
        };
        assert!(run_quietly(&actions, &mut f.system).is_err());
    }

    #[test]
    fn test_open_batch_ignores_silent() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();

        let actions = Actions {
            silent: true,
            open_batch: Some(0),
            ..Actions::default()
        };
        run_quietly(&actions, &mut f.system).unwrap();
        assert_eq!(f.opened.borrow().len(), 1);
    }

    #[test]
    fn test_set_wd() {
        let mut f = fixture();
        let target = f.workspace.path().join("elsewhere");
        let actions = Actions {
            set_wd: Some(target.clone()),
            ..Actions::default()
        };
        run_quietly(&actions, &mut f.system).unwrap();
        assert_eq!(f.system.knot_wd, target);

        let reloaded =
            SystemInfo::from_dirs(&f.system.config_dir, f.system.scratch_file.parent().unwrap())
                .unwrap();
        assert_eq!(reloaded.knot_wd, PathBuf::from(&target));
    }

    fn failing(program: &str) -> CommandRunner {
        let message = format!("{program} not installed");
        CommandRunner::callback(program, move |_| Err(generic_error(&message)))
    }

    fn png_rasterizer() -> CommandRunner {
        CommandRunner::callback("rasterizer", |inputs| {
            RgbaImage::from_pixel(4, 6, Rgba([90, 90, 90, 255]))
                .save(&inputs[1])
                .map_err(|e| generic_error(&e.to_string()))?;
            Ok(String::new())
        })
    }

    #[test]
    fn test_export_survives_missing_viewer() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();
        f.system.tools.rasterizer = png_rasterizer();
        f.system.tools.pdf_viewer = failing("evince");

        let elsewhere = f.workspace.path().join("elsewhere");
        let actions = Actions {
            export_latest: true,
            export_batch: Some(0),
            list: true,
            set_wd: Some(elsewhere.clone()),
            ..Actions::default()
        };
        let mut out = Vec::new();
        let stats = run_with_output(&actions, &mut f.system, &mut out).unwrap();

        assert_eq!(stats.batches_exported, 2);
        let pdf = f.workspace.path().join("comic").join("comic-0").join("comic-0.pdf");
        assert!(pdf.is_file());
        assert!(String::from_utf8(out).unwrap().contains("project <comic>"));
        assert_eq!(f.system.knot_wd, elsewhere);
    }

    #[test]
    fn test_open_project_survives_missing_file_browser() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();
        f.system.set_knot_wd(f.workspace.path()).unwrap();
        f.system.tools.file_browser = failing("nautilus");

        let actions = Actions {
            open_project: Some("comic".to_string()),
            ..Actions::default()
        };
        run_quietly(&actions, &mut f.system).unwrap();

        assert_eq!(f.system.knot_wd, f.workspace.path().join("comic"));
        let opened = f.opened.borrow();
        assert_eq!(opened.len(), 1);
        assert!(opened[0].ends_with("page-0.kra"));
    }

    #[test]
    fn test_new_batch_and_page_survive_missing_editor() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();
        f.system.tools.image_editor = failing("krita");

        let actions = Actions {
            silent: false,
            next_batch: true,
            next_page: true,
            ..Actions::default()
        };
        let stats = run_with_output(&actions, &mut f.system, &mut Vec::new()).unwrap();
        assert_eq!(stats.batches_created, 1);
        assert_eq!(stats.pages_created, 1);
        assert!(f
            .workspace
            .path()
            .join("comic")
            .join("comic-1")
            .join("page-1.kra")
            .is_file());
    }

    #[test]
    fn test_open_batch_propagates_editor_failure() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();
        f.system.tools.image_editor = failing("krita");

        let actions = Actions {
            open_batch: Some(0),
            ..Actions::default()
        };
        assert!(matches!(
            run_quietly(&actions, &mut f.system),
            Err(crate::errors::Error::Generic { .. })
        ));
    }

    #[test]
    fn test_export_compresses_with_configured_quality() {
        let mut f = fixture();
        run_quietly(&init("comic"), &mut f.system).unwrap();
        f.system.tools.rasterizer = png_rasterizer();
        f.system.config.export_quality = 100;

        let settings = Rc::new(RefCell::new(Vec::new()));
        f.system.tools.compressor = {
            let settings = settings.clone();
            CommandRunner::callback("gs", move |inputs| {
                settings.borrow_mut().push(inputs[0].clone());
                fs::copy(&inputs[2], &inputs[1])?;
                Ok(String::new())
            })
        };

        let actions = Actions {
            silent: true,
            export_latest: true,
            ..Actions::default()
        };
        run_quietly(&actions, &mut f.system).unwrap();
        assert_eq!(*settings.borrow(), vec!["/default".to_string()]);
    }

    #[test]
    fn test_project_name_from_path() {
        assert_eq!(project_name("comic"), "comic");
        assert_eq!(project_name("/home/me/comic"), "comic");
        assert_eq!(project_name("/home/me/comic/"), "comic");
    }
}
