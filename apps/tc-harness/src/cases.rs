// cases.rs — The cases this binary runs.
//
// Each case gets the shared TestContext with an empty sandbox and no live
// console instance. Assertions panic (the runner records a failure); sandbox
// errors propagate with `?` and end the run.

use std::fs;

use tc_console::{CaptureBuffer, UsageDefect};
use tc_sandbox::{current_directory, SandboxError};

use crate::context::TestContext;
use crate::error::HarnessError;
use crate::fixture_console::FixtureOptions;
use crate::runner::TestCase;

pub fn registered() -> Vec<TestCase> {
    vec![
        TestCase::new("sandbox_starts_empty", sandbox_starts_empty),
        TestCase::new("erase_removes_nested_tree", erase_removes_nested_tree),
        TestCase::new("scoped_write_round_trips", scoped_write_round_trips),
        TestCase::new("scoped_write_rejects_outside_path", scoped_write_rejects_outside_path),
        TestCase::new("wide_fixture_keeps_zero_bytes", wide_fixture_keeps_zero_bytes),
        TestCase::new("second_instance_replaces_stale", second_instance_replaces_stale),
        TestCase::new("invalid_options_are_captured", invalid_options_are_captured),
        TestCase::new("missing_input_file_is_reported", missing_input_file_is_reported),
        TestCase::new("format_trims_trailing_whitespace", format_trims_trailing_whitespace),
        TestCase::new("current_directory_is_known", current_directory_is_known),
    ]
}

fn entries(ctx: &TestContext) -> Result<usize, HarnessError> {
    let root = ctx.sandbox.root().path();
    let count = fs::read_dir(root)
        .map_err(|source| SandboxError::Io {
            path: root.to_path_buf(),
            source,
        })?
        .count();
    Ok(count)
}

fn sandbox_starts_empty(ctx: &mut TestContext) -> Result<(), HarnessError> {
    assert!(ctx.sandbox.root().path().is_dir());
    assert_eq!(entries(ctx)?, 0);
    Ok(())
}

fn erase_removes_nested_tree(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let sandbox = &ctx.sandbox;
    sandbox.create_scoped_dir(sandbox.path("a"))?;
    sandbox.write_scoped_file(sandbox.path("a").join("b.txt"), "b")?;
    sandbox.create_scoped_dir(sandbox.path("c"))?;

    let report = sandbox.erase()?;

    assert!(report.is_clean());
    assert_eq!(report.files_removed, 1);
    assert_eq!(report.dirs_removed, 2);
    assert!(sandbox.root().path().is_dir());
    assert_eq!(entries(ctx)?, 0);
    Ok(())
}

fn scoped_write_round_trips(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let path = ctx.sandbox.path("f.txt");
    ctx.sandbox.write_scoped_file(&path, "hello")?;
    assert_eq!(fs::read_to_string(&path).ok().as_deref(), Some("hello"));

    ctx.sandbox.write_scoped_file(&path, "hi")?;
    assert_eq!(fs::read_to_string(&path).ok().as_deref(), Some("hi"));

    ctx.sandbox.remove_scoped_file(&path)?;
    ctx.sandbox.remove_scoped_file(&path)?;
    assert!(!path.exists());
    Ok(())
}

fn scoped_write_rejects_outside_path(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let root = ctx.sandbox.root().path();
    let sibling = root.with_file_name("ut-testcon-sibling.txt");
    let escaped = ctx.sandbox.path("..").join("escaped.txt");

    for target in [&sibling, &escaped] {
        let result = ctx.sandbox.write_scoped_file(target, "x");
        assert!(
            matches!(result, Err(SandboxError::OutsideSandbox { .. })),
            "write to {} was not rejected",
            target.display()
        );
        assert!(!target.exists());
    }
    assert!(!ctx.sandbox.write_options_file(&sibling, "--indent=tab"));
    Ok(())
}

fn wide_fixture_keeps_zero_bytes(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let utf16: Vec<u8> = "\u{FEFF}int x;\n"
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    let path = ctx.sandbox.path("wide16.cpp");
    ctx.sandbox.write_scoped_bytes(&path, &utf16)?;

    let read = fs::read(&path).ok();
    assert_eq!(read.as_deref(), Some(utf16.as_slice()));
    assert!(utf16.contains(&0));
    Ok(())
}

fn second_instance_replaces_stale(ctx: &mut TestContext) -> Result<(), HarnessError> {
    ctx.console.create_instance(FixtureOptions::default());
    ctx.console.create_instance(FixtureOptions::default());

    assert!(ctx.console.is_live());
    assert_eq!(ctx.console.take_defects(), vec![UsageDefect::StaleInstance]);

    ctx.console.destroy_instance();
    assert!(!ctx.console.is_live());
    Ok(())
}

fn invalid_options_are_captured(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let options = ctx.sandbox.path("options.rc");
    if !ctx.sandbox.write_options_file(&options, "--indent=spaces\nbad-option\n") {
        return Err(HarnessError::defect("cannot write options test file"));
    }

    let capture = CaptureBuffer::new();
    ctx.console.diagnostics().redirect(capture.clone());
    let console = ctx.console.create_instance(FixtureOptions {
        options_file: Some(options),
        files: Vec::new(),
    });
    let ok = console.process_options();
    ctx.console.diagnostics().restore();
    ctx.console.destroy_instance();

    assert!(!ok);
    assert_eq!(capture.contents(), "Invalid option file options:\nbad-option\n");
    Ok(())
}

fn missing_input_file_is_reported(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let missing = ctx.sandbox.path("missing.cpp");

    let capture = CaptureBuffer::new();
    ctx.console.diagnostics().redirect(capture.clone());
    let changed = ctx
        .console
        .create_instance(FixtureOptions {
            options_file: None,
            files: vec![missing.clone()],
        })
        .format_files();
    ctx.console.diagnostics().restore();
    ctx.console.destroy_instance();

    assert_eq!(changed, 0);
    assert_eq!(
        capture.contents(),
        format!("Cannot open input file {}\n", missing.display())
    );
    Ok(())
}

fn format_trims_trailing_whitespace(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let source = ctx.sandbox.path("src");
    ctx.sandbox.create_scoped_dir(&source)?;
    let file = source.join("main.cpp");
    ctx.sandbox
        .write_scoped_file(&file, "int main()  \n{\t\n    return 0;\n}\n")?;

    let changed = ctx
        .console
        .create_instance(FixtureOptions {
            options_file: None,
            files: vec![file.clone()],
        })
        .format_files();
    ctx.console.destroy_instance();

    assert_eq!(changed, 1);
    assert_eq!(
        fs::read_to_string(&file).ok().as_deref(),
        Some("int main()\n{\n    return 0;\n}\n")
    );
    Ok(())
}

fn current_directory_is_known(_ctx: &mut TestContext) -> Result<(), HarnessError> {
    let cwd = current_directory()?;
    assert!(cwd.is_absolute());
    Ok(())
}
