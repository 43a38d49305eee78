// tests/analyze_pipeline.rs
//! End-to-end runs of the engine over small Fortran trees.

use anyhow::Result;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::path::PathBuf;

use fortmap::config::Config;
use fortmap::core::{AnalyzeOptions, Engine, FormatOptions, RoutineKind, SourceRequest, EXTERNAL_MODULE};

const SOLVER: &str = r#"
module solver
  implicit none
contains
  subroutine alpha(x)
    real, intent(inout) :: x
    call beta(x)
    x = gamma(x)
  end subroutine alpha

  function beta(x) result(y)
    real :: x, y
    y = 2.0 * x
  end function beta
end module solver
"#;

const DRIVER: &str = r#"
program main
  use solver
  real :: v
  call alpha(v)
end program main

recursive subroutine walk(n)
  integer :: n
  if (n > 0) call walk(n - 1)
  call ALPHA(1.0)
  call beta&
       (2.0)
end subroutine walk
"#;

fn options(temp: &TempDir, request: SourceRequest, engine: &Engine) -> AnalyzeOptions {
    let mut options = engine.default_analyze_options(request);
    options.output_matrix = temp.child("out/matrix.csv").to_path_buf();
    options.output_inventory = temp.child("out/inventory.csv").to_path_buf();
    options
}

#[tokio::test]
async fn analyze_writes_all_three_artifacts() -> Result<()> {
    let temp = TempDir::new()?;
    let src = temp.child("src");
    src.child("solver.f90").write_str(SOLVER)?;
    src.child("driver.F90").write_str(DRIVER)?;
    src.child("README.md").write_str("call nothing(1)")?;

    let engine = Engine::with_config(Config::default())?;
    let options = options(&temp, SourceRequest::Directory(src.to_path_buf()), &engine);
    let run = engine.analyze(&options).await?;

    let result = &run.result;
    assert_eq!(result.matrix.row_labels(), ["alpha", "beta", "walk"]);
    assert_eq!(result.matrix.get("beta", "alpha"), Some(1));
    assert_eq!(result.matrix.get("alpha", "walk"), Some(1));
    assert_eq!(result.matrix.get("beta", "walk"), Some(1));
    assert_eq!(result.matrix.get("walk", "walk"), Some(0));
    assert_eq!(result.reordered.row_labels(), ["beta", "alpha", "walk"]);
    assert_eq!(result.reordered.col_labels(), ["walk", "alpha", "beta"]);

    temp.child("out/matrix.csv").assert(
        ",total_connectivity,walk,alpha,beta\nbeta,2,1,1,0\nalpha,1,1,0,0\nwalk,0,0,0,0\n",
    );
    temp.child("out/inventory.csv").assert(
        "obj_name,module_name,type\nwalk,External,subroutine\nalpha,solver,subroutine\nbeta,solver,function\n",
    );
    temp.child("out/extended_matrix.csv")
        .assert(predicate::str::starts_with(
            "obj_name,module_name,type,total_connectivity,walk,alpha,beta\n",
        ))
        .assert(predicate::str::contains("beta,solver,function,2,1,1,0\n"))
        .assert(predicate::str::contains("walk,External,subroutine,0,0,0,0\n"));

    assert_eq!(run.written.len(), 3);
    assert!(result.report.unmatched.is_empty());
    Ok(())
}

#[tokio::test]
async fn explicit_file_list_limits_the_universe() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("solver.f90").write_str(SOLVER)?;
    temp.child("driver.f90").write_str(DRIVER)?;

    let engine = Engine::with_config(Config::default())?;
    let request = engine.source_request(None, vec![temp.child("driver.f90").to_path_buf()]);
    let mut options = options(&temp, request, &engine);
    options.emit_inventory = false;
    options.emit_extended = false;

    let run = engine.analyze(&options).await?;

    // alpha and beta are declared elsewhere, so they count as external like `if`
    assert_eq!(run.result.matrix.row_labels(), ["walk"]);
    assert_eq!(run.result.stats.graph.external_references, 3);
    temp.child("out/matrix.csv").assert(",total_connectivity,walk\nwalk,0,0\n");
    temp.child("out/inventory.csv").assert(predicate::path::missing());
    Ok(())
}

#[tokio::test]
async fn missing_directory_yields_empty_artifacts() -> Result<()> {
    let temp = TempDir::new()?;
    let engine = Engine::with_config(Config::default())?;
    let missing = temp.child("nope").to_path_buf();
    let options = options(&temp, SourceRequest::Directory(missing.clone()), &engine);

    let run = engine.analyze(&options).await?;

    assert_eq!(run.missing_root, Some(missing));
    assert!(run.result.matrix.is_empty());
    temp.child("out/matrix.csv").assert(",total_connectivity\n");
    temp.child("out/inventory.csv").assert("obj_name,module_name,type\n");
    Ok(())
}

#[tokio::test]
async fn unreadable_file_is_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("good.f90").write_str("subroutine good()\n  call bad()\nend subroutine\n")?;
    temp.child("bad.f90").write_binary(&[0xc3, 0x28, 0x0a])?;

    let engine = Engine::with_config(Config::default())?;
    let options = options(&temp, SourceRequest::Directory(temp.to_path_buf()), &engine);
    let run = engine.analyze(&options).await?;

    assert_eq!(run.result.stats.files_analyzed, 1);
    assert_eq!(run.result.stats.files_skipped, 1);
    assert_eq!(run.result.matrix.row_labels(), ["good"]);
    Ok(())
}

#[tokio::test]
async fn inventory_command_sorts_by_module() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("solver.f90").write_str(SOLVER)?;
    temp.child("driver.f90").write_str(DRIVER)?;
    let output = temp.child("inventory.csv");

    let engine = Engine::with_config(Config::default())?;
    let records = engine
        .inventory(&SourceRequest::Directory(temp.to_path_buf()), Some(output.path()), false)
        .await?;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].module_name, EXTERNAL_MODULE);
    assert_eq!(records[2].obj_name, "beta");
    assert_eq!(records[2].kind, RoutineKind::Function);
    output.assert(predicate::str::starts_with("obj_name,module_name,type\nwalk,External,subroutine\n"));
    Ok(())
}

#[tokio::test]
async fn matrix_command_keeps_name_order() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("solver.f90").write_str(SOLVER)?;
    temp.child("driver.f90").write_str(DRIVER)?;
    let csv = temp.child("dependency_matrix.csv");

    let engine = Engine::with_config(Config::default())?;
    let matrix = engine
        .matrix(&SourceRequest::Directory(temp.to_path_buf()), Some(csv.path()))
        .await?;

    assert_eq!(matrix.row_labels(), ["alpha", "beta", "walk"]);
    csv.assert(",alpha,beta,walk\nalpha,0,0,1\nbeta,1,0,1\nwalk,0,0,0\n");
    Ok(())
}

#[test]
fn reorder_command_sorts_saved_matrix() -> Result<()> {
    let temp = TempDir::new()?;
    let input = temp.child("dependency_matrix.csv");
    input.write_str(",a,b,c\na,0,0,0\nb,1,0,1\nc,1,1,0\n")?;
    let output = temp.child("reordered.csv");

    let engine = Engine::with_config(Config::default())?;
    let reordered = engine.reorder(input.path(), Some(output.path()))?;

    assert_eq!(reordered.row_labels(), ["b", "c", "a"]);
    assert_eq!(reordered.col_labels(), ["a", "b", "c"]);
    output.assert(",a,b,c\nb,1,0,1\nc,1,1,0\na,0,0,0\n");
    Ok(())
}

#[test]
fn reorder_rejects_malformed_csv() -> Result<()> {
    let temp = TempDir::new()?;
    let input = temp.child("broken.csv");
    input.write_str(",a\na,maybe\n")?;

    let engine = Engine::with_config(Config::default())?;
    assert!(engine.reorder(input.path(), None).is_err());
    Ok(())
}

#[test]
fn format_dry_run_then_inplace() -> Result<()> {
    let temp = TempDir::new()?;
    let file = temp.child("src/loop.f90");
    file.write_str("subroutine s()\ndo i = 1, 3\ncall t(i)\nend do\nend subroutine\n")?;
    temp.child("src/notes.txt").write_str("do\n")?;

    let engine = Engine::with_config(Config::default())?;
    let paths: Vec<PathBuf> = vec![temp.child("src").to_path_buf()];
    let mut options = FormatOptions::from_config(&engine.config().format);

    options.dry_run = true;
    let summary = engine.format(&paths, &options, false);
    assert_eq!(summary.files, 1);
    assert_eq!(summary.changed, 1);
    file.assert(predicate::str::starts_with("subroutine s()\ndo i"));

    options.dry_run = false;
    options.inplace = true;
    engine.format(&paths, &options, false);
    file.assert("subroutine s()\n    do i = 1, 3\n        call t(i)\n    end do\nend subroutine\n");
    temp.child("src/loop.f90.bak").assert(predicate::path::exists());

    let summary = engine.format(&paths, &options, false);
    assert_eq!(summary.changed, 0);
    Ok(())
}
