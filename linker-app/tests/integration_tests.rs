use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::fs;
use std::path::PathBuf;
use std::process::Command; // Run programs
use tempfile::tempdir; // Create temporary directories for testing

// Writes `content` to `name` under `dir`, creating parent directories.
fn write_shader(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create shader directory");
    }
    fs::write(&path, content).expect("Failed to write shader file");
    path
}

fn linker(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shader-linker").expect("Binary not built");
    // Keep configuration from the caller's environment out of the run.
    cmd.current_dir(dir.path())
        .env_remove("SHADER_LINKER_MODE")
        .env_remove("SHADER_LINKER_ASSET_ROOTS")
        .env_remove("SHADER_LINKER_IMPORT_MARKERS")
        .env_remove("SHADER_LINKER_CACHE_TTL")
        .env_remove("SHADER_LINKER_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_flatten_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write_shader(&tmp_dir, "lib.glsllib", "float helper(){ return 1.0; }\n");
    let root = write_shader(
        &tmp_dir,
        "main.frag",
        "#extension GL_OES_standard_derivatives : enable\n#import \"lib.glsllib\"\nvoid main(){}\n",
    );

    linker(&tmp_dir).arg(&root).assert().success().stdout(
        "#extension GL_OES_standard_derivatives : enable\nfloat helper(){ return 1.0; }\nvoid main(){}\n",
    );
    Ok(())
}

#[test]
fn test_asset_roots_and_markers() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write_shader(&tmp_dir, "assets/Common/Lighting.glsllib", "vec3 light;\n");
    let root = write_shader(
        &tmp_dir,
        "shaders/main.frag",
        "#import \"Common/Lighting.glsllib\"\nvoid main(){}\n",
    );

    linker(&tmp_dir)
        .arg(&root)
        .arg("--asset-root")
        .arg(tmp_dir.path().join("assets"))
        .arg("--import-markers")
        .assert()
        .success()
        .stdout(
            "//-- begin import Common/Lighting.glsllib --\nvec3 light;\n//-- end import Common/Lighting.glsllib --\nvoid main(){}\n",
        );
    Ok(())
}

#[test]
fn test_units_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write_shader(&tmp_dir, "a.glsllib", "#import \"b.glsllib\"\nfloat a;\n");
    write_shader(&tmp_dir, "b.glsllib", "float b;\n");
    let root = write_shader(&tmp_dir, "main.frag", "#import \"a.glsllib\"\nvoid main(){}\n");
    let output_file = tmp_dir.path().join("out/main.json");

    linker(&tmp_dir)
        .arg(&root)
        .arg("--mode")
        .arg("units")
        .arg("-o")
        .arg(&output_file)
        .assert()
        .success();

    assert!(output_file.exists(), "Output file was not created");
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output_file)?)?;
    assert_eq!(json["main"], "void main(){}\n");
    assert_eq!(json["units"]["a.glsllib"], "float a;\n");
    assert_eq!(json["units"]["b.glsllib"], "float b;\n");
    assert_eq!(json["stats"]["modules"], 3);
    Ok(())
}

#[test]
fn test_missing_module_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let root = write_shader(&tmp_dir, "main.frag", "#import \"nowhere.glsllib\"\n");

    linker(&tmp_dir)
        .arg(&root)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("nowhere.glsllib"));
    Ok(())
}

#[test]
fn test_cycle_reports_path() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write_shader(&tmp_dir, "a.glsllib", "#import \"b.glsllib\"\n");
    write_shader(&tmp_dir, "b.glsllib", "#import \"a.glsllib\"\n");
    let root = write_shader(&tmp_dir, "main.frag", "#import \"a.glsllib\"\n");

    linker(&tmp_dir)
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "a.glsllib -> b.glsllib -> a.glsllib",
        ));
    Ok(())
}

#[test]
fn test_malformed_import_reports_line() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let root = write_shader(&tmp_dir, "main.frag", "void main(){}\n#import lib.glsllib\n");

    linker(&tmp_dir)
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
    Ok(())
}

#[test]
fn test_multiple_roots_into_directory() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write_shader(&tmp_dir, "shared.glsllib", "float shared;\n");
    let frag = write_shader(&tmp_dir, "a.frag", "#import \"shared.glsllib\"\nvoid frag(){}\n");
    let vert = write_shader(&tmp_dir, "b.vert", "#import \"shared.glsllib\"\nvoid vert(){}\n");
    let out_dir = tmp_dir.path().join("out");
    fs::create_dir(&out_dir)?;

    linker(&tmp_dir)
        .arg(&frag)
        .arg(&vert)
        .arg("-o")
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out_dir.join("a.frag"))?,
        "float shared;\nvoid frag(){}\n"
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("b.vert"))?,
        "float shared;\nvoid vert(){}\n"
    );
    Ok(())
}

#[test]
fn test_multiple_roots_need_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let a = write_shader(&tmp_dir, "a.frag", "void main(){}\n");
    let b = write_shader(&tmp_dir, "b.frag", "void main(){}\n");

    linker(&tmp_dir)
        .arg(&a)
        .arg(&b)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
    Ok(())
}

#[test]
fn test_config_file_and_env() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    write_shader(&tmp_dir, "lib.glsllib", "float x;\n");
    let root = write_shader(&tmp_dir, "main.frag", "#import \"lib.glsllib\"\nvoid main(){}\n");
    write_shader(&tmp_dir, "shader-linker.toml", "mode = \"units\"\n");

    linker(&tmp_dir)
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"units\""));

    // Environment overrides the file.
    linker(&tmp_dir)
        .arg(&root)
        .env("SHADER_LINKER_MODE", "flatten")
        .assert()
        .success()
        .stdout("float x;\nvoid main(){}\n");
    Ok(())
}
