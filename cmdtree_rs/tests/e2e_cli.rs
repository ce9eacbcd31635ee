//! End-to-End CLI Tests for the cmdtree demo binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command pointing to the cmdtree binary, run in an empty directory
/// so no stray `.cmdtree/config.toml` is picked up.
fn cmdtree(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("cmdtree");
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn temp() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn write_config(dir: &TempDir, body: &str) {
    let config_dir = dir.path().join(".cmdtree");
    std::fs::create_dir_all(&config_dir).expect("create .cmdtree");
    std::fs::write(config_dir.join("config.toml"), body).expect("write config");
}

// ============================================
// Basic CLI Tests
// ============================================

mod cli_basics {
    use super::*;

    #[test]
    fn bare_invocation_lists_modules() {
        let dir = temp();
        cmdtree(&dir)
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage: cmdtree"))
            .stdout(predicate::str::contains("Modules:"))
            .stdout(predicate::str::contains("greet"))
            .stdout(predicate::str::contains("calendar"));
    }

    #[test]
    fn shows_version() {
        let dir = temp();
        cmdtree(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn rejects_bad_color_mode() {
        let dir = temp();
        cmdtree(&dir)
            .args(["--color=sometimes", "math", "add"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid color mode"));
    }
}

// ============================================
// Invocation Tests
// ============================================

mod invocation {
    use super::*;

    #[test]
    fn adds_two_numbers() {
        let dir = temp();
        cmdtree(&dir)
            .args(["math", "add", "--a=2", "--b=3"])
            .assert()
            .success()
            .stdout("5\n");
    }

    #[test]
    fn sums_repeated_alias_flags() {
        let dir = temp();
        cmdtree(&dir)
            .args(["math", "sum", "-n=3", "-n=4", "/n:5"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("duplicate"));

        cmdtree(&dir)
            .args(["math", "sum", "-n=3", "-n=4"])
            .assert()
            .success()
            .stdout("7\n");
    }

    #[test]
    fn sums_separate_value_words() {
        let dir = temp();
        cmdtree(&dir)
            .args(["math", "sum", "--n", "3", "--n", "4"])
            .assert()
            .success()
            .stdout("7\n");

        cmdtree(&dir)
            .args(["math", "add", "--a", "-2", "--b", "5"])
            .assert()
            .success()
            .stdout("3\n");
    }

    #[test]
    fn sums_json_array_split_by_shell() {
        let dir = temp();
        cmdtree(&dir)
            .args(["math", "sum", "--numbers", "[1,", "2,", "3]"])
            .assert()
            .success()
            .stdout("6\n");
    }

    #[test]
    fn describes_weekday_given_as_word() {
        let dir = temp();
        cmdtree(&dir)
            .args(["--json", "calendar", "day", "--day", "Wednesday"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"index\": 3"));
    }

    #[test]
    fn binds_json_map_split_by_shell() {
        let dir = temp();
        cmdtree(&dir)
            .args(["store", "put", "-k", "stock", "--dicto", "{", "\"a\":", "1,", "\"b\":", "2", "}"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"b\": 2"));
    }

    #[test]
    fn sums_json_array() {
        let dir = temp();
        cmdtree(&dir)
            .args(["math", "sum", "--numbers=[1,2,3]"])
            .assert()
            .success()
            .stdout("6\n");
    }

    #[test]
    fn greets_through_receiver() {
        let dir = temp();
        cmdtree(&dir)
            .args(["greet", "hello", "-n=Ada", "--shout", "--times=2"])
            .assert()
            .success()
            .stdout("HELLO, ADA!\nHELLO, ADA!\n");
    }

    #[test]
    fn welcomes_with_enum_title() {
        let dir = temp();
        cmdtree(&dir)
            .args(["greet", "formal", "welcome", "--title=dr", "--name=Who"])
            .assert()
            .success()
            .stdout("Welcome, Dr Who.\n");
    }

    #[test]
    fn describes_weekday_as_json() {
        let dir = temp();
        cmdtree(&dir)
            .args(["--json", "calendar", "day", "--day=3"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\": \"success\""))
            .stdout(predicate::str::contains("\"name\": \"Wednesday\""));
    }

    #[test]
    fn adds_days_to_date() {
        let dir = temp();
        cmdtree(&dir)
            .args(["calendar", "after", "--date=2024-02-28", "--days=2"])
            .assert()
            .success()
            .stdout("2024-03-01\n");
    }

    #[test]
    fn binds_json_map_and_hidden_default() {
        let dir = temp();
        cmdtree(&dir)
            .args(["store", "put", "-k=stock", r#"--dicto={"a":1,"b":2}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"owner\": \"system\""))
            .stdout(predicate::str::contains("\"tag\": null"));
    }
}

// ============================================
// Failure Tests
// ============================================

mod failures {
    use super::*;

    #[test]
    fn unknown_method_suggests_siblings() {
        let dir = temp();
        cmdtree(&dir)
            .args(["math", "nope"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("'nope' is not a method"))
            .stderr(predicate::str::contains("Methods:"))
            .stderr(predicate::str::contains("average"))
            .stderr(predicate::str::contains("sum"));
    }

    #[test]
    fn reports_every_binding_error() {
        let dir = temp();
        cmdtree(&dir)
            .args(["store", "put", "--dicto={bad", "--owner=me", "--bogus"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--key (-k)"))
            .stderr(predicate::str::contains("missing"))
            .stderr(predicate::str::contains("cannot deserialize"))
            .stderr(predicate::str::contains("--owner"))
            .stderr(predicate::str::contains("--bogus"));
    }

    #[test]
    fn scalar_with_two_values_is_rejected() {
        let dir = temp();
        cmdtree(&dir)
            .args(["math", "add", "--a", "1", "2", "--b", "3"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("not an array"));
    }

    #[test]
    fn execution_failure_hides_causes_without_debug() {
        let dir = temp();
        cmdtree(&dir)
            .args(["system", "crash"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("method 'crash' failed: writing crash report"))
            .stderr(predicate::str::contains("disk quota exceeded").not());
    }

    #[test]
    fn execution_failure_shows_causes_with_debug() {
        let dir = temp();
        cmdtree(&dir)
            .args(["system", "crash", "--debug"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("caused by: disk quota exceeded"));
    }
}

// ============================================
// Help Tests
// ============================================

mod help {
    use super::*;

    #[test]
    fn method_help_lists_visible_parameters() {
        let dir = temp();
        cmdtree(&dir)
            .args(["store", "put", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--dicto"))
            .stdout(predicate::str::contains("map<string, int>"))
            .stdout(predicate::str::contains("--owner").not());
    }

    #[test]
    fn module_help_lists_sub_modules() {
        let dir = temp();
        cmdtree(&dir)
            .args(["greet", "-h"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Sub Modules:"))
            .stdout(predicate::str::contains("formal"))
            .stdout(predicate::str::contains("hello"));
    }
}

// ============================================
// Config Tests
// ============================================

mod config {
    use super::*;

    #[test]
    fn greeting_comes_from_config() {
        let dir = temp();
        write_config(&dir, "greeting = \"Ahoy\"\n");
        cmdtree(&dir)
            .args(["greet", "hello", "--name=Ada"])
            .assert()
            .success()
            .stdout("Ahoy, Ada!\n");
    }

    #[test]
    fn json_output_from_config() {
        let dir = temp();
        write_config(&dir, "json = true\n");
        cmdtree(&dir)
            .args(["math", "add", "--a=1", "--b=1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"value\": 2"));
    }

    #[test]
    fn broken_config_falls_back_with_warning() {
        let dir = temp();
        write_config(&dir, "json = [nope\n");
        cmdtree(&dir)
            .args(["math", "add", "--a=1", "--b=1"])
            .assert()
            .success()
            .stdout("2\n")
            .stderr(predicate::str::contains("[cmdtree][warn]"));
    }
}
