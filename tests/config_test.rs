use clap::Parser;
use curlbench::config::*;
use curlbench::error::BenchError;
use curlbench::variables::{ActiveVariableSource, KvRow};
use std::io::Write;

#[test]
fn test_default_backend_and_constants() {
    assert_eq!(DEFAULT_BACKEND_URL, "http://127.0.0.1:5000");
    assert_eq!(HISTORY_REFRESH_INTERVAL_SECS, 3);
    assert_eq!(MIN_ITERATIONS, 1);
    assert_eq!(EXCEL_PREVIEW_ROWS, 5);
}

#[test]
fn test_parse_run_command() {
    let args = CliArgs::try_parse_from([
        "curlbench",
        "run",
        "-c",
        "curl http://x/{{id}}",
        "-k",
        "id=7",
        "-a",
        "response.code == 200",
    ])
    .unwrap();

    assert_eq!(args.backend, DEFAULT_BACKEND_URL);
    assert!(!args.assume_yes);
    let Command::Run(exec) = args.command else {
        panic!("expected run");
    };
    assert_eq!(exec.curl, "curl http://x/{{id}}");
    assert_eq!(exec.kv, vec!["id=7".to_string()]);
    assert_eq!(exec.assertions, vec!["response.code == 200".to_string()]);
    assert!(exec.vars_json.is_none());
}

#[test]
fn test_global_flags_after_subcommand() {
    let args = CliArgs::try_parse_from([
        "curlbench",
        "clear",
        "--yes",
        "--backend",
        "http://10.0.0.2:8000",
    ])
    .unwrap();
    assert!(args.assume_yes);
    assert_eq!(args.backend, "http://10.0.0.2:8000");
    assert!(matches!(args.command, Command::Clear));
}

#[test]
fn test_run_requires_curl() {
    assert!(CliArgs::try_parse_from(["curlbench", "run"]).is_err());
}

#[test]
fn test_parse_history_and_show() {
    let args = CliArgs::try_parse_from(["curlbench", "history", "-w"]).unwrap();
    assert!(matches!(args.command, Command::History { watch: true }));

    let args = CliArgs::try_parse_from(["curlbench", "show", "BATCH20251017-101500-002"]).unwrap();
    let Command::Show { id } = args.command else {
        panic!("expected show");
    };
    assert_eq!(id, "BATCH20251017-101500-002");
}

fn batch_args(extra: &[&str]) -> BatchArgs {
    let mut argv = vec!["curlbench", "batch", "-c", "curl x"];
    argv.extend_from_slice(extra);
    match CliArgs::try_parse_from(argv).unwrap().command {
        Command::Batch(batch) => batch,
        other => panic!("expected batch, got {:?}", other),
    }
}

#[test]
fn test_effective_source() {
    assert_eq!(batch_args(&[]).effective_source(), ActiveVariableSource::Json);
    assert_eq!(
        batch_args(&["-k", "env=prod"]).effective_source(),
        ActiveVariableSource::Kv
    );
    assert_eq!(
        batch_args(&["-k", "env=prod", "-j", "{}"]).effective_source(),
        ActiveVariableSource::Json
    );
    assert_eq!(
        batch_args(&["-x", "rows.xlsx", "-k", "env=prod"]).effective_source(),
        ActiveVariableSource::Excel
    );
    assert_eq!(
        batch_args(&["-x", "rows.xlsx", "--source", "kv"]).effective_source(),
        ActiveVariableSource::Kv
    );
}

#[test]
fn test_batch_iterations_kept_as_text() {
    let batch = batch_args(&["-n", "-4"]);
    assert_eq!(batch.iterations.as_deref(), Some("-4"));
}

#[test]
fn test_parse_kv_arg() {
    assert_eq!(parse_kv_arg("env=prod"), KvRow::new("env", "prod"));
    assert_eq!(parse_kv_arg("q=a=b"), KvRow::new("q", "a=b"));
    assert_eq!(parse_kv_arg("flag"), KvRow::new("flag", ""));
}

#[test]
fn test_read_arg_or_file() {
    assert_eq!(read_arg_or_file("curl x").unwrap(), "curl x");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[{{\"id\":1}}]").unwrap();
    let arg = format!("@{}", file.path().display());
    assert_eq!(read_arg_or_file(&arg).unwrap(), "[{\"id\":1}]");

    let err = read_arg_or_file("@/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, BenchError::Config(_)));
}

#[test]
fn test_client_config_from_args() {
    let args = CliArgs::try_parse_from(["curlbench", "-b", "http://localhost:5001", "clear"]).unwrap();
    let config = ClientConfig::from_args(&args).unwrap();
    assert_eq!(config.backend_url.as_str(), "http://localhost:5001/");
    assert_eq!(config.refresh_interval_secs, HISTORY_REFRESH_INTERVAL_SECS);

    let args = CliArgs::try_parse_from(["curlbench", "-b", "not a url", "clear"]).unwrap();
    assert!(matches!(
        ClientConfig::from_args(&args),
        Err(BenchError::Config(_))
    ));
}
